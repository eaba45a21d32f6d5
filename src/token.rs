//! Inline tokens within one content line.
//!
//! Tokens are separated by single spaces. A token starting with `|` is short
//! text and runs to the next `|` that is followed by a space or the end of
//! the line, so it may contain spaces. Once the expected tokens are read, a
//! remainder starting with ` #` is a comment.

use crate::refs::LabelTable;
use crate::{Context, Error, Result, Value};

/// Splits a content line into its raw tokens.
///
/// # Errors
///
/// Returns a syntax error for leading, doubled or trailing spaces and for
/// unterminated short text.
///
/// # Examples
///
/// ```rust
/// use circlebytes::token::split_tokens;
///
/// let tokens = split_tokens("|a b| @2 # note", 1).unwrap();
/// assert_eq!(tokens, vec!["|a b|", "@2"]);
/// ```
pub fn split_tokens(text: &str, line: usize) -> Result<Vec<&str>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::with_capacity(2);
    let mut pos = 0;

    if bytes.first() == Some(&b' ') {
        return Err(Error::syntax(
            line,
            "content lines must be indented by exactly 4 spaces",
        ));
    }

    while pos < bytes.len() {
        let end = if bytes[pos] == b'|' {
            let close = (pos + 1..bytes.len())
                .find(|&i| bytes[i] == b'|' && matches!(bytes.get(i + 1), None | Some(b' ')))
                .ok_or_else(|| Error::syntax(line, "unterminated short text"))?;
            close + 1
        } else {
            text[pos..].find(' ').map_or(bytes.len(), |i| pos + i)
        };

        if end == pos {
            return Err(Error::syntax(line, "unexpected space between tokens"));
        }
        tokens.push(&text[pos..end]);

        if end == bytes.len() {
            break;
        }
        // bytes[end] is a space here.
        let rest = &text[end + 1..];
        if rest.starts_with('#') {
            break;
        }
        if rest.is_empty() {
            return Err(Error::syntax(line, "trailing space after last token"));
        }
        pos = end + 1;
    }

    Ok(tokens)
}

/// Splits a content line and decodes exactly `arity` tokens.
///
/// # Errors
///
/// Returns a syntax error if the line holds a different number of tokens,
/// or whatever error decoding a token raises.
pub fn parse_line(
    text: &str,
    arity: usize,
    context: &Context,
    labels: &LabelTable,
    line: usize,
) -> Result<Vec<Value>> {
    let tokens = split_tokens(text, line)?;
    if tokens.len() != arity {
        return Err(Error::syntax(
            line,
            &format!(
                "expected {} inline value{}, found {}",
                arity,
                if arity == 1 { "" } else { "s" },
                tokens.len()
            ),
        ));
    }
    tokens
        .into_iter()
        .map(|token| context.decode_inline(token, labels, line))
        .collect()
}
