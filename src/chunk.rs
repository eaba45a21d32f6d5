//! Line framing: splitting a document into chunks.
//!
//! A chunk is a header line (`[label] title`) followed by zero or more
//! content lines indented by exactly [`INDENT`]. Content is kept raw apart
//! from removing the indentation; its interpretation belongs to the handler
//! that owns the chunk title.
//!
//! Lines the chunker skips:
//!
//! - blank lines, which also close the current chunk
//! - top-level lines starting with `#`
//!
//! A labeled header may end in a ` #` comment.

use crate::refs::Label;
use crate::{Error, Result};

/// The indentation unit of content lines.
pub const INDENT: &str = "    ";

/// One content line with the indentation removed.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentLine {
    /// 1-based line number in the document.
    pub line: usize,
    pub text: String,
}

/// A header plus its content lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub label: Option<Label>,
    pub title: String,
    /// 1-based line number of the header.
    pub line: usize,
    pub lines: Vec<ContentLine>,
}

impl Chunk {
    /// Parses a header line.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if a labeled header does not split into exactly
    /// a label and a title, or the label is malformed.
    pub fn parse_header(text: &str, line: usize) -> Result<Chunk> {
        if !text.starts_with('@') {
            return Ok(Chunk {
                label: None,
                title: text.to_string(),
                line,
                lines: Vec::new(),
            });
        }

        let text = match text.find(" #") {
            Some(index) => &text[..index],
            None => text,
        };
        let segments: Vec<&str> = text.split_whitespace().collect();
        let [label, title] = segments.as_slice() else {
            return Err(Error::syntax(
                line,
                &format!(
                    "malformed header {:?}: expected a label and a title",
                    text
                ),
            ));
        };
        let label = Label::parse(label)
            .ok_or_else(|| Error::syntax(line, &format!("malformed label {:?}", label)))?;
        Ok(Chunk {
            label: Some(label),
            title: title.to_string(),
            line,
            lines: Vec::new(),
        })
    }
}

/// Splits a document into chunks.
///
/// # Errors
///
/// Returns a syntax error for indentation other than exactly [`INDENT`] at
/// the start of a line, for content lines outside a chunk, and for
/// malformed headers.
///
/// # Examples
///
/// ```rust
/// use circlebytes::chunk::split_chunks;
///
/// let chunks = split_chunks("@ list\n    @1\n\n@1 text\n    hi").unwrap();
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].title, "text");
/// assert_eq!(chunks[1].lines[0].text, "hi");
/// ```
pub fn split_chunks(input: &str) -> Result<Vec<Chunk>> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut open = false;

    for (index, raw) in input.split('\n').enumerate() {
        let line = index + 1;

        if raw.is_empty() {
            open = false;
            continue;
        }

        if raw.starts_with(' ') {
            let Some(text) = raw.strip_prefix(INDENT) else {
                return Err(Error::syntax(
                    line,
                    "content lines must be indented by exactly 4 spaces",
                ));
            };
            match chunks.last_mut() {
                Some(chunk) if open => chunk.lines.push(ContentLine {
                    line,
                    text: text.to_string(),
                }),
                _ => return Err(Error::syntax(line, "content line outside any chunk")),
            }
            continue;
        }

        if raw.starts_with('#') {
            continue;
        }

        chunks.push(Chunk::parse_header(raw, line)?);
        open = true;
    }

    Ok(chunks)
}
