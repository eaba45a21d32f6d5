//! Type handlers: one pluggable unit per value shape.
//!
//! A [`Context`](crate::Context) keeps its handlers in priority order and
//! dispatches to the first one that applies, both when encoding (via
//! [`TypeHandler::matches`]) and when decoding (via the chunk title or
//! [`TypeHandler::decode_inline`]).
//!
//! Handlers come in two kinds:
//!
//! - **Inline** handlers ([`TypeHandler::title`] returns `None`) turn a value
//!   into a single token that fits inside a content line.
//! - **Block** handlers own a chunk title. The encoder gives each block value
//!   a label and a chunk of its own; the decoder builds the value's shell
//!   with [`TypeHandler::construct`] and later feeds it parsed content lines
//!   through [`TypeHandler::fill`].
//!
//! ## Writing a Handler
//!
//! ```rust
//! use circlebytes::{
//!     deserialize_with_context, serialize_with_context, Context, Encoded, Encoder, LabelTable,
//!     RefTable, Result, TypeHandler, Value,
//! };
//! use std::sync::Arc;
//!
//! /// Encodes the string "∅" as a bare `empty` token.
//! struct EmptySet;
//!
//! impl TypeHandler for EmptySet {
//!     fn name(&self) -> &str {
//!         "empty-set"
//!     }
//!
//!     fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
//!         value.as_str() == Some("∅")
//!     }
//!
//!     fn encode(&self, _value: &Value, _encoder: &mut Encoder<'_>) -> Result<Encoded> {
//!         Ok(Encoded::Inline("empty".to_string()))
//!     }
//!
//!     fn decode_inline(&self, token: &str, _labels: &LabelTable, _line: usize) -> Option<Result<Value>> {
//!         (token == "empty").then(|| Ok(Value::from("∅")))
//!     }
//! }
//!
//! let context = Context::new().with_handler(Arc::new(EmptySet));
//! let text = serialize_with_context(&Value::from("∅"), &context).unwrap();
//! assert_eq!(text, "empty");
//! assert_eq!(deserialize_with_context(&text, &context).unwrap(), Value::from("∅"));
//! ```

use crate::chunk::Chunk;
use crate::refs::{Label, LabelTable, RefTable};
use crate::ser::Encoder;
use crate::value::Primitive;
use crate::{Error, Result, Value};

/// Strings shorter than this (in characters) may be written inline.
pub const SHORT_TEXT_LIMIT: usize = 50;

/// What a handler produced for one value.
#[derive(Clone, Debug, PartialEq)]
pub enum Encoded {
    /// A single token placed wherever the value is referenced.
    Inline(String),
    /// The content lines of the value's chunk, without indentation.
    Block(Vec<String>),
}

/// The capability interface every handler implements.
///
/// Only [`name`](TypeHandler::name), [`matches`](TypeHandler::matches) and
/// [`encode`](TypeHandler::encode) are required; the decode methods default
/// to "not applicable".
pub trait TypeHandler: Send + Sync {
    /// Name used in diagnostics and trace output.
    fn name(&self) -> &str;

    /// Chunk title for block handlers, `None` for inline handlers.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Encode-side applicability test. `refs` holds the values that
    /// already have a label in the current call.
    fn matches(&self, value: &Value, refs: &RefTable) -> bool;

    /// Encodes a value this handler matched. Block handlers encode their
    /// children through [`Encoder::encode_token`].
    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Encoded>;

    /// Decodes an inline token, or returns `None` if the token is not this
    /// handler's to decode.
    fn decode_inline(&self, _token: &str, _labels: &LabelTable, _line: usize) -> Option<Result<Value>> {
        None
    }

    /// Builds the value (or empty shell) for one of this handler's chunks.
    fn construct(&self, chunk: &Chunk) -> Result<Value> {
        Err(Error::unknown_type(chunk.line, &chunk.title))
    }

    /// Inline tokens expected on each content line. Zero means the content
    /// lines are raw and were already consumed by `construct`.
    fn arity(&self) -> usize {
        0
    }

    /// Adds one parsed content line to a shell built by `construct`.
    fn fill(&self, _shell: &Value, _tokens: Vec<Value>, _line: usize) -> Result<()> {
        Ok(())
    }
}

/// Emits the existing label of a value that already has a chunk.
#[derive(Debug, Default)]
pub struct ReferenceHandler;

impl TypeHandler for ReferenceHandler {
    fn name(&self) -> &str {
        "reference"
    }

    fn matches(&self, value: &Value, refs: &RefTable) -> bool {
        refs.lookup(value).is_some()
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Encoded> {
        encoder
            .refs()
            .lookup(value)
            .map(|label| Encoded::Inline(label.to_string()))
            .ok_or_else(|| Error::unsupported("value has no label"))
    }

    fn decode_inline(&self, token: &str, labels: &LabelTable, line: usize) -> Option<Result<Value>> {
        if !token.starts_with('@') {
            return None;
        }
        Some(match Label::parse(token) {
            Some(label) => labels
                .resolve(label)
                .ok_or_else(|| Error::missing_label(line, token)),
            None => Err(Error::syntax(line, &format!("malformed label {:?}", token))),
        })
    }
}

/// A fixed literal standing for one singleton value.
#[derive(Debug)]
pub struct EnumHandler {
    literal: String,
    value: Primitive,
}

impl EnumHandler {
    pub fn new(literal: impl Into<String>, value: Primitive) -> Self {
        EnumHandler {
            literal: literal.into(),
            value,
        }
    }

    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl TypeHandler for EnumHandler {
    fn name(&self) -> &str {
        &self.literal
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        self.value.eq_value(value)
    }

    fn encode(&self, _value: &Value, _encoder: &mut Encoder<'_>) -> Result<Encoded> {
        Ok(Encoded::Inline(self.literal.clone()))
    }

    fn decode_inline(&self, token: &str, _labels: &LabelTable, _line: usize) -> Option<Result<Value>> {
        (token == self.literal).then(|| Ok(self.value.to_value()))
    }
}

/// Finite numbers in their canonical decimal spelling.
#[derive(Debug, Default)]
pub struct NumberHandler;

impl NumberHandler {
    /// The canonical spelling of a finite number.
    #[must_use]
    pub fn canonical(n: f64) -> String {
        n.to_string()
    }
}

impl TypeHandler for NumberHandler {
    fn name(&self) -> &str {
        "number"
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        matches!(value, Value::Number(n) if n.is_finite())
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Encoded> {
        match value {
            Value::Number(n) => Ok(Encoded::Inline(Self::canonical(*n))),
            other => Err(Error::unsupported(other.kind_name())),
        }
    }

    fn decode_inline(&self, token: &str, _labels: &LabelTable, line: usize) -> Option<Result<Value>> {
        let n = token.parse::<f64>().ok().filter(|n| n.is_finite())?;
        // A token that parses but re-renders differently is ambiguous.
        if Self::canonical(n).len() != token.len() {
            return Some(Err(Error::numeric_round_trip(line, token)));
        }
        Some(Ok(Value::Number(n)))
    }
}

/// Short single-line strings, written as `|text|`.
#[derive(Debug, Default)]
pub struct ShortTextHandler;

impl ShortTextHandler {
    /// Whether a string can be written inline.
    #[must_use]
    pub fn accepts(s: &str) -> bool {
        !s.contains('\n') && !s.contains('|') && s.chars().count() < SHORT_TEXT_LIMIT
    }
}

impl TypeHandler for ShortTextHandler {
    fn name(&self) -> &str {
        "short-text"
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        matches!(value, Value::String(s) if Self::accepts(s))
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Encoded> {
        match value {
            Value::String(s) => Ok(Encoded::Inline(format!("|{}|", s))),
            other => Err(Error::unsupported(other.kind_name())),
        }
    }

    fn decode_inline(&self, token: &str, _labels: &LabelTable, line: usize) -> Option<Result<Value>> {
        let rest = token.strip_prefix('|')?;
        Some(match rest.strip_suffix('|') {
            Some(inner) if !inner.contains('|') => Ok(Value::String(inner.to_string())),
            Some(_) => Err(Error::syntax(line, "short text cannot contain '|'")),
            None => Err(Error::syntax(line, "unterminated short text")),
        })
    }
}

/// Any string, as a `text` chunk with one content line per line of text.
#[derive(Debug, Default)]
pub struct LongTextHandler;

impl TypeHandler for LongTextHandler {
    fn name(&self) -> &str {
        "long-text"
    }

    fn title(&self) -> Option<&str> {
        Some("text")
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        value.is_string()
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Encoded> {
        match value {
            Value::String(s) => Ok(Encoded::Block(s.split('\n').map(String::from).collect())),
            other => Err(Error::unsupported(other.kind_name())),
        }
    }

    fn construct(&self, chunk: &Chunk) -> Result<Value> {
        let lines: Vec<&str> = chunk.lines.iter().map(|l| l.text.as_str()).collect();
        Ok(Value::String(lines.join("\n")))
    }
}

/// Lists, as a `list` chunk with one value per content line.
#[derive(Debug, Default)]
pub struct ListHandler;

impl TypeHandler for ListHandler {
    fn name(&self) -> &str {
        "list"
    }

    fn title(&self) -> Option<&str> {
        Some("list")
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        value.is_list()
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Encoded> {
        let list = value
            .as_list()
            .ok_or_else(|| Error::unsupported(value.kind_name()))?;
        let items = list.borrow();
        let mut lines = Vec::with_capacity(items.len());
        for item in items.iter() {
            lines.push(encoder.encode_token(item)?);
        }
        Ok(Encoded::Block(lines))
    }

    fn construct(&self, chunk: &Chunk) -> Result<Value> {
        Ok(Value::list(Vec::with_capacity(chunk.lines.len())))
    }

    fn arity(&self) -> usize {
        1
    }

    fn fill(&self, shell: &Value, tokens: Vec<Value>, line: usize) -> Result<()> {
        let list = shell
            .as_list()
            .ok_or_else(|| Error::syntax(line, "list content outside a list"))?;
        list.borrow_mut().extend(tokens);
        Ok(())
    }
}

/// Ordered maps with keys of any kind, as a `hash` chunk of `key value` lines.
#[derive(Debug, Default)]
pub struct MapHandler;

impl TypeHandler for MapHandler {
    fn name(&self) -> &str {
        "map"
    }

    fn title(&self) -> Option<&str> {
        Some("hash")
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        value.is_map()
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Encoded> {
        let map = value
            .as_map()
            .ok_or_else(|| Error::unsupported(value.kind_name()))?;
        let entries = map.borrow();
        let mut lines = Vec::with_capacity(entries.len());
        for (key, value) in entries.iter() {
            let key = encoder.encode_token(key)?;
            let value = encoder.encode_token(value)?;
            lines.push(format!("{} {}", key, value));
        }
        Ok(Encoded::Block(lines))
    }

    fn construct(&self, _chunk: &Chunk) -> Result<Value> {
        Ok(Value::empty_map())
    }

    fn arity(&self) -> usize {
        2
    }

    fn fill(&self, shell: &Value, tokens: Vec<Value>, line: usize) -> Result<()> {
        let map = shell
            .as_map()
            .ok_or_else(|| Error::syntax(line, "map content outside a map"))?;
        let mut tokens = tokens.into_iter();
        if let (Some(key), Some(value)) = (tokens.next(), tokens.next()) {
            let mut map = map.borrow_mut();
            if map.contains_key(&key) {
                return Err(Error::syntax(line, "duplicate key"));
            }
            map.insert(key, value);
        }
        Ok(())
    }
}

/// String-keyed records, as a `jshash` chunk of `key value` lines.
#[derive(Debug, Default)]
pub struct RecordHandler;

impl TypeHandler for RecordHandler {
    fn name(&self) -> &str {
        "record"
    }

    fn title(&self) -> Option<&str> {
        Some("jshash")
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        value.is_record()
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Encoded> {
        let record = value
            .as_record()
            .ok_or_else(|| Error::unsupported(value.kind_name()))?;
        let fields = record.borrow();
        let mut lines = Vec::with_capacity(fields.len());
        for (key, value) in fields.iter() {
            let key = encoder.encode_token(&Value::String(key.clone()))?;
            let value = encoder.encode_token(value)?;
            lines.push(format!("{} {}", key, value));
        }
        Ok(Encoded::Block(lines))
    }

    fn construct(&self, _chunk: &Chunk) -> Result<Value> {
        Ok(Value::empty_record())
    }

    fn arity(&self) -> usize {
        2
    }

    fn fill(&self, shell: &Value, tokens: Vec<Value>, line: usize) -> Result<()> {
        let record = shell
            .as_record()
            .ok_or_else(|| Error::syntax(line, "record content outside a record"))?;
        let mut tokens = tokens.into_iter();
        match (tokens.next(), tokens.next()) {
            (Some(Value::String(key)), Some(value)) => {
                let mut record = record.borrow_mut();
                if record.contains_key(&key) {
                    return Err(Error::syntax(line, "duplicate key"));
                }
                record.insert(key, value);
                Ok(())
            }
            (Some(key), _) => Err(Error::key_type(line, key.kind_name())),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(handler: &dyn TypeHandler, token: &str) -> Option<Result<Value>> {
        handler.decode_inline(token, &LabelTable::new(), 1)
    }

    #[test]
    fn test_number_round_trip_guard() {
        let handler = NumberHandler;
        assert!(matches!(inline(&handler, "42"), Some(Ok(Value::Number(n))) if n == 42.0));
        assert!(matches!(inline(&handler, "-0.75"), Some(Ok(_))));
        assert!(matches!(
            inline(&handler, "042"),
            Some(Err(Error::NumericRoundTrip { .. }))
        ));
        assert!(matches!(
            inline(&handler, "1e3"),
            Some(Err(Error::NumericRoundTrip { .. }))
        ));
        assert!(matches!(
            inline(&handler, "+1"),
            Some(Err(Error::NumericRoundTrip { .. }))
        ));
        assert!(inline(&handler, "inf").is_none());
        assert!(inline(&handler, "nan").is_none());
        assert!(inline(&handler, "abc").is_none());
    }

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(NumberHandler::canonical(1.0), "1");
        assert_eq!(NumberHandler::canonical(0.25), "0.25");
        assert_eq!(NumberHandler::canonical(-10.0), "-10");
        assert_eq!(NumberHandler::canonical(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_short_text_boundary() {
        assert!(ShortTextHandler::accepts(""));
        assert!(ShortTextHandler::accepts(&"x".repeat(49)));
        assert!(!ShortTextHandler::accepts(&"x".repeat(50)));
        assert!(!ShortTextHandler::accepts("a\nb"));
        assert!(!ShortTextHandler::accepts("a|b"));
        assert!(ShortTextHandler::accepts(&"é".repeat(49)));
    }

    #[test]
    fn test_short_text_decode() {
        let handler = ShortTextHandler;
        assert!(matches!(inline(&handler, "||"), Some(Ok(Value::String(s))) if s.is_empty()));
        assert!(matches!(inline(&handler, "|a b|"), Some(Ok(Value::String(s))) if s == "a b"));
        assert!(matches!(inline(&handler, "|a|b|"), Some(Err(Error::Syntax { .. }))));
        assert!(matches!(inline(&handler, "|ab"), Some(Err(Error::Syntax { .. }))));
        assert!(inline(&handler, "ab").is_none());
    }

    #[test]
    fn test_enum_handler_matches_normalized_value() {
        let handler = EnumHandler::new("nan", Primitive::NaN);
        let refs = RefTable::new();
        assert!(handler.matches(&Value::NaN, &refs));
        assert!(handler.matches(&Value::Number(f64::NAN), &refs));
        assert!(!handler.matches(&Value::Null, &refs));
        assert!(matches!(inline(&handler, "nan"), Some(Ok(Value::NaN))));
        assert!(inline(&handler, "NaN").is_none());
    }

    #[test]
    fn test_enum_handler_matches_strings_by_content() {
        let handler = EnumHandler::new("hi", Primitive::from("hello"));
        let refs = RefTable::new();
        assert!(handler.matches(&Value::from("hello"), &refs));
        assert!(!handler.matches(&Value::from("hell"), &refs));
    }

    #[test]
    fn test_fill_rejects_repeated_keys() {
        let record = Value::empty_record();
        let handler = RecordHandler;
        handler.fill(&record, vec![Value::from("a"), Value::from(1)], 2).unwrap();
        assert_eq!(
            handler.fill(&record, vec![Value::from("a"), Value::from(2)], 3),
            Err(Error::syntax(3, "duplicate key"))
        );
        assert_eq!(record.get("a"), Some(Value::from(1)));

        let map = Value::empty_map();
        let handler = MapHandler;
        handler.fill(&map, vec![Value::Null, Value::from(1)], 2).unwrap();
        assert!(handler.fill(&map, vec![Value::Null, Value::from(2)], 3).is_err());
    }

    #[test]
    fn test_reference_decode_errors() {
        let handler = ReferenceHandler;
        assert!(matches!(
            inline(&handler, "@4"),
            Some(Err(Error::MissingLabel { .. }))
        ));
        assert!(matches!(inline(&handler, "@x"), Some(Err(Error::Syntax { .. }))));
        assert!(inline(&handler, "4").is_none());
    }

    #[test]
    fn test_record_fill_rejects_non_string_keys() {
        let shell = Value::empty_record();
        let err = RecordHandler
            .fill(&shell, vec![Value::from(1), Value::Null], 3)
            .unwrap_err();
        assert_eq!(err, Error::key_type(3, "number"));
    }

    #[test]
    fn test_map_fill_accepts_any_key() {
        let shell = Value::empty_map();
        MapHandler
            .fill(&shell, vec![Value::Undefined, Value::from(1)], 1)
            .unwrap();
        MapHandler
            .fill(&shell, vec![shell.clone(), Value::from(2)], 2)
            .unwrap();
        let map = shell.as_map().unwrap().borrow();
        assert_eq!(map.len(), 2);
        assert!(map.get(&shell).is_some());
    }
}
