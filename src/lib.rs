//! # circlebytes
//!
//! A text codec for object graphs that keeps sharing and cycles intact.
//!
//! ## What is circlebytes?
//!
//! Most text formats describe trees. circlebytes describes graphs: a value
//! that is reachable along two paths is written once and referred to by
//! label everywhere else, so decoding gives back one shared value rather
//! than two copies, and a value that contains itself round-trips as a cycle.
//!
//! ```text
//! @ jshash
//!     |name| |root|
//!     |self| @
//!     |children| @1
//! @1 list
//!     @
//!     @
//! ```
//!
//! ## Key Features
//!
//! - **Identity Preserving**: shared lists, maps and records decode as shared
//!   values; cycles decode as cycles
//! - **Long Text Dedup**: equal multi-line or long strings are written once
//! - **Pluggable Types**: enum literals and custom type handlers are set per
//!   [`Context`]
//! - **Line Numbers**: every decode error carries the line it was found on
//! - **Serde Bridge**: [`to_value`] and [`from_value`] move between plain
//!   Rust types and [`Value`]
//! - **No Unsafe Code**
//!
//! ## Quick Start
//!
//! ```rust
//! use circlebytes::{deserialize, serialize, Value};
//!
//! let shared = Value::list(vec![Value::from(1), Value::from(2)]);
//! let root = Value::empty_record();
//! root.insert("a", shared.clone()).unwrap();
//! root.insert("b", shared).unwrap();
//!
//! let text = serialize(&root).unwrap();
//! assert_eq!(text, "@ jshash\n    |a| @1\n    |b| @1\n@1 list\n    1\n    2");
//!
//! let back = deserialize(&text).unwrap();
//! assert!(back.get("a").unwrap().ptr_eq(&back.get("b").unwrap()));
//! ```
//!
//! ### Cycles
//!
//! ```rust
//! use circlebytes::{deserialize, serialize, Value};
//!
//! let node = Value::empty_record();
//! node.insert("next", node.clone()).unwrap();
//!
//! let back = deserialize(&serialize(&node).unwrap()).unwrap();
//! assert!(back.get("next").unwrap().ptr_eq(&back));
//! ```
//!
//! ### Building Values with value!
//!
//! ```rust
//! use circlebytes::{value, Value};
//!
//! let data = value!({
//!     "name": "Alice",
//!     "tags": ["rust", null, undefined]
//! });
//! assert_eq!(data.get("name"), Some(Value::from("Alice")));
//! ```
//!
//! ## Format
//!
//! The grammar is described in the [`format`] module.
//!
//! ## Memory
//!
//! Composite values are `Rc<RefCell<_>>` handles. A cyclic graph is never
//! freed by reference counting alone; break the cycle (for example by
//! clearing a list) when the graph is no longer needed.
//!
//! ## Demos
//!
//! See the `demos/` directory:
//!
//! - **`cycles.rs`** - Self-references and shared children
//! - **`custom_context.rs`** - Custom enum literals and a custom type handler
//!
//! Run one with: `cargo run --example <name>`

pub mod chunk;
pub mod context;
pub mod de;
pub mod error;
pub mod format;
pub mod handler;
pub mod macros;
pub mod map;
pub mod refs;
pub mod ser;
pub mod token;
pub mod value;

pub use context::Context;
pub use de::ValueDeserializer;
pub use error::{Error, Result};
pub use handler::{
    Encoded, EnumHandler, ListHandler, LongTextHandler, MapHandler, NumberHandler, RecordHandler,
    ReferenceHandler, ShortTextHandler, TypeHandler,
};
pub use map::{OrderedMap, Record};
pub use refs::{Label, LabelTable, RefTable};
pub use ser::{Encoder, ValueSerializer};
pub use value::{ListRef, MapRef, Primitive, RecordRef, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use tracing::debug;

/// Serialize a value graph with the default context.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{serialize, Value};
///
/// assert_eq!(serialize(&Value::from(1.5)).unwrap(), "1.5");
/// assert_eq!(serialize(&Value::list(vec![Value::Null])).unwrap(), "@ list\n    null");
/// ```
///
/// # Errors
///
/// Returns [`Error::Unsupported`] if some value in the graph has no handler.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn serialize(value: &Value) -> Result<String> {
    serialize_with_context(value, Context::shared())
}

/// Serialize a value graph with a custom context.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{serialize_with_context, Context, Primitive, Value};
///
/// let context = Context::new().without_enum("null").with_enum("nil", Primitive::Null)?;
/// let text = serialize_with_context(&Value::list(vec![Value::Null]), &context)?;
/// assert_eq!(text, "@ list\n    nil");
/// # Ok::<(), circlebytes::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::Unsupported`] if some value in the graph has no handler
/// in `context`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn serialize_with_context(value: &Value, context: &Context) -> Result<String> {
    debug!(kind = value.kind_name(), "serializing");
    Encoder::new(context).encode_root(value)
}

/// Serialize a value graph to a writer with the default context.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{serialize_to_writer, Value};
///
/// let mut buffer = Vec::new();
/// serialize_to_writer(&mut buffer, &Value::from("hi")).unwrap();
/// assert_eq!(buffer, b"|hi|");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn serialize_to_writer<W>(writer: W, value: &Value) -> Result<()>
where
    W: io::Write,
{
    serialize_to_writer_with_context(writer, value, Context::shared())
}

/// Serialize a value graph to a writer with a custom context.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn serialize_to_writer_with_context<W>(
    mut writer: W,
    value: &Value,
    context: &Context,
) -> Result<()>
where
    W: io::Write,
{
    let text = serialize_with_context(value, context)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize a document with the default context.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{deserialize, Value};
///
/// let value = deserialize("@ list\n    1\n    |two|\n    @").unwrap();
/// assert_eq!(value.get_index(1), Some(Value::from("two")));
/// assert!(value.get_index(2).unwrap().ptr_eq(&value));
/// ```
///
/// # Errors
///
/// Returns an error describing the first problem found. Errors tied to a
/// line carry its 1-based number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn deserialize(input: &str) -> Result<Value> {
    deserialize_with_context(input, Context::shared())
}

/// Deserialize a document with a custom context.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{deserialize_with_context, Context, Error};
///
/// let err = deserialize_with_context("@ list\n    true", &Context::empty()).unwrap_err();
/// assert_eq!(err, Error::unknown_type(2, "true"));
/// ```
///
/// # Errors
///
/// See [`deserialize`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn deserialize_with_context(input: &str, context: &Context) -> Result<Value> {
    de::decode(input, context)
}

/// Deserialize a document from an I/O stream with the default context.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{deserialize_from_reader, Value};
/// use std::io::Cursor;
///
/// let value = deserialize_from_reader(Cursor::new(b"@ list\n    nan")).unwrap();
/// assert!(value.get_index(0).unwrap().is_nan());
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the document is invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn deserialize_from_reader<R>(mut reader: R) -> Result<Value>
where
    R: io::Read,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    deserialize(&string)
}

/// Deserialize a document from UTF-8 bytes with the default context.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{deserialize_from_slice, Value};
///
/// assert_eq!(deserialize_from_slice(b"-3").unwrap(), Value::from(-3));
/// assert!(deserialize_from_slice(&[0xff, 0xfe]).is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or the document is
/// invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn deserialize_from_slice(v: &[u8]) -> Result<Value> {
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    deserialize(s)
}

/// Convert any `T: Serialize` to a [`Value`] tree.
///
/// Every composite in the result is a fresh allocation, so the tree has no
/// sharing until the caller introduces it.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_record());
/// assert_eq!(value.get("y"), Some(Value::from(2)));
/// ```
///
/// # Errors
///
/// Returns an error if `T`'s `Serialize` impl fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Convert a [`Value`] into any `T: DeserializeOwned`.
///
/// Shared values are read once per path that reaches them.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{deserialize, from_value};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let value = deserialize("@ jshash\n    |x| 1\n    |y| 2").unwrap();
/// let point: Point = from_value(&value).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the graph has a cycle or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: &Value) -> Result<T>
where
    T: DeserializeOwned,
{
    if !value.is_acyclic() {
        return Err(Error::custom("cannot deserialize a cyclic value graph"));
    }
    T::deserialize(ValueDeserializer::new(value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
        manager: Option<Box<User>>,
    }

    fn alice() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
            manager: None,
        }
    }

    #[test]
    fn test_struct_round_trip_through_document() {
        let value = to_value(&alice()).unwrap();
        let text = serialize(&value).unwrap();
        let back = deserialize(&text).unwrap();
        let user: User = from_value(&back).unwrap();
        assert_eq!(user, alice());
    }

    #[test]
    fn test_to_value_point() {
        let value = to_value(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value.get("x"), Some(Value::from(1)));
        assert_eq!(value.get("y"), Some(Value::from(2)));
    }

    #[test]
    fn test_numbers_round_trip() {
        let numbers = vec![1, 2, 3, 4, 5];
        let value = to_value(&numbers).unwrap();
        let back = deserialize(&serialize(&value).unwrap()).unwrap();
        let numbers_back: Vec<i32> = from_value(&back).unwrap();
        assert_eq!(numbers, numbers_back);
    }

    #[test]
    fn test_from_value_shared_substructure_is_copied() {
        let point = to_value(&Point { x: 3, y: 4 }).unwrap();
        let pair = Value::list(vec![point.clone(), point]);
        let points: Vec<Point> = from_value(&pair).unwrap();
        assert_eq!(points, vec![Point { x: 3, y: 4 }, Point { x: 3, y: 4 }]);
    }

    #[test]
    fn test_from_value_rejects_cycles() {
        let list = Value::empty_list();
        list.push(list.clone()).unwrap();
        let result: Result<Vec<Vec<u8>>> = from_value(&list);
        assert!(matches!(result, Err(Error::Custom(_))));
    }

    #[test]
    fn test_writer_and_reader() {
        let value = Value::list(vec![Value::from("a\nb"), Value::Infinity]);
        let mut buffer = Vec::new();
        serialize_to_writer(&mut buffer, &value).unwrap();
        let back = deserialize_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_writer_reports_unsupported() {
        let mut buffer = Vec::new();
        let result =
            serialize_to_writer_with_context(&mut buffer, &Value::Null, &Context::empty());
        assert!(matches!(result, Err(Error::Unsupported(_))));
        assert!(buffer.is_empty());
    }
}
