//! Encoding.
//!
//! This module provides the [`Encoder`], which walks a value graph depth
//! first and writes one chunk per block value, and [`ValueSerializer`], which
//! turns any `T: Serialize` into a [`Value`] tree.
//!
//! ## Overview
//!
//! - **Labels on first encounter**: a block value gets the next label the
//!   first time it is reached, *before* its children are visited
//! - **References afterwards**: every later encounter, including one from
//!   inside the value itself, is written as that label
//! - **Chunk order**: chunks appear in label order (`@`, `@1`, `@2`, ...)
//! - **Inline roots**: a root that needs no chunk is written as a bare token
//!
//! ## Usage
//!
//! ```rust
//! use circlebytes::{serialize, Value};
//!
//! let list = Value::list(vec![Value::from(1), Value::from("two")]);
//! list.push(list.clone()).unwrap();
//!
//! assert_eq!(serialize(&list).unwrap(), "@ list\n    1\n    |two|\n    @");
//! ```

use crate::chunk::INDENT;
use crate::handler::Encoded;
use crate::refs::RefTable;
use crate::value::entries_to_value;
use crate::{Context, Error, Record, Result, Value};
use serde::{ser, Serialize};
use tracing::trace;

/// The encode builder for one call.
///
/// Handlers receive a `&mut Encoder` so block handlers can encode their
/// children with [`Encoder::encode_token`].
pub struct Encoder<'c> {
    context: &'c Context,
    refs: RefTable,
    chunks: Vec<String>,
}

impl<'c> Encoder<'c> {
    pub fn new(context: &'c Context) -> Self {
        Encoder {
            context,
            refs: RefTable::new(),
            chunks: Vec::new(),
        }
    }

    /// Values labeled so far in this call.
    #[must_use]
    pub fn refs(&self) -> &RefTable {
        &self.refs
    }

    #[must_use]
    pub fn context(&self) -> &'c Context {
        self.context
    }

    /// Encodes `value` and returns the token that stands for it: the inline
    /// form for inline values, the label for block values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if no handler in the context accepts
    /// the value, or any error a handler raises.
    pub fn encode_token(&mut self, value: &Value) -> Result<String> {
        let context = self.context;
        let handler = context.dispatch(value, &self.refs).ok_or_else(|| {
            Error::unsupported(&format!("no handler accepts this {}", value.kind_name()))
        })?;

        let Some(title) = handler.title() else {
            return match handler.encode(value, self)? {
                Encoded::Inline(token) => Ok(token),
                Encoded::Block(_) => Err(Error::unsupported(&format!(
                    "inline handler {} produced a block",
                    handler.name()
                ))),
            };
        };

        let label = self.refs.assign(value);
        trace!(label = %label, handler = handler.name(), "assigned label");
        // Reserve the slot so chunks stay in label order even though the
        // children are emitted first.
        self.chunks.push(String::new());

        let lines = match handler.encode(value, self)? {
            Encoded::Block(lines) => lines,
            Encoded::Inline(_) => {
                return Err(Error::unsupported(&format!(
                    "block handler {} produced an inline token",
                    handler.name()
                )))
            }
        };

        let mut chunk = format!("{} {}", label, title);
        for line in &lines {
            chunk.push('\n');
            chunk.push_str(INDENT);
            chunk.push_str(line);
        }
        self.chunks[label.index()] = chunk;
        Ok(label.to_string())
    }

    /// Encodes the root value and returns the finished document.
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode_token`].
    pub fn encode_root(mut self, value: &Value) -> Result<String> {
        let token = self.encode_token(value)?;
        if self.chunks.is_empty() {
            return Ok(token);
        }
        if !self.refs.lookup(value).is_some_and(|l| l.index() == 0) {
            return Err(Error::unsupported(
                "an inline root cannot refer to other chunks",
            ));
        }
        trace!(chunks = self.chunks.len(), "encoded document");
        Ok(self.chunks.join("\n"))
    }
}

/// Serializes any `T: Serialize` into a [`Value`] tree.
///
/// Maps whose keys are all strings (and structs) become records; maps with
/// other keys become ordered maps. Every composite is a fresh allocation.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    entries: Vec<(Value, Value)>,
    current_key: Option<Value>,
    variant: Option<&'static str>,
}

fn tagged(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(variant) => {
            let mut record = Record::with_capacity(1);
            record.insert(variant.to_string(), value);
            Value::record(record)
        }
        None => value,
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::number(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::list(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(Some(variant), to_value_tree(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value_tree(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        tagged(self.variant, Value::list(self.vec))
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            entries: Vec::new(),
            current_key: None,
            variant,
        }
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.entries
            .push((Value::String(key.to_string()), to_value_tree(value)?));
        Ok(())
    }

    fn finish(self) -> Value {
        tagged(self.variant, entries_to_value(self.entries))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(to_value_tree(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, to_value_tree(value)?));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

fn to_value_tree<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}
