//! Decoding.
//!
//! This module provides [`decode`], which rebuilds a value graph from a
//! document, and [`ValueDeserializer`], which feeds a [`Value`] tree into any
//! `T: Deserialize`.
//!
//! ## Two Phases
//!
//! Content lines may name labels defined further down, or the chunk they sit
//! in. Decoding therefore runs in two passes over the chunks:
//!
//! 1. **Shells**: every chunk gets its (still empty) value from its handler
//!    and is bound to its label.
//! 2. **Fill**: every content line is tokenized and its values, labels
//!    included, are added to the shell. All labels resolve by now.
//!
//! ```rust
//! use circlebytes::deserialize;
//!
//! let value = deserialize("@ jshash\n    |me| @\n    |child| @1\n@1 list\n    @").unwrap();
//! assert!(value.get("me").unwrap().ptr_eq(&value));
//! assert!(value.get("child").unwrap().get_index(0).unwrap().ptr_eq(&value));
//! ```

use crate::chunk::{split_chunks, Chunk};
use crate::handler::TypeHandler;
use crate::refs::{Label, LabelTable};
use crate::token::parse_line;
use crate::{Context, Error, Result, Value};
use serde::de::IntoDeserializer;
use serde::{de, forward_to_deserialize_any};
use std::sync::Arc;
use tracing::{debug, trace};

struct Pending<'a> {
    handler: &'a Arc<dyn TypeHandler>,
    chunk: &'a Chunk,
    shell: Value,
}

/// Decodes a document with the given context.
///
/// # Errors
///
/// Returns the first syntax, type, label, root or key error found; no
/// partial value is ever returned.
pub fn decode(input: &str, context: &Context) -> Result<Value> {
    let chunks = split_chunks(input)?;
    debug!(chunks = chunks.len(), "decoding document");

    let Some(first) = chunks.first() else {
        return Err(Error::syntax(1, "empty document"));
    };

    // A lone unlabeled line that names no block type is a bare inline value.
    if chunks.len() == 1
        && first.label.is_none()
        && first.lines.is_empty()
        && context.handler_for_title(&first.title).is_none()
    {
        return context.decode_inline(&first.title, &LabelTable::new(), first.line);
    }

    let mut labels = LabelTable::new();
    let pending = construct_shells(&chunks, context, &mut labels)?;
    let root = labels
        .resolve(Label::ROOT)
        .ok_or_else(|| Error::root_ambiguity("no chunk is labeled @"))?;

    for Pending {
        handler,
        chunk,
        shell,
    } in &pending
    {
        let arity = handler.arity();
        if arity == 0 {
            continue;
        }
        for content in &chunk.lines {
            let values = parse_line(&content.text, arity, context, &labels, content.line)?;
            handler.fill(shell, values, content.line)?;
        }
    }

    debug!(labels = labels.len(), "decoded document");
    Ok(root)
}

fn construct_shells<'a>(
    chunks: &'a [Chunk],
    context: &'a Context,
    labels: &mut LabelTable,
) -> Result<Vec<Pending<'a>>> {
    let sole = chunks.len() == 1;
    let mut pending = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let label = match chunk.label {
            Some(label) => label,
            None if sole => Label::ROOT,
            None => {
                return Err(Error::root_ambiguity(
                    "labels are required when more than one value is present",
                ))
            }
        };
        let handler = context
            .handler_for_title(&chunk.title)
            .ok_or_else(|| Error::unknown_type(chunk.line, &chunk.title))?;
        let shell = handler.construct(chunk)?;

        if !labels.define(label, shell.clone()) {
            return Err(if label == Label::ROOT {
                Error::root_ambiguity("more than one chunk is labeled @")
            } else {
                Error::syntax(chunk.line, &format!("label {} is defined twice", label))
            });
        }
        trace!(label = %label, handler = handler.name(), "constructed shell");

        pending.push(Pending {
            handler,
            chunk,
            shell,
        });
    }

    Ok(pending)
}

/// Deserializes a [`Value`] tree into any `T: Deserialize`.
///
/// Shared composites are read once per occurrence. Cyclic graphs are
/// rejected up front by [`from_value`](crate::from_value).
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Undefined | Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::NaN => visitor.visit_f64(f64::NAN),
            Value::Infinity => visitor.visit_f64(f64::INFINITY),
            Value::NegInfinity => visitor.visit_f64(f64::NEG_INFINITY),
            Value::Number(n) => {
                if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
                    visitor.visit_i64(n as i64)
                } else {
                    visitor.visit_f64(n)
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::List(list) => {
                let items = list.borrow().clone();
                visitor.visit_seq(SeqDeserializer::new(items))
            }
            Value::Map(map) => {
                let entries = map.borrow().clone().into_iter().collect();
                visitor.visit_map(MapDeserializer::new(entries))
            }
            Value::Record(record) => {
                let entries = record
                    .borrow()
                    .iter()
                    .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                    .collect();
                visitor.visit_map(MapDeserializer::new(entries))
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Undefined | Value::Null => visitor.visit_none(),
            value => visitor.visit_some(ValueDeserializer::new(value)),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Record(record) => {
                let fields = record.borrow();
                let entry = match fields.len() {
                    1 => fields.iter().next().map(|(k, v)| (k.clone(), v.clone())),
                    _ => None,
                };
                drop(fields);
                match entry {
                    Some((variant, value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    None => Err(Error::custom("Expected enum variant")),
                }
            }
            _ => Err(Error::custom("Expected enum")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Value, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(entries: Vec<(Value, Value)>) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer {
            variant,
            value: Some(value),
        }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        let visitor = VariantDeserializer { value: self.value };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(Error::custom("Expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(value @ Value::List(_)) => de::Deserializer::deserialize_any(
                ValueDeserializer::new(value),
                visitor,
            ),
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(value @ (Value::Record(_) | Value::Map(_))) => {
                de::Deserializer::deserialize_any(ValueDeserializer::new(value), visitor)
            }
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}
