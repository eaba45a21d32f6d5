//! Keyed containers held inside composite values.
//!
//! - [`Record`]: string keys in insertion order, a thin wrapper around [`IndexMap`].
//! - [`OrderedMap`]: keys of any kind in insertion order.
//!
//! ## Key Equality
//!
//! `OrderedMap` compares keys with [`Value::same_value`]: primitives by
//! content (`NaN` finds `NaN`, `Undefined` finds `Undefined`) and composites
//! by identity, so two structurally equal lists are two distinct keys.
//!
//! ```rust
//! use circlebytes::{OrderedMap, Value};
//!
//! let mut map = OrderedMap::new();
//! map.insert(Value::NaN, Value::from("not a number"));
//! map.insert(Value::empty_list(), Value::from(1));
//! map.insert(Value::empty_list(), Value::from(2));
//!
//! assert_eq!(map.len(), 3);
//! assert_eq!(map.get(&Value::NaN).and_then(|v| v.as_str()), Some("not a number"));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to values.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{Record, Value};
///
/// let mut record = Record::new();
/// record.insert("first".to_string(), Value::from(1));
/// record.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = record.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(IndexMap<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Record(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Record(IndexMap::with_capacity(capacity))
    }

    /// Inserts a field, returning the previous value for the key.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a field, shifting later fields down to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(map: HashMap<String, Value>) -> Self {
        Record(map.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Record(IndexMap::from_iter(iter))
    }
}

/// An insertion-ordered map whose keys may be any [`Value`].
///
/// Lookups are linear; keys that are composites cannot be hashed by content
/// without breaking identity semantics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap(Vec<(Value, Value)>);

impl OrderedMap {
    #[must_use]
    pub fn new() -> Self {
        OrderedMap(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap(Vec::with_capacity(capacity))
    }

    /// Inserts an entry. An existing key keeps its position and has its
    /// value replaced; the old value is returned.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.0.iter_mut().find(|(k, _)| k.same_value(&key)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| k.same_value(key))
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let index = self.0.iter().position(|(k, _)| k.same_value(key))?;
        Some(self.0.remove(index).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.iter().map(|(k, v)| (k, v))
    }
}

impl IntoIterator for OrderedMap {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(Value, Value)> for OrderedMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_position_on_replace() {
        let mut record = Record::new();
        record.insert("a".to_string(), Value::from(1));
        record.insert("b".to_string(), Value::from(2));
        assert!(record.insert("a".to_string(), Value::from(3)).is_some());

        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.get("a").and_then(Value::as_f64), Some(3.0));
    }

    #[test]
    fn test_ordered_map_identity_keys() {
        let key = Value::empty_record();
        let mut map = OrderedMap::new();
        map.insert(key.clone(), Value::from("first"));
        map.insert(Value::empty_record(), Value::from("other"));
        map.insert(key.clone(), Value::from("second"));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&key).and_then(|v| v.as_str()), Some("second"));
    }

    #[test]
    fn test_ordered_map_special_primitive_keys() {
        let mut map = OrderedMap::new();
        map.insert(Value::Undefined, Value::from(1));
        map.insert(Value::number(f64::NAN), Value::from(2));
        map.insert(Value::from(0.0), Value::from(3));

        assert_eq!(map.get(&Value::Undefined).and_then(Value::as_f64), Some(1.0));
        assert_eq!(map.get(&Value::NaN).and_then(Value::as_f64), Some(2.0));
        assert_eq!(map.get(&Value::from(-0.0)).and_then(Value::as_f64), Some(3.0));
        assert!(map.get(&Value::Null).is_none());
    }

    #[test]
    fn test_ordered_map_remove() {
        let mut map: OrderedMap = vec![
            (Value::from(1), Value::from("one")),
            (Value::from(2), Value::from("two")),
        ]
        .into_iter()
        .collect();
        assert!(map.remove(&Value::from(1)).is_some());
        assert_eq!(map.keys().count(), 1);
        assert!(!map.contains_key(&Value::from(1)));
    }
}
