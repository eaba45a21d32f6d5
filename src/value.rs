//! Dynamic value graphs.
//!
//! This module provides the [`Value`] enum, the unit the codec reads and
//! writes, and [`Primitive`], the normalized, thread-safe form of the
//! non-composite variants.
//!
//! ## Sharing and Identity
//!
//! Lists, ordered maps and records are held behind `Rc<RefCell<_>>` handles.
//! Cloning a composite [`Value`] clones the handle, so two clones are the
//! *same* composite. That identity is what the codec preserves:
//!
//! ```rust
//! use circlebytes::Value;
//!
//! let shared = Value::empty_list();
//! let outer = Value::list(vec![shared.clone(), shared.clone()]);
//!
//! let items = outer.as_list().unwrap().borrow();
//! assert!(items[0].ptr_eq(&items[1]));
//! ```
//!
//! ## Cycles
//!
//! A composite may contain itself, directly or through other composites.
//! Equality and `Debug` both terminate on such graphs. Reference counting
//! never reclaims a cycle on its own; callers that build long-lived cyclic
//! graphs should clear one edge before dropping them.
//!
//! ```rust
//! use circlebytes::Value;
//!
//! let node = Value::empty_record();
//! node.insert("self", node.clone()).unwrap();
//! assert!(node.get("self").unwrap().ptr_eq(&node));
//! ```

use crate::map::{OrderedMap, Record};
use crate::{Error, Result};
use serde::de::{self, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Shared handle to a list.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// Shared handle to an ordered map.
pub type MapRef = Rc<RefCell<OrderedMap>>;

/// Shared handle to a string-keyed record.
pub type RecordRef = Rc<RefCell<Record>>;

/// A node in a value graph.
///
/// The primitive variants are compared by content; the composite variants
/// (`List`, `Map`, `Record`) carry shared handles and are compared by
/// identity wherever the codec deduplicates.
///
/// # Examples
///
/// ```rust
/// use circlebytes::Value;
///
/// let text = Value::from("hello");
/// let number = Value::from(42);
/// let nothing = Value::Undefined;
///
/// assert!(text.is_string());
/// assert!(number.is_number());
/// assert!(!nothing.is_composite());
/// ```
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    NaN,
    Infinity,
    NegInfinity,
    Number(f64),
    String(String),
    List(ListRef),
    Map(MapRef),
    Record(RecordRef),
}

/// A primitive value in normalized form.
///
/// Unlike [`Value`], a `Primitive` owns no shared handles and is therefore
/// `Send + Sync`; the enum literal table of a [`Context`](crate::Context)
/// stores its values this way. Equality follows "same value" rules: `NaN`
/// equals `NaN` and `0` equals `-0`.
#[derive(Clone, Debug)]
pub enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    NaN,
    Infinity,
    NegInfinity,
    Number(f64),
    String(String),
}

impl Primitive {
    /// Converts back into a [`Value`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Primitive::Undefined => Value::Undefined,
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(*b),
            Primitive::NaN => Value::NaN,
            Primitive::Infinity => Value::Infinity,
            Primitive::NegInfinity => Value::NegInfinity,
            Primitive::Number(n) => Value::Number(*n),
            Primitive::String(s) => Value::String(s.clone()),
        }
    }

    /// Same-value comparison against a [`Value`] without converting it.
    ///
    /// Composites never match.
    #[must_use]
    pub fn eq_value(&self, value: &Value) -> bool {
        match (self, value) {
            (Primitive::Undefined, Value::Undefined)
            | (Primitive::Null, Value::Null)
            | (Primitive::NaN, Value::NaN)
            | (Primitive::Infinity, Value::Infinity)
            | (Primitive::NegInfinity, Value::NegInfinity) => true,
            (Primitive::Bool(a), Value::Bool(b)) => a == b,
            (Primitive::String(a), Value::String(b)) => a == b,
            (Primitive::Number(a), Value::Number(b)) => a == b,
            (Primitive::NaN, Value::Number(n)) => n.is_nan(),
            (Primitive::Infinity, Value::Number(n)) => *n == f64::INFINITY,
            (Primitive::NegInfinity, Value::Number(n)) => *n == f64::NEG_INFINITY,
            _ => false,
        }
    }

    fn number_bits(n: f64) -> u64 {
        if n == 0.0 {
            0
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Undefined, Primitive::Undefined)
            | (Primitive::Null, Primitive::Null)
            | (Primitive::NaN, Primitive::NaN)
            | (Primitive::Infinity, Primitive::Infinity)
            | (Primitive::NegInfinity, Primitive::NegInfinity) => true,
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            (Primitive::Number(a), Primitive::Number(b)) => a == b,
            (Primitive::String(a), Primitive::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Primitive::Bool(b) => b.hash(state),
            Primitive::Number(n) => Self::number_bits(*n).hash(state),
            Primitive::String(s) => s.hash(state),
            _ => {}
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Primitive::NaN
        } else if value == f64::INFINITY {
            Primitive::Infinity
        } else if value == f64::NEG_INFINITY {
            Primitive::NegInfinity
        } else {
            Primitive::Number(value)
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        value.to_value()
    }
}

impl Value {
    /// Creates a number, mapping non-finite floats onto `NaN`, `Infinity`
    /// and `NegInfinity`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use circlebytes::Value;
    ///
    /// assert!(Value::number(f64::NAN).is_nan());
    /// assert!(matches!(Value::number(1.5), Value::Number(n) if n == 1.5));
    /// ```
    #[must_use]
    pub fn number(n: f64) -> Self {
        Primitive::from(n).to_value()
    }

    /// Wraps items in a fresh list allocation.
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Wraps a map in a fresh allocation.
    #[must_use]
    pub fn map(map: OrderedMap) -> Self {
        Value::Map(Rc::new(RefCell::new(map)))
    }

    /// Wraps a record in a fresh allocation.
    #[must_use]
    pub fn record(record: Record) -> Self {
        Value::Record(Rc::new(RefCell::new(record)))
    }

    #[must_use]
    pub fn empty_list() -> Self {
        Value::list(Vec::new())
    }

    #[must_use]
    pub fn empty_map() -> Self {
        Value::map(OrderedMap::new())
    }

    #[must_use]
    pub fn empty_record() -> Self {
        Value::record(Record::new())
    }

    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` for finite numbers and for the three special numbers.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Number(_) | Value::NaN | Value::Infinity | Value::NegInfinity
        )
    }

    /// Returns `true` if the value is not a number, in either spelling.
    #[inline]
    #[must_use]
    pub fn is_nan(&self) -> bool {
        match self {
            Value::NaN => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Returns `true` for lists, maps and records.
    #[inline]
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_) | Value::Record(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric value, including the special numbers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use circlebytes::Value;
    ///
    /// assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
    /// assert_eq!(Value::Infinity.as_f64(), Some(f64::INFINITY));
    /// assert_eq!(Value::Null.as_f64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::NaN => Some(f64::NAN),
            Value::Infinity => Some(f64::INFINITY),
            Value::NegInfinity => Some(f64::NEG_INFINITY),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&RecordRef> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the normalized primitive, or `None` for composites.
    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        Some(match self {
            Value::Undefined => Primitive::Undefined,
            Value::Null => Primitive::Null,
            Value::Bool(b) => Primitive::Bool(*b),
            Value::NaN => Primitive::NaN,
            Value::Infinity => Primitive::Infinity,
            Value::NegInfinity => Primitive::NegInfinity,
            Value::Number(n) => Primitive::from(*n),
            Value::String(s) => Primitive::String(s.clone()),
            Value::List(_) | Value::Map(_) | Value::Record(_) => return None,
        })
    }

    /// A short name for the kind of value, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::NaN | Value::Infinity | Value::NegInfinity | Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    /// The allocation address of a composite, `None` for primitives.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::List(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            Value::Map(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            Value::Record(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            _ => None,
        }
    }

    /// Returns `true` if both values are the same composite allocation.
    ///
    /// Always `false` for primitives; use `==` or [`Value::same_value`] for those.
    #[must_use]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Key equality used by ordered maps: composites by identity,
    /// primitives by normalized content (so `NaN` matches `NaN`).
    #[must_use]
    pub fn same_value(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.as_primitive() == other.as_primitive(),
            _ => false,
        }
    }

    /// Looks up a record field or a string-keyed map entry.
    ///
    /// Returns a clone of the stored value, which for composites is another
    /// handle to the same allocation.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Record(record) => record.borrow().get(key).cloned(),
            Value::Map(map) => map
                .borrow()
                .get(&Value::String(key.to_string()))
                .cloned(),
            _ => None,
        }
    }

    /// Returns the list element at `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<Value> {
        match self {
            Value::List(list) => list.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Inserts a field into a record, or a string key into a map.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a record nor a map.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Result<Option<Value>> {
        match self {
            Value::Record(record) => Ok(record.borrow_mut().insert(key.into(), value)),
            Value::Map(map) => Ok(map.borrow_mut().insert(Value::String(key.into()), value)),
            other => Err(Error::unsupported(&format!(
                "cannot insert a field into a {}",
                other.kind_name()
            ))),
        }
    }

    /// Appends to a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a list.
    pub fn push(&self, value: Value) -> Result<()> {
        match self {
            Value::List(list) => {
                list.borrow_mut().push(value);
                Ok(())
            }
            other => Err(Error::unsupported(&format!(
                "cannot push onto a {}",
                other.kind_name()
            ))),
        }
    }

    /// Returns `false` if any composite is reachable from itself.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        fn walk(value: &Value, path: &mut Vec<usize>, done: &mut HashSet<usize>) -> bool {
            let Some(id) = value.identity() else {
                return true;
            };
            if done.contains(&id) {
                return true;
            }
            if path.contains(&id) {
                return false;
            }
            path.push(id);
            let acyclic = match value {
                Value::List(list) => list.borrow().iter().all(|v| walk(v, path, done)),
                Value::Map(map) => map
                    .borrow()
                    .iter()
                    .all(|(k, v)| walk(k, path, done) && walk(v, path, done)),
                Value::Record(record) => record.borrow().values().all(|v| walk(v, path, done)),
                _ => true,
            };
            path.pop();
            done.insert(id);
            acyclic
        }

        walk(self, &mut Vec::new(), &mut HashSet::new())
    }
}

// Deep equality. Pairs of composites already under comparison are assumed
// equal, which makes the relation terminate on cyclic graphs.
fn deep_eq(a: &Value, b: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
    if let (Some(x), Some(y)) = (a.identity(), b.identity()) {
        if x == y || !seen.insert((x, y)) {
            return true;
        }
    }
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Infinity, Value::Infinity) | (Value::NegInfinity, Value::NegInfinity) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            let equal =
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| deep_eq(l, r, seen));
            equal
        }
        (Value::Map(x), Value::Map(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            let equal = x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((lk, lv), (rk, rv))| deep_eq(lk, rk, seen) && deep_eq(lv, rv, seen));
            equal
        }
        (Value::Record(x), Value::Record(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            let equal = x.len() == y.len()
                && x.iter().all(|(key, l)| match y.get(key) {
                    Some(r) => deep_eq(l, r, seen),
                    None => false,
                });
            equal
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_eq(self, other, &mut HashSet::new())
    }
}

struct GraphDebug<'a> {
    value: &'a Value,
    path: &'a RefCell<Vec<usize>>,
}

impl<'a> GraphDebug<'a> {
    fn child(&self, value: &'a Value) -> GraphDebug<'a> {
        GraphDebug {
            value,
            path: self.path,
        }
    }
}

impl fmt::Debug for GraphDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(id) = self.value.identity() else {
            return match self.value {
                Value::Undefined => f.write_str("Undefined"),
                Value::Null => f.write_str("Null"),
                Value::Bool(b) => write!(f, "Bool({:?})", b),
                Value::NaN => f.write_str("NaN"),
                Value::Infinity => f.write_str("Infinity"),
                Value::NegInfinity => f.write_str("NegInfinity"),
                Value::Number(n) => write!(f, "Number({:?})", n),
                Value::String(s) => write!(f, "String({:?})", s),
                Value::List(_) | Value::Map(_) | Value::Record(_) => Ok(()),
            };
        };
        if self.path.borrow().contains(&id) {
            return f.write_str("<cycle>");
        }
        self.path.borrow_mut().push(id);
        let result = match self.value {
            Value::List(list) => {
                let list = list.borrow();
                f.debug_list()
                    .entries(list.iter().map(|v| self.child(v)))
                    .finish()
            }
            Value::Map(map) => {
                let map = map.borrow();
                f.write_str("Map ")?;
                f.debug_map()
                    .entries(map.iter().map(|(k, v)| (self.child(k), self.child(v))))
                    .finish()
            }
            Value::Record(record) => {
                let record = record.borrow();
                f.debug_map()
                    .entries(record.iter().map(|(k, v)| (k, self.child(v))))
                    .finish()
            }
            _ => Ok(()),
        };
        self.path.borrow_mut().pop();
        result
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = RefCell::new(Vec::new());
        GraphDebug { value: self, path: &path }.fmt(f)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::number(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::record(value)
    }
}

impl From<OrderedMap> for Value {
    fn from(value: OrderedMap) -> Self {
        Value::map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// Serde support walks the graph as a tree; a composite reached again on its
// own ancestor path makes serialization fail instead of recursing forever.
struct TreeSer<'a> {
    value: &'a Value,
    path: &'a RefCell<Vec<usize>>,
}

impl<'a> TreeSer<'a> {
    fn child(&self, value: &'a Value) -> TreeSer<'a> {
        TreeSer {
            value,
            path: self.path,
        }
    }
}

impl Serialize for TreeSer<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error as _;

        let id = self.value.identity();
        if let Some(id) = id {
            if self.path.borrow().contains(&id) {
                return Err(S::Error::custom("cannot serialize a cyclic value graph"));
            }
            self.path.borrow_mut().push(id);
        }
        let result = match self.value {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::NaN => serializer.serialize_f64(f64::NAN),
            Value::Infinity => serializer.serialize_f64(f64::INFINITY),
            Value::NegInfinity => serializer.serialize_f64(f64::NEG_INFINITY),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::List(list) => {
                let list = list.borrow();
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for element in list.iter() {
                    seq.serialize_element(&self.child(element))?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let map = map.borrow();
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(&self.child(k), &self.child(v))?;
                }
                out.end()
            }
            Value::Record(record) => {
                let record = record.borrow();
                let mut out = serializer.serialize_map(Some(record.len()))?;
                for (k, v) in record.iter() {
                    out.serialize_entry(k, &self.child(v))?;
                }
                out.end()
            }
        };
        if id.is_some() {
            self.path.borrow_mut().pop();
        }
        result
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let path = RefCell::new(Vec::new());
        TreeSer { value: self, path: &path }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::number(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::list(vec))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut entries: Vec<(Value, Value)> = Vec::new();
                while let Some((key, value)) = map.next_entry()? {
                    entries.push((key, value));
                }
                Ok(entries_to_value(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Builds a record when every key is a string, an ordered map otherwise.
pub(crate) fn entries_to_value(entries: Vec<(Value, Value)>) -> Value {
    if entries.iter().all(|(k, _)| k.is_string()) {
        let record = entries
            .into_iter()
            .filter_map(|(k, v)| match k {
                Value::String(s) => Some((s, v)),
                _ => None,
            })
            .collect();
        Value::record(record)
    } else {
        Value::map(entries.into_iter().collect())
    }
}
