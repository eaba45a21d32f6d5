//! Labels and the per-call reference tables.
//!
//! Encoding keeps two explicit tables: one keyed by composite identity
//! (allocation address) and one keyed by normalized primitive content. They
//! are never merged: structurally equal composites stay distinct, while equal
//! long strings collapse to a single label.
//!
//! Decoding keeps a [`LabelTable`] from label to the value or shell bound to
//! it. Both tables live for exactly one encode or decode call.

use crate::value::Primitive;
use crate::Value;
use std::collections::HashMap;
use std::fmt;

/// A per-document reference label: `@`, `@1`, `@2`, ...
///
/// # Examples
///
/// ```rust
/// use circlebytes::Label;
///
/// assert_eq!(Label::ROOT.to_string(), "@");
/// assert_eq!(Label::new(3).to_string(), "@3");
/// assert_eq!(Label::parse("@12"), Some(Label::new(12)));
/// assert_eq!(Label::parse("@0"), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    /// The label of the root value.
    pub const ROOT: Label = Label(0);

    #[must_use]
    pub const fn new(index: u32) -> Self {
        Label(index)
    }

    /// Assignment order, starting at 0 for the root.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Parses `@` or `@<positive integer>` without leading zeros.
    #[must_use]
    pub fn parse(token: &str) -> Option<Label> {
        let digits = token.strip_prefix('@')?;
        if digits.is_empty() {
            return Some(Label::ROOT);
        }
        if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Label)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("@")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

/// Allocation address of a composite, hashed by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Identity(usize);

/// Encode-side table: values already given a chunk, by identity or by content.
#[derive(Debug, Default)]
pub struct RefTable {
    by_identity: HashMap<Identity, Label>,
    by_text: HashMap<String, Label>,
    by_value: HashMap<Primitive, Label>,
    next: u32,
}

impl RefTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label already assigned to `value`, if any.
    #[must_use]
    pub fn lookup(&self, value: &Value) -> Option<Label> {
        match value.identity() {
            Some(id) => self.by_identity.get(&Identity(id)).copied(),
            None => match value {
                Value::String(s) => self.by_text.get(s.as_str()).copied(),
                other => other
                    .as_primitive()
                    .and_then(|p| self.by_value.get(&p).copied()),
            },
        }
    }

    /// Assigns the next label to `value`.
    ///
    /// Called before the value's children are visited, so a value that
    /// contains itself is found here on the recursive visit.
    pub fn assign(&mut self, value: &Value) -> Label {
        let label = Label(self.next);
        self.next += 1;
        match value.identity() {
            Some(id) => {
                self.by_identity.insert(Identity(id), label);
            }
            None => match value {
                Value::String(s) => {
                    self.by_text.insert(s.clone(), label);
                }
                other => {
                    if let Some(p) = other.as_primitive() {
                        self.by_value.insert(p, label);
                    }
                }
            },
        }
        label
    }

    /// Number of labels handed out so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.next as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next == 0
    }
}

/// Decode-side table: label to the value (or not yet filled shell) bound to it.
#[derive(Debug, Default)]
pub struct LabelTable {
    bound: HashMap<Label, Value>,
}

impl LabelTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a label. Returns `false` if the label was already bound.
    pub fn define(&mut self, label: Label, value: Value) -> bool {
        if self.bound.contains_key(&label) {
            return false;
        }
        self.bound.insert(label, value);
        true
    }

    /// Returns the bound value; composites come back as another handle to
    /// the same allocation.
    #[must_use]
    pub fn resolve(&self, label: Label) -> Option<Value> {
        self.bound.get(&label).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_rejects_malformed() {
        assert_eq!(Label::parse("@"), Some(Label::ROOT));
        assert_eq!(Label::parse("@7"), Some(Label::new(7)));
        assert_eq!(Label::parse("@01"), None);
        assert_eq!(Label::parse("@x"), None);
        assert_eq!(Label::parse("@-1"), None);
        assert_eq!(Label::parse("7"), None);
        assert_eq!(Label::parse("@99999999999"), None);
    }

    #[test]
    fn test_labels_assigned_in_order() {
        let mut refs = RefTable::new();
        let a = Value::empty_list();
        let b = Value::empty_list();
        assert_eq!(refs.assign(&a), Label::ROOT);
        assert_eq!(refs.assign(&b), Label::new(1));
        assert_eq!(refs.lookup(&a), Some(Label::ROOT));
        assert_eq!(refs.lookup(&b), Some(Label::new(1)));
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_identity_and_value_tables_are_separate() {
        let mut refs = RefTable::new();
        let list = Value::empty_list();
        refs.assign(&list);
        assert_eq!(refs.lookup(&Value::empty_list()), None);

        refs.assign(&Value::from("a\nb"));
        assert_eq!(refs.lookup(&Value::from("a\nb")), Some(Label::new(1)));
        assert_eq!(refs.lookup(&Value::from("a\nc")), None);
    }

    #[test]
    fn test_label_table_rejects_redefinition() {
        let mut labels = LabelTable::new();
        assert!(labels.define(Label::ROOT, Value::empty_list()));
        assert!(!labels.define(Label::ROOT, Value::empty_map()));
        assert!(labels.resolve(Label::ROOT).is_some_and(|v| v.is_list()));
        assert!(labels.resolve(Label::new(1)).is_none());
    }
}
