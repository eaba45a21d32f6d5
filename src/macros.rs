/// Builds a [`Value`](crate::Value) from a literal description.
///
/// `[..]` builds a list and `{ "key": value, .. }` builds a record; both are
/// fresh allocations. `null`, `undefined`, `true` and `false` are the
/// matching singletons. Anything else goes through `Value::from`.
///
/// # Examples
///
/// ```rust
/// use circlebytes::{value, Value};
///
/// let data = value!({ "id": 7, "tags": ["a", "b"], "parent": null });
/// assert_eq!(data.get("id"), Some(Value::from(7)));
/// assert_eq!(data.get("parent"), Some(Value::Null));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (undefined) => {
        $crate::Value::Undefined
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::empty_list()
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::list(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::empty_record()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::record(record)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn test_value_macro_primitives() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(undefined), Value::Undefined);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!(false), Value::Bool(false));
        assert_eq!(value!(42), Value::Number(42.0));
        assert_eq!(value!(3.5), Value::Number(3.5));
        assert_eq!(value!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_value_macro_lists_are_fresh() {
        let a = value!([1, 2, 3]);
        let b = value!([1, 2, 3]);
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.get_index(2), Some(Value::from(3)));
        assert_eq!(value!([]), Value::empty_list());
    }

    #[test]
    fn test_value_macro_records() {
        assert_eq!(value!({}), Value::empty_record());

        let record = value!({
            "name": "Alice",
            "age": 30,
        });
        let fields = record.as_record().unwrap().borrow();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["name", "age"]);
    }
}
