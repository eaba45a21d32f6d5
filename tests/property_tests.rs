//! Property-based tests for the round-trip and identity guarantees.
//!
//! Generated graphs avoid `NaN`, which never compares equal to itself; it is
//! covered by the integration tests instead.

use circlebytes::{deserialize, from_value, serialize, to_value, OrderedMap, Record, Value};
use proptest::prelude::*;

fn round_trip(value: &Value) -> Result<Value, String> {
    let text = serialize(value).map_err(|e| format!("serialize failed: {}", e))?;
    deserialize(&text).map_err(|e| format!("deserialize failed: {}\n{}", e, text))
}

fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Infinity),
        Just(Value::NegInfinity),
        any::<i32>().prop_map(Value::from),
        (-1.0e9..1.0e9f64).prop_map(Value::from),
        ".{0,80}".prop_map(Value::from),
        "[a-z|\n ]{0,60}".prop_map(Value::from),
    ]
}

fn arb_tree() -> impl Strategy<Value = Value> {
    arb_primitive().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::list),
            prop::collection::vec(("[a-z ]{0,8}", inner.clone()), 0..6).prop_map(|fields| {
                Value::record(fields.into_iter().collect::<Record>())
            }),
            prop::collection::vec((arb_primitive(), inner), 0..6)
                .prop_map(|entries| Value::map(entries.into_iter().collect::<OrderedMap>())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_tree_round_trip(value in arb_tree()) {
        let back = round_trip(&value).map_err(TestCaseError::fail)?;
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_string_round_trip(s in any::<String>()) {
        let value = Value::from(s.as_str());
        let back = round_trip(&value).map_err(TestCaseError::fail)?;
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_short_text_is_inline(s in "[^|\n]{0,49}") {
        prop_assert_eq!(serialize(&Value::from(s.as_str())).unwrap(), format!("|{}|", s));
    }

    #[test]
    fn prop_finite_numbers_round_trip(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
        let text = serialize(&Value::from(n)).unwrap();
        prop_assert_eq!(deserialize(&text).unwrap(), Value::from(n));
    }

    #[test]
    fn prop_shared_child_decodes_once(copies in 1usize..8, child in arb_tree()) {
        let shared = Value::list(vec![child]);
        let root = Value::list(vec![shared; copies]);

        let back = round_trip(&root).map_err(TestCaseError::fail)?;
        let first = back.get_index(0).unwrap();
        for i in 1..copies {
            prop_assert!(first.ptr_eq(&back.get_index(i).unwrap()));
        }
    }

    #[test]
    fn prop_self_cycle_at_any_position(
        before in prop::collection::vec(arb_primitive(), 0..4),
        after in prop::collection::vec(arb_primitive(), 0..4)
    ) {
        let root = Value::list(before.clone());
        root.push(root.clone()).unwrap();
        for item in after {
            root.push(item).unwrap();
        }

        let back = round_trip(&root).map_err(TestCaseError::fail)?;
        prop_assert!(back.get_index(before.len()).unwrap().ptr_eq(&back));
    }

    #[test]
    fn prop_decode_never_panics(input in "[@a-z0-9| #\n]{0,64}") {
        let _ = deserialize(&input);
    }

    #[test]
    fn prop_serde_vec_round_trip(v in prop::collection::vec(any::<i32>(), 0..20)) {
        let back = round_trip(&to_value(&v).unwrap()).map_err(TestCaseError::fail)?;
        prop_assert_eq!(from_value::<Vec<i32>>(&back).unwrap(), v);
    }

    #[test]
    fn prop_serde_option_tuple(t in (proptest::option::of(any::<i32>()), any::<bool>())) {
        let back = round_trip(&to_value(&t).unwrap()).map_err(TestCaseError::fail)?;
        prop_assert_eq!(from_value::<(Option<i32>, bool)>(&back).unwrap(), t);
    }
}
