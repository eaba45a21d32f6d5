use circlebytes::{
    deserialize, deserialize_with_context, from_value, serialize, serialize_with_context,
    to_value, value, Context, Error, OrderedMap, Value,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
}

fn enums() -> Vec<Value> {
    vec![
        Value::Bool(true),
        Value::Bool(false),
        Value::Null,
        Value::Undefined,
        Value::NaN,
        Value::Infinity,
        Value::NegInfinity,
    ]
}

fn primitives() -> Vec<Value> {
    let mut values = enums();
    values.extend((-10..=10).map(Value::from));
    values.extend([0.25, 1.25, -0.75].into_iter().map(Value::from));
    values
}

fn round_trip(value: &Value) -> Value {
    let text = serialize(value).unwrap();
    deserialize(&text).unwrap_or_else(|e| panic!("{} while decoding {:?}", e, text))
}

#[test]
fn test_every_type_serializes() {
    let mut all = primitives();
    all.push(Value::empty_record());
    all.push(Value::empty_list());
    all.push(value!({ "a": 2 }));
    all.push(Value::from("qwer"));
    for value in &all {
        assert!(serialize(value).is_ok(), "{:?}", value);
    }
}

#[test]
fn test_primitives_round_trip() {
    for value in primitives() {
        let back = round_trip(&value);
        if value.is_nan() {
            assert!(back.is_nan());
            assert_ne!(back, back);
        } else {
            assert_eq!(back, value);
        }
    }
}

#[test]
fn test_empty_structures() {
    assert_eq!(round_trip(&Value::empty_record()), Value::empty_record());
    assert_eq!(round_trip(&Value::empty_list()), Value::empty_list());
    assert_eq!(round_trip(&Value::empty_map()), Value::empty_map());
    assert_eq!(round_trip(&Value::from("")), Value::from(""));
}

#[test]
fn test_strings_round_trip() {
    let strings = [
        "", "asdf", "qwer", "qwer\n", "\"", "'", "\"\"", "\"oiuoi\"", "1", "0", "-1", "NaN",
        "\n", "\nzxvc", "a\nb\nc", "@", "#", "@1234", "#29", "#undefined", "#true", " # x",
        "a|b", "| |", "    indented\n  lines",
    ];
    for s in strings {
        assert_eq!(round_trip(&Value::from(s)), Value::from(s), "{:?}", s);
    }
}

#[test]
fn test_strings_inside_lists_round_trip() {
    let strings = ["", "#", "@", "@1", "a b", "x #y", "| |", "a\n#b", "true"];
    let list = Value::list(strings.iter().map(|s| Value::from(*s)).collect());
    assert_eq!(round_trip(&list), list);
}

#[test]
fn test_self_reference_keeps_identity() {
    let a = Value::empty_record();
    a.insert("self", a.clone()).unwrap();

    let text = serialize(&a).unwrap();
    assert_eq!(text, "@ jshash\n    |self| @");

    let result = deserialize(&text).unwrap();
    assert!(result.get("self").unwrap().ptr_eq(&result));
}

#[test]
fn test_cross_references_keep_identity() {
    let a = Value::empty_record();
    let b = Value::empty_record();
    b.insert("r", a.clone()).unwrap();
    a.insert("s", b).unwrap();

    let result = round_trip(&a);
    let s = result.get("s").unwrap();
    let r = s.get("r").unwrap();
    assert!(r.ptr_eq(&result));
    assert!(r.get("s").unwrap().ptr_eq(&s));
}

#[test]
fn test_long_text_is_deduplicated_by_value() {
    let record = Value::empty_record();
    record.insert("a", Value::from("qwer\nasdf")).unwrap();
    record.insert("b", Value::from(String::from("qwer") + "\nasdf")).unwrap();

    let text = serialize(&record).unwrap();
    assert_eq!(text.matches("qwer").count(), 1);
    assert_eq!(text.matches("asdf").count(), 1);
    assert_eq!(
        text,
        "@ jshash\n    |a| @1\n    |b| @1\n@1 text\n    qwer\n    asdf"
    );
    assert_eq!(round_trip(&record), record);
}

#[test]
fn test_equal_composites_are_not_merged() {
    let record = Value::empty_record();
    record.insert("x", value!({ "k": 1 })).unwrap();
    record.insert("y", value!({ "k": 1 })).unwrap();

    let text = serialize(&record).unwrap();
    assert!(text.contains("@1 jshash"));
    assert!(text.contains("@2 jshash"));

    let result = deserialize(&text).unwrap();
    let (x, y) = (result.get("x").unwrap(), result.get("y").unwrap());
    assert_eq!(x, y);
    assert!(!x.ptr_eq(&y));
}

#[test]
fn test_short_text_boundary() {
    let short = "x".repeat(49);
    assert_eq!(serialize(&Value::from(short.as_str())).unwrap(), format!("|{}|", short));

    let long = "x".repeat(50);
    assert_eq!(
        serialize(&Value::from(long.as_str())).unwrap(),
        format!("@ text\n    {}", long)
    );

    let multibyte = "é".repeat(49);
    assert_eq!(
        serialize(&Value::from(multibyte.as_str())).unwrap(),
        format!("|{}|", multibyte)
    );
}

#[test]
fn test_root_shortcut() {
    assert_eq!(serialize(&Value::from(42)).unwrap(), "42");
    assert_eq!(serialize(&Value::from("hi")).unwrap(), "|hi|");
    assert_eq!(deserialize("42").unwrap(), Value::from(42));
    assert_eq!(deserialize("|hi|").unwrap(), Value::from("hi"));
}

#[test]
fn test_maps_with_any_keys() {
    let child = Value::list(vec![Value::from(1)]);
    let map = Value::empty_map();
    {
        let mut entries = map.as_map().unwrap().borrow_mut();
        entries.insert(Value::Undefined, Value::from("u"));
        entries.insert(Value::NaN, Value::from("n"));
        entries.insert(child.clone(), Value::from("list key"));
        entries.insert(Value::from(2), child);
        entries.insert(map.clone(), Value::Null);
    }

    let text = serialize(&map).unwrap();
    assert_eq!(
        text,
        "@ hash\n    undefined |u|\n    nan |n|\n    @1 |list key|\n    2 @1\n    @ null\n@1 list\n    1"
    );

    let result = deserialize(&text).unwrap();
    let entries = result.as_map().unwrap().borrow();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries.get(&Value::NaN), Some(&Value::from("n")));
    let keys: Vec<Value> = entries.keys().cloned().collect();
    assert!(keys[2].ptr_eq(entries.get(&Value::from(2)).unwrap()));
    assert!(keys[4].ptr_eq(&result));
}

#[test]
fn test_nested_lists_share_children() {
    let leaf = Value::from("a long line that certainly does not fit in short text form");
    let inner = Value::list(vec![leaf.clone(), leaf]);
    let outer = Value::list(vec![inner.clone(), inner.clone(), Value::empty_list()]);

    let text = serialize(&outer).unwrap();
    assert!(text.starts_with("@ list\n    @1\n    @1\n    @3\n@1 list\n    @2\n    @2\n@2 text"));

    let result = deserialize(&text).unwrap();
    let first = result.get_index(0).unwrap();
    assert!(first.ptr_eq(&result.get_index(1).unwrap()));
    assert!(!first.ptr_eq(&result.get_index(2).unwrap()));
    assert_eq!(result, outer);
}

#[test]
fn test_empty_context_rejects_enums() {
    let empty = Context::empty();
    for value in enums() {
        assert!(
            matches!(
                serialize_with_context(&value, &empty),
                Err(Error::Unsupported(_))
            ),
            "{:?}",
            value
        );
        let text = serialize(&value).unwrap();
        assert!(
            matches!(
                deserialize_with_context(&text, &empty),
                Err(Error::UnknownType { .. })
            ),
            "{}",
            text
        );
    }
}

#[test]
fn test_empty_context_still_handles_structure() {
    let empty = Context::empty();
    let value = value!({ "n": 1, "items": ["a", "b"] });
    let text = serialize_with_context(&value, &empty).unwrap();
    assert_eq!(deserialize_with_context(&text, &empty).unwrap(), value);
}

#[test]
fn test_nested_struct_through_serde() {
    let order = Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
    };

    let text = serialize(&to_value(&order).unwrap()).unwrap();
    let order_back: Order = from_value(&deserialize(&text).unwrap()).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_serde_json_interop() {
    let json = serde_json::json!({
        "name": "graph",
        "weights": [1, 2.5, -3],
        "meta": { "empty": null, "flag": false }
    });

    let value = to_value(&json).unwrap();
    let back = deserialize(&serialize(&value).unwrap()).unwrap();
    let json_back: serde_json::Value = from_value(&back).unwrap();
    assert_eq!(json, json_back);

    assert_eq!(serde_json::to_value(&back).unwrap(), json);
}

#[test]
fn test_serde_json_refuses_cycles() {
    let list = Value::empty_list();
    list.push(list.clone()).unwrap();
    assert!(serde_json::to_string(&list).is_err());

    let shared = value!([1]);
    let twice = Value::list(vec![shared.clone(), shared]);
    assert_eq!(serde_json::to_string(&twice).unwrap(), "[[1],[1]]");
}

#[test]
fn test_non_string_keyed_maps_become_ordered_maps() {
    let mut by_id = std::collections::BTreeMap::new();
    by_id.insert(1, "one");
    by_id.insert(2, "two");

    let value = to_value(&by_id).unwrap();
    assert!(value.is_map());
    let text = serialize(&value).unwrap();
    assert_eq!(text, "@ hash\n    1 |one|\n    2 |two|");

    let expected: OrderedMap = vec![
        (Value::from(1), Value::from("one")),
        (Value::from(2), Value::from("two")),
    ]
    .into_iter()
    .collect();
    assert_eq!(deserialize(&text).unwrap(), Value::map(expected));
}
