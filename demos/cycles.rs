//! Self-references and shared children.
//!
//! Run with: cargo run --example cycles

use circlebytes::{deserialize, serialize, value, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // A tree node that knows its parent
    let root = value!({ "name": "root" });
    let child = value!({ "name": "child" });
    child.insert("parent", root.clone())?;
    root.insert("children", Value::list(vec![child.clone(), child]))?;

    let text = serialize(&root)?;
    println!("Parent links:\n{}\n", text);

    let back = deserialize(&text)?;
    let children = back.get("children").ok_or("missing children")?;
    let first = children.get_index(0).ok_or("missing child")?;
    let second = children.get_index(1).ok_or("missing child")?;
    println!("Both children are one value: {}", first.ptr_eq(&second));
    println!(
        "The child's parent is the root: {}\n",
        first.get("parent").is_some_and(|p| p.ptr_eq(&back))
    );

    // Equal long strings are written once
    let poem = "roses are red\nviolets are blue";
    let book = value!({ "front": poem, "back": poem });
    println!("Shared text:\n{}\n", serialize(&book)?);

    // Equal but distinct records are kept apart
    let twins = Value::list(vec![value!({ "x": 1 }), value!({ "x": 1 })]);
    println!("Distinct records:\n{}", serialize(&twins)?);

    // Reference counting never frees a cycle on its own
    if let Some(list) = back.get("children").as_ref().and_then(Value::as_list) {
        list.borrow_mut().clear();
    }
    if let Some(list) = root.get("children").as_ref().and_then(Value::as_list) {
        list.borrow_mut().clear();
    }

    Ok(())
}
