//! Custom enum literals and a custom type handler.
//!
//! Run with: cargo run --example custom_context

use circlebytes::chunk::Chunk;
use circlebytes::{
    deserialize_with_context, serialize_with_context, value, Context, Encoded, Encoder, Error,
    LabelTable, RefTable, Result, TypeHandler, Value,
};
use std::sync::Arc;

/// Writes lists of numbers as a `vector` chunk with every number on one line.
struct VectorHandler;

impl VectorHandler {
    fn numbers(value: &Value) -> Option<Vec<f64>> {
        let list = value.as_list()?.borrow();
        if list.is_empty() {
            return None;
        }
        let numbers = list
            .iter()
            .map(|v| match v {
                Value::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        numbers
    }
}

impl TypeHandler for VectorHandler {
    fn name(&self) -> &str {
        "vector"
    }

    fn title(&self) -> Option<&str> {
        Some("vector")
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        Self::numbers(value).is_some()
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Encoded> {
        let numbers = Self::numbers(value).ok_or_else(|| Error::unsupported("not a vector"))?;
        let line: Vec<String> = numbers.iter().map(f64::to_string).collect();
        Ok(Encoded::Block(vec![line.join(" ")]))
    }

    fn construct(&self, chunk: &Chunk) -> Result<Value> {
        let mut items = Vec::new();
        for content in &chunk.lines {
            for token in content.text.split(' ') {
                let n = token
                    .parse::<f64>()
                    .map_err(|_| Error::syntax(content.line, "vectors hold numbers only"))?;
                items.push(Value::from(n));
            }
        }
        Ok(Value::list(items))
    }
}

/// Spells `NaN` as `missing`, for data where it only ever means "no reading".
struct Missing;

impl TypeHandler for Missing {
    fn name(&self) -> &str {
        "missing"
    }

    fn matches(&self, value: &Value, _refs: &RefTable) -> bool {
        value.is_nan()
    }

    fn encode(&self, _value: &Value, _encoder: &mut Encoder<'_>) -> Result<Encoded> {
        Ok(Encoded::Inline("missing".to_string()))
    }

    fn decode_inline(&self, token: &str, _labels: &LabelTable, _line: usize) -> Option<Result<Value>> {
        (token == "missing").then(|| Ok(Value::NaN))
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Booleans as yes/no
    let yes_no = Context::new()
        .without_enum("true")
        .without_enum("false")
        .with_enum("yes", true)?
        .with_enum("no", false)?;
    let flags = value!({ "verbose": true, "color": false });
    println!("Yes/no booleans:\n{}\n", serialize_with_context(&flags, &yes_no)?);

    // Custom handlers
    let sensors = Context::new()
        .with_handler(Arc::new(VectorHandler))
        .with_handler(Arc::new(Missing));
    let readings = value!({
        "position": [1.5, 2, 0.25],
        "temperature": (f64::NAN)
    });
    let text = serialize_with_context(&readings, &sensors)?;
    println!("Custom handlers:\n{}\n", text);
    let back = deserialize_with_context(&text, &sensors)?;
    println!("Decoded: {:?}\n", back);

    // A narrow context rejects anything outside its grammar
    match deserialize_with_context("@ list\n    null", &Context::empty()) {
        Ok(value) => println!("Unexpectedly accepted: {:?}", value),
        Err(e) => println!("Empty context: {}", e),
    }

    Ok(())
}
