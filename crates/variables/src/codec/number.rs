use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn leading_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("leading number pattern is valid")
    })
}

/// Numeric reading of a literal: numbers as-is, strings by their leading numeric literal
/// (any unit suffix is ignored), objects through their `value` field.
pub fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number()
            .captures(s)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Object(map) => map.get("value").and_then(parse_float),
        Value::Array(_) | Value::Null => None,
    }
}
