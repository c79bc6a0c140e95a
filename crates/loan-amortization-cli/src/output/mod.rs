pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of an envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into dotted keys, skipping arrays (the schedule is
/// rendered separately).
pub(crate) fn flatten_scalars(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) if !is_years_months(inner) => flatten_into(&path, inner, out),
            Value::Array(_) => {}
            _ => out.push((path, val.clone())),
        }
    }
}

/// `{"years": n, "months": m}` as produced for payoff durations.
pub(crate) fn is_years_months(map: &Map<String, Value>) -> bool {
    map.len() == 2 && map.contains_key("years") && map.contains_key("months")
}

/// The payment schedule carried by a result, if any.
pub(crate) fn schedule_of(value: &Value) -> Option<&Vec<Value>> {
    result_of(value).get("schedule").and_then(Value::as_array)
}
