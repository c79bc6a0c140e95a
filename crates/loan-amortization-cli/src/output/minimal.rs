use serde_json::Value;

use super::result_of;

/// Headline fields, most specific first. Dotted paths descend into objects.
const PRIORITY_PATHS: &[&str] = &[
    "number_of_payments",
    "monthly_payment",
    "with_additional.months_to_payoff",
    "months_to_payoff",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result, path) {
            if !val.is_null() {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    if let Value::Object(map) = result {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.get(key))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_descends_dotted_path() {
        let v = json!({"with_additional": {"months_to_payoff": 293}});
        assert_eq!(lookup(&v, "with_additional.months_to_payoff"), Some(&json!(293)));
        assert_eq!(lookup(&v, "monthly_payment"), None);
    }
}
