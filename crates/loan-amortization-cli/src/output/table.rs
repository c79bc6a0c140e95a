use loan_amortization_core::presentation::{format_currency, YearsMonths};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use super::{flatten_scalars, is_years_months, result_of, schedule_of};

/// Fields shown as currency. Matched on the last segment of a dotted key.
const MONEY_FIELDS: &[&str] = &[
    "principal",
    "monthly_payment",
    "modified_monthly_payment",
    "total_interest",
    "total_interest_paid",
    "total_paid",
    "total_cost",
    "total_cost_with_additional",
    "total_paid_with_additional",
    "interest_saved",
    "final_payment",
    "principal_paid",
    "interest_paid",
    "cumulative_interest",
    "remaining_balance",
];

/// Summary table, then the schedule (if any), then warnings and methodology.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            print_summary(result);
            if let Some(rows) = schedule_of(value) {
                println!();
                print_schedule(rows);
            }
        }
        Value::Array(rows) => print_schedule(rows),
        other => println!("{}", other),
    }

    if let Value::Object(envelope) = value {
        print_footer(envelope);
    }
}

fn print_summary(result: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten_scalars(result) {
        let shown = format_field(&key, &val);
        builder.push_record([key, shown]);
    }
    println!("{}", Table::from(builder));
}

fn print_schedule(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            println!("{}", format_value(row));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| header_label(h)));
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(headers.iter().map(|h| {
                map.get(h.as_str())
                    .map(|v| format_field(h, v))
                    .unwrap_or_default()
            }));
        }
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// `remaining_balance` -> `Remaining Balance`
fn header_label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn format_field(key: &str, value: &Value) -> String {
    let leaf = key.rsplit('.').next().unwrap_or(key);
    if MONEY_FIELDS.contains(&leaf) {
        if let Some(amount) = as_decimal(value) {
            return format_currency(amount);
        }
    }
    if let Value::Object(map) = value {
        if is_years_months(map) {
            if let Ok(ym) = serde_json::from_value::<YearsMonths>(value.clone()) {
                return ym.to_string();
            }
        }
    }
    format_value(value)
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_money_fields_formatted_as_currency() {
        assert_eq!(format_field("monthly_payment", &json!("1432.25")), "$1,432.25");
        assert_eq!(
            format_field("with_additional.total_interest_paid", &json!("215608.52")),
            "$215,608.52"
        );
        assert_eq!(format_field("months_to_payoff", &json!(293)), "293");
    }

    #[test]
    fn test_years_months_rendered_as_text() {
        let ym = json!({"years": 24, "months": 5});
        assert_eq!(format_field("time_to_payoff", &ym), "24 years and 5 months");
    }

    #[test]
    fn test_header_label() {
        assert_eq!(header_label("remaining_balance"), "Remaining Balance");
        assert_eq!(header_label("payment_number"), "Payment Number");
    }
}
