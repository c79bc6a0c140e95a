use serde_json::Value;
use std::io;

use super::{flatten_scalars, result_of, schedule_of};

/// Write output as CSV to stdout: the schedule rows when the result has one,
/// otherwise a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(rows) = schedule_of(value) {
        write_rows(&mut wtr, rows);
    } else if let Value::Object(result) = result_of(value) {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in flatten_scalars(result) {
            let _ = wtr.write_record([key.as_str(), &format_csv_value(&val)]);
        }
    } else {
        let _ = wtr.write_record([&format_csv_value(value)]);
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_rows_written_with_headers() {
        let rows = vec![
            json!({"payment_number": 1, "principal_paid": "240.31", "remaining_balance": "199759.69"}),
            json!({"payment_number": 2, "principal_paid": "241.31", "remaining_balance": "199518.38"}),
        ];
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_rows(&mut wtr, &rows);
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("payment_number"));
        assert!(lines[1].contains("240.31"));
    }
}
