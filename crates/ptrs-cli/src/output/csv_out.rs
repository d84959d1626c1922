use serde_json::Value;
use std::io;

use super::{flatten, format_cell};

/// Write output as CSV to stdout.
///
/// Batches (annotated records, sample records) become one row per record;
/// single results become two-column `field,value` rows with dotted names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            match result {
                Value::Object(res_map) => match res_map.get("records") {
                    Some(Value::Array(records)) => write_array_csv(&mut wtr, records),
                    _ => {
                        let (rows, _) = flatten(res_map);
                        let _ = wtr.write_record(["field", "value"]);
                        for (key, val) in rows {
                            let _ = wtr.write_record([key.as_str(), &format_cell(&val)]);
                        }
                    }
                },
                other => {
                    let _ = wtr.write_record([&format_cell(other)]);
                }
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_cell(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let mut headers: Vec<String> = first.keys().cloned().collect();
        for item in arr.iter().skip(1) {
            if let Value::Object(map) = item {
                for key in map.keys() {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
            }
        }
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_cell(item)]);
        }
    }
}
