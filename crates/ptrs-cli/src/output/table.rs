use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten, format_cell};

/// Format output as tables: one Field/Value table for the scalars of the
/// result, then one table per array of records (annotations, bands).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            match result {
                Value::Object(res_map) => {
                    let (rows, sections) = flatten(res_map);
                    print_field_table(&rows);
                    for (name, items) in sections {
                        println!("\n{}:", name);
                        print_array_table(&items);
                    }
                }
                other => println!("{}", format_cell(other)),
            }
            print_envelope_notes(map);
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_field_table(rows: &[(String, Value)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in rows {
        builder.push_record([key.clone(), cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &serde_json::Map<String, Value>) {
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

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        // Union of keys in first-seen order; optional fields are skipped when absent
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

        let mut builder = Builder::default();
        builder.push_record(headers.clone());
        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", cell(item));
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        other => format_cell(other),
    }
}
