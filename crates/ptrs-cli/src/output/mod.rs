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

/// Split an object into dotted scalar rows and named arrays of objects.
///
/// `{"metrics": {"median": 10}, "bands": [{..}]}` becomes the row
/// `("metrics.median", 10)` plus the section `("bands", [..])`.
pub fn flatten(map: &Map<String, Value>) -> (Vec<(String, Value)>, Vec<(String, Vec<Value>)>) {
    let mut rows = Vec::new();
    let mut sections = Vec::new();
    flatten_into("", map, &mut rows, &mut sections);
    (rows, sections)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    rows: &mut Vec<(String, Value)>,
    sections: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, rows, sections),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                sections.push((name, items.clone()))
            }
            other => rows.push((name, other.clone())),
        }
    }
}

/// Render a scalar for table and CSV cells.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
