use serde_json::Value;

use super::format_cell;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, descending into
/// a nested `metrics` object, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "payment_time",
        "median_payment_time",
        "average_payment_time",
        "resolved",
    ];

    let candidates = [Some(result_obj), result_obj.get("metrics")];
    for obj in candidates.into_iter().flatten() {
        if let Value::Object(map) = obj {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    println!("{}", display(val));
                    return;
                }
            }
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, display(val));
            return;
        }
    }

    println!("{}", display(result_obj));
}

/// An undefined payment time prints as "undefined", never as an empty line.
fn display(value: &Value) -> String {
    match value {
        Value::Null => "undefined".to_string(),
        other => format_cell(other),
    }
}
