pub mod csv_in;
pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Load a batch document from `--input` (JSON, YAML or CSV) or piped stdin.
///
/// A bare array, or CSV rows of type `R`, is wrapped as `{"records": [...]}`
/// so every command can deserialise straight into its input struct.
pub fn read_batch<R: DeserializeOwned + Serialize>(
    path: Option<&str>,
) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let document = match path {
        Some(p) if csv_in::is_csv(p) => {
            let rows: Vec<R> = csv_in::read_csv(p)?;
            Some(json!({ "records": rows }))
        }
        Some(p) => Some(file::read_value(p)?),
        None => stdin::read_stdin()?,
    };
    Ok(document.map(wrap_records))
}

fn wrap_records(value: Value) -> Value {
    match value {
        Value::Array(_) => json!({ "records": value }),
        other => other,
    }
}
