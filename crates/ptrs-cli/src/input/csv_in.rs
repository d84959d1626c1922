use serde::de::DeserializeOwned;
use std::path::Path;

use super::file::resolve_path;

pub fn is_csv(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Read a headed CSV file into typed rows. Empty cells become `None`.
pub fn read_csv<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let mut rows = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        // +2: header line and 1-based numbering
        let row: T = row.map_err(|e| format!("'{}' line {}: {}", canonical.display(), i + 2, e))?;
        rows.push(row);
    }
    tracing::debug!(path = %canonical.display(), rows = rows.len(), "read csv input");
    Ok(rows)
}
