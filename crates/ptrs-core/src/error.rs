use thiserror::Error;

#[derive(Debug, Error)]
pub enum PtrsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing input: {field} is absent ({context})")]
    MissingInput { field: String, context: String },

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Invalid date in {field}: '{value}' ({reason})")]
    InvalidDate {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PtrsError {
    fn from(e: serde_json::Error) -> Self {
        PtrsError::SerializationError(e.to_string())
    }
}
