use crate::record::RecordId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// One rejected record in a batch ingest
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    pub id: RecordId,
    pub attribute: String,
    pub reason: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record {}: attribute '{}': {}",
            self.id, self.attribute, self.reason
        )
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema violations in {} record(s): {}", .0.len(), format_violations(.0))]
    SchemaViolations(Vec<SchemaViolation>),

    #[error("Embedding unavailable for space '{space}': {reason}")]
    EmbeddingUnavailable { space: String, reason: String },

    #[error("Unknown category '{value}' for space '{space}'")]
    UnknownCategory { space: String, value: String },

    #[error("Value {value} out of range [{min}, {max}] for space '{space}'")]
    OutOfRange {
        space: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Unknown space: {0}")]
    UnknownSpace(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// The violations carried by a `SchemaViolations` error, empty otherwise
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            Error::SchemaViolations(v) => v,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_violations_display() {
        let err = Error::SchemaViolations(vec![SchemaViolation {
            id: RecordId::Integer(7),
            attribute: "calories".to_string(),
            reason: "expected number, got text".to_string(),
        }]);
        let msg = err.to_string();
        assert!(msg.contains("record 7"));
        assert!(msg.contains("calories"));
    }

    #[test]
    fn test_violations_accessor() {
        let err = Error::RecordNotFound("x".to_string());
        assert!(err.violations().is_empty());
    }
}
