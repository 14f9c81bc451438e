//! Error types for task operations
//!
//! None of these are fatal. Validation aborts the single operation, a missing
//! ID is a silent no-op, and a parse failure rejects one CSV line.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    NotFound(Uuid),

    #[error("Line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl TaskError {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TaskError::Validation("task name is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: task name is required");

        let err = TaskError::parse(3, "expected 6 fields, found 2");
        assert_eq!(err.to_string(), "Line 3: expected 6 fields, found 2");
    }
}
