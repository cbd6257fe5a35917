//! Error types for the connector crate.
//!
//! Two families: `ConnectorError` for loading and checking connector tables,
//! and `SubmissionError` for the structured failures a single query
//! submission can produce. Submission errors are values, never panics, and
//! are scoped to the submission that caused them.

use serde::Serialize;
use thiserror::Error;

use crate::matcher::Candidate;
use crate::types::JurisdictionMode;
use crate::validation::FieldViolation;

/// Error raised while loading connector tables or datasets.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV dataset parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Table could not be loaded (size limits, empty directory, ...)
    #[error("Failed to load connector table: {0}")]
    Load(String),

    /// Table parsed but violates a structural invariant
    #[error("Invalid connector '{connector}': {reason}")]
    Integrity { connector: String, reason: String },

    /// Two tables declare the same connector id
    #[error("Duplicate connector id: {0}")]
    DuplicateConnector(String),
}

impl ConnectorError {
    pub(crate) fn integrity(connector: &str, reason: impl Into<String>) -> Self {
        ConnectorError::Integrity {
            connector: connector.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for table loading operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Structured failure of a single query submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionError {
    /// Requested connector id is not in the registry
    #[error("Unknown connector: {connector}")]
    UnknownConnector { connector: String },

    /// Requested query type is not in the connector's query-spec table
    #[error("Unknown query type '{query_type}' for connector {connector}")]
    UnknownQueryType {
        connector: String,
        query_type: String,
    },

    /// Submitted field set satisfies no declared combination
    #[error(
        "No matching combination for {query_type} ({mode}){}",
        .closest.as_ref().map(|c| format!(": closest is {c}")).unwrap_or_default()
    )]
    NoMatchingCombination {
        connector: String,
        query_type: String,
        mode: JurisdictionMode,
        closest: Option<Candidate>,
    },

    /// One or more present fields violate their own validation rule
    #[error("Field validation failed: {}", join_violations(.violations))]
    FieldValidation { violations: Vec<FieldViolation> },
}

impl SubmissionError {
    /// Short machine-readable kind, matching the serialized `kind` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::UnknownConnector { .. } => "unknown_connector",
            SubmissionError::UnknownQueryType { .. } => "unknown_query_type",
            SubmissionError::NoMatchingCombination { .. } => "no_matching_combination",
            SubmissionError::FieldValidation { .. } => "field_validation",
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;

    #[test]
    fn test_unknown_connector_display() {
        let err = SubmissionError::UnknownConnector {
            connector: "TX_TLETS".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown connector: TX_TLETS");
        assert_eq!(err.kind(), "unknown_connector");
    }

    #[test]
    fn test_no_match_without_candidate() {
        let err = SubmissionError::NoMatchingCombination {
            connector: "CA_ESUN".to_string(),
            query_type: "driver-license".to_string(),
            mode: JurisdictionMode::OutOfState,
            closest: None,
        };
        assert_eq!(
            err.to_string(),
            "No matching combination for driver-license (out-of-state)"
        );
    }

    #[test]
    fn test_field_validation_display() {
        let err = SubmissionError::FieldValidation {
            violations: vec![FieldViolation {
                field: "licensePlateNumber".to_string(),
                value: "UNKNOWN".to_string(),
                kind: ViolationKind::ProhibitedValue,
            }],
        };
        assert_eq!(
            err.to_string(),
            "Field validation failed: licensePlateNumber: value 'UNKNOWN' is prohibited"
        );
    }

    #[test]
    fn test_integrity_display() {
        let err = ConnectorError::integrity("FL_FCIC", "field order names unknown field 'x'");
        assert_eq!(
            err.to_string(),
            "Invalid connector 'FL_FCIC': field order names unknown field 'x'"
        );
    }
}
