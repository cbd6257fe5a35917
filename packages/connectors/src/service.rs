//! Submission service
//!
//! `QueryService` is the submission boundary: it takes a flat mapping of
//! field values for one connector and query type and either renders the
//! request or returns a structured [`SubmissionError`].
//!
//! # Example
//!
//! ```
//! use usv_connectors::{QueryService, Submission, JurisdictionMode};
//!
//! let service = QueryService::builtin();
//! let submission = Submission::new("FL_FCIC", "driver-license")
//!     .with_mode(JurisdictionMode::InState)
//!     .with_value("operatorLicenseNumber", "D123456789");
//!
//! let request = service.submit(&submission).unwrap();
//! assert_eq!(request.reference_code, "FDQ");
//! assert!(request.xml.contains("<OperatorLicenseNumber>D123456789</OperatorLicenseNumber>"));
//! ```

use serde::{Deserialize, Serialize};

use crate::config;
use crate::connector::Connector;
use crate::error::SubmissionError;
use crate::matcher::match_combination;
use crate::registry::ConnectorRegistry;
use crate::render::render_with_message_id;
use crate::types::{FieldValues, JurisdictionMode};
use crate::validation::validate_fields;

/// One query submission as received from a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub connector: String,
    pub query_type: String,
    #[serde(default)]
    pub mode: JurisdictionMode,
    #[serde(default)]
    pub values: FieldValues,
    /// Message id for the `<Id>` element; the fixed placeholder when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl Submission {
    pub fn new(connector: impl Into<String>, query_type: impl Into<String>) -> Self {
        Self {
            connector: connector.into(),
            query_type: query_type.into(),
            mode: JurisdictionMode::default(),
            values: FieldValues::new(),
            message_id: None,
        }
    }

    pub fn with_mode(mut self, mode: JurisdictionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

/// A successfully rendered request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRequest {
    pub connector_id: String,
    pub query_type: String,
    pub message_type: String,
    pub combination_id: u32,
    pub reference_code: String,
    pub xml: String,
}

/// Validates, matches and renders submissions against a registry.
#[derive(Debug, Clone, Copy)]
pub struct QueryService<'r> {
    registry: &'r ConnectorRegistry,
}

impl QueryService<'static> {
    /// Service over the built-in connectors.
    pub fn builtin() -> Self {
        Self::new(ConnectorRegistry::builtin())
    }
}

impl<'r> QueryService<'r> {
    pub fn new(registry: &'r ConnectorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r ConnectorRegistry {
        self.registry
    }

    /// Resolve a connector id.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::UnknownConnector` if the id is not registered.
    pub fn connector(&self, id: &str) -> Result<&'r Connector, SubmissionError> {
        self.registry
            .lookup(id)
            .ok_or_else(|| SubmissionError::UnknownConnector {
                connector: id.to_string(),
            })
    }

    /// Process one submission.
    ///
    /// Steps run in order and the first failure is returned: connector
    /// lookup, query type lookup, field validation, combination matching,
    /// rendering.
    ///
    /// # Errors
    ///
    /// Returns the `SubmissionError` of the first failing step.
    pub fn submit(&self, submission: &Submission) -> Result<RenderedRequest, SubmissionError> {
        let result = self.submit_inner(submission);
        if let Err(e) = &result {
            tracing::warn!(
                connector = %submission.connector,
                query_type = %submission.query_type,
                mode = %submission.mode,
                kind = e.kind(),
                error = %e,
                "Submission rejected"
            );
        }
        result
    }

    fn submit_inner(&self, submission: &Submission) -> Result<RenderedRequest, SubmissionError> {
        let connector = self.connector(&submission.connector)?;
        let spec = connector
            .query_spec(&submission.query_type)
            .ok_or_else(|| SubmissionError::UnknownQueryType {
                connector: connector.id.clone(),
                query_type: submission.query_type.clone(),
            })?;

        tracing::debug!(
            connector = %connector.id,
            query_type = %spec.query_type,
            fields = submission.values.len(),
            "Validating submission"
        );

        let violations = validate_fields(connector, &submission.values);
        if !violations.is_empty() {
            return Err(SubmissionError::FieldValidation { violations });
        }

        let combination = match_combination(connector, spec, &submission.values, submission.mode)
            .map_err(|closest| SubmissionError::NoMatchingCombination {
                connector: connector.id.clone(),
                query_type: spec.query_type.clone(),
                mode: submission.mode,
                closest,
            })?;

        let message_id = submission
            .message_id
            .as_deref()
            .unwrap_or(config::MESSAGE_ID_PLACEHOLDER);
        let xml = render_with_message_id(
            connector,
            &spec.query_type,
            &submission.values,
            submission.mode,
            message_id,
        )?;

        Ok(RenderedRequest {
            connector_id: connector.id.clone(),
            query_type: spec.query_type.clone(),
            message_type: spec.message_type.clone(),
            combination_id: combination.id,
            reference_code: combination.reference_code.clone(),
            xml,
        })
    }
}
