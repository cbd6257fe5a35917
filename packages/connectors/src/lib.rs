//! Universal Search connectors
//!
//! Connector configuration for criminal-information network queries and
//! rendering of the XML requests those networks expect. This library provides:
//! - Connector tables (field definitions, query specs, render rules) in YAML
//! - Field validation and combination matching for submitted forms
//! - Deterministic XML request rendering
//! - Form descriptors and reference datasets for form front ends
//!
//! # Example
//!
//! ```
//! use usv_connectors::{ConnectorRegistry, FieldValues, JurisdictionMode, render};
//!
//! let connector = ConnectorRegistry::builtin().lookup("CA_ESUN").unwrap();
//! let mut values = FieldValues::new();
//! values.insert("purposeCode".to_string(), "C".to_string());
//! values.insert("licensePlateNumber".to_string(), "7ABC123".to_string());
//!
//! let xml = render(connector, "vehicle-registration", &values, JurisdictionMode::InState)?;
//! assert!(xml.starts_with("<Request>\n  <MessageType>VehicleRegistrationQuery</MessageType>"));
//! # Ok::<(), usv_connectors::SubmissionError>(())
//! ```

pub mod config;
pub mod connector;
pub mod datasets;
pub mod error;
pub mod field;
pub mod form;
pub mod matcher;
pub mod query_spec;
pub mod registry;
pub mod render;
pub mod service;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use connector::{Connector, ConnectorSummary};
pub use datasets::DatasetCatalog;
pub use error::{ConnectorError, Result, SubmissionError};
pub use field::{FieldDefinition, OptionEntry, Pattern, ValidationRule, ValueSource};
pub use form::{FormCombination, FormDescriptor, FormField};
pub use matcher::{match_combination, Candidate};
pub use query_spec::{QueryCombination, QuerySpec};
pub use registry::ConnectorRegistry;
pub use render::{render, render_with_message_id};
pub use service::{QueryService, RenderedRequest, Submission};
pub use types::{Applicability, FieldFormat, FieldValues, InputKind, JurisdictionMode};
pub use validation::{validate_fields, FieldViolation, ViolationKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
