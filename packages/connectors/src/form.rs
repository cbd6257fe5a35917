//! Form descriptors
//!
//! A serializable description of the input form for one connector and query
//! type, for front ends that build the form dynamically.

use serde::Serialize;

use crate::connector::Connector;
use crate::datasets::DatasetCatalog;
use crate::error::SubmissionError;
use crate::field::{FieldDefinition, OptionEntry, ValueSource};
use crate::query_spec::QueryCombination;
use crate::types::{Applicability, InputKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub key: String,
    pub label: String,
    pub kind: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub required: bool,
    /// Dataset the options come from, when not inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionEntry>,
}

impl FormField {
    fn from_definition(def: &FieldDefinition, catalog: Option<&DatasetCatalog>) -> Self {
        let options = match (def.value_source(), catalog) {
            (ValueSource::Inline(options), _) => options.to_vec(),
            (ValueSource::Dataset(_), Some(catalog)) => catalog.resolve(def).to_vec(),
            _ => Vec::new(),
        };
        Self {
            key: def.key.clone(),
            label: def.label.clone(),
            kind: def.kind,
            hint: def.hint.clone(),
            placeholder: def.placeholder.clone(),
            max_length: def.max_length,
            default: def.default.clone(),
            required: def.required,
            dataset: def.dataset.clone(),
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormCombination {
    pub id: u32,
    pub description: String,
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub applies_to: Applicability,
    pub reference_code: String,
}

impl From<&QueryCombination> for FormCombination {
    fn from(c: &QueryCombination) -> Self {
        Self {
            id: c.id,
            description: c.description.clone(),
            required: c.required.clone(),
            optional: c.optional.clone(),
            applies_to: c.applies_to,
            reference_code: c.reference_code.clone(),
        }
    }
}

/// Input form for one connector and query type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDescriptor {
    pub connector_id: String,
    pub query_type: String,
    pub name: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub default_state: String,
    /// Fields used by the query type, purpose code first, then in emission order
    pub fields: Vec<FormField>,
    pub combinations: Vec<FormCombination>,
}

impl FormDescriptor {
    /// Describe the form of `query_type`, resolving dataset options from
    /// `catalog` when given.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::UnknownQueryType` if the connector has no such
    /// query type.
    pub fn build(
        connector: &Connector,
        query_type: &str,
        catalog: Option<&DatasetCatalog>,
    ) -> Result<Self, SubmissionError> {
        let spec = connector
            .query_spec(query_type)
            .ok_or_else(|| SubmissionError::UnknownQueryType {
                connector: connector.id.clone(),
                query_type: query_type.to_string(),
            })?;

        let fields = connector
            .form_fields(spec)
            .into_iter()
            .map(|def| FormField::from_definition(def, catalog))
            .collect();

        Ok(Self {
            connector_id: connector.id.clone(),
            query_type: spec.query_type.clone(),
            name: spec.name.clone(),
            message_type: spec.message_type.clone(),
            version: spec.version,
            default_state: connector.default_state.clone(),
            fields,
            combinations: spec.combinations.iter().map(FormCombination::from).collect(),
        })
    }
}
