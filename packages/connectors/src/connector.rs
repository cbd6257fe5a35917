//! Connector tables
//!
//! A connector bundles everything needed to query one regional network: its
//! field definitions, its query specifications and the declarative rules the
//! renderer follows (field order, purpose code, jurisdiction handling).
//!
//! Tables are YAML documents. They are parsed once and never mutated.
//!
//! # Integrity
//!
//! Loading rejects tables where:
//! - a combination, the field order or the purpose code names an unknown field
//! - a combination field is missing from the field order
//! - a query type has no combinations, or a combination has no required fields
//! - required and optional fields of a combination overlap
//! - a field declares both inline options and a dataset
//! - the state is omitted in-state but no jurisdiction field exists

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use crate::config;
use crate::error::{ConnectorError, Result};
use crate::field::FieldDefinition;
use crate::query_spec::QuerySpec;
use crate::types::{FieldFormat, JurisdictionMode};

fn default_purpose_code_field() -> String {
    config::DEFAULT_PURPOSE_CODE_FIELD.to_string()
}

/// Configuration profile for one regional record-query network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    pub region: String,
    /// Home jurisdiction code, e.g. `CA`
    pub default_state: String,
    /// Credential fields the network expects with every request
    #[serde(default)]
    pub authentication_fields: Vec<String>,
    #[serde(default)]
    pub requires_purpose_code: bool,
    #[serde(default = "default_purpose_code_field")]
    pub purpose_code_field: String,
    #[serde(default)]
    pub omit_state_for_in_state: bool,
    /// Emission order of fields in the rendered request
    pub field_order: Vec<String>,
    pub fields: BTreeMap<String, FieldDefinition>,
    pub query_specs: Vec<QuerySpec>,
}

/// Summary of a connector for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub region: String,
}

impl Connector {
    /// Load a connector table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Load` if the file cannot be read or exceeds
    /// [`config::MAX_TABLE_SIZE`], and any error of [`Connector::from_yaml_str`].
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        tracing::debug!(path = %path_ref.display(), "Loading connector table");

        let metadata = fs::metadata(path_ref).map_err(|e| {
            ConnectorError::Load(format!("cannot access {}: {e}", path_ref.display()))
        })?;

        if metadata.len() as usize > config::MAX_TABLE_SIZE {
            tracing::warn!(
                size = metadata.len(),
                max = config::MAX_TABLE_SIZE,
                "Connector table exceeds size limit"
            );
            return Err(ConnectorError::Load(format!(
                "{} exceeds maximum size limit ({} bytes)",
                path_ref.display(),
                config::MAX_TABLE_SIZE
            )));
        }

        let content = fs::read_to_string(path_ref)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a connector table from a YAML string and check its integrity.
    ///
    /// # Errors
    ///
    /// Returns an error if the content exceeds the size limit, is not a valid
    /// table, or violates an integrity rule (see module docs).
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.len() > config::MAX_TABLE_SIZE {
            return Err(ConnectorError::Load(format!(
                "table content exceeds maximum size limit ({} bytes)",
                config::MAX_TABLE_SIZE
            )));
        }

        let mut connector: Self = serde_yaml_ng::from_str(content)?;
        for (key, field) in connector.fields.iter_mut() {
            field.key.clone_from(key);
        }

        connector.check_integrity()?;

        tracing::debug!(
            connector = %connector.id,
            fields = connector.fields.len(),
            query_types = connector.query_specs.len(),
            "Parsed connector table"
        );

        Ok(connector)
    }

    /// Verify the structural invariants of this table.
    pub fn check_integrity(&self) -> Result<()> {
        let id = self.id.as_str();

        if id.trim().is_empty() {
            return Err(ConnectorError::Load("connector id is empty".to_string()));
        }

        for (key, field) in &self.fields {
            if field.options.is_some() && field.dataset.is_some() {
                return Err(ConnectorError::integrity(
                    id,
                    format!("field '{key}' declares both options and a dataset"),
                ));
            }
            if field.xml_tag.trim().is_empty() {
                return Err(ConnectorError::integrity(
                    id,
                    format!("field '{key}' has an empty xml_tag"),
                ));
            }
        }

        let mut seen = HashSet::new();
        for key in &self.field_order {
            if !self.fields.contains_key(key) {
                return Err(ConnectorError::integrity(
                    id,
                    format!("field order names unknown field '{key}'"),
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(ConnectorError::integrity(
                    id,
                    format!("field order lists '{key}' twice"),
                ));
            }
        }

        if self.requires_purpose_code {
            if !self.fields.contains_key(&self.purpose_code_field) {
                return Err(ConnectorError::integrity(
                    id,
                    format!(
                        "purpose code field '{}' is not defined",
                        self.purpose_code_field
                    ),
                ));
            }
            if seen.contains(self.purpose_code_field.as_str()) {
                return Err(ConnectorError::integrity(
                    id,
                    "purpose code field must not appear in the field order",
                ));
            }
        }

        if self.omit_state_for_in_state
            && !self
                .fields
                .values()
                .any(|f| f.format == FieldFormat::Jurisdiction)
        {
            return Err(ConnectorError::integrity(
                id,
                "state is omitted in-state but no field has the jurisdiction format",
            ));
        }

        let mut query_types = HashSet::new();
        for spec in &self.query_specs {
            let qt = spec.query_type.as_str();
            if !query_types.insert(qt) {
                return Err(ConnectorError::integrity(
                    id,
                    format!("query type '{qt}' is declared twice"),
                ));
            }
            if spec.combinations.is_empty() {
                return Err(ConnectorError::integrity(
                    id,
                    format!("query type '{qt}' has no combinations"),
                ));
            }

            for combination in &spec.combinations {
                let cid = combination.id;
                if combination.required.is_empty() {
                    return Err(ConnectorError::integrity(
                        id,
                        format!("{qt} combination {cid} has no required fields"),
                    ));
                }
                if let Some(key) = combination
                    .optional
                    .iter()
                    .find(|k| combination.required.contains(*k))
                {
                    return Err(ConnectorError::integrity(
                        id,
                        format!("{qt} combination {cid} lists '{key}' as required and optional"),
                    ));
                }
                for key in combination.keys() {
                    if !self.fields.contains_key(key) {
                        return Err(ConnectorError::integrity(
                            id,
                            format!("{qt} combination {cid} references unknown field '{key}'"),
                        ));
                    }
                    if !seen.contains(key) && !self.is_purpose_code_field(key) {
                        return Err(ConnectorError::integrity(
                            id,
                            format!("{qt} combination {cid} field '{key}' is not in the field order"),
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    pub fn query_spec(&self, query_type: &str) -> Option<&QuerySpec> {
        self.query_specs.iter().find(|s| s.query_type == query_type)
    }

    /// Query types in declaration order.
    pub fn query_types(&self) -> impl Iterator<Item = &str> {
        self.query_specs.iter().map(|s| s.query_type.as_str())
    }

    pub fn summary(&self) -> ConnectorSummary {
        ConnectorSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            region: self.region.clone(),
        }
    }

    fn is_purpose_code_field(&self, key: &str) -> bool {
        self.requires_purpose_code && self.purpose_code_field == key
    }

    /// The purpose code field, when this jurisdiction mandates one.
    pub fn purpose_code(&self) -> Option<&FieldDefinition> {
        if self.requires_purpose_code {
            self.fields.get(&self.purpose_code_field)
        } else {
            None
        }
    }

    /// Check if jurisdiction-code fields are written for `mode`.
    pub fn emits_jurisdiction(&self, mode: JurisdictionMode) -> bool {
        !(self.omit_state_for_in_state && mode == JurisdictionMode::InState)
    }

    /// Check if a submitted key is accepted outside of any combination.
    ///
    /// These are the authentication fields, the mandated purpose code, and
    /// jurisdiction fields that will not be emitted for `mode`.
    pub fn is_ambient_key(&self, key: &str, mode: JurisdictionMode) -> bool {
        if self.authentication_fields.iter().any(|k| k == key) || self.is_purpose_code_field(key)
        {
            return true;
        }
        !self.emits_jurisdiction(mode)
            && self
                .fields
                .get(key)
                .is_some_and(|f| f.format == FieldFormat::Jurisdiction)
    }

    /// Fields in emission order.
    pub fn ordered_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.field_order.iter().filter_map(|k| self.fields.get(k))
    }

    /// Keys used by a query type, in emission order (purpose code first).
    pub fn form_fields(&self, spec: &QuerySpec) -> Vec<&FieldDefinition> {
        let referenced: BTreeSet<&str> = spec.referenced_fields();
        self.purpose_code()
            .into_iter()
            .chain(
                self.ordered_fields()
                    .filter(|f| referenced.contains(f.key.as_str())),
            )
            .collect()
    }
}
