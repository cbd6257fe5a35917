//! Query specifications: the valid field combinations per query type

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{Applicability, JurisdictionMode};

/// One valid set of required and optional fields for a query type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCombination {
    pub id: u32,
    pub description: String,
    /// Field keys that must all be present
    pub required: Vec<String>,
    /// Field keys that may additionally be present
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,
    #[serde(default)]
    pub applies_to: Applicability,
    /// Wire-message key, e.g. QV, QD, FRQ
    pub reference_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl QueryCombination {
    /// Check if `key` is required or optional in this combination.
    pub fn allows_key(&self, key: &str) -> bool {
        self.required.iter().any(|k| k == key) || self.optional.iter().any(|k| k == key)
    }

    /// Required keys not in `present`, in declaration order.
    pub fn missing<'a>(&'a self, present: &BTreeSet<&str>) -> Vec<&'a str> {
        self.required
            .iter()
            .map(String::as_str)
            .filter(|k| !present.contains(k))
            .collect()
    }

    pub fn applies_to_mode(&self, mode: JurisdictionMode) -> bool {
        self.applies_to.allows(mode)
    }

    /// All keys this combination mentions.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .map(String::as_str)
    }
}

/// A named query type with its ordered combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Query type identifier, e.g. `vehicle-registration`
    pub query_type: String,
    /// Display name
    pub name: String,
    /// Element content of `<MessageType>`
    pub message_type: String,
    /// Transaction version of the message, when the network publishes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub combinations: Vec<QueryCombination>,
}

impl QuerySpec {
    /// Union of the keys referenced by any combination.
    pub fn referenced_fields(&self) -> BTreeSet<&str> {
        self.combinations.iter().flat_map(|c| c.keys()).collect()
    }

    pub fn combination(&self, id: u32) -> Option<&QueryCombination> {
        self.combinations.iter().find(|c| c.id == id)
    }
}
