//! Core types shared by the connector model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Submitted form values: field key to raw string value.
pub type FieldValues = BTreeMap<String, String>;

/// Whether the query target is inside or outside the connector's home
/// jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JurisdictionMode {
    #[default]
    InState,
    OutOfState,
}

impl JurisdictionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JurisdictionMode::InState => "in-state",
            JurisdictionMode::OutOfState => "out-of-state",
        }
    }
}

impl fmt::Display for JurisdictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JurisdictionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-state" | "in" | "instate" => Ok(JurisdictionMode::InState),
            "out-of-state" | "out" | "outofstate" => Ok(JurisdictionMode::OutOfState),
            other => Err(format!(
                "invalid jurisdiction mode '{other}', expected in-state or out-of-state"
            )),
        }
    }
}

/// Jurisdiction modes a query combination applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Applicability {
    InState,
    OutOfState,
    #[default]
    Both,
}

impl Applicability {
    /// Check if a submission in `mode` may use this combination.
    pub fn allows(&self, mode: JurisdictionMode) -> bool {
        match self {
            Applicability::Both => true,
            Applicability::InState => mode == JurisdictionMode::InState,
            Applicability::OutOfState => mode == JurisdictionMode::OutOfState,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Applicability::InState => "in-state",
            Applicability::OutOfState => "out-of-state",
            Applicability::Both => "both",
        }
    }
}

/// Input control kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Select,
    Number,
    Date,
}

/// Formatting applied to a field value when it is written to XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    /// Emit the submitted value as is
    #[default]
    Verbatim,
    /// Upper-case the value (person names)
    Uppercase,
    /// Strip date separators: `2024-05-01` becomes `20240501`
    CompactDate,
    /// Jurisdiction code: upper-cased, and dropped for in-state queries on
    /// connectors that omit it
    Jurisdiction,
}
