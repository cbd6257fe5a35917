//! Field definitions: presentation metadata, validation rules and output tags

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

use crate::types::{FieldFormat, InputKind};

/// One entry of an enumerated value list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
}

impl OptionEntry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Where the allowed values of a field come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource<'a> {
    /// Free input
    Free,
    /// Options listed in the table itself
    Inline(&'a [OptionEntry]),
    /// Options supplied by an external dataset, by name (e.g. `platetype.csv`)
    Dataset(&'a str),
}

/// A compiled regular expression that serializes as its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source)
            .map_err(|e| serde::de::Error::custom(format!("invalid pattern '{source}': {e}")))
    }
}

/// Value constraints beyond kind and length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Exact values that are rejected (compared case-insensitively)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibited_values: Vec<String>,
    /// Patterns that reject a value when they match
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibited_patterns: Vec<Pattern>,
    /// Tokens accepted as is, bypassing the kind check (e.g. `NX`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_values: Vec<String>,
}

impl ValidationRule {
    pub fn is_special(&self, value: &str) -> bool {
        self.special_values.iter().any(|s| s == value)
    }
}

/// Definition of one form field of a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field key; filled from the table's map key on load
    #[serde(default, skip_serializing)]
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: InputKind,
    /// XML element name used in the rendered request
    pub xml_tag: String,
    #[serde(default)]
    pub format: FieldFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Shown as required on the form; combination matching decides what a
    /// submission actually needs
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    /// Get the source of this field's allowed values.
    pub fn value_source(&self) -> ValueSource<'_> {
        match (&self.options, &self.dataset) {
            (Some(options), _) => ValueSource::Inline(options),
            (None, Some(dataset)) => ValueSource::Dataset(dataset),
            (None, None) => ValueSource::Free,
        }
    }

    /// Apply this field's output formatting to a trimmed value.
    ///
    /// Whether a jurisdiction field is emitted at all is decided by the
    /// renderer; here it is only upper-cased.
    pub fn format_value<'v>(&self, value: &'v str) -> Cow<'v, str> {
        match self.format {
            FieldFormat::Verbatim => Cow::Borrowed(value),
            FieldFormat::Uppercase | FieldFormat::Jurisdiction => {
                if value.chars().any(char::is_lowercase) {
                    Cow::Owned(value.to_uppercase())
                } else {
                    Cow::Borrowed(value)
                }
            }
            FieldFormat::CompactDate => {
                if value.contains(is_date_separator) {
                    Cow::Owned(value.chars().filter(|c| !is_date_separator(*c)).collect())
                } else {
                    Cow::Borrowed(value)
                }
            }
        }
    }
}

fn is_date_separator(c: char) -> bool {
    matches!(c, '-' | '/' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(yaml: &str) -> FieldDefinition {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_inline_options_source() {
        let def = field(
            r#"
label: Sex
kind: select
xml_tag: SexCode
options:
  - { value: 'M', label: 'M - Male' }
"#,
        );
        assert_eq!(
            def.value_source(),
            ValueSource::Inline(&[OptionEntry::new("M", "M - Male")])
        );
    }

    #[test]
    fn test_dataset_source() {
        let def = field("{label: State, kind: select, xml_tag: State, dataset: stateCodes.csv}");
        assert_eq!(def.value_source(), ValueSource::Dataset("stateCodes.csv"));
        assert_eq!(def.kind, InputKind::Select);
        assert_eq!(def.format, FieldFormat::Verbatim);
    }

    #[test]
    fn test_pattern_deserialize() {
        let rule: ValidationRule =
            serde_yaml_ng::from_str("prohibited_patterns: ['^0+$']").unwrap();
        assert!(rule.prohibited_patterns[0].is_match("000"));
        assert!(!rule.prohibited_patterns[0].is_match("A100"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result: std::result::Result<ValidationRule, _> =
            serde_yaml_ng::from_str("prohibited_patterns: ['^(0+$']");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid pattern"), "{err}");
    }

    #[test]
    fn test_format_value() {
        let mut def = field("{label: Name, xml_tag: Name, format: uppercase}");
        assert_eq!(def.format_value("doe, john"), "DOE, JOHN");

        def.format = FieldFormat::CompactDate;
        assert_eq!(def.format_value("2024-05-01"), "20240501");
        assert_eq!(def.format_value("20240501"), "20240501");

        def.format = FieldFormat::Verbatim;
        assert_eq!(def.format_value("abc"), "abc");
    }
}
