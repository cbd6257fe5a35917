//! Field-level validation
//!
//! Every present field is checked against its own definition, independently
//! of combination matching. Checks run in this order and the first failure
//! wins for a field:
//!
//! 1. prohibited values (case-insensitive)
//! 2. prohibited patterns
//! 3. special tokens, which are accepted as is
//! 4. length of the formatted value
//! 5. input kind (number, date, inline select options)
//!
//! Violations of different fields are all reported together.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::config;
use crate::connector::Connector;
use crate::field::{FieldDefinition, ValueSource};
use crate::types::{FieldValues, InputKind};

/// Why a field value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ViolationKind {
    ProhibitedValue,
    ProhibitedPattern { pattern: String },
    TooLong { max: usize, actual: usize },
    NotANumber,
    InvalidDate,
    NotAnOption,
}

/// A present field whose value violates its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    /// The trimmed submitted value
    pub value: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = &self.value;
        write!(f, "{}: ", self.field)?;
        match &self.kind {
            ViolationKind::ProhibitedValue => write!(f, "value '{value}' is prohibited"),
            ViolationKind::ProhibitedPattern { pattern } => {
                write!(f, "value '{value}' matches prohibited pattern '{pattern}'")
            }
            ViolationKind::TooLong { max, actual } => {
                write!(f, "value is {actual} characters long, maximum is {max}")
            }
            ViolationKind::NotANumber => write!(f, "value '{value}' is not a number"),
            ViolationKind::InvalidDate => write!(
                f,
                "value '{value}' is not a valid date (YYYY-MM-DD or YYYYMMDD)"
            ),
            ViolationKind::NotAnOption => {
                write!(f, "value '{value}' is not one of the allowed options")
            }
        }
    }
}

/// Check a single trimmed value against its field definition.
pub fn check_value(def: &FieldDefinition, value: &str) -> Option<ViolationKind> {
    if let Some(rule) = &def.validation {
        if rule
            .prohibited_values
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(value))
        {
            return Some(ViolationKind::ProhibitedValue);
        }
        if let Some(pattern) = rule.prohibited_patterns.iter().find(|p| p.is_match(value)) {
            return Some(ViolationKind::ProhibitedPattern {
                pattern: pattern.as_str().to_string(),
            });
        }
        if rule.is_special(value) {
            return None;
        }
    }

    // Length applies to what is written, so `2024-05-01` fits an 8-character
    // compact date field.
    let max = def.max_length.unwrap_or(config::MAX_VALUE_LENGTH);
    let actual = def.format_value(value).chars().count();
    if actual > max {
        return Some(ViolationKind::TooLong { max, actual });
    }

    match def.kind {
        InputKind::Number if !value.chars().all(|c| c.is_ascii_digit()) => {
            Some(ViolationKind::NotANumber)
        }
        InputKind::Date if parse_date(value).is_none() => Some(ViolationKind::InvalidDate),
        InputKind::Select => match def.value_source() {
            ValueSource::Inline(options) if !options.iter().any(|o| o.value == value) => {
                Some(ViolationKind::NotAnOption)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Parse a calendar date written as `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let dashed = format!("{}-{}-{}", &value[..4], &value[4..6], &value[6..]);
        return NaiveDate::parse_from_str(&dashed, "%Y-%m-%d").ok();
    }
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Validate every present field of a submission.
///
/// Keys without a definition are skipped; combination matching rejects
/// them unless the connector recognizes them.
pub fn validate_fields(connector: &Connector, values: &FieldValues) -> Vec<FieldViolation> {
    values
        .iter()
        .filter_map(|(key, raw)| {
            let value = raw.trim();
            if value.is_empty() {
                return None;
            }
            let def = connector.field(key)?;
            check_value(def, value).map(|kind| FieldViolation {
                field: key.clone(),
                value: value.to_string(),
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectorRegistry;
    use pretty_assertions::assert_eq;

    fn fl() -> &'static Connector {
        ConnectorRegistry::builtin().lookup("FL_FCIC").unwrap()
    }

    fn ca() -> &'static Connector {
        ConnectorRegistry::builtin().lookup("CA_ESUN").unwrap()
    }

    fn check(connector: &Connector, key: &str, value: &str) -> Option<ViolationKind> {
        check_value(connector.field(key).unwrap(), value)
    }

    #[test]
    fn test_prohibited_values_case_insensitive() {
        assert_eq!(check(fl(), "licensePlateNumber", "UNKNOWN"), Some(ViolationKind::ProhibitedValue));
        assert_eq!(check(fl(), "licensePlateNumber", "unk"), Some(ViolationKind::ProhibitedValue));
        assert_eq!(check(fl(), "licensePlateNumber", "ABC123"), None);
    }

    #[test]
    fn test_prohibited_patterns() {
        assert_eq!(
            check(fl(), "vehicleIdentificationNumber", "0000"),
            Some(ViolationKind::ProhibitedPattern {
                pattern: "^0+$".to_string()
            })
        );
        assert!(check(fl(), "decalNumber", "X").is_some());
        assert!(check(fl(), "decalNumber", "ABCD").is_some());
        assert_eq!(check(fl(), "decalNumber", "D12345"), None);
        assert!(check(fl(), "operatorLicenseNumber", "0").is_some());
        assert_eq!(check(fl(), "operatorLicenseNumber", "A1234567"), None);
    }

    #[test]
    fn test_special_value_accepted() {
        assert_eq!(check(fl(), "licensePlateYear", "NX"), None);
        assert_eq!(check(fl(), "licensePlateYear", "2025"), None);
    }

    #[test]
    fn test_max_length() {
        assert_eq!(
            check(fl(), "sexCode", "MM"),
            Some(ViolationKind::TooLong { max: 1, actual: 2 })
        );
        // Length is measured on the compact form
        assert_eq!(check(fl(), "birthDate", "2024-05-01"), None);
    }

    #[test]
    fn test_default_length_limit() {
        let long = "A".repeat(config::MAX_VALUE_LENGTH + 1);
        assert!(matches!(
            check(ca(), "addressCity", &long),
            Some(ViolationKind::TooLong { .. })
        ));
    }

    #[test]
    fn test_number_kind() {
        assert_eq!(check(ca(), "vehicleYear", "20x0"), Some(ViolationKind::NotANumber));
        assert_eq!(check(ca(), "vehicleYear", "2020"), None);
    }

    #[test]
    fn test_date_kind() {
        assert_eq!(check(ca(), "birthDate", "1980-02-30"), Some(ViolationKind::InvalidDate));
        assert_eq!(check(ca(), "birthDate", "05/01/1980"), Some(ViolationKind::InvalidDate));
        assert_eq!(check(ca(), "birthDate", "19800501"), None);
        assert_eq!(check(ca(), "birthDate", "1980-05-01"), None);
    }

    #[test]
    fn test_inline_options() {
        assert_eq!(check(ca(), "sexCode", "Q"), Some(ViolationKind::NotAnOption));
        assert_eq!(check(ca(), "sexCode", "F"), None);
        // Dataset-backed selects are opaque
        assert_eq!(check(ca(), "licensePlateTypeCode", "ZZ"), None);
    }

    #[test]
    fn test_validate_fields_reports_all() {
        let values: FieldValues = [
            ("licensePlateNumber", "UNKNOWN"),
            ("vehicleIdentificationNumber", "AAAA"),
            ("requestor", "  "),
            ("ori", "FL0000000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let violations = validate_fields(fl(), &values);
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["licensePlateNumber", "vehicleIdentificationNumber"]);
    }

    #[test]
    fn test_violation_display() {
        let violation = FieldViolation {
            field: "sexCode".to_string(),
            value: "MM".to_string(),
            kind: ViolationKind::TooLong { max: 1, actual: 2 },
        };
        assert_eq!(
            violation.to_string(),
            "sexCode: value is 2 characters long, maximum is 1"
        );
    }

    #[test]
    fn test_violation_serializes_flat() {
        let violation = FieldViolation {
            field: "decalNumber".to_string(),
            value: "0".to_string(),
            kind: ViolationKind::ProhibitedPattern {
                pattern: "^0+$".to_string(),
            },
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["reason"], "prohibited_pattern");
        assert_eq!(json["pattern"], "^0+$");
        assert_eq!(json["field"], "decalNumber");
    }
}
