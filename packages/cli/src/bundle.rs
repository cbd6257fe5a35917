//! Federated Search bundle checks
//!
//! Validates exported DepartmentBundle JSON documents against the rules the
//! import backend enforces, before they are uploaded.
//!
//! Structural errors (missing or empty `bundles`, malformed bundle entries)
//! stop the check early; configuration checks only run on a sound structure.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const QUERY_MAPPING: &str = "QUERYINPUTDATAMAPPING";
const QUERY_FORM: &str = "QUERYINPUTFORM";

/// Outcome of checking one bundle document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    pub bundles: usize,
    /// Configuration count per `type`
    pub type_counts: BTreeMap<String, usize>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl BundleReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a parsed bundle document.
pub fn validate_bundle(doc: &Value) -> BundleReport {
    let mut report = BundleReport::default();

    let Some(bundles) = check_structure(doc, &mut report) else {
        return report;
    };

    report.bundles = bundles.len();
    for bundle in bundles {
        for config in configurations(bundle) {
            let kind = config
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            *report.type_counts.entry(kind.to_string()).or_default() += 1;
        }
    }

    if !report.errors.is_empty() {
        return report;
    }

    for config in bundles.iter().flat_map(configurations) {
        match config.get("type").and_then(Value::as_str) {
            Some(QUERY_MAPPING) => check_query_mapping(config, &mut report),
            Some(QUERY_FORM) => check_form(config, &mut report),
            _ => {}
        }
    }

    tracing::debug!(
        bundles = report.bundles,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Checked bundle"
    );

    report
}

fn check_structure<'a>(doc: &'a Value, report: &mut BundleReport) -> Option<&'a [Value]> {
    let Some(bundles) = doc.get("bundles") else {
        report
            .errors
            .push("Missing 'bundles' key at top level".to_string());
        return None;
    };
    let Some(bundles) = bundles.as_array() else {
        report.errors.push("'bundles' must be an array".to_string());
        return None;
    };
    if bundles.is_empty() {
        report.errors.push("'bundles' array is empty".to_string());
        return None;
    }

    for (i, bundle) in bundles.iter().enumerate() {
        for field in ["name", "type", "configurations"] {
            if bundle.get(field).is_none() {
                report
                    .errors
                    .push(format!("Bundle {i} missing required field: {field}"));
            }
        }
        let kind = bundle.get("type");
        if kind.and_then(Value::as_str) != Some("BUNDLE") {
            let shown = kind.map_or_else(|| "None".to_string(), Value::to_string);
            report.errors.push(format!(
                "Bundle {i} has invalid type: {shown} (should be 'BUNDLE')"
            ));
        }
    }

    Some(bundles.as_slice())
}

fn configurations(bundle: &Value) -> impl Iterator<Item = &Value> {
    bundle
        .get("configurations")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn config_name(config: &Value) -> &str {
    config
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("UNNAMED")
}

/// Present and not null, false, zero or empty.
fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn lowercase_strings(value: Option<&Value>) -> impl Iterator<Item = String> + '_ {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_lowercase)
}

fn key_reference(combination: &Value) -> String {
    match combination.get("keyReference") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "UNKNOWN".to_string(),
    }
}

fn check_query_mapping(config: &Value, report: &mut BundleReport) {
    let name = config_name(config);
    let combinations = array(config, "combinations");
    let attributes = array(config, "attributes");

    let empty: Vec<String> = combinations
        .iter()
        .filter(|c| {
            let requirements = c.get("requirements");
            !requirements.is_some_and(|r| {
                is_set(r.get("set")) || is_set(r.get("any"))
            })
        })
        .map(key_reference)
        .collect();
    if !empty.is_empty() {
        report.errors.push(format!(
            "{name}: Empty combinations found: {}",
            empty.join(", ")
        ));
    }

    let invalid: Vec<&str> = attributes
        .iter()
        .filter(|a| {
            !(is_set(a.get("name")) && is_set(a.get("targetField")) && is_set(a.get("sourceField")))
        })
        .map(|a| a.get("name").and_then(Value::as_str).unwrap_or("NO_NAME"))
        .collect();
    if !invalid.is_empty() {
        report.errors.push(format!(
            "{name}: Invalid attributes: {}",
            invalid.join(", ")
        ));
    }

    let covered: BTreeSet<String> = attributes
        .iter()
        .flat_map(|a| lowercase_strings(a.get("sourceField")))
        .collect();
    let required: BTreeSet<String> = combinations
        .iter()
        .filter_map(|c| c.get("requirements"))
        .flat_map(|r| lowercase_strings(r.get("set")).chain(lowercase_strings(r.get("any"))))
        .collect();
    let missing: Vec<&str> = required.difference(&covered).map(String::as_str).collect();
    if !missing.is_empty() {
        report.errors.push(format!(
            "{name}: Missing attributes: {}",
            missing.join(", ")
        ));
    }

    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<String> = combinations
        .iter()
        .map(key_reference)
        .filter(|k| !seen.insert(k.clone()))
        .collect();
    if !duplicates.is_empty() {
        let duplicates: Vec<String> = duplicates.into_iter().collect();
        report.errors.push(format!(
            "{name}: Duplicate keyReferences: {}",
            duplicates.join(", ")
        ));
    }
}

fn check_form(form: &Value, report: &mut BundleReport) {
    let name = config_name(form);

    if form.get("id").is_some() {
        report
            .errors
            .push(format!("{name}: Forms should not have 'id' field"));
    }
    if form.get("version").is_some() {
        report
            .errors
            .push(format!("{name}: Forms should not have 'version' field"));
    }
    for field in ["name", "type", "layout"] {
        if form.get(field).is_none() {
            report
                .errors
                .push(format!("{name}: Missing required field '{field}'"));
        }
    }

    let Some(layout) = form.get("layout") else {
        return;
    };
    let Some(layout) = layout.as_object() else {
        report
            .errors
            .push(format!("{name}: layout must be an object"));
        return;
    };

    let uppercase: Vec<&str> = layout
        .keys()
        .map(String::as_str)
        .filter(|k| k.chars().any(char::is_uppercase) && !k.chars().any(char::is_lowercase))
        .collect();
    if !uppercase.is_empty() {
        report.warnings.push(format!(
            "{name}: Layout has uppercase keys: {} (should be lowercase)",
            uppercase.join(", ")
        ));
    }

    let selects = selects_with_object_options(layout);
    if !selects.is_empty() {
        report.warnings.push(format!(
            "{name}: FormSelect with object options may cause issues: {}",
            selects.join(", ")
        ));
    }
}

/// Names of `FormSelect` nodes whose options are objects rather than strings.
fn selects_with_object_options(layout: &Map<String, Value>) -> Vec<&str> {
    layout
        .values()
        .filter_map(Value::as_object)
        .flat_map(|context| context.iter())
        .filter(|(_, node)| {
            let is_select = node
                .get("type")
                .and_then(|t| t.get("resolvedName"))
                .and_then(Value::as_str)
                == Some("FormSelect");
            let first_option = node
                .get("props")
                .and_then(|p| p.get("options"))
                .and_then(Value::as_array)
                .and_then(|o| o.first());
            is_select && first_option.is_some_and(Value::is_object)
        })
        .map(|(node_name, _)| node_name.as_str())
        .collect()
}
