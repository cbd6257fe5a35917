//! Then step definitions
//!
//! Steps that verify the rendered request or the failure.

use cucumber::{gherkin::Step, then};
use usv_connectors::SubmissionError;

use crate::world::QueryWorld;

// =============================================================================
// Rendered requests
// =============================================================================

#[then(expr = "the request is rendered with reference code {string}")]
fn assert_reference_code(world: &mut QueryWorld, expected: String) {
    assert_eq!(world.request().reference_code, expected);
}

#[then(expr = "the matched combination is {int}")]
fn assert_combination(world: &mut QueryWorld, expected: u32) {
    assert_eq!(world.request().combination_id, expected);
}

#[then(expr = "the XML contains {string}")]
fn assert_xml_contains(world: &mut QueryWorld, fragment: String) {
    let xml = &world.request().xml;
    assert!(xml.contains(&fragment), "Expected {fragment} in:\n{xml}");
}

#[then(expr = "the XML does not contain {string}")]
fn assert_xml_not_contains(world: &mut QueryWorld, fragment: String) {
    let xml = &world.request().xml;
    assert!(!xml.contains(&fragment), "Did not expect {fragment} in:\n{xml}");
}

#[then("the XML is:")]
fn assert_xml_is(world: &mut QueryWorld, step: &Step) {
    let expected = step.docstring.as_ref().expect("step has a doc string");
    assert_eq!(world.request().xml, expected.trim());
}

#[then("the XML is well-formed")]
fn assert_well_formed(world: &mut QueryWorld) {
    let xml = &world.request().xml;
    if let Err(e) = roxmltree::Document::parse(xml) {
        panic!("Rendered XML is not well-formed: {e}\n{xml}");
    }
}

// =============================================================================
// Failures
// =============================================================================

#[then(expr = "the submission fails with {string}")]
fn assert_failure_kind(world: &mut QueryWorld, kind: String) {
    assert_eq!(world.error().kind(), kind, "error: {}", world.error());
}

#[then(expr = "the field {string} is rejected as {string}")]
fn assert_violation(world: &mut QueryWorld, field: String, reason: String) {
    let SubmissionError::FieldValidation { violations } = world.error() else {
        panic!("Expected field validation failure, got {}", world.error());
    };
    let violation = violations
        .iter()
        .find(|v| v.field == field)
        .unwrap_or_else(|| panic!("No violation for {field}: {violations:?}"));
    let json = serde_json::to_value(violation).unwrap();
    assert_eq!(json["reason"], reason.as_str());
}

#[then(expr = "the closest combination is {int} missing {string}")]
fn assert_closest(world: &mut QueryWorld, id: u32, missing: String) {
    let SubmissionError::NoMatchingCombination { closest, .. } = world.error() else {
        panic!("Expected no matching combination, got {}", world.error());
    };
    let closest = closest.as_ref().expect("a closest candidate");
    assert_eq!(closest.combination_id, id);
    let expected: Vec<String> = missing.split(',').map(|s| s.trim().to_string()).collect();
    assert_eq!(closest.missing, expected);
}
