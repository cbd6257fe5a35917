//! Given step definitions
//!
//! Steps that build up the submission.

use cucumber::{gherkin::Step, given};
use usv_connectors::JurisdictionMode;

use crate::world::QueryWorld;

#[given(expr = "the connector {string}")]
fn set_connector(world: &mut QueryWorld, connector: String) {
    world.submission.connector = connector;
}

#[given(expr = "the query type {string}")]
fn set_query_type(world: &mut QueryWorld, query_type: String) {
    world.submission.query_type = query_type;
}

#[given(expr = "the jurisdiction mode is {string}")]
fn set_mode(world: &mut QueryWorld, mode: String) {
    let mode: JurisdictionMode = mode.parse().expect("valid jurisdiction mode");
    world.set_mode(mode);
}

#[given(expr = "the message id {string}")]
fn set_message_id(world: &mut QueryWorld, message_id: String) {
    world.submission.message_id = Some(message_id);
}

/// Table rows are `| field | value |`; the first row is a header.
#[given("the following field values:")]
fn set_field_values(world: &mut QueryWorld, step: &Step) {
    let table = step.table.as_ref().expect("step has a data table");
    for row in table.rows.iter().skip(1) {
        let key = row.first().expect("field column").trim().to_string();
        let value = row.get(1).cloned().unwrap_or_default();
        world.submission.values.insert(key, value);
    }
}
