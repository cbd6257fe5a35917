//! When step definitions
//!
//! Steps that submit the query.

use cucumber::when;

use crate::world::QueryWorld;

#[when("the query is submitted")]
fn submit_query(world: &mut QueryWorld) {
    world.submit();
}
