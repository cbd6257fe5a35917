//! Combination matching
//!
//! A submission satisfies a combination when every required field is present,
//! every other present field is optional for that combination or recognized
//! by the connector, and the combination applies to the jurisdiction mode.
//! Combinations are tried in declaration order; the first one wins.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::connector::Connector;
use crate::query_spec::{QueryCombination, QuerySpec};
use crate::types::{FieldValues, JurisdictionMode};

/// The combination a rejected submission came closest to satisfying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub combination_id: u32,
    pub reference_code: String,
    pub description: String,
    /// Required fields that were absent or empty
    pub missing: Vec<String>,
    /// Present fields the combination does not allow
    pub unexpected: Vec<String>,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "combination {} ({})", self.combination_id, self.description)?;
        if !self.missing.is_empty() {
            write!(f, ", missing {}", self.missing.join(", "))?;
        }
        if !self.unexpected.is_empty() {
            write!(f, ", unexpected {}", self.unexpected.join(", "))?;
        }
        Ok(())
    }
}

/// Keys whose values are non-empty after trimming.
pub fn present_keys(values: &FieldValues) -> BTreeSet<&str> {
    values
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, _)| k.as_str())
        .collect()
}

fn unexpected<'a>(
    connector: &Connector,
    combination: &QueryCombination,
    present: &BTreeSet<&'a str>,
    mode: JurisdictionMode,
) -> Vec<&'a str> {
    present
        .iter()
        .copied()
        .filter(|k| !combination.allows_key(k) && !connector.is_ambient_key(k, mode))
        .collect()
}

/// Find the first combination of `spec` satisfied by `values` in `mode`.
///
/// On failure, returns the closest applicable candidate: fewest missing
/// required fields, then fewest unexpected fields, then declaration order.
/// `None` means no combination applies to `mode` at all.
pub fn match_combination<'s>(
    connector: &Connector,
    spec: &'s QuerySpec,
    values: &FieldValues,
    mode: JurisdictionMode,
) -> Result<&'s QueryCombination, Option<Candidate>> {
    let present = present_keys(values);
    let mut closest: Option<(usize, usize, Candidate)> = None;

    for combination in spec
        .combinations
        .iter()
        .filter(|c| c.applies_to_mode(mode))
    {
        let missing = combination.missing(&present);
        let unexpected = unexpected(connector, combination, &present, mode);

        if missing.is_empty() && unexpected.is_empty() {
            tracing::debug!(
                query_type = %spec.query_type,
                combination = combination.id,
                reference_code = %combination.reference_code,
                "Matched combination"
            );
            return Ok(combination);
        }

        let score = (missing.len(), unexpected.len());
        let better = match &closest {
            Some((m, u, _)) => score < (*m, *u),
            None => true,
        };
        if better {
            closest = Some((
                score.0,
                score.1,
                Candidate {
                    combination_id: combination.id,
                    reference_code: combination.reference_code.clone(),
                    description: combination.description.clone(),
                    missing: missing.into_iter().map(String::from).collect(),
                    unexpected: unexpected.into_iter().map(String::from).collect(),
                },
            ));
        }
    }

    Err(closest.map(|(_, _, candidate)| candidate))
}
