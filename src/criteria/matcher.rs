// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Matching criteria against candidate records.
//!
//! The filterer talks to criteria through the [`Matcher`] trait so tag
//! matching stays independently testable and fakeable; health selection is
//! layered on top by the filterer itself.

use super::Criteria;
use crate::fqdn;
use crate::record::Record;

/// Decides whether a candidate record satisfies a query's constraints.
pub trait Matcher: Send + Sync {
    /// Whether `record` satisfies every constraint.
    fn matches(&self, record: &Record) -> bool;
}

impl Matcher for Criteria {
    /// Apply every tag constraint to `record`; all must hold.
    ///
    /// A tag with several values matches when any value does. The `s`, `y`,
    /// and `fqdn` entries carry no per-record constraint and are skipped.
    /// An empty `domain` (query under no served domain) matches nothing
    /// unless the query named a literal instance id, which searches across
    /// domains.
    fn matches(&self, record: &Record) -> bool {
        let has_id = !self.get("id").is_empty();

        for (tag, values) in self.entries() {
            match tag.as_str() {
                "fqdn" | "s" | "y" => {}
                "domain" => {
                    let root = values.first().map_or("", String::as_str);
                    if root.is_empty() {
                        if !has_id {
                            return false;
                        }
                    } else if record.domain != fqdn::ensure_trailing_dot(root) {
                        return false;
                    }
                }
                _ => {
                    if !values.iter().any(|value| tag_matches(tag, value, record)) {
                        return false;
                    }
                }
            }
        }

        true
    }
}

fn tag_matches(tag: &str, value: &str, record: &Record) -> bool {
    match tag {
        "id" => record.id == value,
        "group" => record.group == value,
        "network" => record.network == value,
        "deployment" => record.deployment == value,
        "g" => record.group_ids.iter().any(|id| id == value),
        "m" => record.instance_index == value,
        "a" => record.az_id == value,
        "n" => record.network_id == value,
        "i" => record.ip == value,
        // The grammar rejects unknown tags before they reach a matcher.
        _ => false,
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod matcher_tests;
