// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Query-name parsing into filter criteria.
//!
//! An incoming query FQDN encodes what to select: a literal instance name, a
//! `*` wildcard, or a `q-` selector block, optionally followed by group,
//! network, and deployment labels, and terminated by one of the served root
//! domains. Parsing turns the name into a [`Criteria`] map consumed by the
//! filterer.
//!
//! The selector block is a run of `<tag><value>` pairs, e.g. `q-s0m1`:
//! a single-letter tag followed by a `[A-Za-z0-9_-]` value that extends to
//! the next recognized tag letter. Unknown tags are rejected here, at the
//! grammar boundary, so filtering never sees a constraint it cannot apply.

pub mod matcher;

use crate::errors::CriteriaError;
use std::collections::{BTreeMap, BTreeSet};

/// Filter tags recognized in a selector block.
///
/// `s` health selector, `y` initial-health-check mode, `g` link/group id,
/// `m` instance index, `a` availability-zone id, `n` network id, `i` IP.
const TAG_LETTERS: [char; 7] = ['s', 'y', 'g', 'm', 'a', 'n', 'i'];

/// Parsed representation of a query FQDN.
///
/// A tag-keyed multimap. Every criteria contains `fqdn` (the original
/// query) and `domain` (the matched root domain, possibly empty); selector
/// tags and the implicit `id`/`group`/`network`/`deployment` constraints
/// appear as parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    tags: BTreeMap<String, Vec<String>>,
}

impl Criteria {
    /// Parse `fqdn` against the snapshot's served domains.
    ///
    /// The longest known domain suffixing the query becomes its root; with
    /// no match the root is empty and only the first label is interpreted.
    /// With a root, the head segments into one of the known instance forms:
    /// `<query>`, `<query>.<group>`, or
    /// `<query>.<group>.<network>.<deployment>`.
    pub fn new(fqdn: &str, domains: &BTreeSet<String>) -> Result<Criteria, CriteriaError> {
        let root = longest_matching_domain(fqdn, domains);

        let mut criteria = Criteria::default();
        criteria.insert("fqdn", fqdn);
        criteria.insert("domain", &root);

        let head = match root.as_str() {
            "" => fqdn.strip_suffix('.').unwrap_or(fqdn),
            matched => {
                let stripped = fqdn.strip_suffix(matched).unwrap_or("");
                stripped.strip_suffix('.').unwrap_or(stripped)
            }
        };
        if head.is_empty() {
            return Ok(criteria);
        }

        let labels: Vec<&str> = head.split('.').collect();

        match labels[0] {
            "*" => {}
            query if query.starts_with("q-") => {
                parse_selector_block(&query[2..], fqdn, &mut criteria)?;
            }
            instance_id => criteria.insert("id", instance_id),
        }

        // Without a root domain the remainder of the head cannot be
        // segmented reliably; only the first label is interpreted.
        if root.is_empty() {
            return Ok(criteria);
        }

        match labels.len() {
            1 => {}
            2 => parse_middle_label(labels[1], "group", fqdn, &mut criteria)?,
            4 => {
                parse_middle_label(labels[1], "group", fqdn, &mut criteria)?;
                parse_middle_label(labels[2], "network", fqdn, &mut criteria)?;
                parse_middle_label(labels[3], "deployment", fqdn, &mut criteria)?;
            }
            _ => {
                return Err(CriteriaError::MalformedHead {
                    fqdn: fqdn.to_string(),
                })
            }
        }

        Ok(criteria)
    }

    /// Values recorded for `tag`; empty when the tag is absent.
    #[must_use]
    pub fn get(&self, tag: &str) -> &[String] {
        self.tags.get(tag).map_or(&[], Vec::as_slice)
    }

    /// The full tag map.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, Vec<String>> {
        &self.tags
    }

    /// Whether the query asked for a synchronous initial health check (`y1`).
    #[must_use]
    pub fn synchronous_initial_check(&self) -> bool {
        self.get("y").first().is_some_and(|v| v == "1")
    }

    fn insert(&mut self, tag: &str, value: &str) {
        self.tags
            .entry(tag.to_string())
            .or_default()
            .push(value.to_string());
    }
}

impl FromIterator<(String, Vec<String>)> for Criteria {
    /// Assemble criteria directly from tag entries, bypassing the query
    /// grammar. Callers are responsible for using recognized tags.
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Criteria {
            tags: iter.into_iter().collect(),
        }
    }
}

/// A middle label is either another `q-` selector block (`q-g7`) or a
/// literal name for the given constraint.
fn parse_middle_label(
    label: &str,
    name: &str,
    fqdn: &str,
    criteria: &mut Criteria,
) -> Result<(), CriteriaError> {
    if let Some(block) = label.strip_prefix("q-") {
        parse_selector_block(block, fqdn, criteria)
    } else {
        criteria.insert(name, label);
        Ok(())
    }
}

/// State machine over a selector block: tag letter, then a value run that
/// extends to the next recognized tag letter.
fn parse_selector_block(
    block: &str,
    fqdn: &str,
    criteria: &mut Criteria,
) -> Result<(), CriteriaError> {
    let mut chars = block.chars().peekable();

    while let Some(tag) = chars.next() {
        if !TAG_LETTERS.contains(&tag) {
            return Err(CriteriaError::UnknownTag {
                tag,
                fqdn: fqdn.to_string(),
            });
        }

        let mut value = String::new();
        while let Some(&c) = chars.peek() {
            if TAG_LETTERS.contains(&c) {
                break;
            }
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                value.push(c);
                chars.next();
            } else {
                return Err(CriteriaError::InvalidCharacter {
                    tag,
                    found: c,
                    fqdn: fqdn.to_string(),
                });
            }
        }

        if value.is_empty() {
            return Err(CriteriaError::MissingValue {
                tag,
                fqdn: fqdn.to_string(),
            });
        }

        criteria.insert(&tag.to_string(), &value);
    }

    Ok(())
}

/// The longest served domain that suffixes `fqdn` on a label boundary.
fn longest_matching_domain(fqdn: &str, domains: &BTreeSet<String>) -> String {
    domains
        .iter()
        .filter(|domain| fqdn == domain.as_str() || fqdn.ends_with(&format!(".{domain}")))
        .max_by_key(|domain| domain.len())
        .cloned()
        .unwrap_or_default()
}
