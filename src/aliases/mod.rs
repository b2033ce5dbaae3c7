// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Alias registry: operator-defined names that expand to target FQDNs.
//!
//! Aliases come from two places. The static configuration is loaded once at
//! startup (see [`Config::load`]); the registry file may additionally embed
//! templated definitions, which are compiled into synthetic `q-` queries and
//! merged over the static set on every successful parse.
//!
//! An alias key is either a literal name or a `_.`-prefixed capture pattern.
//! A capture pattern matches any query whose first label is arbitrary and
//! whose remainder equals the pattern body; the captured label is substituted
//! for each `_` label of the targets, so `_.[body]` aliases can fan a
//! per-instance name out to per-instance queries.

pub mod config;

use crate::errors::AliasConfigError;
use crate::fqdn;
use serde::Deserialize;
use std::collections::BTreeMap;

/// How an alias key matches incoming queries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AliasKey {
    /// Exact fully-qualified alias name.
    Literal(String),
    /// Capture pattern: first query label is wildcarded and substituted for
    /// each `_` label of the targets.
    Capture {
        /// Pattern body (everything after the `_.` marker), fully qualified.
        body: String,
    },
}

impl AliasKey {
    /// Parse a raw alias name into its key form.
    ///
    /// Names are normalized to end with a dot; a leading `_.` marks a
    /// capture pattern.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let name = fqdn::ensure_trailing_dot(raw);
        match name.strip_prefix("_.") {
            Some(body) => AliasKey::Capture {
                body: body.to_string(),
            },
            None => AliasKey::Literal(name),
        }
    }

    /// The top-level name this alias contributes to the served domain set.
    ///
    /// For a capture pattern this is the pattern body, since every query it
    /// matches ends with the body.
    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            AliasKey::Literal(name) => name,
            AliasKey::Capture { body } => body,
        }
    }
}

/// Registry of alias definitions, keyed by [`AliasKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    entries: BTreeMap<AliasKey, Vec<String>>,
}

impl Config {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(alias name, targets)` pairs.
    ///
    /// Targets are stored exactly as given: a target that is an IP literal
    /// must survive untouched, and FQDN targets are expected to already be
    /// fully qualified.
    pub fn from_map<I, S>(map: I) -> Result<Self, AliasConfigError>
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for (name, targets) in map {
            if name.as_ref().is_empty() {
                return Err(AliasConfigError::EmptyAliasName);
            }
            entries.insert(AliasKey::parse(name.as_ref()), targets);
        }
        Ok(Config { entries })
    }

    /// Whether the registry has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another registry over this one; `other` wins on key collision.
    #[must_use]
    pub fn merge(&self, other: &Config) -> Config {
        let mut entries = self.entries.clone();
        for (key, targets) in &other.entries {
            entries.insert(key.clone(), targets.clone());
        }
        Config { entries }
    }

    /// Top-level domains served because of aliases, trailing dot included.
    #[must_use]
    pub fn alias_hosts(&self) -> Vec<String> {
        self.entries.keys().map(|k| k.host().to_string()).collect()
    }

    /// Expand a query name through the registry.
    ///
    /// Lookup order: exact literal match on the normalized name, then a
    /// capture match on everything after the first label. A name no alias
    /// matches echoes back unchanged as a one-element list.
    #[must_use]
    pub fn resolutions(&self, name: &str) -> Vec<String> {
        let normalized = fqdn::ensure_trailing_dot(name);
        if let Some(targets) = self.entries.get(&AliasKey::Literal(normalized.clone())) {
            return targets.clone();
        }

        if let Some((head, rest)) = fqdn::split_first_label(&normalized) {
            if !rest.is_empty() {
                let key = AliasKey::Capture {
                    body: rest.to_string(),
                };
                if let Some(targets) = self.entries.get(&key) {
                    return targets
                        .iter()
                        .map(|target| substitute_capture(target, head))
                        .collect();
                }
            }
        }

        vec![name.to_string()]
    }

    /// Compile a registry from the embedded `aliases` block of a payload.
    #[must_use]
    pub(crate) fn from_embedded(
        embedded: &BTreeMap<String, Vec<EmbeddedAliasDefinition>>,
    ) -> Config {
        let mut entries = BTreeMap::new();
        for (name, definitions) in embedded {
            let key = AliasKey::parse(name);
            let targets = definitions.iter().map(|d| d.compile(&key)).collect();
            entries.insert(key, targets);
        }
        Config { entries }
    }
}

/// Replace every `_` label of `target` with the captured label.
fn substitute_capture(target: &str, captured: &str) -> String {
    target
        .split('.')
        .map(|label| if label == "_" { captured } else { label })
        .collect::<Vec<_>>()
        .join(".")
}

// ============================================================================
// Embedded Alias Definitions
// ============================================================================

/// Health selection an embedded alias bakes into its synthetic query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthFilter {
    /// Healthy instances, falling back to all when none are healthy.
    #[default]
    Smart,
    /// Only healthy instances.
    Healthy,
    /// Only unhealthy instances.
    Unhealthy,
    /// Every instance regardless of health.
    All,
}

impl HealthFilter {
    fn selector(self) -> char {
        match self {
            HealthFilter::Smart => '0',
            HealthFilter::Unhealthy => '1',
            HealthFilter::Healthy => '3',
            HealthFilter::All => '4',
        }
    }
}

/// Whether the first health check on a newly tracked address is awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialHealthCheck {
    /// Resolve immediately, treating unprobed addresses as healthy.
    Asynchronous,
    /// Block resolution until the first verdict (or its timeout).
    Synchronous,
}

/// What the `_` capture of a `_.`-keyed embedded alias stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderType {
    /// The captured label is an instance UUID.
    Uuid,
    /// Any other declared placeholder; carries no selector.
    Other,
}

impl<'de> serde::Deserialize<'de> for PlaceholderType {
    /// Unrecognized placeholder declarations are kept as [`Self::Other`]
    /// rather than rejected; they compile to no selector.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "uuid" => PlaceholderType::Uuid,
            _ => PlaceholderType::Other,
        })
    }
}

/// One templated alias definition embedded in the registry file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddedAliasDefinition {
    /// Link identifier the synthetic query selects on (`q-g<id>`).
    pub group_id: String,
    /// Root domain of the synthetic query.
    pub root_domain: String,
    /// Health selection; defaults to smart.
    #[serde(default)]
    pub health_filter: HealthFilter,
    /// Initial-check mode; omitted from the query unless set explicitly.
    #[serde(default)]
    pub initial_health_check: Option<InitialHealthCheck>,
    /// Placeholder declaration for capture-style keys.
    #[serde(default)]
    pub placeholder_type: Option<PlaceholderType>,
}

impl EmbeddedAliasDefinition {
    /// Compile this definition into its synthetic query target.
    ///
    /// The selector block is assembled in fixed label order: the `m0` uuid
    /// marker (capture keys with `placeholder_type: uuid` only), then the
    /// health selector, then the initial-check selector when declared.
    fn compile(&self, key: &AliasKey) -> String {
        let mut selectors = String::new();
        if matches!(key, AliasKey::Capture { .. })
            && self.placeholder_type == Some(PlaceholderType::Uuid)
        {
            selectors.push_str("m0");
        }
        selectors.push('s');
        selectors.push(self.health_filter.selector());
        if let Some(check) = self.initial_health_check {
            selectors.push('y');
            selectors.push(match check {
                InitialHealthCheck::Asynchronous => '0',
                InitialHealthCheck::Synchronous => '1',
            });
        }

        format!(
            "q-{selectors}.q-g{}.{}",
            self.group_id,
            fqdn::ensure_trailing_dot(&self.root_domain)
        )
    }
}
