// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Static alias configuration loading.
//!
//! Operators declare aliases in JSON files mapping alias names to target
//! lists:
//!
//! ```json
//! {
//!   "db.internal": ["q-s0.database.prod-network.prod.registry."],
//!   "_.apps": ["_.apps.prod-network.prod.registry."]
//! }
//! ```
//!
//! Files are read once at startup; the merged result is the static half of
//! the alias registry.

use super::Config;
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

impl Config {
    /// Load one alias configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let raw = fs::read(path)
            .with_context(|| format!("reading alias config {}", path.display()))?;
        let map: BTreeMap<String, Vec<String>> = serde_json::from_slice(&raw)
            .with_context(|| format!("decoding alias config {}", path.display()))?;
        Config::from_map(map)
            .with_context(|| format!("validating alias config {}", path.display()))
    }

    /// Load and merge several alias configuration files.
    ///
    /// Files are merged in argument order; a later file's definition of an
    /// alias replaces an earlier one's.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Config> {
        let mut merged = Config::new();
        for path in paths {
            let config = Config::load(path.as_ref())?;
            merged = merged.merge(&config);
        }
        Ok(merged)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
