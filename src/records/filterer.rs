// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Candidate filtering with health-aware selection.
//!
//! A filterer applies a query's tag constraints to the candidate records,
//! then narrows the survivors by the query's health selector against the
//! health oracle's current view. Health verdicts are read once per address
//! per call; the oracle is never round-tripped per record.

use crate::constants::{HEALTH_POLL_INTERVAL, SYNC_HEALTH_CHECK_TIMEOUT};
use crate::criteria::matcher::Matcher;
use crate::criteria::Criteria;
use crate::healthiness::{HealthState, HealthWatcher};
use crate::record::Record;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Narrows candidate records to a query's answers.
#[async_trait]
pub trait Filterer: Send + Sync {
    /// Records satisfying `criteria`, in candidate order.
    async fn filter(&self, criteria: &Criteria, candidates: &[Record]) -> Vec<Record>;
}

/// Produces a [`Filterer`] per resolution.
///
/// `should_track` controls whether records surviving tag matching are
/// registered with the health oracle; resolution tracks, passive filtering
/// does not.
pub trait FiltererFactory: Send + Sync {
    /// Build a filterer for one resolution pass.
    fn new_filterer(&self, should_track: bool) -> Box<dyn Filterer>;
}

/// How the `s` selector narrows survivors by health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HealthStrategy {
    /// Healthy only, falling back to the whole surviving set when nothing
    /// is healthy (`s0`, the default).
    Smart,
    /// Unhealthy only (`s1`).
    Unhealthy,
    /// Healthy only (`s3`).
    Healthy,
    /// Ignore health (`s4`).
    All,
}

impl HealthStrategy {
    /// Strategy selected by the criteria; `None` for unrecognized `s`
    /// values, which match nothing.
    fn from_criteria(criteria: &Criteria) -> Option<HealthStrategy> {
        match criteria.get("s").first().map(String::as_str) {
            None | Some("0") => Some(HealthStrategy::Smart),
            Some("1") => Some(HealthStrategy::Unhealthy),
            Some("3") => Some(HealthStrategy::Healthy),
            Some("4") => Some(HealthStrategy::All),
            Some(_) => None,
        }
    }
}

/// Factory for the standard health-aware filterer.
pub struct HealthFiltererFactory {
    health_watcher: Arc<dyn HealthWatcher>,
    sync_check_timeout: Duration,
}

impl HealthFiltererFactory {
    /// Factory bound to `health_watcher` with the default synchronous-check
    /// timeout.
    #[must_use]
    pub fn new(health_watcher: Arc<dyn HealthWatcher>) -> Self {
        Self::with_timeout(health_watcher, SYNC_HEALTH_CHECK_TIMEOUT)
    }

    /// Factory with an explicit bound on `y1` first-verdict waits.
    #[must_use]
    pub fn with_timeout(health_watcher: Arc<dyn HealthWatcher>, sync_check_timeout: Duration) -> Self {
        Self {
            health_watcher,
            sync_check_timeout,
        }
    }
}

impl FiltererFactory for HealthFiltererFactory {
    fn new_filterer(&self, should_track: bool) -> Box<dyn Filterer> {
        Box::new(HealthFilterer {
            health_watcher: Arc::clone(&self.health_watcher),
            should_track,
            sync_check_timeout: self.sync_check_timeout,
        })
    }
}

/// The standard filterer: tag matching, tracking, health selection.
pub struct HealthFilterer {
    health_watcher: Arc<dyn HealthWatcher>,
    should_track: bool,
    sync_check_timeout: Duration,
}

#[async_trait]
impl Filterer for HealthFilterer {
    async fn filter(&self, criteria: &Criteria, candidates: &[Record]) -> Vec<Record> {
        let surviving: Vec<Record> = candidates
            .iter()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect();
        if surviving.is_empty() {
            return surviving;
        }

        if self.should_track {
            for record in &surviving {
                self.health_watcher.track(&record.ip);
            }
        }

        let Some(strategy) = HealthStrategy::from_criteria(criteria) else {
            return Vec::new();
        };
        if strategy == HealthStrategy::All {
            return surviving;
        }

        // A synchronous initial check only makes sense when this filterer
        // registered the addresses; otherwise no probe is coming.
        if criteria.synchronous_initial_check() && self.should_track {
            self.await_first_verdicts(&surviving).await;
        }

        // one verdict per address for the duration of this call
        let mut verdict_cache: BTreeMap<String, bool> = BTreeMap::new();
        let verdicts: Vec<bool> = surviving
            .iter()
            .map(|record| {
                *verdict_cache.entry(record.ip.clone()).or_insert_with(|| {
                    self.health_watcher.health_state(&record.ip).is_healthy()
                })
            })
            .collect();

        match strategy {
            HealthStrategy::Smart => {
                if verdicts.iter().any(|healthy| *healthy) {
                    select(surviving, &verdicts, true)
                } else {
                    surviving
                }
            }
            HealthStrategy::Healthy => select(surviving, &verdicts, true),
            HealthStrategy::Unhealthy => select(surviving, &verdicts, false),
            HealthStrategy::All => surviving,
        }
    }
}

impl HealthFilterer {
    /// Wait until every surviving address has a first verdict, bounded by
    /// the configured timeout.
    async fn await_first_verdicts(&self, records: &[Record]) {
        let deadline = Instant::now() + self.sync_check_timeout;
        let mut pending: BTreeSet<&str> = records.iter().map(|r| r.ip.as_str()).collect();

        loop {
            pending.retain(|ip| {
                matches!(self.health_watcher.health_state(ip), HealthState::Unknown)
            });
            if pending.is_empty() || Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
    }
}

fn select(records: Vec<Record>, verdicts: &[bool], keep_healthy: bool) -> Vec<Record> {
    records
        .into_iter()
        .zip(verdicts)
        .filter(|(_, healthy)| **healthy == keep_healthy)
        .map(|(record, _)| record)
        .collect()
}

#[cfg(test)]
#[path = "filterer_tests.rs"]
mod filterer_tests;
