// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The record set: snapshot store, refresh worker, and resolution facade.
//!
//! A [`RecordSet`] owns the current [`RecordSnapshot`] behind an atomically
//! swappable pointer. Readers clone the pointer once per call and work
//! against that snapshot throughout, so a concurrent refresh never shows a
//! caller a half-updated view. One background worker listens to the file
//! source's change feed; each successful parse publishes a new snapshot and
//! nudges every subscriber, while failures of any kind leave the current
//! snapshot untouched.

pub mod filterer;
pub mod parser;

use crate::aliases;
use crate::criteria::Criteria;
use crate::errors::ResolutionError;
use crate::file_source::FileSource;
use crate::healthiness::HealthWatcher;
use crate::metrics;
use crate::record::Record;
use anyhow::Context;
use filterer::FiltererFactory;
use parser::RowWarning;
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Immutable aggregate of records, served domains, and merged aliases.
///
/// Published to the store as a whole; never mutated afterwards.
#[derive(Debug)]
pub struct RecordSnapshot {
    /// Records in registry file order.
    pub records: Arc<[Record]>,
    /// Domains this resolver answers for: every record domain plus every
    /// alias host, all fully qualified.
    pub domains: BTreeSet<String>,
    /// Static aliases merged with the payload's embedded aliases.
    pub aliases: aliases::Config,
}

impl RecordSnapshot {
    fn from_parsed(parsed: parser::ParsedRegistry, static_aliases: &aliases::Config) -> Self {
        let merged = static_aliases.merge(&parsed.embedded_aliases);
        let mut domains: BTreeSet<String> = parsed
            .records
            .iter()
            .map(|record| record.domain.clone())
            .collect();
        domains.extend(merged.alias_hosts());
        RecordSnapshot {
            records: parsed.records.into(),
            domains,
            aliases: merged,
        }
    }

    fn empty(static_aliases: &aliases::Config) -> Self {
        Self::from_parsed(parser::ParsedRegistry::default(), static_aliases)
    }
}

/// Continuously refreshed, health-aware view of the instance registry.
pub struct RecordSet {
    snapshot: RwLock<Arc<RecordSnapshot>>,
    subscribers: Mutex<Vec<mpsc::Sender<bool>>>,
    filterer_factory: Arc<dyn FiltererFactory>,
    health_watcher: Arc<dyn HealthWatcher>,
    static_aliases: aliases::Config,
}

impl RecordSet {
    /// Build a record set and start its refresh worker.
    ///
    /// The registry is read once up front. If that first read or parse
    /// fails the set starts empty (and says so at ERROR level); the worker
    /// repairs it on the next change signal. Construction itself never
    /// fails.
    ///
    /// The worker runs until `shutdown` fires, its sender is dropped, or
    /// the file source closes its change feed; all subscriber channels are
    /// closed on the way out.
    pub async fn new(
        file_source: Arc<dyn FileSource>,
        static_aliases: aliases::Config,
        health_watcher: Arc<dyn HealthWatcher>,
        filterer_factory: Arc<dyn FiltererFactory>,
        shutdown: watch::Receiver<()>,
    ) -> Arc<RecordSet> {
        let initial = match load(file_source.as_ref()).await {
            Ok(parsed) => {
                log_row_warnings(&parsed.warnings);
                RecordSnapshot::from_parsed(parsed, &static_aliases)
            }
            Err(err) => {
                error!(
                    error = %err,
                    "initial registry load failed, starting with an empty record set"
                );
                RecordSnapshot::empty(&static_aliases)
            }
        };
        metrics::RECORDS.set(initial.records.len() as i64);

        let record_set = Arc::new(RecordSet {
            snapshot: RwLock::new(Arc::new(initial)),
            subscribers: Mutex::new(Vec::new()),
            filterer_factory,
            health_watcher,
            static_aliases,
        });

        let changes = file_source.subscribe();
        tokio::spawn(refresh_worker(
            Arc::clone(&record_set),
            file_source,
            changes,
            shutdown,
        ));

        record_set
    }

    /// Resolve a name to IP addresses.
    ///
    /// An IP literal answers itself. Anything else is expanded through the
    /// alias registry; each expansion is parsed and filtered against the
    /// same snapshot, and the answers are concatenated in expansion order.
    /// Targets that fail (unparseable query or zero records) are skipped as
    /// long as any target answers; only when every target fails does the
    /// aggregate failure surface.
    pub async fn resolve(&self, name: &str) -> Result<Vec<String>, ResolutionError> {
        if name.parse::<IpAddr>().is_ok() {
            metrics::record_resolution("success");
            return Ok(vec![name.to_string()]);
        }

        let snapshot = self.current();
        let expansions = snapshot.aliases.resolutions(name);
        let filterer = self.filterer_factory.new_filterer(true);

        let mut ips = Vec::new();
        let mut failures = Vec::new();
        for expansion in &expansions {
            if expansion.parse::<IpAddr>().is_ok() {
                ips.push(expansion.clone());
                continue;
            }
            match Criteria::new(expansion, &snapshot.domains) {
                Err(err) => failures.push(err.to_string()),
                Ok(criteria) => {
                    let records = filterer.filter(&criteria, &snapshot.records).await;
                    if records.is_empty() {
                        failures.push(format!("no records found for '{expansion}'"));
                    } else {
                        ips.extend(records.iter().map(|record| record.ip.clone()));
                    }
                }
            }
        }

        if ips.is_empty() && !failures.is_empty() {
            metrics::record_resolution("failure");
            return Err(ResolutionError::AliasResolution {
                details: failures.join(", "),
            });
        }

        metrics::record_resolution("success");
        Ok(ips)
    }

    /// Filter the current records by each query in `names`, concatenated.
    ///
    /// Unparseable names contribute nothing. `should_track` is handed to
    /// the filterer factory: a tracking filterer registers every record
    /// surviving tag matching with the health oracle.
    pub async fn filter(&self, names: &[String], should_track: bool) -> Vec<Record> {
        let snapshot = self.current();
        let filterer = self.filterer_factory.new_filterer(should_track);

        let mut records = Vec::new();
        for name in names {
            let Ok(criteria) = Criteria::new(name, &snapshot.domains) else {
                continue;
            };
            records.extend(filterer.filter(&criteria, &snapshot.records).await);
        }
        records
    }

    /// Expand a name through the current alias registry.
    ///
    /// Returns the alias's targets in declared order, or the name itself
    /// when no alias matches.
    #[must_use]
    pub fn expand_aliases(&self, name: &str) -> Vec<String> {
        self.current().aliases.resolutions(name)
    }

    /// Every domain this resolver currently answers for.
    #[must_use]
    pub fn domains(&self) -> Vec<String> {
        self.current().domains.iter().cloned().collect()
    }

    /// Whether any current record serves `ip`.
    #[must_use]
    pub fn has_ip(&self, ip: &str) -> bool {
        self.current().records.iter().any(|record| record.ip == ip)
    }

    /// The current records, shared and read-only.
    #[must_use]
    pub fn all_records(&self) -> Arc<[Record]> {
        Arc::clone(&self.current().records)
    }

    /// Register for snapshot-change notifications.
    ///
    /// The channel holds a single pending notification; it is a hint that
    /// at least one refresh happened, not a log of refreshes. The channel
    /// closes when the record set shuts down.
    pub fn subscribe(&self) -> mpsc::Receiver<bool> {
        let (tx, rx) = mpsc::channel(crate::constants::SUBSCRIBER_CHANNEL_CAPACITY);
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(tx);
        metrics::SUBSCRIBERS.inc();
        rx
    }

    fn current(&self) -> Arc<RecordSnapshot> {
        Arc::clone(&self.snapshot.read().expect("snapshot lock poisoned"))
    }

    async fn refresh(&self, source: &dyn FileSource) {
        match load(source).await {
            Err(err) => {
                warn!(error = %err, "registry refresh failed, keeping the current snapshot");
                metrics::record_refresh("error");
            }
            Ok(parsed) => {
                log_row_warnings(&parsed.warnings);
                let snapshot = Arc::new(RecordSnapshot::from_parsed(parsed, &self.static_aliases));
                self.publish(snapshot);
                metrics::record_refresh("success");
            }
        }
    }

    /// Swap in a new snapshot, drop health tracking for addresses that
    /// disappeared, and nudge subscribers.
    fn publish(&self, snapshot: Arc<RecordSnapshot>) {
        let previous = {
            let mut current = self.snapshot.write().expect("snapshot lock poisoned");
            std::mem::replace(&mut *current, Arc::clone(&snapshot))
        };

        let live: BTreeSet<&str> = snapshot
            .records
            .iter()
            .map(|record| record.ip.as_str())
            .collect();
        let gone: BTreeSet<&str> = previous
            .records
            .iter()
            .map(|record| record.ip.as_str())
            .filter(|ip| !live.contains(ip))
            .collect();
        for ip in gone {
            self.health_watcher.untrack(ip);
        }

        metrics::RECORDS.set(snapshot.records.len() as i64);
        info!(
            records = snapshot.records.len(),
            domains = snapshot.domains.len(),
            "published record snapshot"
        );

        let subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        for subscriber in subscribers.iter() {
            // best-effort: a full buffer means that subscriber already has
            // a pending notification
            let _ = subscriber.try_send(true);
        }
    }

    fn close_subscribers(&self) {
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .clear();
        metrics::SUBSCRIBERS.set(0);
    }
}

async fn load(source: &dyn FileSource) -> anyhow::Result<parser::ParsedRegistry> {
    let raw = source.get().await.context("reading record registry")?;
    let parsed = parser::parse(&raw).context("decoding record registry")?;
    Ok(parsed)
}

async fn refresh_worker(
    record_set: Arc<RecordSet>,
    file_source: Arc<dyn FileSource>,
    mut changes: mpsc::Receiver<bool>,
    mut shutdown: watch::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("record set shutting down");
                break;
            }
            change = changes.recv() => match change {
                Some(_) => record_set.refresh(file_source.as_ref()).await,
                None => {
                    debug!("registry change feed closed, record set shutting down");
                    break;
                }
            },
        }
    }
    record_set.close_subscribers();
}

fn log_row_warnings(warnings: &[RowWarning]) {
    for warning in warnings {
        match warning {
            RowWarning::LengthMismatch {
                expected,
                actual,
                row,
            } => {
                warn!(
                    expected = *expected,
                    actual = *actual,
                    row = *row,
                    "skipped registry row: value count mismatch"
                );
            }
            RowWarning::CellType {
                column,
                name,
                row,
                expected,
            } => {
                warn!(
                    column = *column,
                    name = *name,
                    row = *row,
                    expected = *expected,
                    "skipped registry row: cell type mismatch"
                );
            }
            RowWarning::MissingColumn { name, row } => {
                warn!(
                    name = *name,
                    row = *row,
                    "skipped registry row: required column missing"
                );
            }
        }
    }
    if !warnings.is_empty() {
        metrics::REJECTED_ROWS_TOTAL.inc_by(warnings.len() as u64);
    }
}
