// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # rosterdns - Service-Discovery Record Set Engine
//!
//! rosterdns answers DNS questions for instance names within a deployment by
//! consulting a continuously refreshed, locally cached snapshot of the
//! platform's instance registry, applying operator-defined aliases, and
//! narrowing candidates with a per-query selection language covering group
//! membership, availability zone, instance index, and health.
//!
//! ## Overview
//!
//! This library provides the core of the resolver:
//!
//! - Schema-on-read parsing of the registry file into immutable snapshots
//! - A concurrently refreshable snapshot store with subscriber fan-out
//! - A two-level alias registry (static configuration plus definitions
//!   embedded in the registry file)
//! - The `q-` query-filter language and health-aware candidate selection
//!
//! The DNS wire protocol, the health probe transport, and the file watcher
//! are external collaborators reached through the [`file_source::FileSource`]
//! and [`healthiness::HealthWatcher`] contracts.
//!
//! ## Modules
//!
//! - [`records`] - the [`records::RecordSet`] facade, snapshot store, parser,
//!   and filterer
//! - [`aliases`] - alias registry, configuration loading, and expansion
//! - [`criteria`] - query-name parsing and record matching
//! - [`healthiness`] - health oracle contract
//!
//! ## Example
//!
//! ```rust,no_run
//! use rosterdns::aliases;
//! use rosterdns::records::filterer::HealthFiltererFactory;
//! use rosterdns::records::RecordSet;
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! # async fn example(
//! #     file_source: Arc<dyn rosterdns::file_source::FileSource>,
//! #     health_watcher: Arc<dyn rosterdns::healthiness::HealthWatcher>,
//! # ) -> anyhow::Result<()> {
//! let static_aliases = aliases::Config::load(std::path::Path::new("/etc/rosterdns/aliases.json"))?;
//! let factory = Arc::new(HealthFiltererFactory::new(Arc::clone(&health_watcher)));
//! let (_shutdown_tx, shutdown_rx) = watch::channel(());
//!
//! let record_set = RecordSet::new(
//!     file_source,
//!     static_aliases,
//!     health_watcher,
//!     factory,
//!     shutdown_rx,
//! )
//! .await;
//!
//! let ips = record_set.resolve("q-s0.web.prod-network.prod.registry.").await?;
//! # Ok(())
//! # }
//! ```

pub mod aliases;
pub mod constants;
pub mod criteria;
pub mod errors;
pub mod file_source;
pub mod fqdn;
pub mod healthiness;
pub mod metrics;
pub mod record;
pub mod records;
