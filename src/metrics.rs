// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the record set engine.
//!
//! All metrics carry the `rosterdns_` namespace prefix and live in one
//! registry so an external metrics endpoint can expose them with a single
//! [`render`] call.

use prometheus::{CounterVec, Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

/// Namespace prefix for all record set metrics
const METRICS_NAMESPACE: &str = "rosterdns";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Refresh Metrics
// ============================================================================

/// Total number of registry refresh attempts by outcome
///
/// Labels:
/// - `status`: Outcome (`success`, `error`)
pub static REFRESH_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_refresh_total"),
        "Total number of registry refresh attempts by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of registry rows rejected during parsing
pub static REJECTED_ROWS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rejected_rows_total"),
        "Total number of registry rows rejected during parsing",
    );
    let counter = IntCounter::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Number of records in the current snapshot
pub static RECORDS: LazyLock<IntGauge> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_records"),
        "Number of records in the current snapshot",
    );
    let gauge = IntGauge::with_opts(opts).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Resolution Metrics
// ============================================================================

/// Total number of resolutions by outcome
///
/// Labels:
/// - `status`: Outcome (`success`, `failure`)
pub static RESOLUTIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resolutions_total"),
        "Total number of name resolutions by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Number of live snapshot-change subscribers
pub static SUBSCRIBERS: LazyLock<IntGauge> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_subscribers"),
        "Number of live snapshot-change subscribers",
    );
    let gauge = IntGauge::with_opts(opts).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record the outcome of one refresh attempt.
pub fn record_refresh(status: &str) {
    REFRESH_TOTAL.with_label_values(&[status]).inc();
}

/// Record the outcome of one resolution.
pub fn record_resolution(status: &str) {
    RESOLUTIONS_TOTAL.with_label_values(&[status]).inc();
}

/// Render all registered metrics in the Prometheus text exposition format.
#[must_use]
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder
        .encode(&METRICS_REGISTRY.gather(), &mut buffer)
        .is_err()
    {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
