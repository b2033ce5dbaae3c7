// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the record set engine.

use std::time::Duration;

// ============================================================================
// Subscriber Fan-out
// ============================================================================

/// Buffer size of each subscriber's change channel.
///
/// The change notification is a hint, not a log; one buffered slot is enough
/// for a subscriber to learn that at least one refresh happened since it last
/// looked.
pub const SUBSCRIBER_CHANNEL_CAPACITY: usize = 1;

// ============================================================================
// Health Checking
// ============================================================================

/// How long a filterer performing a synchronous initial health check (`y1`)
/// waits for the oracle's first verdict on newly tracked addresses.
pub const SYNC_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval while waiting out a synchronous initial health check.
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(50);
