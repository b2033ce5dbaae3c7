// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Instance record value type.
//!
//! A [`Record`] is one row of the platform's instance registry: a single
//! endpoint of a deployed instance, flattened into the columns the registry
//! file carries. Records are parsed leniently (see [`crate::records::parser`])
//! and live inside an immutable snapshot; they are never mutated in place.

/// One instance endpoint from the registry.
///
/// All fields are stored as strings, matching the registry's schema-on-read
/// column layout. `domain` always carries a trailing dot; the parser appends
/// one when the registry omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Instance name (UUID-like). Required.
    pub id: String,
    /// Numeric instance identity; empty when the registry has none.
    pub num_id: String,
    /// Instance group the endpoint belongs to. Required.
    pub group: String,
    /// Link identifiers for group-scoped (`q-g`) queries; may be empty.
    pub group_ids: Vec<String>,
    /// Network name. Required.
    pub network: String,
    /// Network identifier; empty when the registry has none.
    pub network_id: String,
    /// Deployment name. Required.
    pub deployment: String,
    /// Endpoint address, dotted-quad form. Required.
    pub ip: String,
    /// Root domain, always with a trailing dot. Required.
    pub domain: String,
    /// Availability zone name; may be empty.
    pub az: String,
    /// Availability zone identifier; may be empty.
    pub az_id: String,
    /// Decimal index of the instance within its group; may be empty.
    pub instance_index: String,
}
