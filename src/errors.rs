// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the record set engine.
//!
//! This module provides the typed errors the engine surfaces:
//! - Registry payload rejection (top-level schema problems)
//! - Query-filter grammar violations
//! - Alias resolution failures aggregated across targets
//! - Static alias configuration problems
//!
//! Per-row registry problems are deliberately *not* errors; the parser
//! reports them as [`crate::records::parser::RowWarning`] values and keeps
//! the rest of the payload.

use thiserror::Error;

/// The registry payload could not be turned into a snapshot at all.
///
/// Raised only for top-level problems: malformed JSON, a missing or mistyped
/// `record_keys` list, or a malformed embedded alias block. Individual bad
/// rows never produce this error.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The payload did not decode into the registry envelope.
    #[error("unable to decode record registry payload: {0}")]
    Payload(#[source] serde_json::Error),
}

/// A query name failed to parse into filter criteria.
///
/// These errors stay inside the resolve path: a criteria error on one alias
/// target is folded into that target's failure and only becomes visible when
/// every target of the query fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// A selector block contained a letter outside the recognized tag set.
    #[error("unrecognized filter tag '{tag}' in query '{fqdn}'")]
    UnknownTag {
        /// The offending tag letter
        tag: char,
        /// The query being parsed
        fqdn: String,
    },

    /// A recognized tag was not followed by a value.
    #[error("filter tag '{tag}' has no value in query '{fqdn}'")]
    MissingValue {
        /// The tag letter missing its value
        tag: char,
        /// The query being parsed
        fqdn: String,
    },

    /// A filter value contained a character outside `[A-Za-z0-9_-]`.
    #[error("unexpected character '{found}' in value of filter tag '{tag}' in query '{fqdn}'")]
    InvalidCharacter {
        /// The tag whose value was being read
        tag: char,
        /// The rejected character
        found: char,
        /// The query being parsed
        fqdn: String,
    },

    /// The portion of the query before its root domain did not segment into
    /// a known instance form (one, two, or four labels).
    #[error("query '{fqdn}' does not segment into a known instance form")]
    MalformedHead {
        /// The query being parsed
        fqdn: String,
    },
}

/// Resolution produced no answers for any target of a name.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Every expanded alias target failed to yield records. The details list
    /// one entry per failed target.
    #[error("failures occurred when resolving alias domains: {details}")]
    AliasResolution {
        /// Per-target failure descriptions, comma separated
        details: String,
    },
}

/// The static alias configuration was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AliasConfigError {
    /// An alias entry had an empty name.
    #[error("alias name must not be empty")]
    EmptyAliasName,
}
