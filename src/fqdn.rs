// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Small helpers for working with fully-qualified domain names.

/// Append a trailing dot unless the name already has one.
///
/// The record set stores every domain, alias key, and alias host in
/// fully-qualified form, so comparisons are bit-exact.
pub fn ensure_trailing_dot(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Split an FQDN into its first label and the remainder.
///
/// The remainder keeps its trailing dot: `"q-s0.alias2."` becomes
/// `("q-s0", "alias2.")`. A bare label such as `"alias2."` yields an empty
/// remainder.
pub fn split_first_label(fqdn: &str) -> Option<(&str, &str)> {
    let (head, rest) = fqdn.split_once('.')?;
    if head.is_empty() {
        return None;
    }
    Some((head, rest))
}

#[cfg(test)]
#[path = "fqdn_tests.rs"]
mod fqdn_tests;
