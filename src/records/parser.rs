// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Schema-on-read parser for the registry file.
//!
//! The registry is a JSON object carrying a `record_keys` column list and
//! `record_infos` row arrays, plus an optional embedded `aliases` block.
//! The envelope is decoded strictly; the cells are not. A structurally valid
//! payload never fails as a whole: each row is validated against the column
//! list on its own, and a bad row is skipped with a [`RowWarning`] while the
//! rest of the payload goes on to become the snapshot.

use crate::aliases::{self, EmbeddedAliasDefinition};
use crate::errors::ParseError;
use crate::fqdn;
use crate::record::Record;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Registry file envelope. Cell validation happens per row, not here.
#[derive(Debug, Deserialize)]
struct RegistryPayload {
    record_keys: Vec<String>,
    #[serde(default)]
    record_infos: Vec<Vec<Value>>,
    #[serde(default)]
    aliases: BTreeMap<String, Vec<EmbeddedAliasDefinition>>,
}

/// Successfully parsed registry payload.
#[derive(Debug, Default)]
pub struct ParsedRegistry {
    /// Records built from the valid rows, in file order.
    pub records: Vec<Record>,
    /// Aliases compiled from the embedded `aliases` block.
    pub embedded_aliases: aliases::Config,
    /// One entry per skipped row.
    pub warnings: Vec<RowWarning>,
}

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWarning {
    /// The row's cell count differs from the column list's length.
    LengthMismatch {
        /// Number of columns declared in `record_keys`
        expected: usize,
        /// Number of cells the row carried
        actual: usize,
        /// Zero-based row index
        row: usize,
    },
    /// A cell held the wrong JSON kind for its column.
    CellType {
        /// Zero-based column index within `record_keys`
        column: usize,
        /// Canonical column name
        name: &'static str,
        /// Zero-based row index
        row: usize,
        /// Kind the column requires
        expected: &'static str,
    },
    /// A required column is absent from `record_keys` entirely.
    MissingColumn {
        /// Canonical column name
        name: &'static str,
        /// Zero-based row index
        row: usize,
    },
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::LengthMismatch {
                expected,
                actual,
                row,
            } => write!(
                f,
                "row {row} has {actual} values, expected {expected}"
            ),
            RowWarning::CellType {
                column,
                name,
                row,
                expected,
            } => write!(
                f,
                "row {row} column {column} ({name}) is not of type {expected}"
            ),
            RowWarning::MissingColumn { name, row } => {
                write!(f, "row {row} is missing required column {name}")
            }
        }
    }
}

// ============================================================================
// Column Layout
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// Must be a JSON string.
    RequiredString,
    /// Must be a JSON string or null; absent and null read as empty.
    OptionalString,
    /// Must be a JSON integer or null; absent and null read as empty.
    OptionalIndex,
    /// Must be an array of strings; absent reads as empty.
    GroupIds,
}

struct Column {
    /// Key as it appears in `record_keys`.
    key: &'static str,
    /// Canonical name used in warnings.
    name: &'static str,
    kind: ColumnKind,
}

const COLUMNS: [Column; 12] = [
    Column { key: "id", name: "id", kind: ColumnKind::RequiredString },
    Column { key: "num_id", name: "num_id", kind: ColumnKind::OptionalString },
    Column { key: "instance_group", name: "group", kind: ColumnKind::RequiredString },
    Column { key: "group_ids", name: "group_ids", kind: ColumnKind::GroupIds },
    Column { key: "az", name: "az", kind: ColumnKind::OptionalString },
    Column { key: "az_id", name: "az_id", kind: ColumnKind::OptionalString },
    Column { key: "network", name: "network", kind: ColumnKind::RequiredString },
    Column { key: "network_id", name: "network_id", kind: ColumnKind::OptionalString },
    Column { key: "deployment", name: "deployment", kind: ColumnKind::RequiredString },
    Column { key: "ip", name: "ip", kind: ColumnKind::RequiredString },
    Column { key: "domain", name: "domain", kind: ColumnKind::RequiredString },
    Column { key: "instance_index", name: "instance_index", kind: ColumnKind::OptionalIndex },
];

/// Parse a registry payload.
///
/// Fails only on envelope problems; see [`RowWarning`] for everything
/// non-fatal.
pub fn parse(raw: &[u8]) -> Result<ParsedRegistry, ParseError> {
    let payload: RegistryPayload = serde_json::from_slice(raw).map_err(ParseError::Payload)?;

    let positions: BTreeMap<&str, usize> = payload
        .record_keys
        .iter()
        .enumerate()
        .map(|(index, key)| (key.as_str(), index))
        .collect();

    let mut records = Vec::with_capacity(payload.record_infos.len());
    let mut warnings = Vec::new();

    for (row_index, row) in payload.record_infos.iter().enumerate() {
        if row.len() != payload.record_keys.len() {
            warnings.push(RowWarning::LengthMismatch {
                expected: payload.record_keys.len(),
                actual: row.len(),
                row: row_index,
            });
            continue;
        }

        match build_record(row, row_index, &positions) {
            Ok(record) => records.push(record),
            Err(warning) => warnings.push(warning),
        }
    }

    Ok(ParsedRegistry {
        records,
        embedded_aliases: aliases::Config::from_embedded(&payload.aliases),
        warnings,
    })
}

fn build_record(
    row: &[Value],
    row_index: usize,
    positions: &BTreeMap<&str, usize>,
) -> Result<Record, RowWarning> {
    let mut record = Record::default();

    for column in &COLUMNS {
        let cell = positions.get(column.key).map(|&index| (index, &row[index]));

        let value = match (column.kind, cell) {
            (ColumnKind::RequiredString, None) => {
                return Err(RowWarning::MissingColumn {
                    name: column.name,
                    row: row_index,
                })
            }
            (ColumnKind::RequiredString, Some((index, cell))) => match cell {
                Value::String(s) => FieldValue::Scalar(s.clone()),
                _ => return Err(cell_type(index, column, row_index, "string")),
            },
            (ColumnKind::OptionalString, None) => FieldValue::Scalar(String::new()),
            (ColumnKind::OptionalString, Some((index, cell))) => match cell {
                Value::String(s) => FieldValue::Scalar(s.clone()),
                Value::Null => FieldValue::Scalar(String::new()),
                _ => return Err(cell_type(index, column, row_index, "string")),
            },
            (ColumnKind::OptionalIndex, None) => FieldValue::Scalar(String::new()),
            (ColumnKind::OptionalIndex, Some((index, cell))) => match cell {
                Value::Null => FieldValue::Scalar(String::new()),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => FieldValue::Scalar(i.to_string()),
                    None => return Err(cell_type(index, column, row_index, "integer")),
                },
                _ => return Err(cell_type(index, column, row_index, "integer")),
            },
            (ColumnKind::GroupIds, None) => FieldValue::List(Vec::new()),
            (ColumnKind::GroupIds, Some((index, cell))) => match cell {
                Value::Array(items) => {
                    let mut ids = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(s) => ids.push(s.clone()),
                            _ => {
                                return Err(cell_type(index, column, row_index, "array of string"))
                            }
                        }
                    }
                    FieldValue::List(ids)
                }
                _ => return Err(cell_type(index, column, row_index, "array of string")),
            },
        };

        match (column.key, value) {
            ("id", FieldValue::Scalar(s)) => record.id = s,
            ("num_id", FieldValue::Scalar(s)) => record.num_id = s,
            ("instance_group", FieldValue::Scalar(s)) => record.group = s,
            ("group_ids", FieldValue::List(ids)) => record.group_ids = ids,
            ("az", FieldValue::Scalar(s)) => record.az = s,
            ("az_id", FieldValue::Scalar(s)) => record.az_id = s,
            ("network", FieldValue::Scalar(s)) => record.network = s,
            ("network_id", FieldValue::Scalar(s)) => record.network_id = s,
            ("deployment", FieldValue::Scalar(s)) => record.deployment = s,
            ("ip", FieldValue::Scalar(s)) => record.ip = s,
            ("domain", FieldValue::Scalar(s)) => record.domain = fqdn::ensure_trailing_dot(&s),
            ("instance_index", FieldValue::Scalar(s)) => record.instance_index = s,
            _ => {}
        }
    }

    Ok(record)
}

enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

fn cell_type(
    column: usize,
    spec: &Column,
    row: usize,
    expected: &'static str,
) -> RowWarning {
    RowWarning::CellType {
        column,
        name: spec.name,
        row,
        expected,
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
