//! Feature engineering over flow records
//!
//! Turns flow summary rows into the numeric table a classifier consumes.
//! High-cardinality identifiers (addresses, raw protocol tag, raw
//! timestamps) never appear in the output so a model learns behavior,
//! not specific hosts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{FlowRecord, TransportProtocol};
use crate::error::{FlowsightError, Result};

/// Denominator floor for rate features when a flow has zero duration
pub const RATE_EPSILON: f64 = 1e-6;

/// Columns produced by [`build_features`], in output (lexicographic) order.
///
/// The set is fixed by this module's logic, not by runtime data: the same
/// input columns always yield the same output layout.
pub const FEATURE_COLUMNS: &[&str] = &[
    "avg_packet_size",
    "bytes_per_sec",
    "dst_high_port",
    "dst_is_dns",
    "dst_is_rdp",
    "dst_is_smb",
    "dst_is_ssh",
    "dst_is_web",
    "dst_port",
    "duration",
    "is_long_flow",
    "is_short_flow",
    "is_tcp",
    "is_udp",
    "packet_count",
    "pkts_per_sec",
    "src_high_port",
    "src_port",
    "total_bytes",
];

/// A small column-ordered numeric table
///
/// One row per flow, one named column per feature. Column order is part
/// of the value: positional consumers (the classifier) rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// A table with no columns and no rows
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// An empty table with the given column layout
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build from pre-assembled rows, validating row widths
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(FlowsightError::ShapeMismatch {
                    expected: columns.len(),
                    got: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build from rows already known to match the column layout
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Append a row; its width must match the column count
    pub fn push_row(&mut self, row: Vec<f64>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(FlowsightError::ShapeMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Single cell lookup
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx])
    }
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Derive model-ready features from flow records.
///
/// Empty input yields a table with zero columns, signaling "nothing to
/// score" to callers. Rate denominators are floored at [`RATE_EPSILON`]
/// so zero-duration flows never divide by zero.
pub fn build_features(flows: &[FlowRecord]) -> FeatureTable {
    if flows.is_empty() {
        return FeatureTable::empty();
    }

    let columns: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
    let mut rows = Vec::with_capacity(flows.len());

    for flow in flows {
        let denom = flow.duration.max(RATE_EPSILON);
        let dst = flow.dst_port;
        let src = flow.src_port;

        let mut row = Vec::with_capacity(FEATURE_COLUMNS.len());
        row.push(flow.avg_packet_size);                                 // avg_packet_size
        row.push(flow.total_bytes as f64 / denom);                      // bytes_per_sec
        row.push(flag(dst >= 1024));                                    // dst_high_port
        row.push(flag(dst == 53));                                      // dst_is_dns
        row.push(flag(dst == 3389));                                    // dst_is_rdp
        row.push(flag(dst == 139 || dst == 445));                       // dst_is_smb
        row.push(flag(dst == 22));                                      // dst_is_ssh
        row.push(flag(dst == 80 || dst == 443 || dst == 8080));         // dst_is_web
        row.push(dst as f64);                                           // dst_port
        row.push(flow.duration);                                        // duration
        row.push(flag(flow.duration > 60.0));                           // is_long_flow
        row.push(flag(flow.duration < 1.0));                            // is_short_flow
        row.push(flag(flow.protocol == TransportProtocol::Tcp));        // is_tcp
        row.push(flag(flow.protocol == TransportProtocol::Udp));        // is_udp
        row.push(flow.packet_count as f64);                             // packet_count
        row.push(flow.packet_count as f64 / denom);                     // pkts_per_sec
        row.push(flag(src >= 1024));                                    // src_high_port
        row.push(src as f64);                                           // src_port
        row.push(flow.total_bytes as f64);                              // total_bytes
        rows.push(row);
    }

    debug!("Built {} feature rows ({} columns)", rows.len(), columns.len());

    FeatureTable { columns, rows }
}
