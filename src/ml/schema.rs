//! Training-time feature schema and table alignment
//!
//! A classifier is positional: it knows nothing about column names at
//! inference time, so the feature table handed to it must have exactly
//! the columns it was fit against, in the same order. The schema is
//! frozen when a model is trained and read-only afterwards.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::features::FeatureTable;

/// Ordered list of feature column names frozen at training time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingSchema {
    columns: Vec<String>,
}

impl TrainingSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Load from a JSON array-of-strings document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let schema = serde_json::from_reader(BufReader::new(file))?;
        Ok(schema)
    }

    /// Persist as a JSON array-of-strings document
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Reshape a feature table to exactly match a schema.
///
/// Columns the schema names but the table lacks are inserted filled with
/// 0.0; columns the table carries but the schema does not name are
/// dropped; the survivors are reordered to the schema's order. The
/// output column list is always the schema, verbatim, including for an
/// empty input.
pub fn align(features: &FeatureTable, schema: &TrainingSchema) -> FeatureTable {
    // Where each schema column lives in the input, if anywhere.
    let source_index: Vec<Option<usize>> = schema
        .columns()
        .iter()
        .map(|name| features.column_index(name))
        .collect();

    let missing = source_index.iter().filter(|idx| idx.is_none()).count();
    let extra = features.num_columns() + missing - schema.len();
    if missing > 0 || extra > 0 {
        debug!(
            "Aligning features: {} column(s) filled with defaults, {} dropped",
            missing, extra
        );
    }

    let rows: Vec<Vec<f64>> = features
        .rows()
        .iter()
        .map(|row| {
            source_index
                .iter()
                .map(|idx| idx.map_or(0.0, |i| row[i]))
                .collect()
        })
        .collect();

    FeatureTable::from_parts(schema.columns().to_vec(), rows)
}
