//! Label name / class index mapping
//!
//! A single ordered list where position is the class index, so the two
//! directions of the mapping can never drift apart. Persisted alongside
//! the model as the label-decoder artifact.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlowsightError, Result};

/// Bijective label mapping, position-as-index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCodec {
    labels: Vec<String>,
}

impl LabelCodec {
    /// Build from raw labels: distinct values, sorted for determinism
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> =
            raw.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self {
            labels: distinct.into_iter().collect(),
        }
    }

    /// Build from an already-ordered label list
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of one label
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Label at one class index
    pub fn decode(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Encode raw labels to class indices.
    ///
    /// Any value outside the known set is an error listing every
    /// offender; guessing a mapping would silently corrupt training.
    pub fn encode(&self, raw: &[String]) -> Result<Vec<usize>> {
        let mut unknown = BTreeSet::new();
        let mut encoded = Vec::with_capacity(raw.len());

        for label in raw {
            match self.index_of(label) {
                Some(idx) => encoded.push(idx),
                None => {
                    unknown.insert(label.clone());
                }
            }
        }

        if !unknown.is_empty() {
            return Err(FlowsightError::UnknownLabels(
                unknown.into_iter().collect(),
            ));
        }
        Ok(encoded)
    }

    /// Load from a JSON array-of-strings document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let codec = serde_json::from_reader(BufReader::new(file))?;
        Ok(codec)
    }

    /// Persist as a JSON array-of-strings document
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
