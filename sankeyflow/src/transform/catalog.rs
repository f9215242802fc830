//! Label discovery and label ↔ index mapping.
//!
//! Labels are collected stage by stage in first-occurrence order, and a label
//! already seen in an earlier stage keeps its first position. A label's index
//! is its position in that list.

use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};

use crate::error::LookupError;
use crate::models::{IndexedPath, IndexedPathTable, PathTable};

/// Bijection between labels and dense node indices `0..len`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelCatalog {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelCatalog {
    /// Discover labels from a (qualified) path table.
    pub fn from_paths(paths: &PathTable) -> Self {
        let mut catalog = Self::default();

        for stage in 0..paths.stages.len() {
            let mut seen_in_stage = HashSet::new();
            for path in &paths.paths {
                if let Some(value) = path.cells[stage].as_deref() {
                    if seen_in_stage.insert(value) {
                        catalog.insert(value);
                    }
                }
            }
        }

        catalog
    }

    fn insert(&mut self, label: &str) {
        if !self.index.contains_key(label) {
            self.index.insert(label.to_string(), self.labels.len());
            self.labels.push(label.to_string());
        }
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

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Copy of `paths` with every value replaced by its index.
    ///
    /// Absent cells stay `None`. A value with no catalog entry is a
    /// [`LookupError`]; it cannot happen for the table the catalog was built
    /// from.
    pub fn index_paths(&self, paths: &PathTable) -> Result<IndexedPathTable, LookupError> {
        let indexed = paths
            .paths
            .iter()
            .map(|path| {
                let nodes = path
                    .cells
                    .iter()
                    .zip(&paths.stages)
                    .map(|(cell, stage)| match cell.as_deref() {
                        None => Ok(None),
                        Some(value) => self.index_of(value).map(Some).ok_or_else(|| LookupError::UnknownLabel {
                            stage: stage.name.clone(),
                            value: value.to_string(),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(IndexedPath { nodes, count: path.count })
            })
            .collect::<Result<Vec<_>, LookupError>>()?;

        Ok(IndexedPathTable { paths: indexed })
    }
}

impl Serialize for LabelCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.labels.serialize(serializer)
    }
}
