//! Domain models for the sankeyflow pipeline.
//!
//! - [`Table`] - Raw stage-by-stage records with a kind tag per stage
//! - [`PathTable`] - Distinct paths with their occurrence counts
//! - [`IndexedPathTable`] - Paths rewritten as label catalog indices
//! - [`Edge`] - Weighted source → target link between two nodes

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::error::DataShapeError;

/// A table cell: a category token, or `None` for the absent marker.
pub type Cell = Option<String>;

/// Name of the appended weight column in exported path tables.
pub const COUNT_FIELD: &str = "Count";

// =============================================================================
// Column Kind
// =============================================================================

/// What the present values of a stage look like.
///
/// Computed whenever a [`Table`] is built or mutated, never guessed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Category tokens only (or no values at all).
    Categorical,
    /// Every present value is a finite number.
    Numeric,
    /// Both tokens and numbers.
    Mixed,
}

impl ColumnKind {
    /// Classify a stage from its present values.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut numeric = false;
        let mut categorical = false;

        for value in values {
            if is_numeric(value) {
                numeric = true;
            } else {
                categorical = true;
            }
            if numeric && categorical {
                return ColumnKind::Mixed;
            }
        }

        if numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

// =============================================================================
// Stage
// =============================================================================

/// One ordered position in a path (a table column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub kind: ColumnKind,
}

fn stages_with_kinds(names: Vec<String>, rows: &[Vec<Cell>]) -> Vec<Stage> {
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let kind = ColumnKind::infer(rows.iter().filter_map(|row| row[i].as_deref()));
            Stage { name, kind }
        })
        .collect()
}

fn check_shape(names: &[String], rows: &[Vec<Cell>]) -> Result<(), DataShapeError> {
    if names.is_empty() {
        return Err(DataShapeError::NoStages);
    }

    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(DataShapeError::DuplicateStage(name.clone()));
        }
    }

    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != names.len() {
            return Err(DataShapeError::RaggedRow {
                row,
                expected: names.len(),
                found: cells.len(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Table
// =============================================================================

/// Raw records: one row per individual, one cell per stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    stages: Vec<Stage>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, tagging every stage with its [`ColumnKind`].
    pub fn new(stage_names: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, DataShapeError> {
        check_shape(&stage_names, &rows)?;
        let stages = stages_with_kinds(stage_names, &rows);
        Ok(Self { stages, rows })
    }

    /// Convenience constructor from string slices, `None` meaning absent.
    pub fn from_rows(stage_names: &[&str], rows: &[Vec<Option<&str>>]) -> Result<Self, DataShapeError> {
        Self::new(
            stage_names.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        )
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Apply `f` to every cell, then recompute stage kinds.
    pub fn update_cells(&mut self, mut f: impl FnMut(&mut Cell)) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                f(cell);
            }
        }
        self.refresh_kinds();
    }

    fn refresh_kinds(&mut self) {
        for (i, stage) in self.stages.iter_mut().enumerate() {
            stage.kind = ColumnKind::infer(self.rows.iter().filter_map(|row| row[i].as_deref()));
        }
    }
}

// =============================================================================
// Path Table
// =============================================================================

/// One distinct path through the stages and how many rows took it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathRecord {
    pub cells: Vec<Cell>,
    pub count: usize,
}

impl PathRecord {
    /// Present values in stage order.
    pub fn present(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().filter_map(|c| c.as_deref())
    }
}

/// Distinct paths of a [`Table`], each with a count of at least one.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTable {
    pub stages: Vec<Stage>,
    pub paths: Vec<PathRecord>,
}

impl PathTable {
    /// Total number of original rows the table stands for.
    pub fn total_count(&self) -> usize {
        self.paths.iter().map(|p| p.count).sum()
    }

    /// Export as JSON objects keyed by stage name, plus `Count`.
    ///
    /// Absent cells become `null`.
    pub fn to_records(&self) -> Vec<Value> {
        self.paths
            .iter()
            .map(|path| {
                let mut obj = Map::new();
                for (stage, cell) in self.stages.iter().zip(&path.cells) {
                    obj.insert(stage.name.clone(), json!(cell));
                }
                obj.insert(COUNT_FIELD.to_string(), json!(path.count));
                Value::Object(obj)
            })
            .collect()
    }
}

// =============================================================================
// Indexed Paths
// =============================================================================

/// A path whose values were replaced by label catalog indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPath {
    /// One slot per stage; `None` where the path has no value.
    pub nodes: Vec<Option<usize>>,
    pub count: usize,
}

impl IndexedPath {
    /// Node indices present on this path, in stage order.
    pub fn present(&self) -> Vec<usize> {
        self.nodes.iter().flatten().copied().collect()
    }
}

/// Indexed copy of a [`PathTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPathTable {
    pub paths: Vec<IndexedPath>,
}

// =============================================================================
// Edge
// =============================================================================

/// Weighted link between two stage-adjacent nodes of one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub value: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_inference() {
        assert_eq!(ColumnKind::infer(["A", "B"]), ColumnKind::Categorical);
        assert_eq!(ColumnKind::infer(["1", "2.5", " 3 "]), ColumnKind::Numeric);
        assert_eq!(ColumnKind::infer(["A", "2"]), ColumnKind::Mixed);
        assert_eq!(ColumnKind::infer(std::iter::empty()), ColumnKind::Categorical);
    }

    #[test]
    fn test_non_finite_tokens_are_categorical() {
        assert_eq!(ColumnKind::infer(["inf", "NaN"]), ColumnKind::Categorical);
    }

    #[test]
    fn test_table_tags_stages() {
        let table = Table::from_rows(
            &["Grade", "Year", "Empty"],
            &[
                vec![Some("A"), Some("2020"), None],
                vec![Some("B"), Some("2021"), None],
            ],
        )
        .unwrap();

        let kinds: Vec<_> = table.stages().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![ColumnKind::Categorical, ColumnKind::Numeric, ColumnKind::Categorical]);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = Table::from_rows(&["A", "B"], &[vec![Some("x")]]).unwrap_err();
        assert_eq!(err, DataShapeError::RaggedRow { row: 0, expected: 2, found: 1 });
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let err = Table::from_rows(&["A", "A"], &[]).unwrap_err();
        assert_eq!(err, DataShapeError::DuplicateStage("A".into()));
    }

    #[test]
    fn test_update_cells_refreshes_kinds() {
        let mut table = Table::from_rows(&["S"], &[vec![Some("A")], vec![Some("B")]]).unwrap();
        table.update_cells(|cell| *cell = Some("4".into()));
        assert_eq!(table.stages()[0].kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_path_table_records() {
        let paths = PathTable {
            stages: vec![
                Stage { name: "C1".into(), kind: ColumnKind::Categorical },
                Stage { name: "C2".into(), kind: ColumnKind::Categorical },
            ],
            paths: vec![PathRecord { cells: vec![Some("A".into()), None], count: 3 }],
        };

        let records = paths.to_records();
        assert_eq!(records[0]["C1"], "A");
        assert!(records[0]["C2"].is_null());
        assert_eq!(records[0]["Count"], 3);
        assert_eq!(paths.total_count(), 3);
    }
}
