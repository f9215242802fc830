//! Tag category values with their stage so equal tokens in different stages
//! become different nodes ("A" in Calc1 is not "A" in Calc2).

use std::collections::HashMap;

use crate::error::DataShapeError;
use crate::models::{Cell, ColumnKind, PathTable};

/// Joins a value and its stage name.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Replaces [`DEFAULT_SEPARATOR`] when labels are shown.
pub const DEFAULT_DISPLAY_SEPARATOR: &str = " ";

/// `value` + `separator` + `stage`.
pub fn qualify(value: &str, stage: &str, separator: &str) -> String {
    format!("{}{}{}", value, separator, stage)
}

/// Human-facing form of a qualified label.
pub fn display_label(label: &str, separator: &str, display: &str) -> String {
    if separator.is_empty() {
        return label.to_string();
    }
    label.replace(separator, display)
}

/// Qualify every present value of every categorical stage in place.
///
/// Numeric stages keep their values, so equal numbers in different numeric
/// stages share a node. A mixed stage, or two distinct stage values that
/// qualify to the same label (e.g. "A" in "B_C" and "A_B" in "C"), fail the
/// whole call and leave the table unchanged. Returns the number of stages
/// rewritten.
pub fn qualify_labels(paths: &mut PathTable, separator: &str) -> Result<usize, DataShapeError> {
    if let Some(stage) = paths.stages.iter().find(|s| s.kind == ColumnKind::Mixed) {
        return Err(DataShapeError::MixedColumn(stage.name.clone()));
    }

    let qualified: Vec<Vec<Cell>> = paths
        .paths
        .iter()
        .map(|path| {
            path.cells
                .iter()
                .zip(&paths.stages)
                .map(|(cell, stage)| match (cell, stage.kind) {
                    (Some(value), ColumnKind::Categorical) => Some(qualify(value, &stage.name, separator)),
                    _ => cell.clone(),
                })
                .collect()
        })
        .collect();

    check_collisions(paths, &qualified)?;

    for (path, cells) in paths.paths.iter_mut().zip(qualified) {
        path.cells = cells;
    }

    Ok(paths.stages.iter().filter(|s| s.kind == ColumnKind::Categorical).count())
}

/// Every label must map back to one source: a (stage, value) pair for
/// categorical stages, or a bare value shared by numeric stages.
fn check_collisions(paths: &PathTable, qualified: &[Vec<Cell>]) -> Result<(), DataShapeError> {
    // label -> (identity, stage it was first seen in)
    let mut sources: HashMap<&str, ((Option<usize>, &str), usize)> = HashMap::new();

    for (path, cells) in paths.paths.iter().zip(qualified) {
        for (i, (raw, label)) in path.cells.iter().zip(cells).enumerate() {
            let (Some(raw), Some(label)) = (raw.as_deref(), label.as_deref()) else {
                continue;
            };
            let identity = match paths.stages[i].kind {
                ColumnKind::Numeric => (None, raw),
                _ => (Some(i), raw),
            };

            let (first, first_stage) = *sources.entry(label).or_insert((identity, i));
            if first != identity {
                return Err(DataShapeError::LabelCollision {
                    label: label.to_string(),
                    first: paths.stages[first_stage].name.clone(),
                    second: paths.stages[i].name.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PathRecord, Stage};

    fn stage(name: &str, kind: ColumnKind) -> Stage {
        Stage { name: name.into(), kind }
    }

    fn record(cells: &[Option<&str>], count: usize) -> PathRecord {
        PathRecord {
            cells: cells.iter().map(|c| c.map(str::to_string)).collect(),
            count,
        }
    }

    #[test]
    fn test_qualifies_categorical_stages() {
        let mut paths = PathTable {
            stages: vec![stage("Course1", ColumnKind::Categorical), stage("Course2", ColumnKind::Categorical)],
            paths: vec![record(&[Some("A"), Some("A")], 2), record(&[Some("C"), None], 1)],
        };

        assert_eq!(qualify_labels(&mut paths, "_").unwrap(), 2);

        assert_eq!(paths.paths[0], record(&[Some("A_Course1"), Some("A_Course2")], 2));
        assert_eq!(paths.paths[1], record(&[Some("C_Course1"), None], 1));
    }

    #[test]
    fn test_numeric_stage_untouched() {
        let mut paths = PathTable {
            stages: vec![stage("Grade", ColumnKind::Categorical), stage("Year", ColumnKind::Numeric)],
            paths: vec![record(&[Some("A"), Some("2021")], 1)],
        };

        assert_eq!(qualify_labels(&mut paths, "_").unwrap(), 1);
        assert_eq!(paths.paths[0], record(&[Some("A_Grade"), Some("2021")], 1));
    }

    #[test]
    fn test_mixed_stage_rejected_without_changes() {
        let mut paths = PathTable {
            stages: vec![stage("Grade", ColumnKind::Categorical), stage("Odd", ColumnKind::Mixed)],
            paths: vec![record(&[Some("A"), Some("1")], 1)],
        };
        let before = paths.clone();

        let err = qualify_labels(&mut paths, "_").unwrap_err();
        assert_eq!(err, DataShapeError::MixedColumn("Odd".into()));
        assert_eq!(paths, before);
    }

    #[test]
    fn test_colliding_labels_rejected_without_changes() {
        // "A" + "_" + "B_C" and "A_B" + "_" + "C" are both "A_B_C"
        let mut paths = PathTable {
            stages: vec![stage("B_C", ColumnKind::Categorical), stage("C", ColumnKind::Categorical)],
            paths: vec![record(&[Some("A"), Some("A_B")], 1)],
        };
        let before = paths.clone();

        let err = qualify_labels(&mut paths, "_").unwrap_err();
        assert_eq!(
            err,
            DataShapeError::LabelCollision {
                label: "A_B_C".into(),
                first: "B_C".into(),
                second: "C".into(),
            }
        );
        assert_eq!(paths, before);
    }

    #[test]
    fn test_other_separator_avoids_collision() {
        let mut paths = PathTable {
            stages: vec![stage("B_C", ColumnKind::Categorical), stage("C", ColumnKind::Categorical)],
            paths: vec![record(&[Some("A"), Some("A_B")], 1)],
        };

        assert_eq!(qualify_labels(&mut paths, "@").unwrap(), 2);
        assert_eq!(paths.paths[0], record(&[Some("A@B_C"), Some("A_B@C")], 1));
    }

    #[test]
    fn test_numeric_stages_share_values() {
        let mut paths = PathTable {
            stages: vec![stage("Year1", ColumnKind::Numeric), stage("Year2", ColumnKind::Numeric)],
            paths: vec![record(&[Some("1"), Some("1")], 1)],
        };

        assert_eq!(qualify_labels(&mut paths, "_").unwrap(), 0);
    }

    #[test]
    fn test_categorical_label_clashing_with_numeric_value() {
        // With "e" as separator, "1" in stage "2" reads like the number 1e2
        let mut paths = PathTable {
            stages: vec![stage("2", ColumnKind::Categorical), stage("N", ColumnKind::Numeric)],
            paths: vec![record(&[Some("1"), Some("1e2")], 1)],
        };

        let err = qualify_labels(&mut paths, "e").unwrap_err();
        assert!(matches!(err, DataShapeError::LabelCollision { ref label, .. } if label == "1e2"));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("A_Calc_1", "_", " "), "A Calc 1");
        assert_eq!(display_label("A::Calc1", "::", " / "), "A / Calc1");
        assert_eq!(display_label("A", "", " "), "A");
    }
}
