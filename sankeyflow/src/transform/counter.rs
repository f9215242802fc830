//! Collapse a table into its distinct paths.
//!
//! ```text
//! Calc1 Calc2              Calc1 Calc2 Count
//!   A     B                  A     B     2
//!   A     B        →         C     -     1
//!   C     -
//! ```

use std::collections::HashMap;

use crate::models::{Cell, PathRecord, PathTable, Table};

/// Count rows per distinct cell-wise combination.
///
/// Absent equals absent, so rows that differ only in a value are distinct
/// while rows with the same gaps collapse. Output is ordered by descending
/// count, ties kept in first-occurrence order.
pub fn count_paths(table: &Table) -> PathTable {
    let mut positions: HashMap<&[Cell], usize> = HashMap::new();
    let mut paths: Vec<PathRecord> = Vec::new();

    for row in table.rows() {
        match positions.get(row.as_slice()) {
            Some(&i) => paths[i].count += 1,
            None => {
                positions.insert(row.as_slice(), paths.len());
                paths.push(PathRecord { cells: row.clone(), count: 1 });
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal counts
    paths.sort_by(|a, b| b.count.cmp(&a.count));

    PathTable {
        stages: table.stages().to_vec(),
        paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(items: &[Option<&str>]) -> Vec<Cell> {
        items.iter().map(|c| c.map(str::to_string)).collect()
    }

    #[test]
    fn test_counts_duplicates() {
        let table = Table::from_rows(
            &["Course1", "Course2"],
            &[
                vec![Some("A"), Some("B")],
                vec![Some("A"), Some("B")],
                vec![Some("C"), None],
            ],
        )
        .unwrap();

        let paths = count_paths(&table);

        assert_eq!(paths.paths.len(), 2);
        assert_eq!(paths.paths[0], PathRecord { cells: cells(&[Some("A"), Some("B")]), count: 2 });
        assert_eq!(paths.paths[1], PathRecord { cells: cells(&[Some("C"), None]), count: 1 });
        assert_eq!(paths.total_count(), 3);
    }

    #[test]
    fn test_absent_position_matters() {
        let table = Table::from_rows(
            &["S1", "S2"],
            &[vec![Some("A"), None], vec![None, Some("A")], vec![Some("A"), None]],
        )
        .unwrap();

        let paths = count_paths(&table);
        assert_eq!(paths.paths.len(), 2);
        assert_eq!(paths.paths[0].count, 2);
        assert_eq!(paths.paths[0].cells, cells(&[Some("A"), None]));
    }

    #[test]
    fn test_all_absent_row_retained() {
        let table = Table::from_rows(&["S1", "S2"], &[vec![None, None], vec![None, None]]).unwrap();
        let paths = count_paths(&table);

        assert_eq!(paths.paths.len(), 1);
        assert_eq!(paths.paths[0].count, 2);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let table = Table::from_rows(
            &["S"],
            &[vec![Some("X")], vec![Some("Y")], vec![Some("Z")], vec![Some("Z")]],
        )
        .unwrap();

        let order: Vec<_> = count_paths(&table)
            .paths
            .into_iter()
            .map(|p| p.cells[0].clone().unwrap())
            .collect();
        assert_eq!(order, vec!["Z", "X", "Y"]);
    }

    #[test]
    fn test_repeatable() {
        let table = Table::from_rows(
            &["S1", "S2"],
            &[vec![Some("A"), Some("B")], vec![Some("B"), None], vec![Some("A"), Some("C")]],
        )
        .unwrap();

        assert_eq!(count_paths(&table), count_paths(&table));
    }
}
