//! Merge category values into coarser groups.
//!
//! Each `combine` entry lists its member tokens as characters ("AB" means
//! "A" or "B"); every member cell becomes the paired `group` value. Pairs are
//! applied in order, so a later entry sees the output of earlier ones.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, ConfigurationError};
use crate::models::Table;

/// Paired group specs and their replacement values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    pub combine: Vec<String>,
    pub group: Vec<String>,
}

impl Default for Normalization {
    /// Letter grades: A/B pass as "A", D/F fail as "F".
    fn default() -> Self {
        Self {
            combine: vec!["AB".to_string(), "DF".to_string()],
            group: vec!["A".to_string(), "F".to_string()],
        }
    }
}

impl Normalization {
    pub fn new(combine: Vec<String>, group: Vec<String>) -> ConfigResult<Self> {
        let normalization = Self { combine, group };
        normalization.validate()?;
        Ok(normalization)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.combine.len() != self.group.len() {
            return Err(ConfigurationError::MismatchedGroups {
                combine: self.combine.len(),
                group: self.group.len(),
            });
        }
        Ok(())
    }

    /// Rewrite `table` in place. Returns how many cells changed value.
    pub fn apply(&self, table: &mut Table) -> ConfigResult<usize> {
        combine_categories(table, &self.combine, &self.group)
    }
}

/// Replace every cell that is a member of a `combine` entry with the paired
/// `group` value. Absent and non-member cells are left alone.
///
/// Fails before touching the table when the two lists differ in length.
pub fn combine_categories(table: &mut Table, combine: &[String], group: &[String]) -> ConfigResult<usize> {
    if combine.len() != group.len() {
        return Err(ConfigurationError::MismatchedGroups {
            combine: combine.len(),
            group: group.len(),
        });
    }

    let mut changed = 0;
    table.update_cells(|cell| {
        let Some(value) = cell.as_deref() else {
            return;
        };

        let mut current = value.to_string();
        for (members, replacement) in combine.iter().zip(group) {
            if is_member(&current, members) {
                current = replacement.clone();
            }
        }

        if current != value {
            changed += 1;
            *cell = Some(current);
        }
    });

    Ok(changed)
}

fn is_member(value: &str, members: &str) -> bool {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => members.contains(c),
        _ => false,
    }
}
