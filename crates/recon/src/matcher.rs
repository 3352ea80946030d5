use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::keys::KeyPair;
use crate::model::{Cell, Side, Table};

/// Suffixes for non-key column names present on both sides of the join.
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

/// The three partitions of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// One row per (left, right) pair sharing a key value.
    pub matched: Table,
    /// Left rows whose key value never appears on the right.
    pub unmatched_left: Table,
    /// Right rows whose key value never appears on the left.
    pub unmatched_right: Table,
}

/// Inner join on exact key equality plus the two anti-joins.
///
/// A key value seen `m` times on the left and `n` times on the right yields
/// `m * n` matched rows. The unmatched partitions are set-membership tests
/// against the other side's key values, not leftovers of the join.
pub fn match_tables(left: &Table, right: &Table, keys: &KeyPair) -> Result<MatchResult, ReconError> {
    let left_key = left.require_column(keys.left, Side::Left)?;
    let right_key = right.require_column(keys.right, Side::Right)?;

    let layout = JoinLayout::new(left, right, keys, right_key)?;
    let mut matched = Table::with_columns("Matched", layout.columns.clone());
    let mut unmatched_left = Table::with_columns(left.name.clone(), left.columns().to_vec());
    let mut unmatched_right = Table::with_columns(right.name.clone(), right.columns().to_vec());

    // Right rows by key value, in right-table order
    let mut right_index: HashMap<&Cell, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        right_index.entry(&row[right_key]).or_default().push(i);
    }

    let left_keys: HashSet<&Cell> = left.rows().iter().map(|row| &row[left_key]).collect();

    for left_row in left.rows() {
        match right_index.get(&left_row[left_key]) {
            Some(right_rows) => {
                for &ri in right_rows {
                    matched.push_row(layout.combine(left_row, &right.rows()[ri]));
                }
            }
            None => unmatched_left.push_row(left_row.clone()),
        }
    }

    for right_row in right.rows() {
        if !left_keys.contains(&right_row[right_key]) {
            unmatched_right.push_row(right_row.clone());
        }
    }

    log::debug!(
        "matched on '{}' = '{}': {} matched, {} left-only, {} right-only",
        keys.left,
        keys.right,
        matched.len(),
        unmatched_left.len(),
        unmatched_right.len()
    );

    Ok(MatchResult {
        matched,
        unmatched_left,
        unmatched_right,
    })
}

/// Column layout of the matched partition.
struct JoinLayout {
    columns: Vec<String>,
    /// Right column indices carried into matched rows.
    right_kept: Vec<usize>,
}

impl JoinLayout {
    fn new(left: &Table, right: &Table, keys: &KeyPair, right_key: usize) -> Result<Self, ReconError> {
        // Same-named keys are merged into one column, taken from the left side
        let shared_key = keys.left == keys.right;
        let right_kept: Vec<usize> = (0..right.columns().len())
            .filter(|&i| !(shared_key && i == right_key))
            .collect();

        let left_names: HashSet<&str> = left.columns().iter().map(String::as_str).collect();
        let right_names: HashSet<&str> = right_kept
            .iter()
            .map(|&i| right.columns()[i].as_str())
            .collect();

        let mut columns = Vec::with_capacity(left.columns().len() + right_kept.len());
        for name in left.columns() {
            if right_names.contains(name.as_str()) {
                columns.push(format!("{name}{LEFT_SUFFIX}"));
            } else {
                columns.push(name.clone());
            }
        }
        for &i in &right_kept {
            let name = &right.columns()[i];
            if left_names.contains(name.as_str()) {
                columns.push(format!("{name}{RIGHT_SUFFIX}"));
            } else {
                columns.push(name.clone());
            }
        }

        // A suffixed name can still clash with a real column (e.g. "ref_x")
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ReconError::Schema {
                    side: Side::Right,
                    column: name.clone(),
                });
            }
        }

        Ok(Self { columns, right_kept })
    }

    fn combine(&self, left_row: &[Cell], right_row: &[Cell]) -> Vec<Cell> {
        let mut row = Vec::with_capacity(self.columns.len());
        row.extend_from_slice(left_row);
        row.extend(self.right_kept.iter().map(|&i| right_row[i].clone()));
        row
    }
}
