use std::collections::HashSet;

use crate::error::ReconError;
use crate::model::{Side, Table};

/// Canonical form of a column name: trimmed and lower-cased.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim and lower-case every column name. Row data is untouched.
///
/// Fails with `Schema` if two columns end up with the same name, rather
/// than dropping one of them.
pub fn normalize(table: Table, side: Side) -> Result<Table, ReconError> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(table.columns().len());

    for raw in table.columns() {
        let name = normalize_column_name(raw);
        if !seen.insert(name.clone()) {
            log::warn!("{side} table '{}': column '{raw}' collides as '{name}'", table.name);
            return Err(ReconError::Schema { side, column: name });
        }
        columns.push(name);
    }

    Ok(table.with_renamed_columns(columns))
}
