//! Referential-integrity checks between two identifier tables.
//!
//! The single operation here is an anti-join: every row of `right` whose key
//! tuple has no match in `left`. It answers "is everything observed in
//! `right` accounted for in `left`". Stale entries that exist only in `left`
//! are a different error class and are never reported.

use anyhow::Result;

use crate::table::{IdTable, IdValue, key_of, render_tuple};

mod report;

pub use self::report::save_missing_ids;

pub const MERGE_INDICATOR_COLUMN: &str = "_merge";
pub const RIGHT_ONLY: &str = "right_only";

/// Right-only key tuples produced by [`missing_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingIds {
    left: String,
    right: String,
    key_columns: Vec<String>,
    rows: Vec<Vec<IdValue>>,
}

impl MissingIds {
    /// Orphaned key tuples, sorted. Duplicates in `right` stay duplicated.
    pub fn rows(&self) -> &[Vec<IdValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Key columns plus the merge indicator, one row per orphan.
    pub fn to_table(&self, name: &str) -> Result<IdTable> {
        let mut columns = self
            .key_columns
            .iter()
            .map(String::as_str)
            .collect::<Vec<&str>>();
        columns.push(MERGE_INDICATOR_COLUMN);

        IdTable::with_rows(
            name,
            &columns,
            self.rows.iter().map(|row| {
                let mut row = row.clone();
                row.push(IdValue::from(RIGHT_ONLY));
                row
            }),
        )
    }

    pub fn describe(&self) -> String {
        let mut message = format!(
            "Found {} [{}] in {} missing from {}:",
            self.rows.len(),
            self.key_columns.join(", "),
            self.right,
            self.left
        );
        for row in &self.rows {
            message.push_str("\n  (");
            message.push_str(&render_tuple(row));
            message.push(')');
        }
        message
    }
}

/// Rows whose `key_columns` tuple appears in `right` but not in `left`.
///
/// Fails only when `key_columns` is empty or names a column absent from
/// either table.
pub fn missing_ids(left: &IdTable, right: &IdTable, key_columns: &[&str]) -> Result<MissingIds> {
    let left_keys = left.key_set(key_columns)?;
    let right_indices = right.key_indices(key_columns)?;

    let mut rows = right
        .rows()
        .iter()
        .map(|row| key_of(row, &right_indices))
        .filter(|key| !left_keys.contains(key))
        .collect::<Vec<Vec<IdValue>>>();
    rows.sort();

    Ok(MissingIds {
        left: left.name().to_string(),
        right: right.name().to_string(),
        key_columns: key_columns.iter().map(|key| key.to_string()).collect(),
        rows,
    })
}
