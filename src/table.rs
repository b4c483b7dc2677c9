use std::collections::HashSet;
use std::fmt;

use anyhow::{Result, bail};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use serde::Serialize;

/// A single identifier cell. `Null` joins with `Null`, like an outer merge on
/// missing keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum IdValue {
    Null,
    Int(i64),
    Text(String),
}

impl IdValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    fn csv_cell(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int(value) => value.to_string(),
            Self::Text(value) => escape_csv_cell(value),
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for IdValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for IdValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for IdValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<IdValue>> From<Option<T>> for IdValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl FromSql for IdValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Self::Null),
            ValueRef::Integer(value) => Ok(Self::Int(value)),
            // Spreadsheet-sourced ids sometimes arrive as REAL; only whole numbers are ids.
            ValueRef::Real(value) if value.fract() == 0.0 => Ok(Self::Int(value as i64)),
            ValueRef::Real(_) | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(|text| Self::Text(text.to_string()))
                .map_err(|err| FromSqlError::Other(Box::new(err))),
        }
    }
}

/// A named table of identifier tuples with ordered column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<IdValue>>,
}

impl IdTable {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(
        name: impl Into<String>,
        columns: &[&str],
        rows: impl IntoIterator<Item = Vec<IdValue>>,
    ) -> Result<Self> {
        let mut table = Self::new(name, columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<IdValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<IdValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "row width {} does not match {} columns of table {}",
                row.len(),
                self.columns.len(),
                self.name
            );
        }
        self.rows.push(row);
        Ok(())
    }

    /// Positions of `key_columns` in this table, in key order.
    pub fn key_indices(&self, key_columns: &[&str]) -> Result<Vec<usize>> {
        if key_columns.is_empty() {
            bail!("no key columns given for table {}", self.name);
        }

        key_columns
            .iter()
            .map(|key| {
                self.columns
                    .iter()
                    .position(|column| column == key)
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "key column {key} not found in table {} (columns: {})",
                            self.name,
                            self.columns.join(", ")
                        )
                    })
            })
            .collect()
    }

    pub fn column_values(&self, column: &str) -> Result<Vec<&IdValue>> {
        let index = self.key_indices(&[column])?[0];
        Ok(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Rewrites every text cell of `column`; null and integer cells are kept.
    pub fn map_text(&mut self, column: &str, f: impl Fn(&str) -> String) -> Result<()> {
        let index = self.key_indices(&[column])?[0];
        for row in &mut self.rows {
            if let IdValue::Text(value) = &row[index] {
                row[index] = IdValue::Text(f(value));
            }
        }
        Ok(())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&[IdValue]) -> bool) {
        self.rows.retain(|row| keep(row));
    }

    /// Sorts rows and drops exact duplicates.
    pub fn into_distinct(mut self) -> Self {
        self.rows.sort();
        self.rows.dedup();
        self
    }

    /// Removes every row whose key equals `drop`. Fails when no row matches,
    /// since dropping an absent key would make a canary vacuous.
    pub fn without_key(&self, key_columns: &[&str], drop: &[IdValue]) -> Result<Self> {
        let indices = self.key_indices(key_columns)?;
        if drop.len() != indices.len() {
            bail!(
                "drop key has {} values but {} key columns were given",
                drop.len(),
                indices.len()
            );
        }

        let mut kept = Self::new(self.name.clone(), &[]);
        kept.columns = self.columns.clone();
        kept.rows = self
            .rows
            .iter()
            .filter(|row| key_of(row, &indices) != drop)
            .cloned()
            .collect();

        if kept.len() == self.len() {
            bail!(
                "key ({}) not found in {} on [{}]",
                render_tuple(drop),
                self.name,
                key_columns.join(", ")
            );
        }

        Ok(kept)
    }

    pub fn key_set(&self, key_columns: &[&str]) -> Result<HashSet<Vec<IdValue>>> {
        let indices = self.key_indices(key_columns)?;
        Ok(self.rows.iter().map(|row| key_of(row, &indices)).collect())
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(
            &self
                .columns
                .iter()
                .map(|column| escape_csv_cell(column))
                .collect::<Vec<String>>()
                .join(","),
        );
        out.push('\n');

        for row in &self.rows {
            out.push_str(
                &row.iter()
                    .map(IdValue::csv_cell)
                    .collect::<Vec<String>>()
                    .join(","),
            );
            out.push('\n');
        }

        out
    }
}

pub fn key_of(row: &[IdValue], indices: &[usize]) -> Vec<IdValue> {
    indices.iter().map(|index| row[*index].clone()).collect()
}

pub fn render_tuple(values: &[IdValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

fn escape_csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
