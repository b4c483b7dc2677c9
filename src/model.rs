use std::fmt;

use serde::Serialize;

use crate::table::IdValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSystem {
    /// PUDL-assigned FERC Form 1 ids shared by both filing formats.
    Ferc1,
    /// Legacy Visual FoxPro filings.
    Ferc1Dbf,
    /// Structured XBRL filings.
    Ferc1Xbrl,
    /// EIA-860/923 survey entities.
    Eia,
}

impl SourceSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ferc1 => "ferc1",
            Self::Ferc1Dbf => "ferc1_dbf",
            Self::Ferc1Xbrl => "ferc1_xbrl",
            Self::Eia => "eia",
        }
    }

    /// Years for which the raw source is loaded and considered valid.
    pub fn working_years(self) -> std::ops::RangeInclusive<i32> {
        match self {
            Self::Ferc1 => 1994..=2023,
            Self::Ferc1Dbf => 1994..=2020,
            Self::Ferc1Xbrl => 2021..=2023,
            Self::Eia => 2001..=2023,
        }
    }
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Utility,
    Plant,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utility => "utility",
            Self::Plant => "plant",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One curated mapping between a canonical id and a source-native key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrosswalkEntry {
    pub entity: EntityKind,
    pub canonical_id: i64,
    pub source: SourceSystem,
    pub native_key: Vec<IdValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlueTableSummary {
    pub name: String,
    pub columns: Vec<String>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlueManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub crosswalk_path: String,
    pub crosswalk_sha256: String,
    pub include_ferc1: bool,
    pub include_eia: bool,
    pub tables: Vec<GlueTableSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRecord {
    pub check_id: String,
    pub kind: String,
    pub left: String,
    pub right: String,
    pub key_columns: Vec<String>,
    pub result: String,
    pub orphan_count: usize,
    pub report_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRunReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub crosswalk_path: String,
    pub crosswalk_sha256: String,
    pub years: Vec<i32>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub checks: Vec<CheckRecord>,
}
