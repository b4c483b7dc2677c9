//! Raw presence sets: native ids physically present in the raw sources.
//!
//! Nothing here is cached. Each call opens its own read-only session, runs
//! the scoped queries and drops the connection before returning.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use tracing::{debug, info};

use crate::model::{EntityKind, SourceSystem};
use crate::table::{IdTable, IdValue};
use crate::util::normalize_plant_name;

mod ferc1;
mod survey;
#[cfg(test)]
mod tests;

pub use self::ferc1::{
    Ferc1DbfSource, Ferc1XbrlSource, PLANTS_FERC1_RAW_DBF, PLANTS_FERC1_RAW_XBRL,
    UTIL_IDS_FERC1_RAW_DBF, UTIL_IDS_FERC1_RAW_XBRL,
};
pub use self::survey::{PLANT_IDS_EIA_RAW, SurveySource, UTIL_IDS_EIA_RAW};

pub const PLANTS_FERC1_RAW: &str = "plants_ferc1_raw";

/// Capability to read the native ids of one raw source for a year scope.
pub trait RawIdSource {
    fn system(&self) -> SourceSystem;

    fn read_scoped_ids(&self, entity: EntityKind, scope: &Scope) -> Result<IdTable>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    AllWorkingYears,
    Years(BTreeSet<i32>),
}

impl Scope {
    /// Parses `--year` values such as `2020` or `2019-2021`. No values means
    /// every working year of whichever source is queried.
    pub fn parse(specs: &[String]) -> Result<Self> {
        if specs.is_empty() {
            return Ok(Self::AllWorkingYears);
        }

        let pattern =
            Regex::new(r"^(\d{4})(?:-(\d{4}))?$").context("failed to compile year regex")?;

        let mut years = BTreeSet::new();
        for spec in specs {
            let captures = pattern
                .captures(spec.trim())
                .with_context(|| format!("invalid year or year range: {spec}"))?;
            let start = captures[1]
                .parse::<i32>()
                .with_context(|| format!("invalid year in {spec}"))?;
            let end = match captures.get(2) {
                Some(end) => end
                    .as_str()
                    .parse::<i32>()
                    .with_context(|| format!("invalid year in {spec}"))?,
                None => start,
            };
            if end < start {
                bail!("year range {spec} ends before it starts");
            }
            years.extend(start..=end);
        }

        Ok(Self::Years(years))
    }

    /// Years to query for `source`. Any requested year outside the source's
    /// working partitions is a configuration error.
    pub fn years_for(&self, source: SourceSystem) -> Result<Vec<i32>> {
        let working = source.working_years();
        match self {
            Self::AllWorkingYears => Ok(working.collect()),
            Self::Years(years) => {
                let unsupported = years
                    .iter()
                    .filter(|year| !working.contains(*year))
                    .collect::<Vec<&i32>>();
                if !unsupported.is_empty() {
                    bail!(
                        "years {:?} are outside the working partitions of {source} ({}-{})",
                        unsupported,
                        working.start(),
                        working.end()
                    );
                }
                Ok(years.iter().copied().collect())
            }
        }
    }

    /// The part of this scope that falls within `source`'s working years, or
    /// `None` when nothing overlaps.
    pub fn restrict_to(&self, source: SourceSystem) -> Option<Self> {
        match self {
            Self::AllWorkingYears => Some(Self::AllWorkingYears),
            Self::Years(years) => {
                let working = source.working_years();
                let overlap = years
                    .iter()
                    .copied()
                    .filter(|year| working.contains(year))
                    .collect::<BTreeSet<i32>>();
                (!overlap.is_empty()).then_some(Self::Years(overlap))
            }
        }
    }

    /// A scope that selects nothing; sources are not opened for it.
    pub fn empty() -> Self {
        Self::Years(BTreeSet::new())
    }

    pub fn explicit_years(&self) -> Vec<i32> {
        match self {
            Self::AllWorkingYears => Vec::new(),
            Self::Years(years) => years.iter().copied().collect(),
        }
    }
}

/// Where one entity's native ids live in a raw source.
pub(crate) struct RawLayout {
    pub tables: &'static [&'static str],
    pub columns: &'static [&'static str],
    pub output: &'static [&'static str],
}

fn open_read_only(path: &Path, source: SourceSystem) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open {source} database read-only: {}", path.display()))
}

pub(crate) fn read_source(
    path: &Path,
    source: SourceSystem,
    entity: EntityKind,
    name: &str,
    layout: &RawLayout,
    scope: &Scope,
) -> Result<IdTable> {
    // Scope is validated before the database is touched.
    let years = scope.years_for(source)?;
    if years.is_empty() {
        debug!(source = %source, entity = %entity, "no years in scope; source not queried");
        return Ok(IdTable::new(name, layout.output));
    }

    let connection = open_read_only(path, source)?;
    let table = read_layout(&connection, name, layout, &years)
        .with_context(|| format!("failed to read raw {entity} ids from {source}"))?;

    info!(
        source = %source,
        entity = %entity,
        years = years.len(),
        ids = table.len(),
        "extracted raw ids"
    );

    Ok(table)
}

/// Distinct native ids from every table of `layout`, restricted to `years`.
/// Plant names are normalized and blank names dropped.
fn read_layout(
    connection: &Connection,
    name: &str,
    layout: &RawLayout,
    years: &[i32],
) -> Result<IdTable> {
    let mut table = IdTable::new(name, layout.output);
    let placeholders = vec!["?"; years.len()].join(", ");
    for raw_table in layout.tables {
        let sql = format!(
            "SELECT DISTINCT {} FROM {raw_table} WHERE report_year IN ({placeholders})",
            layout.columns.join(", ")
        );
        let mut statement = connection
            .prepare(&sql)
            .with_context(|| format!("failed to query raw table {raw_table}"))?;
        let mut rows = statement.query(params_from_iter(years.iter()))?;

        let before = table.len();
        while let Some(row) = rows.next()? {
            let values = (0..layout.columns.len())
                .map(|index| row.get::<_, IdValue>(index))
                .collect::<rusqlite::Result<Vec<IdValue>>>()
                .with_context(|| format!("failed to read row of raw table {raw_table}"))?;
            table.push_row(values)?;
        }
        debug!(raw_table = %raw_table, rows = table.len() - before, "read raw ids");
    }

    if layout.output.contains(&"plant_name_ferc1") {
        table.map_text("plant_name_ferc1", normalize_plant_name)?;
        let name_index = table.key_indices(&["plant_name_ferc1"])?[0];
        table.retain(|row| row[name_index].as_text().is_some_and(|name| !name.is_empty()));
    }

    Ok(table.into_distinct())
}

/// Raw FERC plants of both filing formats keyed by `(utility_id_ferc1,
/// plant_name_ferc1)`. Native respondent ids are translated through the
/// crosswalk, one row per mapped FERC utility; respondents without a mapping
/// keep a null utility id so their plants still surface as orphans.
pub fn raw_plants_ferc1(
    dbf_plants: &IdTable,
    xbrl_plants: &IdTable,
    utilities_ferc1_dbf: &IdTable,
    utilities_ferc1_xbrl: &IdTable,
) -> Result<IdTable> {
    let mut combined = IdTable::new(PLANTS_FERC1_RAW, &["utility_id_ferc1", "plant_name_ferc1"]);

    for (plants, crosswalk, native_column) in [
        (dbf_plants, utilities_ferc1_dbf, "utility_id_ferc1_dbf"),
        (xbrl_plants, utilities_ferc1_xbrl, "utility_id_ferc1_xbrl"),
    ] {
        let crosswalk_indices = crosswalk.key_indices(&[native_column, "utility_id_ferc1"])?;
        let mut native_to_ferc1 = HashMap::<&IdValue, Vec<&IdValue>>::new();
        for row in crosswalk.rows() {
            native_to_ferc1
                .entry(&row[crosswalk_indices[0]])
                .or_default()
                .push(&row[crosswalk_indices[1]]);
        }

        let plant_indices = plants.key_indices(&[native_column, "plant_name_ferc1"])?;
        for row in plants.rows() {
            let plant_name = &row[plant_indices[1]];
            match native_to_ferc1.get(&row[plant_indices[0]]) {
                Some(utility_ids) => {
                    for utility_id_ferc1 in utility_ids {
                        combined
                            .push_row(vec![IdValue::clone(utility_id_ferc1), plant_name.clone()])?;
                    }
                }
                None => combined.push_row(vec![IdValue::Null, plant_name.clone()])?,
            }
        }
    }

    Ok(combined.into_distinct())
}
