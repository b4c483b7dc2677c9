use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use super::{
    PLANTS_EIA, PLANTS_FERC1, PLANTS_PUDL, UTILITIES_EIA, UTILITIES_FERC1, UTILITIES_FERC1_DBF,
    UTILITIES_FERC1_XBRL, UTILITIES_PUDL,
};
use crate::model::{CrosswalkEntry, EntityKind, SourceSystem};
use crate::table::{IdTable, IdValue, render_tuple};
use crate::util::normalize_plant_name;

const CURATED_TABLES: &[(&str, &[&str])] = &[
    (UTILITIES_PUDL, &["utility_id_pudl", "utility_name_pudl"]),
    (PLANTS_PUDL, &["plant_id_pudl", "plant_name_pudl"]),
    (
        UTILITIES_FERC1,
        &["utility_id_ferc1", "utility_name_ferc1", "utility_id_pudl"],
    ),
    (UTILITIES_FERC1_DBF, &["utility_id_ferc1", "utility_id_ferc1_dbf"]),
    (UTILITIES_FERC1_XBRL, &["utility_id_ferc1", "utility_id_ferc1_xbrl"]),
    (
        PLANTS_FERC1,
        &["utility_id_ferc1", "plant_name_ferc1", "plant_id_pudl"],
    ),
    (
        UTILITIES_EIA,
        &["utility_id_eia", "utility_name_eia", "utility_id_pudl"],
    ),
    (PLANTS_EIA, &["plant_id_eia", "plant_name_eia", "plant_id_pudl"]),
];

/// The curated crosswalk, loaded wholesale and checked for authoring errors.
#[derive(Debug, Clone)]
pub struct CrosswalkStore {
    tables: BTreeMap<&'static str, IdTable>,
}

impl CrosswalkStore {
    pub fn open(path: &Path) -> Result<Self> {
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open crosswalk read-only: {}", path.display()))?;

        Self::load(&connection)
            .with_context(|| format!("failed to load crosswalk from {}", path.display()))
    }

    pub fn load(connection: &Connection) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for (name, columns) in CURATED_TABLES {
            let mut table = load_curated_table(connection, name, columns)?;
            if *name == PLANTS_FERC1 {
                table.map_text("plant_name_ferc1", normalize_plant_name)?;
            }
            debug!(table = %name, rows = table.len(), "loaded curated table");
            tables.insert(*name, table);
        }

        let store = Self { tables };
        store.check_authoring()?;

        info!(
            utilities = store.table(UTILITIES_PUDL).len(),
            plants = store.table(PLANTS_PUDL).len(),
            utility_entries = store.entries(EntityKind::Utility).len(),
            plant_entries = store.entries(EntityKind::Plant).len(),
            "loaded crosswalk"
        );

        Ok(store)
    }

    /// A curated table by name. Every name in the curated layout is present
    /// once the store is loaded.
    pub fn table(&self, name: &str) -> &IdTable {
        &self.tables[name]
    }

    /// Flattened `(canonical_id, source_system, native_key)` triples. FERC
    /// DBF and XBRL utility ids resolve to PUDL ids through `utilities_ferc1`;
    /// rows that cannot be resolved are left to the consistency checks.
    pub fn entries(&self, entity: EntityKind) -> Vec<CrosswalkEntry> {
        let mut entries = Vec::new();
        match entity {
            EntityKind::Utility => {
                let ferc1_to_pudl = self
                    .table(UTILITIES_FERC1)
                    .rows()
                    .iter()
                    .filter_map(|row| Some((row[0].as_int()?, row[2].as_int()?)))
                    .collect::<HashMap<i64, i64>>();

                push_entries(
                    &mut entries,
                    entity,
                    SourceSystem::Ferc1,
                    self.table(UTILITIES_FERC1),
                    |row| Some((row[2].as_int()?, vec![row[0].clone()])),
                );
                for (source, name) in [
                    (SourceSystem::Ferc1Dbf, UTILITIES_FERC1_DBF),
                    (SourceSystem::Ferc1Xbrl, UTILITIES_FERC1_XBRL),
                ] {
                    push_entries(&mut entries, entity, source, self.table(name), |row| {
                        let pudl = ferc1_to_pudl.get(&row[0].as_int()?)?;
                        Some((*pudl, vec![row[1].clone()]))
                    });
                }
                push_entries(
                    &mut entries,
                    entity,
                    SourceSystem::Eia,
                    self.table(UTILITIES_EIA),
                    |row| Some((row[2].as_int()?, vec![row[0].clone()])),
                );
            }
            EntityKind::Plant => {
                push_entries(
                    &mut entries,
                    entity,
                    SourceSystem::Ferc1,
                    self.table(PLANTS_FERC1),
                    |row| Some((row[2].as_int()?, vec![row[0].clone(), row[1].clone()])),
                );
                push_entries(
                    &mut entries,
                    entity,
                    SourceSystem::Eia,
                    self.table(PLANTS_EIA),
                    |row| Some((row[2].as_int()?, vec![row[0].clone()])),
                );
            }
        }
        entries
    }

    fn check_authoring(&self) -> Result<()> {
        let mut problems = Vec::new();

        for entity in [EntityKind::Utility, EntityKind::Plant] {
            let entries = self.entries(entity);

            let mut seen = BTreeSet::new();
            let mut canonical_by_native = BTreeMap::<(SourceSystem, &[IdValue]), BTreeSet<i64>>::new();
            for entry in &entries {
                if !seen.insert(entry) {
                    problems.push(format!(
                        "duplicate {entity} mapping: {} {} ({}) -> {}",
                        entry.source,
                        entity,
                        render_tuple(&entry.native_key),
                        entry.canonical_id
                    ));
                }
                canonical_by_native
                    .entry((entry.source, entry.native_key.as_slice()))
                    .or_default()
                    .insert(entry.canonical_id);
            }

            for ((source, native_key), canonical_ids) in &canonical_by_native {
                if canonical_ids.len() > 1 {
                    problems.push(format!(
                        "{source} {entity} ({}) maps to {} canonical ids: {:?}",
                        render_tuple(native_key),
                        canonical_ids.len(),
                        canonical_ids
                    ));
                }
            }

            let (canonical_table, canonical_column) = match entity {
                EntityKind::Utility => (UTILITIES_PUDL, "utility_id_pudl"),
                EntityKind::Plant => (PLANTS_PUDL, "plant_id_pudl"),
            };
            let referenced = entries
                .iter()
                .map(|entry| entry.canonical_id)
                .collect::<BTreeSet<i64>>();
            for value in self.table(canonical_table).column_values(canonical_column)? {
                match value.as_int() {
                    Some(id) if referenced.contains(&id) => {}
                    Some(id) => problems.push(format!(
                        "{canonical_column} {id} is not referenced by any source {entity}"
                    )),
                    None => problems.push(format!(
                        "{canonical_table} has a non-integer {canonical_column}: {value}"
                    )),
                }
            }
        }

        if !problems.is_empty() {
            bail!(
                "crosswalk has {} authoring error(s):\n  {}",
                problems.len(),
                problems.join("\n  ")
            );
        }

        Ok(())
    }
}

fn push_entries(
    entries: &mut Vec<CrosswalkEntry>,
    entity: EntityKind,
    source: SourceSystem,
    table: &IdTable,
    resolve: impl Fn(&[IdValue]) -> Option<(i64, Vec<IdValue>)>,
) {
    entries.extend(table.rows().iter().filter_map(|row| {
        let (canonical_id, native_key) = resolve(row)?;
        Some(CrosswalkEntry {
            entity,
            canonical_id,
            source,
            native_key,
        })
    }));
}

fn load_curated_table(connection: &Connection, name: &str, columns: &[&str]) -> Result<IdTable> {
    let sql = format!("SELECT {} FROM {name}", columns.join(", "));
    let mut statement = connection
        .prepare(&sql)
        .with_context(|| format!("failed to query curated table {name}"))?;
    let mut rows = statement.query([])?;

    let mut table = IdTable::new(name, columns);
    while let Some(row) = rows.next()? {
        let values = (0..columns.len())
            .map(|index| row.get::<_, IdValue>(index))
            .collect::<rusqlite::Result<Vec<IdValue>>>()
            .with_context(|| format!("failed to read row of curated table {name}"))?;
        table.push_row(values)?;
    }

    Ok(table)
}
