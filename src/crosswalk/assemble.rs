use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{
    CrosswalkStore, PLANTS_EIA, PLANTS_FERC1, PLANTS_PUDL, UTILITIES_EIA, UTILITIES_FERC1,
    UTILITIES_FERC1_DBF, UTILITIES_FERC1_XBRL, UTILITIES_PUDL, UTILITY_PLANT_ASSN,
};
use crate::model::SourceSystem;
use crate::table::{IdTable, IdValue};

/// Named glue tables projected from the crosswalk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glue {
    tables: BTreeMap<String, IdTable>,
}

impl Glue {
    pub fn get(&self, name: &str) -> Option<&IdTable> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &IdTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    fn insert(&mut self, table: IdTable) {
        self.tables.insert(table.name().to_string(), table);
    }
}

/// Projects the crosswalk into glue tables. The PUDL-wide tables are always
/// present; FERC and EIA tables only when requested. A requested source with
/// no crosswalk rows yields empty tables and a warning, never an error.
pub fn assemble(store: &CrosswalkStore, include_ferc1: bool, include_eia: bool) -> Result<Glue> {
    let mut glue = Glue::default();

    glue.insert(store.table(UTILITIES_PUDL).clone().into_distinct());
    glue.insert(store.table(PLANTS_PUDL).clone().into_distinct());

    if include_ferc1 {
        for (source, name) in [
            (SourceSystem::Ferc1, UTILITIES_FERC1),
            (SourceSystem::Ferc1Dbf, UTILITIES_FERC1_DBF),
            (SourceSystem::Ferc1Xbrl, UTILITIES_FERC1_XBRL),
            (SourceSystem::Ferc1, PLANTS_FERC1),
        ] {
            glue.insert(source_table(store, source, name));
        }
        glue.insert(utility_plant_assn(
            store.table(UTILITIES_FERC1),
            store.table(PLANTS_FERC1),
        )?);
    }

    if include_eia {
        for name in [UTILITIES_EIA, PLANTS_EIA] {
            glue.insert(source_table(store, SourceSystem::Eia, name));
        }
    }

    info!(
        tables = glue.len(),
        include_ferc1,
        include_eia,
        "assembled glue tables"
    );

    Ok(glue)
}

fn source_table(store: &CrosswalkStore, source: SourceSystem, name: &str) -> IdTable {
    let table = store.table(name).clone().into_distinct();
    if table.is_empty() {
        warn!(
            source = %source,
            table = %name,
            "no crosswalk entries loaded for source; table is empty"
        );
    }
    table
}

/// PUDL utility/plant pairs implied by the FERC plant mapping.
fn utility_plant_assn(utilities_ferc1: &IdTable, plants_ferc1: &IdTable) -> Result<IdTable> {
    let utility_ids = utilities_ferc1.key_indices(&["utility_id_ferc1", "utility_id_pudl"])?;
    let ferc1_to_pudl = utilities_ferc1
        .rows()
        .iter()
        .filter_map(|row| {
            Some((
                row[utility_ids[0]].as_int()?,
                row[utility_ids[1]].as_int()?,
            ))
        })
        .collect::<HashMap<i64, i64>>();

    let plant_ids = plants_ferc1.key_indices(&["utility_id_ferc1", "plant_id_pudl"])?;
    let pairs = plants_ferc1.rows().iter().filter_map(|row| {
        let utility_id_pudl = ferc1_to_pudl.get(&row[plant_ids[0]].as_int()?)?;
        let plant_id_pudl = row[plant_ids[1]].as_int()?;
        Some(vec![
            IdValue::Int(*utility_id_pudl),
            IdValue::Int(plant_id_pudl),
        ])
    });

    let table = IdTable::with_rows(
        UTILITY_PLANT_ASSN,
        &["utility_id_pudl", "plant_id_pudl"],
        pairs,
    )
    .context("failed to build utility/plant association")?;

    Ok(table.into_distinct())
}
