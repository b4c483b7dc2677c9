use std::path::PathBuf;

use anyhow::Result;

use super::{RawIdSource, RawLayout, Scope, read_source};
use crate::model::{EntityKind, SourceSystem};
use crate::table::IdTable;

pub const UTIL_IDS_FERC1_RAW_DBF: &str = "util_ids_ferc1_raw_dbf";
pub const UTIL_IDS_FERC1_RAW_XBRL: &str = "util_ids_ferc1_raw_xbrl";
pub const PLANTS_FERC1_RAW_DBF: &str = "plants_ferc1_raw_dbf";
pub const PLANTS_FERC1_RAW_XBRL: &str = "plants_ferc1_raw_xbrl";

const DBF_UTILITIES: RawLayout = RawLayout {
    tables: &["f1_respondent_id"],
    columns: &["respondent_id"],
    output: &["utility_id_ferc1_dbf"],
};

const DBF_PLANTS: RawLayout = RawLayout {
    tables: &["f1_steam", "f1_gnrt_plant", "f1_hydro", "f1_pumped_storage"],
    columns: &["respondent_id", "plant_name"],
    output: &["utility_id_ferc1_dbf", "plant_name_ferc1"],
};

const XBRL_UTILITIES: RawLayout = RawLayout {
    tables: &["identification_001_duration"],
    columns: &["entity_id"],
    output: &["utility_id_ferc1_xbrl"],
};

const XBRL_PLANTS: RawLayout = RawLayout {
    tables: &[
        "steam_electric_generating_plant_statistics_large_plants_402_duration",
        "hydroelectric_generating_plant_statistics_large_plants_406_duration",
        "pumped_storage_generating_plant_statistics_408_duration",
        "generating_plant_statistics_410_duration",
    ],
    columns: &["entity_id", "plant_name_axis"],
    output: &["utility_id_ferc1_xbrl", "plant_name_ferc1"],
};

/// Raw FERC Form 1 database converted from the legacy DBF filings.
#[derive(Debug, Clone)]
pub struct Ferc1DbfSource {
    path: PathBuf,
}

impl Ferc1DbfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RawIdSource for Ferc1DbfSource {
    fn system(&self) -> SourceSystem {
        SourceSystem::Ferc1Dbf
    }

    fn read_scoped_ids(&self, entity: EntityKind, scope: &Scope) -> Result<IdTable> {
        let (name, layout) = match entity {
            EntityKind::Utility => (UTIL_IDS_FERC1_RAW_DBF, &DBF_UTILITIES),
            EntityKind::Plant => (PLANTS_FERC1_RAW_DBF, &DBF_PLANTS),
        };
        read_source(&self.path, self.system(), entity, name, layout, scope)
    }
}

/// Raw FERC Form 1 database extracted from XBRL filings.
#[derive(Debug, Clone)]
pub struct Ferc1XbrlSource {
    path: PathBuf,
}

impl Ferc1XbrlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RawIdSource for Ferc1XbrlSource {
    fn system(&self) -> SourceSystem {
        SourceSystem::Ferc1Xbrl
    }

    fn read_scoped_ids(&self, entity: EntityKind, scope: &Scope) -> Result<IdTable> {
        let (name, layout) = match entity {
            EntityKind::Utility => (UTIL_IDS_FERC1_RAW_XBRL, &XBRL_UTILITIES),
            EntityKind::Plant => (PLANTS_FERC1_RAW_XBRL, &XBRL_PLANTS),
        };
        read_source(&self.path, self.system(), entity, name, layout, scope)
    }
}
