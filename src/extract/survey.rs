use std::path::PathBuf;

use anyhow::Result;

use super::{RawIdSource, RawLayout, Scope, read_source};
use crate::model::{EntityKind, SourceSystem};
use crate::table::IdTable;

pub const UTIL_IDS_EIA_RAW: &str = "util_ids_eia_raw";
pub const PLANT_IDS_EIA_RAW: &str = "plant_ids_eia_raw";

const EIA_UTILITIES: RawLayout = RawLayout {
    tables: &["utilities_eia860"],
    columns: &["utility_id_eia"],
    output: &["utility_id_eia"],
};

const EIA_PLANTS: RawLayout = RawLayout {
    tables: &["plants_eia860"],
    columns: &["plant_id_eia"],
    output: &["plant_id_eia"],
};

/// Processed EIA-860 annual tables, already keyed by EIA ids.
#[derive(Debug, Clone)]
pub struct SurveySource {
    path: PathBuf,
}

impl SurveySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RawIdSource for SurveySource {
    fn system(&self) -> SourceSystem {
        SourceSystem::Eia
    }

    fn read_scoped_ids(&self, entity: EntityKind, scope: &Scope) -> Result<IdTable> {
        let (name, layout) = match entity {
            EntityKind::Utility => (UTIL_IDS_EIA_RAW, &EIA_UTILITIES),
            EntityKind::Plant => (PLANT_IDS_EIA_RAW, &EIA_PLANTS),
        };
        read_source(&self.path, self.system(), entity, name, layout, scope)
    }
}
