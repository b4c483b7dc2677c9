//! Curated PUDL id crosswalk and the glue tables derived from it.

mod assemble;
mod store;

pub use self::assemble::{Glue, assemble};
pub use self::store::CrosswalkStore;

pub const UTILITIES_PUDL: &str = "utilities_pudl";
pub const PLANTS_PUDL: &str = "plants_pudl";
pub const UTILITIES_FERC1: &str = "utilities_ferc1";
pub const UTILITIES_FERC1_DBF: &str = "utilities_ferc1_dbf";
pub const UTILITIES_FERC1_XBRL: &str = "utilities_ferc1_xbrl";
pub const PLANTS_FERC1: &str = "plants_ferc1";
pub const UTILITIES_EIA: &str = "utilities_eia";
pub const PLANTS_EIA: &str = "plants_eia";
pub const UTILITY_PLANT_ASSN: &str = "utility_plant_assn";
