//! Small, internally consistent crosswalk and raw databases shared by tests.
//!
//! PUDL utility 100 is Public Service Co of Colorado (FERC utility 227, DBF
//! respondent 145, XBRL entity C000029); its Comanche and Cherokee plants are
//! reported in both filing formats. Utility 101 is Alabama Power (FERC 1).
//! Utility 102 only reports to EIA.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

use crate::crosswalk::CrosswalkStore;

pub const CROSSWALK_SQL: &str = "
    CREATE TABLE utilities_pudl (utility_id_pudl INTEGER, utility_name_pudl TEXT);
    CREATE TABLE plants_pudl (plant_id_pudl INTEGER, plant_name_pudl TEXT);
    CREATE TABLE utilities_ferc1 (
      utility_id_ferc1 INTEGER, utility_name_ferc1 TEXT, utility_id_pudl INTEGER
    );
    CREATE TABLE utilities_ferc1_dbf (utility_id_ferc1 INTEGER, utility_id_ferc1_dbf INTEGER);
    CREATE TABLE utilities_ferc1_xbrl (utility_id_ferc1 INTEGER, utility_id_ferc1_xbrl TEXT);
    CREATE TABLE plants_ferc1 (
      utility_id_ferc1 INTEGER, plant_name_ferc1 TEXT, plant_id_pudl INTEGER
    );
    CREATE TABLE utilities_eia (utility_id_eia INTEGER, utility_name_eia TEXT, utility_id_pudl INTEGER);
    CREATE TABLE plants_eia (plant_id_eia INTEGER, plant_name_eia TEXT, plant_id_pudl INTEGER);

    INSERT INTO utilities_pudl VALUES
      (100, 'Public Service Co of Colorado'),
      (101, 'Alabama Power Co'),
      (102, 'Green Mountain Power Corp');
    INSERT INTO plants_pudl VALUES
      (500, 'Comanche'),
      (501, 'Cherokee'),
      (502, 'Barry'),
      (503, 'Searsburg');
    INSERT INTO utilities_ferc1 VALUES
      (227, 'Public Service Company of Colorado', 100),
      (1, 'Alabama Power Company', 101);
    INSERT INTO utilities_ferc1_dbf VALUES (227, 145), (1, 8);
    INSERT INTO utilities_ferc1_xbrl VALUES (227, 'C000029'), (1, 'C000002');
    INSERT INTO plants_ferc1 VALUES
      (227, 'Comanche', 500),
      (227, 'cherokee', 501),
      (1, 'barry', 502);
    INSERT INTO utilities_eia VALUES
      (15466, 'Public Service Co of Colorado', 100),
      (195, 'Alabama Power Co', 101),
      (7601, 'Green Mountain Power Corp', 102);
    INSERT INTO plants_eia VALUES
      (470, 'Comanche', 500),
      (469, 'Cherokee', 501),
      (3, 'Barry', 502),
      (56254, 'Searsburg', 503);
";

pub const FERC1_DBF_SQL: &str = "
    CREATE TABLE f1_respondent_id (respondent_id INTEGER, respondent_name TEXT, report_year INTEGER);
    CREATE TABLE f1_steam (respondent_id INTEGER, plant_name TEXT, report_year INTEGER);
    CREATE TABLE f1_gnrt_plant (respondent_id INTEGER, plant_name TEXT, report_year INTEGER);
    CREATE TABLE f1_hydro (respondent_id INTEGER, plant_name TEXT, report_year INTEGER);
    CREATE TABLE f1_pumped_storage (respondent_id INTEGER, plant_name TEXT, report_year INTEGER);

    INSERT INTO f1_respondent_id VALUES
      (145, 'Public Service Company of Colorado', 2019),
      (145, 'Public Service Company of Colorado', 2020),
      (8, 'Alabama Power Company', 2020);
    INSERT INTO f1_steam VALUES
      (145, 'Comanche ', 2019),
      (145, 'COMANCHE', 2020),
      (8, 'Barry', 2020),
      (8, '', 2020);
    INSERT INTO f1_gnrt_plant VALUES (145, 'Cherokee', 2020);
";

pub const FERC1_XBRL_SQL: &str = "
    CREATE TABLE identification_001_duration (
      entity_id TEXT, respondent_legal_name TEXT, report_year INTEGER
    );
    CREATE TABLE steam_electric_generating_plant_statistics_large_plants_402_duration (
      entity_id TEXT, plant_name_axis TEXT, report_year INTEGER
    );
    CREATE TABLE hydroelectric_generating_plant_statistics_large_plants_406_duration (
      entity_id TEXT, plant_name_axis TEXT, report_year INTEGER
    );
    CREATE TABLE pumped_storage_generating_plant_statistics_408_duration (
      entity_id TEXT, plant_name_axis TEXT, report_year INTEGER
    );
    CREATE TABLE generating_plant_statistics_410_duration (
      entity_id TEXT, plant_name_axis TEXT, report_year INTEGER
    );

    INSERT INTO identification_001_duration VALUES
      ('C000029', 'Public Service Company of Colorado', 2021),
      ('C000002', 'Alabama Power Company', 2021);
    INSERT INTO steam_electric_generating_plant_statistics_large_plants_402_duration VALUES
      ('C000029', 'comanche', 2021),
      ('C000002', 'Barry', 2021);
    INSERT INTO generating_plant_statistics_410_duration VALUES ('C000029', 'Cherokee  ', 2021);
";

pub const SURVEY_SQL: &str = "
    CREATE TABLE utilities_eia860 (utility_id_eia INTEGER, utility_name_eia TEXT, report_year INTEGER);
    CREATE TABLE plants_eia860 (
      plant_id_eia INTEGER, plant_name_eia TEXT, utility_id_eia INTEGER, report_year INTEGER
    );

    INSERT INTO utilities_eia860 VALUES
      (15466, 'Public Service Co of Colorado', 2020),
      (15466, 'Public Service Co of Colorado', 2021),
      (195, 'Alabama Power Co', 2021),
      (7601, 'Green Mountain Power Corp', 2021);
    INSERT INTO plants_eia860 VALUES
      (470, 'Comanche', 15466, 2021),
      (469, 'Cherokee', 15466, 2021),
      (3, 'Barry', 195, 2021),
      (56254, 'Searsburg', 7601, 2021);
";

pub fn crosswalk_connection(extra_sql: &str) -> Connection {
    let connection = Connection::open_in_memory().expect("in-memory DB should open");
    connection
        .execute_batch(CROSSWALK_SQL)
        .expect("crosswalk fixture should load");
    connection
        .execute_batch(extra_sql)
        .expect("fixture adjustments should apply");
    connection
}

pub fn crosswalk_store() -> CrosswalkStore {
    CrosswalkStore::load(&crosswalk_connection("")).expect("fixture crosswalk is consistent")
}

/// File-backed fixture databases, since sources open their files read-only.
pub struct FixtureDbs {
    pub dir: TempDir,
    pub crosswalk: PathBuf,
    pub ferc1_dbf: PathBuf,
    pub ferc1_xbrl: PathBuf,
    pub eia: PathBuf,
}

impl FixtureDbs {
    pub fn new() -> Self {
        Self::with_adjustments("", "", "", "")
    }

    /// Extra SQL run after each fixture seed, in crosswalk/dbf/xbrl/eia order.
    pub fn with_adjustments(crosswalk: &str, dbf: &str, xbrl: &str, eia: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let paths = [
            ("pudl_crosswalk.sqlite", CROSSWALK_SQL, crosswalk),
            ("ferc1_dbf.sqlite", FERC1_DBF_SQL, dbf),
            ("ferc1_xbrl.sqlite", FERC1_XBRL_SQL, xbrl),
            ("pudl_eia.sqlite", SURVEY_SQL, eia),
        ]
        .map(|(file, seed, extra)| write_db(dir.path(), file, seed, extra));

        let [crosswalk, ferc1_dbf, ferc1_xbrl, eia] = paths;
        Self {
            dir,
            crosswalk,
            ferc1_dbf,
            ferc1_xbrl,
            eia,
        }
    }
}

fn write_db(dir: &Path, file: &str, seed: &str, extra: &str) -> PathBuf {
    let path = dir.join(file);
    let connection = Connection::open(&path).expect("fixture DB should open");
    connection.execute_batch(seed).expect("fixture seed should load");
    connection
        .execute_batch(extra)
        .expect("fixture adjustments should apply");
    path
}
