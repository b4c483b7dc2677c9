use super::*;
use crate::test_support::FixtureDbs;

fn years(values: &[i32]) -> Scope {
    Scope::Years(values.iter().copied().collect())
}

#[test]
fn parse_accepts_single_years_and_ranges() {
    let scope = Scope::parse(&["2019-2021".to_string(), "2023".to_string()])
        .expect("valid year specs");
    assert_eq!(scope, years(&[2019, 2020, 2021, 2023]));
    assert_eq!(Scope::parse(&[]).expect("empty"), Scope::AllWorkingYears);
}

#[test]
fn parse_rejects_malformed_and_reversed_ranges() {
    assert!(Scope::parse(&["20x1".to_string()]).is_err());
    let error = Scope::parse(&["2021-2019".to_string()]).expect_err("reversed range");
    assert!(error.to_string().contains("ends before it starts"));
}

#[test]
fn years_for_rejects_unsupported_partitions() {
    let error = years(&[2020, 2021])
        .years_for(SourceSystem::Ferc1Dbf)
        .expect_err("2021 is not a DBF year");
    assert!(error.to_string().contains("[2021]"), "unexpected error: {error}");
    assert!(error.to_string().contains("ferc1_dbf"));

    let all = Scope::AllWorkingYears
        .years_for(SourceSystem::Ferc1Xbrl)
        .expect("all working years");
    assert_eq!(all, vec![2021, 2022, 2023]);
}

#[test]
fn restrict_to_splits_scope_across_formats() {
    let scope = years(&[2019, 2020, 2021]);
    assert_eq!(
        scope.restrict_to(SourceSystem::Ferc1Dbf),
        Some(years(&[2019, 2020]))
    );
    assert_eq!(scope.restrict_to(SourceSystem::Ferc1Xbrl), Some(years(&[2021])));
    assert_eq!(years(&[2022]).restrict_to(SourceSystem::Ferc1Dbf), None);
}

#[test]
fn dbf_utilities_are_scoped_by_year() {
    let dbs = FixtureDbs::new();
    let source = Ferc1DbfSource::new(&dbs.ferc1_dbf);

    let ids_2019 = source
        .read_scoped_ids(EntityKind::Utility, &years(&[2019]))
        .expect("2019 is a DBF year");
    assert_eq!(ids_2019.name(), UTIL_IDS_FERC1_RAW_DBF);
    assert_eq!(ids_2019.rows(), &[vec![IdValue::Int(145)]]);

    let ids_all = source
        .read_scoped_ids(EntityKind::Utility, &Scope::AllWorkingYears)
        .expect("all years");
    assert_eq!(ids_all.rows(), &[vec![IdValue::Int(8)], vec![IdValue::Int(145)]]);
}

#[test]
fn dbf_plants_are_normalized_deduplicated_and_blank_names_dropped() {
    let dbs = FixtureDbs::new();
    let plants = Ferc1DbfSource::new(&dbs.ferc1_dbf)
        .read_scoped_ids(EntityKind::Plant, &Scope::AllWorkingYears)
        .expect("plants readable");

    assert_eq!(
        plants.rows(),
        &[
            vec![IdValue::Int(8), IdValue::from("barry")],
            vec![IdValue::Int(145), IdValue::from("cherokee")],
            vec![IdValue::Int(145), IdValue::from("comanche")],
        ]
    );
}

#[test]
fn unsupported_scope_fails_before_opening_database() {
    let source = Ferc1XbrlSource::new("/nonexistent/ferc1_xbrl.sqlite");
    let error = source
        .read_scoped_ids(EntityKind::Utility, &years(&[2005]))
        .expect_err("2005 is not an XBRL year");
    assert!(error.to_string().contains("outside the working partitions"));
}

#[test]
fn empty_scope_does_not_open_database() {
    let source = Ferc1XbrlSource::new("/nonexistent/ferc1_xbrl.sqlite");
    let table = source
        .read_scoped_ids(EntityKind::Plant, &Scope::empty())
        .expect("nothing to read");
    assert!(table.is_empty());
    assert_eq!(table.columns().len(), 2);
}

#[test]
fn missing_database_is_an_infrastructure_error() {
    let source = SurveySource::new("/nonexistent/pudl_eia.sqlite");
    let error = source
        .read_scoped_ids(EntityKind::Plant, &Scope::AllWorkingYears)
        .expect_err("database does not exist");
    assert!(error.to_string().contains("failed to open eia database read-only"));
}

#[test]
fn missing_raw_table_propagates() {
    let dbs = FixtureDbs::with_adjustments("", "", "DROP TABLE generating_plant_statistics_410_duration;", "");
    let error = Ferc1XbrlSource::new(&dbs.ferc1_xbrl)
        .read_scoped_ids(EntityKind::Plant, &Scope::AllWorkingYears)
        .expect_err("410 table is gone");
    let chain = format!("{error:#}");
    assert!(chain.contains("generating_plant_statistics_410_duration"), "unexpected error: {chain}");
}

#[test]
fn survey_ids_are_distinct_across_years() {
    let dbs = FixtureDbs::new();
    let utilities = SurveySource::new(&dbs.eia)
        .read_scoped_ids(EntityKind::Utility, &Scope::AllWorkingYears)
        .expect("survey readable");
    assert_eq!(utilities.name(), UTIL_IDS_EIA_RAW);
    assert_eq!(utilities.len(), 3);
}

#[test]
fn raw_plants_ferc1_maps_native_ids_and_keeps_unmapped_as_null() {
    let dbf = IdTable::with_rows(
        PLANTS_FERC1_RAW_DBF,
        &["utility_id_ferc1_dbf", "plant_name_ferc1"],
        vec![
            vec![IdValue::Int(145), IdValue::from("comanche")],
            vec![IdValue::Int(999), IdValue::from("mystery")],
        ],
    )
    .expect("fits");
    let xbrl = IdTable::with_rows(
        PLANTS_FERC1_RAW_XBRL,
        &["utility_id_ferc1_xbrl", "plant_name_ferc1"],
        vec![vec![IdValue::from("C000029"), IdValue::from("comanche")]],
    )
    .expect("fits");
    let crosswalk_dbf = IdTable::with_rows(
        "utilities_ferc1_dbf",
        &["utility_id_ferc1", "utility_id_ferc1_dbf"],
        vec![vec![IdValue::Int(227), IdValue::Int(145)]],
    )
    .expect("fits");
    let crosswalk_xbrl = IdTable::with_rows(
        "utilities_ferc1_xbrl",
        &["utility_id_ferc1", "utility_id_ferc1_xbrl"],
        vec![vec![IdValue::Int(227), IdValue::from("C000029")]],
    )
    .expect("fits");

    let raw = raw_plants_ferc1(&dbf, &xbrl, &crosswalk_dbf, &crosswalk_xbrl).expect("combines");
    assert_eq!(raw.name(), PLANTS_FERC1_RAW);
    assert_eq!(
        raw.rows(),
        &[
            vec![IdValue::Null, IdValue::from("mystery")],
            vec![IdValue::Int(227), IdValue::from("comanche")],
        ]
    );
}

#[test]
fn raw_plants_ferc1_keeps_every_mapped_utility() {
    let dbf = IdTable::with_rows(
        PLANTS_FERC1_RAW_DBF,
        &["utility_id_ferc1_dbf", "plant_name_ferc1"],
        vec![vec![IdValue::Int(145), IdValue::from("comanche")]],
    )
    .expect("fits");
    let xbrl = IdTable::new(PLANTS_FERC1_RAW_XBRL, &["utility_id_ferc1_xbrl", "plant_name_ferc1"]);
    let crosswalk_dbf = IdTable::with_rows(
        "utilities_ferc1_dbf",
        &["utility_id_ferc1", "utility_id_ferc1_dbf"],
        vec![
            vec![IdValue::Int(227), IdValue::Int(145)],
            vec![IdValue::Int(300), IdValue::Int(145)],
        ],
    )
    .expect("fits");
    let crosswalk_xbrl = IdTable::new(
        "utilities_ferc1_xbrl",
        &["utility_id_ferc1", "utility_id_ferc1_xbrl"],
    );

    let raw = raw_plants_ferc1(&dbf, &xbrl, &crosswalk_dbf, &crosswalk_xbrl).expect("combines");
    assert_eq!(
        raw.rows(),
        &[
            vec![IdValue::Int(227), IdValue::from("comanche")],
            vec![IdValue::Int(300), IdValue::from("comanche")],
        ]
    );
}
