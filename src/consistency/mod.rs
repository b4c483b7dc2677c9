//! Relationships across the id graph that must have zero orphans.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};

use crate::crosswalk::{
    PLANTS_EIA, PLANTS_FERC1, PLANTS_PUDL, UTILITIES_EIA, UTILITIES_FERC1, UTILITIES_FERC1_DBF,
    UTILITIES_FERC1_XBRL, UTILITIES_PUDL, UTILITY_PLANT_ASSN,
};
use crate::extract::{
    PLANT_IDS_EIA_RAW, PLANTS_FERC1_RAW, UTIL_IDS_EIA_RAW, UTIL_IDS_FERC1_RAW_DBF,
    UTIL_IDS_FERC1_RAW_XBRL,
};
use crate::integrity::{MissingIds, missing_ids, save_missing_ids};
use crate::table::{IdValue, render_tuple};

mod context;

pub use self::context::{ContextOptions, GlueContext};

/// `right` must be fully accounted for in `left` on `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub id: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    pub key: &'static [&'static str],
}

pub const RELATIONSHIPS: &[Relationship] = &[
    Relationship {
        id: "validate_utility_id_pudl_in_utilities_ferc1",
        left: UTILITIES_PUDL,
        right: UTILITIES_FERC1,
        key: &["utility_id_pudl"],
    },
    Relationship {
        id: "validate_utility_id_ferc1_in_utilities_ferc1_dbf",
        left: UTILITIES_FERC1,
        right: UTILITIES_FERC1_DBF,
        key: &["utility_id_ferc1"],
    },
    Relationship {
        id: "validate_utility_id_ferc1_in_utilities_ferc1_xbrl",
        left: UTILITIES_FERC1,
        right: UTILITIES_FERC1_XBRL,
        key: &["utility_id_ferc1"],
    },
    Relationship {
        id: "validate_utility_id_ferc1_in_plants_ferc1",
        left: UTILITIES_FERC1,
        right: PLANTS_FERC1,
        key: &["utility_id_ferc1"],
    },
    Relationship {
        id: "check_for_unmapped_utility_id_ferc1_xbrl_in_raw_xbrl",
        left: UTILITIES_FERC1_XBRL,
        right: UTIL_IDS_FERC1_RAW_XBRL,
        key: &["utility_id_ferc1_xbrl"],
    },
    Relationship {
        id: "check_for_unmapped_utility_id_ferc1_dbf_in_raw_dbf",
        left: UTILITIES_FERC1_DBF,
        right: UTIL_IDS_FERC1_RAW_DBF,
        key: &["utility_id_ferc1_dbf"],
    },
    Relationship {
        id: "validate_plant_id_pudl_in_plants_ferc1",
        left: PLANTS_PUDL,
        right: PLANTS_FERC1,
        key: &["plant_id_pudl"],
    },
    // Plant names are not globally unique; the composite key is deliberate.
    Relationship {
        id: "check_for_unmapped_plants_in_plants_ferc1",
        left: PLANTS_FERC1,
        right: PLANTS_FERC1_RAW,
        key: &["utility_id_ferc1", "plant_name_ferc1"],
    },
    Relationship {
        id: "validate_utility_id_pudl_in_utilities_eia",
        left: UTILITIES_PUDL,
        right: UTILITIES_EIA,
        key: &["utility_id_pudl"],
    },
    Relationship {
        id: "validate_plant_id_pudl_in_plants_eia",
        left: PLANTS_PUDL,
        right: PLANTS_EIA,
        key: &["plant_id_pudl"],
    },
    Relationship {
        id: "validate_plant_id_pudl_in_utility_plant_assn",
        left: PLANTS_PUDL,
        right: UTILITY_PLANT_ASSN,
        key: &["plant_id_pudl"],
    },
    Relationship {
        id: "validate_utility_id_pudl_in_utility_plant_assn",
        left: UTILITIES_PUDL,
        right: UTILITY_PLANT_ASSN,
        key: &["utility_id_pudl"],
    },
    Relationship {
        id: "check_for_unmapped_plants_eia",
        left: PLANTS_EIA,
        right: PLANT_IDS_EIA_RAW,
        key: &["plant_id_eia"],
    },
    Relationship {
        id: "check_for_unmapped_utilities_eia",
        left: UTILITIES_EIA,
        right: UTIL_IDS_EIA_RAW,
        key: &["utility_id_eia"],
    },
];

pub fn find_relationship(id: &str) -> Result<&'static Relationship> {
    RELATIONSHIPS
        .iter()
        .find(|relationship| relationship.id == id)
        .with_context(|| format!("unknown relationship: {id}"))
}

/// Drop one known-good key from `left` and expect exactly one orphan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canary {
    pub check_id: &'static str,
    pub drop: Vec<IdValue>,
}

pub fn default_canaries() -> Vec<Canary> {
    vec![
        Canary {
            check_id: "check_for_unmapped_plants_in_plants_ferc1",
            drop: vec![IdValue::Int(227), IdValue::from("comanche")],
        },
        Canary {
            check_id: "validate_utility_id_ferc1_in_utilities_ferc1_xbrl",
            drop: vec![IdValue::Int(227)],
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub relationship: Relationship,
    pub canary: Option<Vec<IdValue>>,
    pub status: CheckStatus,
    pub missing: Option<MissingIds>,
    pub report_path: Option<PathBuf>,
}

impl CheckOutcome {
    pub fn name(&self) -> String {
        match &self.canary {
            Some(drop) => format!("{}_minus_({})", self.relationship.id, render_tuple(drop)),
            None => self.relationship.id.to_string(),
        }
    }

    pub fn orphan_count(&self) -> usize {
        self.missing.as_ref().map(MissingIds::len).unwrap_or(0)
    }

    /// Assertion-style failure carrying every orphaned key tuple.
    pub fn ensure_passed(&self) -> Result<()> {
        if self.status != CheckStatus::Failed {
            return Ok(());
        }

        let detail = self
            .missing
            .as_ref()
            .map(MissingIds::describe)
            .unwrap_or_default();
        match &self.canary {
            Some(_) => bail!(
                "{}: found {} [{}] but expected 1\n{detail}",
                self.name(),
                self.orphan_count(),
                self.relationship.key.join(", ")
            ),
            None => bail!("{}: {detail}", self.name()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuiteOptions {
    pub save_unmapped_ids: Option<PathBuf>,
    pub with_canaries: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl SuiteReport {
    pub fn count(&self, status: CheckStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    /// Fails naming every failed check and its orphans.
    pub fn ensure_passed(&self) -> Result<()> {
        let failures = self
            .outcomes
            .iter()
            .filter_map(|outcome| outcome.ensure_passed().err())
            .map(|err| err.to_string())
            .collect::<Vec<String>>();

        if !failures.is_empty() {
            bail!(
                "{} glue check(s) failed:\n{}",
                failures.len(),
                failures.join("\n")
            );
        }

        Ok(())
    }
}

pub fn run_relationship(context: &GlueContext, relationship: &Relationship) -> Result<CheckOutcome> {
    let Some((left, right)) = context.pair(relationship) else {
        return Ok(skipped(relationship, None));
    };

    let missing = missing_ids(left, right, relationship.key)
        .with_context(|| format!("check {} could not run", relationship.id))?;
    let status = if missing.is_empty() {
        CheckStatus::Passed
    } else {
        CheckStatus::Failed
    };

    Ok(CheckOutcome {
        relationship: *relationship,
        canary: None,
        status,
        missing: Some(missing),
        report_path: None,
    })
}

pub fn run_canary(context: &GlueContext, canary: &Canary) -> Result<CheckOutcome> {
    let relationship = find_relationship(canary.check_id)?;
    let Some((left, right)) = context.pair(relationship) else {
        return Ok(skipped(relationship, Some(canary.drop.clone())));
    };

    let left_minus_one = left
        .without_key(relationship.key, &canary.drop)
        .with_context(|| format!("canary for {} could not drop its key", relationship.id))?;
    let missing = missing_ids(&left_minus_one, right, relationship.key)?;
    let status = if missing.len() == 1 {
        CheckStatus::Passed
    } else {
        CheckStatus::Failed
    };

    Ok(CheckOutcome {
        relationship: *relationship,
        canary: Some(canary.drop.clone()),
        status,
        missing: Some(missing),
        report_path: None,
    })
}

pub fn run_suite(context: &GlueContext, options: &SuiteOptions) -> Result<SuiteReport> {
    let mut report = SuiteReport::default();

    for relationship in RELATIONSHIPS {
        let mut outcome = run_relationship(context, relationship)?;
        if let (Some(report_dir), Some(missing)) = (&options.save_unmapped_ids, &outcome.missing) {
            outcome.report_path = Some(save_missing_ids(report_dir, relationship.id, missing)?);
        }
        log_outcome(&outcome);
        report.outcomes.push(outcome);
    }

    if options.with_canaries {
        for canary in default_canaries() {
            let outcome = run_canary(context, &canary)?;
            log_outcome(&outcome);
            report.outcomes.push(outcome);
        }
    }

    info!(
        passed = report.count(CheckStatus::Passed),
        failed = report.count(CheckStatus::Failed),
        skipped = report.count(CheckStatus::Skipped),
        "glue checks complete"
    );

    Ok(report)
}

fn skipped(relationship: &Relationship, canary: Option<Vec<IdValue>>) -> CheckOutcome {
    CheckOutcome {
        relationship: *relationship,
        canary,
        status: CheckStatus::Skipped,
        missing: None,
        report_path: None,
    }
}

fn log_outcome(outcome: &CheckOutcome) {
    match outcome.status {
        CheckStatus::Passed => info!(check = %outcome.name(), "check passed"),
        CheckStatus::Skipped => warn!(
            check = %outcome.name(),
            left = %outcome.relationship.left,
            right = %outcome.relationship.right,
            "check skipped; source not included"
        ),
        CheckStatus::Failed => error!(
            check = %outcome.name(),
            orphans = outcome.orphan_count(),
            "check failed"
        ),
    }
}
