use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::cli::CheckArgs;
use crate::consistency::{
    CheckStatus, ContextOptions, GlueContext, SuiteOptions, SuiteReport, run_suite,
};
use crate::crosswalk::CrosswalkStore;
use crate::extract::{Ferc1DbfSource, Ferc1XbrlSource, Scope, SurveySource};
use crate::model::{CheckRecord, CheckRunReport};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: CheckArgs) -> Result<()> {
    let scope = Scope::parse(&args.years)?;
    let crosswalk_path = args.crosswalk_path();

    info!(
        crosswalk = %crosswalk_path.display(),
        years = ?scope.explicit_years(),
        "starting glue checks"
    );

    let store = CrosswalkStore::open(&crosswalk_path)?;
    let options = ContextOptions {
        include_ferc1: !args.sources.no_ferc1,
        include_eia: !args.sources.no_eia,
        scope,
    };
    let context = GlueContext::build(
        &store,
        &Ferc1DbfSource::new(args.ferc1_dbf_path()),
        &Ferc1XbrlSource::new(args.ferc1_xbrl_path()),
        &SurveySource::new(args.eia_path()),
        &options,
    )?;

    let suite_options = SuiteOptions {
        save_unmapped_ids: args.save_unmapped_ids.then(|| args.report_dir.clone()),
        with_canaries: args.with_canaries,
    };
    let report = run_suite(&context, &suite_options)?;

    if args.save_unmapped_ids {
        let run_report = build_run_report(&report, &crosswalk_path, &options.scope)?;
        let report_path = args.report_dir.join("glue_check_report.json");
        write_json_pretty(&report_path, &run_report)?;
        info!(path = %report_path.display(), "wrote glue check report");
    }

    report.ensure_passed()
}

fn build_run_report(report: &SuiteReport, crosswalk_path: &Path, scope: &Scope) -> Result<CheckRunReport> {
    let checks = report
        .outcomes
        .iter()
        .map(|outcome| CheckRecord {
            check_id: outcome.name(),
            kind: if outcome.canary.is_some() {
                "canary".to_string()
            } else {
                "relationship".to_string()
            },
            left: outcome.relationship.left.to_string(),
            right: outcome.relationship.right.to_string(),
            key_columns: outcome
                .relationship
                .key
                .iter()
                .map(|key| key.to_string())
                .collect(),
            result: outcome.status.as_str().to_string(),
            orphan_count: outcome.orphan_count(),
            report_path: outcome
                .report_path
                .as_ref()
                .map(|path| path.display().to_string()),
        })
        .collect::<Vec<CheckRecord>>();

    Ok(CheckRunReport {
        manifest_version: 1,
        generated_at: now_utc_string(),
        crosswalk_path: crosswalk_path.display().to_string(),
        crosswalk_sha256: sha256_file(crosswalk_path)?,
        years: scope.explicit_years(),
        passed: report.count(CheckStatus::Passed),
        failed: report.count(CheckStatus::Failed),
        skipped: report.count(CheckStatus::Skipped),
        checks,
    })
}
