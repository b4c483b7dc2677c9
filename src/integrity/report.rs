use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use super::MissingIds;
use crate::util::write_text;

/// Writes the orphans of one relationship to `<report_dir>/<check_id>.csv`.
/// An empty result still produces a header-only file so stale reports from a
/// previous run are overwritten.
pub fn save_missing_ids(report_dir: &Path, check_id: &str, missing: &MissingIds) -> Result<PathBuf> {
    let path = report_dir.join(format!("{check_id}.csv"));
    let table = missing.to_table(check_id)?;
    write_text(&path, &table.to_csv())?;

    info!(
        check = %check_id,
        rows = missing.len(),
        path = %path.display(),
        "saved unmapped ids"
    );

    Ok(path)
}
