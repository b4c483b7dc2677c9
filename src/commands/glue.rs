use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::cli::GlueArgs;
use crate::crosswalk::{CrosswalkStore, Glue, assemble};
use crate::model::{GlueManifest, GlueTableSummary};
use crate::util::{ensure_directory, now_utc_string, sha256_file, write_json_pretty, write_text};

pub fn run(args: GlueArgs) -> Result<()> {
    let crosswalk_path = args.crosswalk_path();
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| args.data_root.join("glue"));
    let include_ferc1 = !args.sources.no_ferc1;
    let include_eia = !args.sources.no_eia;

    info!(
        crosswalk = %crosswalk_path.display(),
        out_dir = %out_dir.display(),
        include_ferc1,
        include_eia,
        "assembling glue"
    );

    let store = CrosswalkStore::open(&crosswalk_path)?;
    let glue = assemble(&store, include_ferc1, include_eia)?;

    let manifest = GlueManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        crosswalk_path: crosswalk_path.display().to_string(),
        crosswalk_sha256: sha256_file(&crosswalk_path)?,
        include_ferc1,
        include_eia,
        tables: write_glue_tables(&glue, &out_dir)?,
    };

    let manifest_path = out_dir.join("glue_manifest.json");
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), tables = manifest.tables.len(), "wrote glue manifest");

    Ok(())
}

fn write_glue_tables(glue: &Glue, out_dir: &Path) -> Result<Vec<GlueTableSummary>> {
    ensure_directory(out_dir)?;

    let mut summaries = Vec::with_capacity(glue.len());
    for table in glue.tables() {
        let path = out_dir.join(format!("{}.csv", table.name()));
        write_text(&path, &table.to_csv())?;
        info!(table = %table.name(), rows = table.len(), path = %path.display(), "wrote glue table");

        summaries.push(GlueTableSummary {
            name: table.name().to_string(),
            columns: table.columns().to_vec(),
            row_count: table.len(),
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::cli::SourceSelection;
    use crate::test_support::FixtureDbs;

    #[test]
    fn glue_writes_tables_and_manifest() {
        let dbs = FixtureDbs::new();
        let out_dir = dbs.dir.path().join("glue");

        run(GlueArgs {
            data_root: dbs.dir.path().to_path_buf(),
            crosswalk_db: None,
            out_dir: Some(out_dir.clone()),
            sources: SourceSelection {
                no_ferc1: false,
                no_eia: true,
            },
        })
        .expect("glue command succeeds");

        let plants = fs::read_to_string(out_dir.join("plants_ferc1.csv")).expect("table written");
        assert!(plants.starts_with("utility_id_ferc1,plant_name_ferc1,plant_id_pudl\n"));
        assert!(plants.contains("227,comanche,500\n"));
        assert!(!out_dir.join("plants_eia.csv").exists());

        let manifest: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(out_dir.join("glue_manifest.json")).expect("manifest written"),
        )
        .expect("manifest is json");
        assert_eq!(manifest["include_eia"], serde_json::json!(false));
        assert_eq!(manifest["tables"].as_array().map(Vec::len), Some(7));
        assert_eq!(manifest["crosswalk_sha256"].as_str().map(str::len), Some(64));
    }
}
