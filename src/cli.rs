use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pudl-glue",
    version,
    about = "PUDL id crosswalk assembly and referential-integrity checks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble glue tables from the curated crosswalk and write them out.
    Glue(GlueArgs),
    /// Check that every id relationship has zero orphans.
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceSelection {
    #[arg(long, default_value_t = false)]
    pub no_ferc1: bool,

    #[arg(long, default_value_t = false)]
    pub no_eia: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GlueArgs {
    #[arg(long, default_value = ".cache/pudl")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub crosswalk_db: Option<PathBuf>,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub sources: SourceSelection,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(long, default_value = ".cache/pudl")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub crosswalk_db: Option<PathBuf>,

    #[arg(long)]
    pub ferc1_dbf_db: Option<PathBuf>,

    #[arg(long)]
    pub ferc1_xbrl_db: Option<PathBuf>,

    #[arg(long)]
    pub eia_db: Option<PathBuf>,

    /// A report year or inclusive range such as 2019-2021. Repeatable.
    #[arg(long = "year")]
    pub years: Vec<String>,

    #[arg(long, default_value = "devtools/ferc1-eia-glue")]
    pub report_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    pub save_unmapped_ids: bool,

    #[arg(long, default_value_t = false)]
    pub with_canaries: bool,

    #[command(flatten)]
    pub sources: SourceSelection,
}

impl GlueArgs {
    pub fn crosswalk_path(&self) -> PathBuf {
        self.crosswalk_db
            .clone()
            .unwrap_or_else(|| self.data_root.join(CROSSWALK_DB))
    }
}

impl CheckArgs {
    pub fn crosswalk_path(&self) -> PathBuf {
        self.crosswalk_db
            .clone()
            .unwrap_or_else(|| self.data_root.join(CROSSWALK_DB))
    }

    pub fn ferc1_dbf_path(&self) -> PathBuf {
        self.ferc1_dbf_db
            .clone()
            .unwrap_or_else(|| self.data_root.join("ferc1_dbf.sqlite"))
    }

    pub fn ferc1_xbrl_path(&self) -> PathBuf {
        self.ferc1_xbrl_db
            .clone()
            .unwrap_or_else(|| self.data_root.join("ferc1_xbrl.sqlite"))
    }

    pub fn eia_path(&self) -> PathBuf {
        self.eia_db
            .clone()
            .unwrap_or_else(|| self.data_root.join("pudl_eia.sqlite"))
    }
}

const CROSSWALK_DB: &str = "pudl_crosswalk.sqlite";
