use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use tracing::info;

use super::Relationship;
use crate::crosswalk::{CrosswalkStore, UTILITIES_FERC1_DBF, UTILITIES_FERC1_XBRL, assemble};
use crate::extract::{RawIdSource, Scope, raw_plants_ferc1};
use crate::model::{EntityKind, SourceSystem};
use crate::table::IdTable;

#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub include_ferc1: bool,
    pub include_eia: bool,
    pub scope: Scope,
}

/// Every table a check can name: glue tables plus raw presence sets.
/// Computed once per run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct GlueContext {
    tables: BTreeMap<String, IdTable>,
}

impl GlueContext {
    pub fn build(
        store: &CrosswalkStore,
        ferc1_dbf: &impl RawIdSource,
        ferc1_xbrl: &impl RawIdSource,
        survey: &impl RawIdSource,
        options: &ContextOptions,
    ) -> Result<Self> {
        for (source, expected) in [
            (ferc1_dbf.system(), SourceSystem::Ferc1Dbf),
            (ferc1_xbrl.system(), SourceSystem::Ferc1Xbrl),
            (survey.system(), SourceSystem::Eia),
        ] {
            if source != expected {
                bail!("expected a {expected} source but got {source}");
            }
        }

        // Every requested year must be a working year of every included
        // source; nothing is read before the scope is known to be valid.
        if options.include_ferc1 {
            options.scope.years_for(SourceSystem::Ferc1)?;
        }
        if options.include_eia {
            options.scope.years_for(SourceSystem::Eia)?;
        }

        let glue = assemble(store, options.include_ferc1, options.include_eia)?;
        let mut context = Self::from_tables(glue.tables().cloned());

        if options.include_ferc1 {
            // Each filing format reads only its own share of the FERC years.
            let dbf_scope = options
                .scope
                .restrict_to(SourceSystem::Ferc1Dbf)
                .unwrap_or_else(Scope::empty);
            let xbrl_scope = options
                .scope
                .restrict_to(SourceSystem::Ferc1Xbrl)
                .unwrap_or_else(Scope::empty);

            let dbf_utilities = ferc1_dbf.read_scoped_ids(EntityKind::Utility, &dbf_scope)?;
            let dbf_plants = ferc1_dbf.read_scoped_ids(EntityKind::Plant, &dbf_scope)?;
            let xbrl_utilities = ferc1_xbrl.read_scoped_ids(EntityKind::Utility, &xbrl_scope)?;
            let xbrl_plants = ferc1_xbrl.read_scoped_ids(EntityKind::Plant, &xbrl_scope)?;

            let plants_raw = raw_plants_ferc1(
                &dbf_plants,
                &xbrl_plants,
                context.require(UTILITIES_FERC1_DBF)?,
                context.require(UTILITIES_FERC1_XBRL)?,
            )?;

            context.insert(dbf_utilities);
            context.insert(xbrl_utilities);
            context.insert(plants_raw);
        }

        if options.include_eia {
            context.insert(survey.read_scoped_ids(EntityKind::Utility, &options.scope)?);
            context.insert(survey.read_scoped_ids(EntityKind::Plant, &options.scope)?);
        }

        info!(tables = context.tables.len(), "built glue context");

        Ok(context)
    }

    pub fn from_tables(tables: impl IntoIterator<Item = IdTable>) -> Self {
        let mut context = Self::default();
        for table in tables {
            context.insert(table);
        }
        context
    }

    pub fn table(&self, name: &str) -> Option<&IdTable> {
        self.tables.get(name)
    }

    fn require(&self, name: &str) -> Result<&IdTable> {
        self.table(name)
            .with_context(|| format!("table {name} is not part of this run"))
    }

    fn insert(&mut self, table: IdTable) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// Both sides of `relationship`, or `None` when either source was left
    /// out of the run.
    pub(super) fn pair(&self, relationship: &Relationship) -> Option<(&IdTable, &IdTable)> {
        Some((self.table(relationship.left)?, self.table(relationship.right)?))
    }
}
