use crate::asset::{self, AssetSpec, ImportStrategy};
use crate::bespoke::{self, NodeOptions};
use crate::errors::ImportError;
use crate::generic::{ChildMaps, GenericImporter};
use crate::relationship::{CollisionPolicy, ParentMap};
use crate::source::QuerySource;
use crate::summary::ImportSummary;
use catalog::Catalog;
use model::asset::AssetName;
use tracing::{Instrument, info, info_span};

/// Run-wide policies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    pub collision_policy: CollisionPolicy,
    /// Abort instead of warning when a node renders a network its server is
    /// not cabled to.
    pub strict_topology: bool,
    pub skip_nodes: Vec<AssetName>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::default(),
            strict_topology: false,
            skip_nodes: vec!["local".to_owned()],
        }
    }
}

/// Rebuilds the whole inventory from the source of truth.
pub struct Importer<S> {
    source: S,
    catalog: Catalog,
    options: ImportOptions,
}

impl<S: QuerySource> Importer<S> {
    pub fn new(source: S, catalog: Catalog, options: ImportOptions) -> Self {
        Self {
            source,
            catalog,
            options,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Empties the store, then imports every kind in dependency order. The
    /// first fatal error stops the run and leaves the store as it is.
    pub async fn run(&self) -> Result<ImportSummary, ImportError> {
        let plan = asset::import_order()?;
        self.catalog.reset().await?;

        let generic =
            GenericImporter::new(&self.source, &self.catalog, self.options.collision_policy);
        let mut parent_maps = ChildMaps::new();
        let mut summary = ImportSummary::default();

        for spec in plan {
            let parents = parent_maps.remove(&spec.kind);
            let produced = self
                .import_kind(&generic, spec, parents.as_ref(), &mut summary)
                .instrument(info_span!("import", kind = %spec.kind))
                .await?;
            parent_maps.extend(produced);
        }

        info!(warnings = summary.warnings.len(), "Import complete");
        Ok(summary)
    }

    async fn import_kind(
        &self,
        generic: &GenericImporter<'_, S>,
        spec: &AssetSpec,
        parents: Option<&ParentMap>,
        summary: &mut ImportSummary,
    ) -> Result<ChildMaps, ImportError> {
        match spec.strategy {
            ImportStrategy::Generic => return generic.import(spec, parents, summary).await,
            ImportStrategy::Networks => {
                bespoke::import_networks(&self.source, &self.catalog, spec, summary).await?
            }
            ImportStrategy::Groups => {
                bespoke::import_groups(&self.source, &self.catalog, spec, summary).await?
            }
            ImportStrategy::Nodes => {
                let options = NodeOptions {
                    skip: &self.options.skip_nodes,
                    strict_topology: self.options.strict_topology,
                };
                bespoke::import_nodes(&self.source, &self.catalog, spec, options, summary).await?
            }
        }
        Ok(ChildMaps::new())
    }
}
