use model::asset::{AssetKind, AssetName};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// A recoverable condition: the affected record was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportWarning {
    /// No record of `parent_kind` lists this asset.
    Orphan {
        kind: AssetKind,
        asset: AssetName,
        parent_kind: AssetKind,
    },
    /// The node renders a network none of its server's ports are cabled to.
    UnreachableNetwork { node: AssetName, network: AssetName },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::Orphan {
                kind,
                asset,
                parent_kind,
            } => write!(f, "{kind} '{asset}' has no {parent_kind}, skipped"),
            ImportWarning::UnreachableNetwork { node, network } => write!(
                f,
                "node '{node}' renders network '{network}', which no port of its server reaches"
            ),
        }
    }
}

/// What one import run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: BTreeMap<AssetKind, usize>,
    pub ports_created: usize,
    pub connections_created: usize,
    pub connections_associated: usize,
    pub genders_created: usize,
    pub skipped_nodes: Vec<AssetName>,
    pub warnings: Vec<ImportWarning>,
}

impl ImportSummary {
    pub fn created(&self, kind: AssetKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn record_created(&mut self, kind: AssetKind) {
        *self.created.entry(kind).or_default() += 1;
    }

    /// Logs `warning` and keeps it for the end-of-run report.
    pub(crate) fn warn(&mut self, warning: ImportWarning) {
        match &warning {
            ImportWarning::Orphan {
                kind,
                asset,
                parent_kind,
            } => warn!(
                asset = %asset,
                kind = %kind,
                parent_kind = %parent_kind,
                "{kind} {asset} has no {parent_kind}, skipping"
            ),
            ImportWarning::UnreachableNetwork { node, network } => warn!(
                node = %node,
                network = %network,
                "Network {network} of node {node} is not cabled to its server, skipping"
            ),
        }
        self.warnings.push(warning);
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Imported:")?;
        for (kind, count) in &self.created {
            writeln!(f, "    {kind}: {count}")?;
        }
        writeln!(f, "    network_adapter_port: {}", self.ports_created)?;
        writeln!(
            f,
            "    network_connection: {} ({} associated with nodes)",
            self.connections_created, self.connections_associated
        )?;
        writeln!(f, "    gender: {}", self.genders_created)?;

        if !self.skipped_nodes.is_empty() {
            writeln!(f, "Skipped nodes: {}", self.skipped_nodes.join(", "))?;
        }

        if self.warnings.is_empty() {
            write!(f, "No warnings")
        } else {
            write!(f, "{} warning(s):", self.warnings.len())?;
            for warning in &self.warnings {
                write!(f, "\n    {warning}")?;
            }
            Ok(())
        }
    }
}
