//! Static description of every asset kind and the order they are imported in.

use crate::errors::ImportError;
use crate::generic::{AssetHook, PortBuilder};
use model::asset::AssetKind;

/// How records of a kind are turned into store rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportStrategy {
    /// Generic importer; parent and oob resolution driven by the spec.
    Generic,
    Networks,
    Groups,
    Nodes,
}

pub struct AssetSpec {
    pub kind: AssetKind,
    /// Query listing every record (or, for groups and nodes, every name).
    pub query: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    /// Kind whose records list records of this kind.
    pub parent: Option<AssetKind>,
    /// Key under which a parent lists records of this kind.
    pub child_key: Option<&'static str>,
    /// Kinds whose child → parent tables this kind's import produces.
    pub children: &'static [AssetKind],
    pub needs_oob: bool,
    /// Dependencies other than the parent and the oob network.
    pub depends_on: &'static [AssetKind],
    pub strategy: ImportStrategy,
    pub hook: Option<&'static dyn AssetHook>,
}

impl AssetSpec {
    /// Kinds that must be imported before this one.
    pub fn dependencies(&self) -> Vec<AssetKind> {
        let mut deps: Vec<AssetKind> = self.parent.into_iter().collect();
        if self.needs_oob {
            deps.push(AssetKind::Network);
        }
        deps.extend_from_slice(self.depends_on);
        deps.sort();
        deps.dedup();
        deps
    }
}

pub static ASSETS: &[AssetSpec] = &[
    AssetSpec {
        kind: AssetKind::Network,
        query: "assets.networks",
        singular: "network",
        plural: "networks",
        parent: None,
        child_key: None,
        children: &[],
        needs_oob: false,
        depends_on: &[],
        strategy: ImportStrategy::Networks,
        hook: None,
    },
    AssetSpec {
        kind: AssetKind::NetworkSwitch,
        query: "assets.network_switches",
        singular: "network switch",
        plural: "network switches",
        parent: None,
        child_key: None,
        children: &[],
        needs_oob: true,
        depends_on: &[],
        strategy: ImportStrategy::Generic,
        hook: None,
    },
    AssetSpec {
        kind: AssetKind::Pdu,
        query: "assets.pdus",
        singular: "pdu",
        plural: "pdus",
        parent: None,
        child_key: None,
        children: &[],
        needs_oob: true,
        depends_on: &[],
        strategy: ImportStrategy::Generic,
        hook: None,
    },
    AssetSpec {
        kind: AssetKind::Chassis,
        query: "assets.chassis",
        singular: "chassis",
        plural: "chassis",
        parent: None,
        child_key: None,
        children: &[AssetKind::Server, AssetKind::Psu],
        needs_oob: false,
        depends_on: &[],
        strategy: ImportStrategy::Generic,
        hook: None,
    },
    AssetSpec {
        kind: AssetKind::Psu,
        query: "assets.psus",
        singular: "psu",
        plural: "psus",
        parent: Some(AssetKind::Chassis),
        child_key: Some("psus"),
        children: &[],
        needs_oob: false,
        depends_on: &[],
        strategy: ImportStrategy::Generic,
        hook: None,
    },
    AssetSpec {
        kind: AssetKind::Server,
        query: "assets.servers",
        singular: "server",
        plural: "servers",
        parent: Some(AssetKind::Chassis),
        child_key: Some("servers"),
        children: &[AssetKind::NetworkAdapter],
        needs_oob: true,
        depends_on: &[],
        strategy: ImportStrategy::Generic,
        hook: None,
    },
    AssetSpec {
        kind: AssetKind::NetworkAdapter,
        query: "assets.network_adapters",
        singular: "network adapter",
        plural: "network adapters",
        parent: Some(AssetKind::Server),
        child_key: Some("network_adapters"),
        children: &[],
        needs_oob: false,
        // Ports are cabled to networks through switches.
        depends_on: &[AssetKind::Network, AssetKind::NetworkSwitch],
        strategy: ImportStrategy::Generic,
        hook: Some(&PortBuilder),
    },
    AssetSpec {
        kind: AssetKind::Group,
        query: "groups.map(&:name)",
        singular: "group",
        plural: "groups",
        parent: None,
        child_key: None,
        children: &[],
        needs_oob: false,
        depends_on: &[],
        strategy: ImportStrategy::Groups,
        hook: None,
    },
    AssetSpec {
        kind: AssetKind::Node,
        query: "nodes.map(&:name)",
        singular: "node",
        plural: "nodes",
        parent: None,
        child_key: None,
        children: &[],
        needs_oob: false,
        depends_on: &[AssetKind::Server, AssetKind::Group, AssetKind::NetworkAdapter],
        strategy: ImportStrategy::Nodes,
        hook: None,
    },
];

pub fn spec(kind: AssetKind) -> Option<&'static AssetSpec> {
    ASSETS.iter().find(|spec| spec.kind == kind)
}

/// The order in which `ASSETS` has to be imported.
pub fn import_order() -> Result<Vec<&'static AssetSpec>, ImportError> {
    topo_sort(ASSETS)
}

/// Kahn's algorithm over the dependency edges of `specs`. Among the kinds
/// that are ready, the one declared first goes first. Dependencies on kinds
/// outside of `specs` are ignored.
pub fn topo_sort(specs: &[AssetSpec]) -> Result<Vec<&AssetSpec>, ImportError> {
    let position = |kind: AssetKind| specs.iter().position(|spec| spec.kind == kind);

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); specs.len()];
    let mut in_degree = vec![0usize; specs.len()];
    for (idx, spec) in specs.iter().enumerate() {
        for dep in spec.dependencies().into_iter().filter_map(position) {
            dependents[dep].push(idx);
            in_degree[idx] += 1;
        }
    }

    let mut done = vec![false; specs.len()];
    let mut order = Vec::with_capacity(specs.len());
    while let Some(next) = (0..specs.len()).find(|&idx| !done[idx] && in_degree[idx] == 0) {
        done[next] = true;
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
        }
        order.push(&specs[next]);
    }

    if order.len() < specs.len() {
        let stuck = specs
            .iter()
            .zip(done)
            .filter(|(_, done)| !done)
            .map(|(spec, _)| spec.kind)
            .collect();
        return Err(ImportError::DependencyCycle(stuck));
    }

    Ok(order)
}
