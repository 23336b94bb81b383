//! Agreement between the cabling declared on hardware and the networks a
//! node's rendered configuration puts it on.
//!
//! Each port connection on the node's server is a candidate. A rendered
//! network binds the node to the first unclaimed candidate on that network,
//! in port order, and labels it with the rendered interface name.

use crate::errors::ImportError;
use crate::summary::{ImportSummary, ImportWarning};
use catalog::Catalog;
use model::asset::{AssetId, AssetName};
use model::network::network_connection::{AssignNode, GetNetworkConnection};
use model::node;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, info};

/// A connection on one of the node's ports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub connection_id: AssetId,
    pub network: AssetName,
    pub node_id: Option<AssetId>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    /// Index of the first unclaimed candidate on the network.
    Free(usize),
    /// Every candidate on the network belongs to another node.
    Claimed {
        connection_id: AssetId,
        claimed_by: AssetId,
    },
    Unreachable,
}

pub fn select(candidates: &[Candidate], network: &str) -> Selection {
    let mut on_network = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.network == network)
        .peekable();

    let Some(&(_, first)) = on_network.peek() else {
        return Selection::Unreachable;
    };

    on_network
        .find(|(_, candidate)| candidate.node_id.is_none())
        .map(|(idx, _)| Selection::Free(idx))
        .unwrap_or(Selection::Claimed {
            connection_id: first.connection_id,
            claimed_by: first.node_id.unwrap_or_default(),
        })
}

pub struct TopologyReconciler<'a> {
    catalog: &'a Catalog,
    strict: bool,
}

impl<'a> TopologyReconciler<'a> {
    /// With `strict`, a rendered network no port reaches aborts the run
    /// instead of being skipped.
    pub fn new(catalog: &'a Catalog, strict: bool) -> Self {
        Self { catalog, strict }
    }

    /// Connections on the server's ports: adapters in creation order, ports
    /// by number.
    async fn candidates(&self, server_id: AssetId) -> Result<Vec<Candidate>, ImportError> {
        let ports = self.catalog.hardware.server_ports(server_id).await?;
        let port_ids: Vec<AssetId> = ports.iter().map(|port| port.id).collect();

        let mut by_port: HashMap<AssetId, Candidate> = self
            .catalog
            .network
            .get_connections(GetNetworkConnection::all().with_port_ids(port_ids))
            .await?
            .into_iter()
            .map(|(connection, network)| {
                let candidate = Candidate {
                    connection_id: connection.id,
                    network: network.name,
                    node_id: connection.node_id,
                };
                (connection.network_adapter_port_id, candidate)
            })
            .collect();

        Ok(ports
            .iter()
            .filter_map(|port| by_port.remove(&port.id))
            .collect())
    }

    pub async fn reconcile(
        &self,
        node: &node::Model,
        rendered: &Map<String, Value>,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        let mut candidates = self.candidates(node.server_id).await?;
        debug!(
            candidates = candidates.len(),
            rendered = rendered.len(),
            "Reconciling rendered networks"
        );

        for (network, config) in rendered {
            if config.get("defined") == Some(&Value::Bool(false)) {
                debug!(network = %network, "Network not defined for node, skipping");
                continue;
            }

            let idx = match select(&candidates, network) {
                Selection::Free(idx) => idx,
                Selection::Claimed {
                    connection_id,
                    claimed_by,
                } => {
                    return Err(ImportError::ConnectionClaimed {
                        node: node.name.clone(),
                        network: network.clone(),
                        connection_id,
                        claimed_by,
                    });
                }
                Selection::Unreachable if self.strict => {
                    return Err(ImportError::UnreachableNetwork {
                        node: node.name.clone(),
                        network: network.clone(),
                    });
                }
                Selection::Unreachable => {
                    summary.warn(ImportWarning::UnreachableNetwork {
                        node: node.name.clone(),
                        network: network.clone(),
                    });
                    continue;
                }
            };

            let interface = config
                .get("interface")
                .and_then(Value::as_str)
                .ok_or_else(|| ImportError::MissingInterface {
                    node: node.name.clone(),
                    network: network.clone(),
                })?;

            let candidate = &mut candidates[idx];
            self.catalog
                .network
                .assign_node(AssignNode {
                    connection_id: candidate.connection_id,
                    node_id: node.id,
                    interface: interface.to_owned(),
                })
                .await?;
            candidate.node_id = Some(node.id);
            summary.connections_associated += 1;

            info!(
                network = %network,
                interface,
                connection = candidate.connection_id,
                "Associated node with network connection"
            );
        }

        Ok(())
    }
}
