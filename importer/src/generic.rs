//! Import of every asset kind that needs nothing beyond its parent and oob.

use crate::asset::{self, AssetSpec};
use crate::errors::ImportError;
use crate::reference::resolve_field;
use crate::relationship::{CollisionPolicy, ParentMap, extract, merge};
use crate::source::QuerySource;
use crate::summary::{ImportSummary, ImportWarning};
use async_trait::async_trait;
use catalog::{Catalog, CatalogError};
use model::asset::{AssetId, AssetKind, AssetName, CreateAsset, asset_name, full_model};
use model::hardware::network_adapter_port::CreateNetworkAdapterPort;
use model::network::network_connection::CreateNetworkConnection;
use model::network::oob::CreateOob;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Child → parent tables produced by one kind, keyed by child kind.
pub type ChildMaps = BTreeMap<AssetKind, ParentMap>;

/// A raw record with its name taken out of `metadata.name`.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    pub name: AssetName,
    pub data: Value,
}

/// An asset persisted by the current run.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatedAsset {
    pub id: AssetId,
    pub name: AssetName,
    pub data: Value,
}

/// Extra work for a kind once all of its assets exist.
#[async_trait]
pub trait AssetHook: Send + Sync {
    async fn after_create(
        &self,
        catalog: &Catalog,
        created: &[CreatedAsset],
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError>;
}

pub(crate) fn expect_array(expression: &str, value: Value) -> Result<Vec<Value>, ImportError> {
    match value {
        Value::Array(records) => Ok(records),
        other => Err(ImportError::unexpected(expression, "an array", &other)),
    }
}

/// Names every record and makes sure no name is used twice.
pub fn index_records(kind: AssetKind, records: Vec<Value>) -> Result<Vec<RawRecord>, ImportError> {
    let mut seen = BTreeSet::new();

    records
        .into_iter()
        .enumerate()
        .map(|(index, data)| {
            let name = asset_name(&data)
                .ok_or(ImportError::MissingName { kind, index })?
                .to_owned();
            if !seen.insert(name.clone()) {
                return Err(ImportError::DuplicateName { kind, name });
            }
            Ok(RawRecord { name, data })
        })
        .collect()
}

pub struct GenericImporter<'a, S> {
    source: &'a S,
    catalog: &'a Catalog,
    policy: CollisionPolicy,
}

impl<'a, S: QuerySource> GenericImporter<'a, S> {
    pub fn new(source: &'a S, catalog: &'a Catalog, policy: CollisionPolicy) -> Self {
        Self {
            source,
            catalog,
            policy,
        }
    }

    /// Imports every record of `spec.kind`. Records of a kind with a parent
    /// are only created when `parents` names one for them.
    pub async fn import(
        &self,
        spec: &AssetSpec,
        parents: Option<&ParentMap>,
        summary: &mut ImportSummary,
    ) -> Result<ChildMaps, ImportError> {
        info!("Importing {}", spec.plural);

        let response = self.source.query(spec.query).await?;
        let records = index_records(spec.kind, expect_array(spec.query, response)?)?;
        info!("Found {} {}", records.len(), spec.plural);

        let mut created = Vec::with_capacity(records.len());
        for record in records {
            if let Some(asset) = self.import_record(spec, parents, record, summary).await? {
                created.push(asset);
            }
        }

        if let Some(hook) = spec.hook {
            hook.after_create(self.catalog, &created, summary).await?;
        }

        self.child_maps(spec, &created)
    }

    async fn import_record(
        &self,
        spec: &AssetSpec,
        parents: Option<&ParentMap>,
        record: RawRecord,
        summary: &mut ImportSummary,
    ) -> Result<Option<CreatedAsset>, ImportError> {
        let mut req = CreateAsset::new(record.name.clone(), Value::Null);

        if let Some(parent_kind) = spec.parent {
            let Some(parent) = parents.and_then(|parents| parents.get(&record.name)) else {
                summary.warn(ImportWarning::Orphan {
                    kind: spec.kind,
                    asset: record.name,
                    parent_kind,
                });
                return Ok(None);
            };

            let parent_id = self
                .catalog
                .find_asset_id(parent_kind, parent)
                .await
                .map_err(|e| ImportError::dangling(e, spec.kind, &record.name, parent_kind, parent))?;
            req = req.with_parent(parent_id);
        }

        if spec.needs_oob {
            req = req.with_oob(self.create_oob(spec.kind, &record).await?);
        }

        match full_model(&record.data) {
            Some(model) => info!("Importing {} {} ({model})", spec.singular, record.name),
            None => info!("Importing {} {}", spec.singular, record.name),
        }

        req.data = record.data.clone();
        let id = self.catalog.create_asset(spec.kind, req).await?;
        summary.record_created(spec.kind);

        Ok(Some(CreatedAsset {
            id,
            name: record.name,
            data: record.data,
        }))
    }

    async fn create_oob(&self, kind: AssetKind, record: &RawRecord) -> Result<AssetId, ImportError> {
        let oob = record
            .data
            .get("oob")
            .filter(|oob| oob.is_object())
            .ok_or_else(|| ImportError::MissingOob {
                kind,
                name: record.name.clone(),
            })?;

        let network_name =
            resolve_field(oob, "network").ok_or_else(|| ImportError::MissingOobNetwork {
                kind,
                name: record.name.clone(),
            })?;

        let network = self
            .catalog
            .network
            .find_network(network_name)
            .await
            .map_err(|e| match e {
                CatalogError::NotFound { .. } => ImportError::OobNetworkNotFound {
                    kind,
                    name: record.name.clone(),
                    network: network_name.to_owned(),
                },
                other => other.into(),
            })?;

        let oob = self
            .catalog
            .network
            .create_oob(CreateOob {
                data: oob.clone(),
                network_id: network.id,
            })
            .await?;
        Ok(oob.id)
    }

    fn child_maps(&self, spec: &AssetSpec, created: &[CreatedAsset]) -> Result<ChildMaps, ImportError> {
        let mut maps = ChildMaps::new();

        for &child in spec.children {
            let Some(child_key) = asset::spec(child).and_then(|child_spec| child_spec.child_key) else {
                continue;
            };

            let pairs = created
                .iter()
                .flat_map(|asset| extract(&asset.name, &asset.data, child_key));
            let parents = merge(child, pairs, self.policy)?;

            debug!(
                "Found these {child}-{} relationships:\n{}",
                spec.kind,
                serde_json::to_string_pretty(&parents).unwrap_or_default()
            );
            maps.insert(child, parents);
        }

        Ok(maps)
    }
}

/// Port records of an adapter in listed order. `ports` is either a list of
/// port records or an object keyed by interface name.
pub fn adapter_ports(data: &Value) -> Vec<&Value> {
    match data.get("ports") {
        Some(Value::Array(ports)) => ports.iter().collect(),
        Some(Value::Object(ports)) => ports.values().collect(),
        _ => Vec::new(),
    }
}

/// Creates the ports of every imported adapter, numbered from 1, and a
/// connection for every port cabled to a network through a switch.
pub struct PortBuilder;

#[async_trait]
impl AssetHook for PortBuilder {
    async fn after_create(
        &self,
        catalog: &Catalog,
        adapters: &[CreatedAsset],
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        for adapter in adapters {
            for (number, port_data) in (1..).zip(adapter_ports(&adapter.data)) {
                info!("Importing network adapter port {number} for adapter {}", adapter.name);
                let port = catalog
                    .hardware
                    .create_port(CreateNetworkAdapterPort {
                        network_adapter_id: adapter.id,
                        number,
                    })
                    .await?;
                summary.ports_created += 1;

                let (Some(network_name), Some(switch_name)) = (
                    resolve_field(port_data, "network"),
                    resolve_field(port_data, "switch"),
                ) else {
                    continue;
                };

                let network = catalog.network.find_network(network_name).await.map_err(|e| {
                    ImportError::dangling(
                        e,
                        AssetKind::NetworkAdapter,
                        &adapter.name,
                        AssetKind::Network,
                        network_name,
                    )
                })?;
                let switch = catalog
                    .network
                    .find_network_switch(switch_name)
                    .await
                    .map_err(|e| {
                        ImportError::dangling(
                            e,
                            AssetKind::NetworkAdapter,
                            &adapter.name,
                            AssetKind::NetworkSwitch,
                            switch_name,
                        )
                    })?;

                catalog
                    .network
                    .create_connection(CreateNetworkConnection {
                        network_id: network.id,
                        network_adapter_port_id: port.id,
                        network_switch_id: switch.id,
                    })
                    .await?;
                debug!(
                    adapter = %adapter.name,
                    port = number,
                    network = %network.name,
                    switch = %switch.name,
                    "Created network connection"
                );
                summary.connections_created += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FixtureSource;
    use model::hardware::chassis;
    use model::network::CreateNetwork;
    use serde_json::json;

    fn record(name: &str) -> Value {
        json!({"metadata": {"name": name}})
    }

    #[test]
    fn test_index_records() {
        let records = index_records(AssetKind::Chassis, vec![record("c2"), record("c1")]).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c2", "c1"]);
    }

    #[test]
    fn test_index_records_rejects_bad_names() {
        assert!(matches!(
            index_records(AssetKind::Pdu, vec![record("p1"), json!({"name": "p2"})]),
            Err(ImportError::MissingName {
                kind: AssetKind::Pdu,
                index: 1
            })
        ));
        assert!(matches!(
            index_records(AssetKind::Pdu, vec![record("p1"), record("p1")]),
            Err(ImportError::DuplicateName { kind: AssetKind::Pdu, name }) if name == "p1"
        ));
    }

    #[test]
    fn test_adapter_ports_keep_listed_order() {
        let listed = json!({"ports": [{"n": 1}, {"n": 2}, {"n": 3}]});
        assert_eq!(
            adapter_ports(&listed),
            vec![&json!({"n": 1}), &json!({"n": 2}), &json!({"n": 3})]
        );

        let keyed = json!({"ports": {"eth1": {"n": 1}, "eth0": {"n": 2}}});
        assert_eq!(adapter_ports(&keyed), vec![&json!({"n": 1}), &json!({"n": 2})]);

        assert!(adapter_ports(&json!({})).is_empty());
        assert!(adapter_ports(&json!({"ports": "eth0"})).is_empty());
    }

    fn fixture(responses: &[(&str, Value)]) -> FixtureSource {
        FixtureSource::from(
            responses
                .iter()
                .map(|(expression, value)| (expression.to_string(), value.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[tokio::test]
    async fn test_root_kind_yields_child_maps() {
        let catalog = Catalog::in_memory().await.unwrap();
        let source = fixture(&[(
            "assets.chassis",
            json!([
                {"metadata": {"name": "c1"}, "servers": ["^s1", "^s2"], "psus": ["^p1"]},
                {"metadata": {"name": "c2"}, "servers": ["^s3"]},
            ]),
        )]);
        let spec = asset::spec(AssetKind::Chassis).unwrap();
        let mut summary = ImportSummary::default();

        let maps = GenericImporter::new(&source, &catalog, CollisionPolicy::Reject)
            .import(spec, None, &mut summary)
            .await
            .unwrap();

        assert_eq!(summary.created(AssetKind::Chassis), 2);
        assert_eq!(catalog.all::<chassis::Entity>().await.unwrap().len(), 2);

        let servers = &maps[&AssetKind::Server];
        assert_eq!(servers.get("s1").map(String::as_str), Some("c1"));
        assert_eq!(servers.get("s3").map(String::as_str), Some("c2"));
        assert_eq!(maps[&AssetKind::Psu].len(), 1);
    }

    #[tokio::test]
    async fn test_orphans_are_skipped_with_one_warning() {
        let catalog = Catalog::in_memory().await.unwrap();
        let source = fixture(&[
            (
                "assets.chassis",
                json!([{"metadata": {"name": "c1"}, "psus": ["^p1"]}]),
            ),
            (
                "assets.psus",
                json!([{"metadata": {"name": "p1"}}, {"metadata": {"name": "p2"}}]),
            ),
        ]);
        let importer = GenericImporter::new(&source, &catalog, CollisionPolicy::Reject);
        let mut summary = ImportSummary::default();

        let maps = importer
            .import(asset::spec(AssetKind::Chassis).unwrap(), None, &mut summary)
            .await
            .unwrap();
        importer
            .import(
                asset::spec(AssetKind::Psu).unwrap(),
                maps.get(&AssetKind::Psu),
                &mut summary,
            )
            .await
            .unwrap();

        assert_eq!(summary.created(AssetKind::Psu), 1);
        assert_eq!(
            summary.warnings,
            vec![ImportWarning::Orphan {
                kind: AssetKind::Psu,
                asset: "p2".to_owned(),
                parent_kind: AssetKind::Chassis,
            }]
        );
        assert!(catalog.find_asset_id(AssetKind::Psu, "p2").await.is_err());
    }

    #[tokio::test]
    async fn test_oob_network_must_exist() {
        let catalog = Catalog::in_memory().await.unwrap();
        catalog
            .network
            .create_network(CreateNetwork {
                name: "mgmt".to_owned(),
                cable_colour: "yellow".to_owned(),
                data: json!({}),
            })
            .await
            .unwrap();
        let source = fixture(&[(
            "assets.pdus",
            json!([
                {"metadata": {"name": "pdu1"}, "oob": {"network": "^mgmt", "ip": "10.0.0.9"}},
                {"metadata": {"name": "pdu2"}, "oob": {"network": "^bmc"}},
            ]),
        )]);
        let mut summary = ImportSummary::default();

        let err = GenericImporter::new(&source, &catalog, CollisionPolicy::Reject)
            .import(asset::spec(AssetKind::Pdu).unwrap(), None, &mut summary)
            .await
            .unwrap_err();

        assert!(
            matches!(
                &err,
                ImportError::OobNetworkNotFound { kind: AssetKind::Pdu, name, network }
                    if name == "pdu2" && network == "bmc"
            ),
            "Unexpected error: {err}"
        );
        assert_eq!(summary.created(AssetKind::Pdu), 1);
    }

    #[tokio::test]
    async fn test_missing_oob_is_fatal() {
        let catalog = Catalog::in_memory().await.unwrap();
        let source = fixture(&[(
            "assets.network_switches",
            json!([{"metadata": {"name": "sw1"}, "oob": {"ip": "10.0.0.2"}}]),
        )]);
        let mut summary = ImportSummary::default();

        let err = GenericImporter::new(&source, &catalog, CollisionPolicy::Reject)
            .import(asset::spec(AssetKind::NetworkSwitch).unwrap(), None, &mut summary)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingOobNetwork { .. }), "{err}");

        let source = fixture(&[(
            "assets.network_switches",
            json!([{"metadata": {"name": "sw1"}}]),
        )]);
        let err = GenericImporter::new(&source, &catalog, CollisionPolicy::Reject)
            .import(asset::spec(AssetKind::NetworkSwitch).unwrap(), None, &mut summary)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingOob { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_non_array_response_is_fatal() {
        let catalog = Catalog::in_memory().await.unwrap();
        let source = fixture(&[("assets.chassis", json!({"c1": {}}))]);
        let mut summary = ImportSummary::default();

        let err = GenericImporter::new(&source, &catalog, CollisionPolicy::Reject)
            .import(asset::spec(AssetKind::Chassis).unwrap(), None, &mut summary)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnexpectedResponse { .. }), "{err}");
    }
}
