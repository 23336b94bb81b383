//! Kinds whose records do not fit the generic importer: networks carry a
//! mandatory cable colour, groups and nodes are listed by name and looked at
//! one by one.

use crate::asset::AssetSpec;
use crate::errors::ImportError;
use crate::generic::{expect_array, index_records};
use crate::source::QuerySource;
use crate::summary::ImportSummary;
use crate::topology::TopologyReconciler;
use catalog::Catalog;
use model::asset::{AssetKind, AssetName, asset_name};
use model::network::CreateNetwork;
use model::node::CreateNode;
use model::node::group::CreateGroup;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{Instrument, debug, info, info_span};

pub(crate) async fn import_networks<S: QuerySource>(
    source: &S,
    catalog: &Catalog,
    spec: &AssetSpec,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    info!("Importing {}", spec.plural);

    let response = source.query(spec.query).await?;
    let records = index_records(spec.kind, expect_array(spec.query, response)?)?;
    info!("Found {} {}", records.len(), spec.plural);

    for record in records {
        let cable_colour = record
            .data
            .get("cable_colour")
            .and_then(Value::as_str)
            .ok_or_else(|| ImportError::MissingCableColour {
                name: record.name.clone(),
            })?
            .to_owned();

        info!("Importing network {}", record.name);
        catalog
            .network
            .create_network(CreateNetwork {
                name: record.name,
                cable_colour,
                data: record.data,
            })
            .await?;
        summary.record_created(spec.kind);
    }
    Ok(())
}

/// Runs a name-listing query, rejecting duplicates.
async fn list_names<S: QuerySource>(
    source: &S,
    spec: &AssetSpec,
) -> Result<Vec<AssetName>, ImportError> {
    let response = source.query(spec.query).await?;
    let mut seen = BTreeSet::new();

    expect_array(spec.query, response)?
        .into_iter()
        .map(|name| match name {
            Value::String(name) if seen.insert(name.clone()) => Ok(name),
            Value::String(name) => Err(ImportError::DuplicateName {
                kind: spec.kind,
                name,
            }),
            other => Err(ImportError::unexpected(spec.query, "an array of names", &other)),
        })
        .collect()
}

async fn query_str<S: QuerySource>(source: &S, expression: &str) -> Result<String, ImportError> {
    match source.query(expression).await? {
        Value::String(value) => Ok(value),
        other => Err(ImportError::unexpected(expression, "a string", &other)),
    }
}

pub(crate) async fn import_groups<S: QuerySource>(
    source: &S,
    catalog: &Catalog,
    spec: &AssetSpec,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    let groups = list_names(source, spec).await?;
    info!("Found {} groups: {}", groups.len(), groups.join(", "));

    for group in groups {
        info!("Importing group {group}");
        let data = source.query(&format!("groups.{group}.to_h")).await?;
        catalog
            .node
            .create_group(CreateGroup { name: group, data })
            .await?;
        summary.record_created(spec.kind);
    }
    Ok(())
}

pub(crate) struct NodeOptions<'a> {
    pub skip: &'a [AssetName],
    pub strict_topology: bool,
}

pub(crate) async fn import_nodes<S: QuerySource>(
    source: &S,
    catalog: &Catalog,
    spec: &AssetSpec,
    options: NodeOptions<'_>,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    let nodes = list_names(source, spec).await?;
    info!("Found {} nodes: {}", nodes.len(), nodes.join(", "));

    let reconciler = TopologyReconciler::new(catalog, options.strict_topology);
    for name in nodes {
        if options.skip.contains(&name) {
            info!("Skipping node {name}");
            summary.skipped_nodes.push(name);
            continue;
        }

        let span = info_span!("node", node = %name);
        import_node(source, catalog, &reconciler, name, summary)
            .instrument(span)
            .await?;
    }
    Ok(())
}

async fn import_node<S: QuerySource>(
    source: &S,
    catalog: &Catalog,
    reconciler: &TopologyReconciler<'_>,
    name: AssetName,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    info!("Importing node {name}");

    let data = source.query(&format!("nodes.{name}.to_h")).await?;

    let asset_expression = format!("nodes.{name}.asset");
    let asset = source.query(&asset_expression).await?;
    let server_name = asset_name(&asset)
        .ok_or_else(|| ImportError::unexpected(&asset_expression, "a named asset", &asset))?;
    let group_name = query_str(source, &format!("nodes.{name}.group.name")).await?;

    let server = catalog.hardware.find_server(server_name).await.map_err(|e| {
        ImportError::dangling(e, AssetKind::Node, &name, AssetKind::Server, server_name)
    })?;
    let group = catalog.node.find_group(&group_name).await.map_err(|e| {
        ImportError::dangling(e, AssetKind::Node, &name, AssetKind::Group, &group_name)
    })?;

    let genders: Vec<String> = data
        .get("genders")
        .and_then(Value::as_array)
        .map(|genders| {
            genders
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let node = catalog
        .node
        .create_node(CreateNode {
            name,
            data,
            server_id: server.id,
            group_id: group.id,
        })
        .await?;
    summary.record_created(AssetKind::Node);

    info!("Creating/associating genders for node {}: {}", node.name, genders.join(", "));
    let mut tagged = BTreeSet::new();
    for gender_name in genders {
        if !tagged.insert(gender_name.clone()) {
            continue;
        }
        let (gender, created) = catalog.node.find_or_create_gender(&gender_name).await?;
        if created {
            debug!(gender = %gender.name, "Created gender");
            summary.genders_created += 1;
        }
        catalog.node.tag_node(gender.id, node.id).await?;
    }

    let rendered_expression = format!("nodes.{}.config.networks", node.name);
    let rendered = match source.query(&rendered_expression).await? {
        Value::Object(networks) => networks,
        Value::Null => Map::new(),
        other => {
            return Err(ImportError::unexpected(&rendered_expression, "an object", &other));
        }
    };

    reconciler
        .reconcile(&node, &rendered, summary)
        .instrument(info_span!("reconcile", node = %node.name))
        .await
}
