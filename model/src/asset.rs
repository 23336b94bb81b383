//! Kinds of inventoried assets and the type-erased creation request shared by
//! every asset that is imported through the generic path.

use serde_json::Value;
use strum::{Display, EnumIter};

pub type AssetName = String;
pub type AssetId = i64;

/// Every asset type the import pipeline knows about.
///
/// Declaration order doubles as the tie-break order when the pipeline sorts
/// the asset types by their dependencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[cfg_attr(feature = "testing", derive(proptest_derive::Arbitrary))]
#[strum(serialize_all = "snake_case")]
pub enum AssetKind {
    Network,
    NetworkSwitch,
    Pdu,
    Chassis,
    Psu,
    Server,
    NetworkAdapter,
    Group,
    Node,
}

/// Attributes of an asset created through the generic import path.
///
/// `parent` and `oob` are store ids; which of them are required depends on
/// the kind the asset is created as.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateAsset {
    pub name: AssetName,
    pub data: Value,
    pub parent: Option<AssetId>,
    pub oob: Option<AssetId>,
}

impl CreateAsset {
    pub fn new(name: impl Into<AssetName>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
            parent: None,
            oob: None,
        }
    }

    pub fn with_parent(mut self, parent: AssetId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_oob(mut self, oob: AssetId) -> Self {
        self.oob = Some(oob);
        self
    }
}

/// Reads the name of a raw asset record (`metadata.name`).
pub fn asset_name(record: &Value) -> Option<&str> {
    record.pointer("/metadata/name").and_then(Value::as_str)
}

/// Manufacturer and model of a physical asset, e.g. `Dell PowerEdge R630`.
pub fn full_model(data: &Value) -> Option<String> {
    let parts: Vec<&str> = ["manufacturer", "model"]
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_str))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
