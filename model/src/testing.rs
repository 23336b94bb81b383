//! Test utilities and proptest strategies for model types.
//!
//! This module is only available when the `testing` feature is enabled.

use crate::asset::{AssetName, CreateAsset};
use crate::hardware::chassis::CreateChassis;
use crate::network::CreateNetwork;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// Strategy for names in the style of the source of truth, e.g. `rack1-r630-3`.
pub fn arb_asset_name() -> impl Strategy<Value = AssetName> {
    proptest::string::string_regex("[a-z][a-z0-9]{1,8}(-[a-z0-9]{1,6}){0,3}").unwrap()
}

/// Strategy for `n` pairwise distinct names.
pub fn arb_unique_names(n: usize) -> impl Strategy<Value = Vec<AssetName>> {
    prop::collection::btree_set(arb_asset_name(), n)
        .prop_map(|names: BTreeSet<AssetName>| names.into_iter().collect())
}

// Strategy for the free-form attribute blob carried by physical assets
fn arb_asset_data() -> impl Strategy<Value = Value> {
    (
        prop_oneof![Just("Dell"), Just("Supermicro"), Just("HPE")],
        "[A-Z][0-9]{2,4}",
        any::<bool>(),
    )
        .prop_map(|(manufacturer, model, rack_mounted)| {
            json!({
                "manufacturer": manufacturer,
                "model": model,
                "rack_mounted": rack_mounted,
            })
        })
}

prop_compose! {
    /// Strategy for generating CreateNetwork requests.
    pub fn arb_create_network()(
        name in arb_asset_name(),
        cable_colour in prop_oneof![Just("red"), Just("blue"), Just("yellow"), Just("green")],
    ) -> CreateNetwork {
        CreateNetwork {
            name,
            cable_colour: cable_colour.to_string(),
            data: json!({}),
        }
    }
}

prop_compose! {
    /// Strategy for generating CreateChassis requests.
    pub fn arb_create_chassis()(
        name in arb_asset_name(),
        data in arb_asset_data(),
    ) -> CreateChassis {
        CreateChassis { name, data }
    }
}

prop_compose! {
    /// Strategy for generic creation requests without any references set.
    pub fn arb_create_asset()(
        name in arb_asset_name(),
        data in arb_asset_data(),
    ) -> CreateAsset {
        CreateAsset::new(name, data)
    }
}
