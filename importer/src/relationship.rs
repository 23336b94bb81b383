//! Parent/child relationships declared inside raw asset records.
//!
//! A parent lists its children by reference under the children's plural key
//! (a chassis record carries `servers: ["^s1", ...]`). Children do not point
//! back, so the listing is inverted into a child → parent table that the
//! child kind's import consumes.

use crate::errors::ImportError;
use crate::reference::resolve;
use model::asset::{AssetKind, AssetName};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use strum::Display;
use tracing::debug;

/// Child name → parent name.
pub type ParentMap = BTreeMap<AssetName, AssetName>;

/// What to do when two parents list the same child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Abort the run.
    #[default]
    Reject,
    /// The parent seen last keeps the child.
    LastWriteWins,
}

/// `(child, parent)` pairs for every child `parent` lists under `child_key`.
/// A missing or non-list entry declares no children; non-string entries are
/// ignored.
pub fn extract(parent: &str, data: &Value, child_key: &str) -> Vec<(AssetName, AssetName)> {
    let Some(tokens) = data.get(child_key).and_then(Value::as_array) else {
        return Vec::new();
    };

    tokens
        .iter()
        .filter_map(Value::as_str)
        .map(|token| (resolve(token).to_owned(), parent.to_owned()))
        .collect()
}

/// Merges the pairs extracted from all parents of one kind into a single
/// table for children of `kind`.
pub fn merge(
    kind: AssetKind,
    pairs: impl IntoIterator<Item = (AssetName, AssetName)>,
    policy: CollisionPolicy,
) -> Result<ParentMap, ImportError> {
    let mut parents = ParentMap::new();

    for (child, parent) in pairs {
        match parents.entry(child) {
            Entry::Vacant(entry) => {
                entry.insert(parent);
            }
            Entry::Occupied(entry) if *entry.get() == parent => {}
            Entry::Occupied(mut entry) => match policy {
                CollisionPolicy::Reject => {
                    return Err(ImportError::ParentCollision {
                        kind,
                        child: entry.key().clone(),
                        first: entry.get().clone(),
                        second: parent,
                    });
                }
                CollisionPolicy::LastWriteWins => {
                    debug!(
                        asset = %entry.key(),
                        kind = %kind,
                        previous = %entry.get(),
                        parent = %parent,
                        "Child listed by more than one parent, keeping the last"
                    );
                    entry.insert(parent);
                }
            },
        }
    }

    Ok(parents)
}
