use catalog::CatalogError;
use catalog::database::StoreError;
use model::asset::{AssetId, AssetKind, AssetName};
use thiserror::Error;

/// Failures of the remote query channel.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Query '{expression}' failed ({status}): {stderr}")]
    Failed {
        expression: String,
        status: String,
        stderr: String,
    },

    #[error("Query '{expression}' did not return JSON: {source}")]
    Parse {
        expression: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expression '{0}' cannot be quoted for the remote shell")]
    Unquotable(String),

    #[error("No command configured to reach the source of truth")]
    EmptyCommand,

    #[error("No response recorded for '{0}'")]
    UnknownExpression(String),

    #[error("Failed to load fixture '{path}': {reason}")]
    Fixture { path: String, reason: String },
}

impl QueryError {
    /// Whether repeating the same query may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueryError::Spawn { .. } | QueryError::Failed { .. })
    }
}

/// Every condition that aborts an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Remote query failed: {0}")]
    Query(#[from] QueryError),

    #[error("Store operation failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Store setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Query '{expression}' returned {found}, expected {expected}")]
    UnexpectedResponse {
        expression: String,
        expected: &'static str,
        found: String,
    },

    #[error("{kind} record #{index} has no name at metadata.name")]
    MissingName { kind: AssetKind, index: usize },

    #[error("{kind} '{name}' is listed more than once")]
    DuplicateName { kind: AssetKind, name: AssetName },

    #[error("{kind} '{child}' is claimed by both '{first}' and '{second}'")]
    ParentCollision {
        kind: AssetKind,
        child: AssetName,
        first: AssetName,
        second: AssetName,
    },

    #[error("{kind} '{name}' has no oob record")]
    MissingOob { kind: AssetKind, name: AssetName },

    #[error("Oob of {kind} '{name}' does not reference a network")]
    MissingOobNetwork { kind: AssetKind, name: AssetName },

    #[error("Oob of {kind} '{name}' is on network '{network}', which does not exist")]
    OobNetworkNotFound {
        kind: AssetKind,
        name: AssetName,
        network: AssetName,
    },

    #[error("Network '{name}' has no cable_colour")]
    MissingCableColour { name: AssetName },

    #[error("{kind} '{name}' references {target_kind} '{target}', which does not exist")]
    DanglingReference {
        kind: AssetKind,
        name: AssetName,
        target_kind: AssetKind,
        target: AssetName,
    },

    #[error(
        "Node '{node}' renders network '{network}', but connection {connection_id} on it already belongs to node {claimed_by}"
    )]
    ConnectionClaimed {
        node: AssetName,
        network: AssetName,
        connection_id: AssetId,
        claimed_by: AssetId,
    },

    #[error("Node '{node}' renders network '{network}' without an interface")]
    MissingInterface { node: AssetName, network: AssetName },

    #[error("Node '{node}' renders network '{network}', which none of its server's ports reach")]
    UnreachableNetwork { node: AssetName, network: AssetName },

    #[error("Asset kinds {0:?} depend on each other")]
    DependencyCycle(Vec<AssetKind>),
}

impl ImportError {
    /// Recoverable conditions are reported as warnings in the run summary,
    /// so every returned error aborts the run.
    pub fn is_fatal(&self) -> bool {
        true
    }

    /// Maps a failed lookup of `target` on behalf of `name` to a
    /// `DanglingReference`, passing every other store failure through.
    pub(crate) fn dangling(
        err: CatalogError,
        kind: AssetKind,
        name: &str,
        target_kind: AssetKind,
        target: &str,
    ) -> Self {
        match err {
            CatalogError::NotFound { .. } => ImportError::DanglingReference {
                kind,
                name: name.to_owned(),
                target_kind,
                target: target.to_owned(),
            },
            other => ImportError::Catalog(other),
        }
    }

    pub(crate) fn unexpected(expression: &str, expected: &'static str, found: &serde_json::Value) -> Self {
        let found = match found {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        };
        ImportError::UnexpectedResponse {
            expression: expression.to_owned(),
            expected,
            found: found.to_owned(),
        }
    }
}
