use model::asset::{AssetId, AssetKind, AssetName};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: AssetKind, name: AssetName },

    #[error("Network connection {id} not found")]
    ConnectionNotFound { id: AssetId },

    #[error("Cannot create {kind} '{name}' without its {reference}")]
    MissingReference {
        kind: AssetKind,
        name: AssetName,
        reference: &'static str,
    },

    #[error("{0} assets are not created through the generic import path")]
    Unsupported(AssetKind),
}
