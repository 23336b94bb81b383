pub mod catalog_errors;
pub mod database;
pub mod hardware_catalog;
pub mod network_catalog;
pub mod node_catalog;

#[cfg(test)]
mod test_utils;

pub use catalog_errors::CatalogError;

use database::{Database, StoreBackend, StoreError};
use hardware_catalog::HardwareCatalog;
use model::asset::{AssetId, AssetKind, CreateAsset};
use model::hardware::chassis::CreateChassis;
use model::hardware::network_adapter::CreateNetworkAdapter;
use model::hardware::psu::CreatePsu;
use model::hardware::server::CreateServer;
use model::network::network_switch::CreateNetworkSwitch;
use model::network::pdu::CreatePdu;
use network_catalog::NetworkCatalog;
use node_catalog::NodeCatalog;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

/// Facade providing access to all catalog types.
///
/// Each catalog manages a specific domain (networks, hardware, nodes) while
/// sharing the same underlying database connection.
#[derive(Clone)]
pub struct Catalog {
    pub network: Arc<NetworkCatalog>,
    pub hardware: Arc<HardwareCatalog>,
    pub node: Arc<NodeCatalog>,
    db: Database,
}

impl Catalog {
    pub fn from(db: Database) -> Self {
        Self {
            network: NetworkCatalog::from(db.clone()),
            hardware: HardwareCatalog::from(db.clone()),
            node: NodeCatalog::from(db.clone()),
            db,
        }
    }

    /// Connects to `backend` and brings the schema up to date.
    pub async fn connect(backend: StoreBackend) -> Result<Self, StoreError> {
        let db = Database::with(backend).await?;
        db.migrate().await?;
        Ok(Self::from(db))
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect(StoreBackend::Memory).await
    }

    #[cfg(test)]
    pub async fn for_test() -> Self {
        Self::from(Database::for_test().await)
    }

    pub fn endpoint(&self) -> &str {
        &self.db.endpoint
    }

    /// Empties every table.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.db.reset().await
    }

    /// All rows of one table.
    pub async fn all<E: EntityTrait>(&self) -> Result<Vec<E::Model>, CatalogError> {
        E::find().all(&self.db.conn).await.map_err(Into::into)
    }

    /// Creates an asset imported through the generic path. Psus may lack a
    /// parent; servers, switches and PDUs must come with their OOB.
    pub async fn create_asset(
        &self,
        kind: AssetKind,
        req: CreateAsset,
    ) -> Result<AssetId, CatalogError> {
        let missing = |reference| CatalogError::MissingReference {
            kind,
            name: req.name.clone(),
            reference,
        };

        let id = match kind {
            AssetKind::Chassis => {
                self.hardware
                    .create_chassis(CreateChassis {
                        name: req.name,
                        data: req.data,
                    })
                    .await?
                    .id
            }
            AssetKind::Psu => {
                self.hardware
                    .create_psu(CreatePsu {
                        name: req.name,
                        data: req.data,
                        chassis_id: req.parent,
                    })
                    .await?
                    .id
            }
            AssetKind::Server => {
                let chassis_id = req.parent.ok_or_else(|| missing("chassis"))?;
                let oob_id = req.oob.ok_or_else(|| missing("oob"))?;
                self.hardware
                    .create_server(CreateServer {
                        name: req.name,
                        data: req.data,
                        chassis_id,
                        oob_id,
                    })
                    .await?
                    .id
            }
            AssetKind::NetworkAdapter => {
                let server_id = req.parent.ok_or_else(|| missing("server"))?;
                self.hardware
                    .create_network_adapter(CreateNetworkAdapter {
                        name: req.name,
                        data: req.data,
                        server_id,
                    })
                    .await?
                    .id
            }
            AssetKind::NetworkSwitch => {
                let oob_id = req.oob.ok_or_else(|| missing("oob"))?;
                self.network
                    .create_network_switch(CreateNetworkSwitch {
                        name: req.name,
                        data: req.data,
                        oob_id,
                    })
                    .await?
                    .id
            }
            AssetKind::Pdu => {
                let oob_id = req.oob.ok_or_else(|| missing("oob"))?;
                self.network
                    .create_pdu(CreatePdu {
                        name: req.name,
                        data: req.data,
                        oob_id,
                    })
                    .await?
                    .id
            }
            AssetKind::Network | AssetKind::Group | AssetKind::Node => {
                return Err(CatalogError::Unsupported(kind));
            }
        };
        Ok(id)
    }

    /// Looks up the id of the asset of `kind` named `name`.
    pub async fn find_asset_id(&self, kind: AssetKind, name: &str) -> Result<AssetId, CatalogError> {
        let id = match kind {
            AssetKind::Network => self.network.find_network(name).await?.id,
            AssetKind::NetworkSwitch => self.network.find_network_switch(name).await?.id,
            AssetKind::Pdu => self.network.find_pdu(name).await?.id,
            AssetKind::Chassis => self.hardware.find_chassis(name).await?.id,
            AssetKind::Psu => self.hardware.find_psu(name).await?.id,
            AssetKind::Server => self.hardware.find_server(name).await?.id,
            AssetKind::NetworkAdapter => self.hardware.find_network_adapter(name).await?.id,
            AssetKind::Group => self.node.find_group(name).await?.id,
            AssetKind::Node => self.node.find_node(name).await?.id,
        };
        Ok(id)
    }
}

pub(crate) async fn find_by_name<E>(
    conn: &DatabaseConnection,
    kind: AssetKind,
    column: E::Column,
    name: &str,
) -> Result<E::Model, CatalogError>
where
    E: EntityTrait,
{
    E::find()
        .filter(column.eq(name))
        .one(conn)
        .await?
        .ok_or_else(|| CatalogError::NotFound {
            kind,
            name: name.to_owned(),
        })
}
