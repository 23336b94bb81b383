use crate::catalog_errors::CatalogError;
use crate::database::Database;
use crate::find_by_name;
use model::asset::{AssetId, AssetKind};
use model::hardware::chassis::{self, CreateChassis, Entity as ChassisEntity};
use model::hardware::network_adapter::{self, CreateNetworkAdapter, Entity as NetworkAdapterEntity};
use model::hardware::network_adapter_port::{
    self, CreateNetworkAdapterPort, Entity as NetworkAdapterPortEntity,
};
use model::hardware::psu::{self, CreatePsu, Entity as PsuEntity};
use model::hardware::server::{self, CreateServer, Entity as ServerEntity};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

/// Chassis and the hardware mounted in them, down to individual adapter ports.
pub struct HardwareCatalog {
    db: Database,
}

impl HardwareCatalog {
    pub fn from(db: Database) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn create_chassis(&self, req: CreateChassis) -> Result<chassis::Model, CatalogError> {
        chassis::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_chassis(&self, name: &str) -> Result<chassis::Model, CatalogError> {
        find_by_name::<ChassisEntity>(
            &self.db.conn,
            AssetKind::Chassis,
            chassis::Column::Name,
            name,
        )
        .await
    }

    pub async fn create_psu(&self, req: CreatePsu) -> Result<psu::Model, CatalogError> {
        psu::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_psu(&self, name: &str) -> Result<psu::Model, CatalogError> {
        find_by_name::<PsuEntity>(&self.db.conn, AssetKind::Psu, psu::Column::Name, name).await
    }

    pub async fn create_server(&self, req: CreateServer) -> Result<server::Model, CatalogError> {
        server::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_server(&self, name: &str) -> Result<server::Model, CatalogError> {
        find_by_name::<ServerEntity>(&self.db.conn, AssetKind::Server, server::Column::Name, name)
            .await
    }

    pub async fn create_network_adapter(
        &self,
        req: CreateNetworkAdapter,
    ) -> Result<network_adapter::Model, CatalogError> {
        network_adapter::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_network_adapter(
        &self,
        name: &str,
    ) -> Result<network_adapter::Model, CatalogError> {
        find_by_name::<NetworkAdapterEntity>(
            &self.db.conn,
            AssetKind::NetworkAdapter,
            network_adapter::Column::Name,
            name,
        )
        .await
    }

    pub async fn create_port(
        &self,
        req: CreateNetworkAdapterPort,
    ) -> Result<network_adapter_port::Model, CatalogError> {
        network_adapter_port::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    /// Ports of one adapter, by port number.
    pub async fn adapter_ports(
        &self,
        network_adapter_id: AssetId,
    ) -> Result<Vec<network_adapter_port::Model>, CatalogError> {
        NetworkAdapterPortEntity::find()
            .filter(network_adapter_port::Column::NetworkAdapterId.eq(network_adapter_id))
            .order_by_asc(network_adapter_port::Column::Number)
            .all(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    /// Every port of every adapter in a server: adapters in creation order,
    /// ports by number within each adapter.
    pub async fn server_ports(
        &self,
        server_id: AssetId,
    ) -> Result<Vec<network_adapter_port::Model>, CatalogError> {
        let adapter_ids: Vec<AssetId> = NetworkAdapterEntity::find()
            .filter(network_adapter::Column::ServerId.eq(server_id))
            .order_by_asc(network_adapter::Column::Id)
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|adapter| adapter.id)
            .collect();

        if adapter_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut ports = NetworkAdapterPortEntity::find()
            .filter(network_adapter_port::Column::NetworkAdapterId.is_in(adapter_ids.clone()))
            .all(&self.db.conn)
            .await?;

        ports.sort_by_key(|port| {
            let adapter_rank = adapter_ids
                .iter()
                .position(|id| *id == port.network_adapter_id);
            (adapter_rank, port.number)
        });
        Ok(ports)
    }
}
