use crate::asset::AssetId;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

pub type PortNumber = i32;

/// A physical port of a network adapter, numbered from 1 in the order the
/// adapter lists its ports.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "network_adapter_port")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    pub number: PortNumber,
    pub network_adapter_id: AssetId,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::network_adapter::Entity",
        from = "Column::NetworkAdapterId",
        to = "super::network_adapter::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    NetworkAdapter,
    #[sea_orm(has_one = "crate::network::network_connection::Entity")]
    NetworkConnection,
}

impl Related<super::network_adapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkAdapter.def()
    }
}

impl Related<crate::network::network_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkConnection.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Set(number @ ..=0) = self.number {
            return Err(DbErr::Custom(format!(
                "Port numbers start at 1, got {number}"
            )));
        }
        Ok(self)
    }
}

#[derive(Clone, Debug)]
pub struct CreateNetworkAdapterPort {
    pub network_adapter_id: AssetId,
    pub number: PortNumber,
}

impl From<CreateNetworkAdapterPort> for ActiveModel {
    fn from(req: CreateNetworkAdapterPort) -> Self {
        Self {
            id: NotSet,
            number: Set(req.number),
            network_adapter_id: Set(req.network_adapter_id),
        }
    }
}
