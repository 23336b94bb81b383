use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "network_adapter")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: AssetName,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
    pub server_id: AssetId,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::server::Entity",
        from = "Column::ServerId",
        to = "super::server::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Server,
    #[sea_orm(has_many = "super::network_adapter_port::Entity")]
    NetworkAdapterPort,
}

impl Related<super::server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Server.def()
    }
}

impl Related<super::network_adapter_port::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkAdapterPort.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateNetworkAdapter {
    pub name: AssetName,
    pub data: Json,
    pub server_id: AssetId,
}

impl From<CreateNetworkAdapter> for ActiveModel {
    fn from(req: CreateNetworkAdapter) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            data: Set(req.data),
            server_id: Set(req.server_id),
        }
    }
}
