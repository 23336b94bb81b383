use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "network_switch")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: AssetName,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
    #[sea_orm(unique)]
    pub oob_id: AssetId,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::oob::Entity",
        from = "Column::OobId",
        to = "super::oob::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Oob,
    #[sea_orm(has_many = "super::network_connection::Entity")]
    NetworkConnection,
}

impl Related<super::oob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Oob.def()
    }
}

impl Related<super::network_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkConnection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateNetworkSwitch {
    pub name: AssetName,
    pub data: Json,
    pub oob_id: AssetId,
}

impl From<CreateNetworkSwitch> for ActiveModel {
    fn from(req: CreateNetworkSwitch) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            data: Set(req.data),
            oob_id: Set(req.oob_id),
        }
    }
}
