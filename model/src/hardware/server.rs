use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "server")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: AssetName,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
    pub chassis_id: AssetId,
    #[sea_orm(unique)]
    pub oob_id: AssetId,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chassis::Entity",
        from = "Column::ChassisId",
        to = "super::chassis::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Chassis,
    #[sea_orm(
        belongs_to = "crate::network::oob::Entity",
        from = "Column::OobId",
        to = "crate::network::oob::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Oob,
    #[sea_orm(has_many = "super::network_adapter::Entity")]
    NetworkAdapter,
    #[sea_orm(has_many = "crate::node::Entity")]
    Node,
}

impl Related<super::chassis::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chassis.def()
    }
}

impl Related<crate::network::oob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Oob.def()
    }
}

impl Related<super::network_adapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkAdapter.def()
    }
}

impl Related<crate::node::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Node.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateServer {
    pub name: AssetName,
    pub data: Json,
    pub chassis_id: AssetId,
    pub oob_id: AssetId,
}

impl From<CreateServer> for ActiveModel {
    fn from(req: CreateServer) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            data: Set(req.data),
            chassis_id: Set(req.chassis_id),
            oob_id: Set(req.oob_id),
        }
    }
}
