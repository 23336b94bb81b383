//! Logical assets: nodes (the operating system instances running on servers),
//! the groups they are configured through and their gender tags.

pub mod gender;
pub mod gender_node;
pub mod group;

use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "node")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: AssetName,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
    pub server_id: AssetId,
    pub group_id: AssetId,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::hardware::server::Entity",
        from = "Column::ServerId",
        to = "crate::hardware::server::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Server,
    #[sea_orm(
        belongs_to = "group::Entity",
        from = "Column::GroupId",
        to = "group::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Group,
    #[sea_orm(has_many = "crate::network::network_connection::Entity")]
    NetworkConnection,
}

impl Related<crate::hardware::server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Server.def()
    }
}

impl Related<group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<crate::network::network_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkConnection.def()
    }
}

impl Related<gender::Entity> for Entity {
    fn to() -> RelationDef {
        gender_node::Relation::Gender.def()
    }

    fn via() -> Option<RelationDef> {
        Some(gender_node::Relation::Node.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateNode {
    pub name: AssetName,
    pub data: Json,
    pub server_id: AssetId,
    pub group_id: AssetId,
}

impl From<CreateNode> for ActiveModel {
    fn from(req: CreateNode) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            data: Set(req.data),
            server_id: Set(req.server_id),
            group_id: Set(req.group_id),
        }
    }
}
