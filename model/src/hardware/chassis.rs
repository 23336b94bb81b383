use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chassis")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: AssetName,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::server::Entity")]
    Server,
    #[sea_orm(has_many = "super::psu::Entity")]
    Psu,
}

impl Related<super::server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Server.def()
    }
}

impl Related<super::psu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Psu.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateChassis {
    pub name: AssetName,
    pub data: Json,
}

impl From<CreateChassis> for ActiveModel {
    fn from(req: CreateChassis) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            data: Set(req.data),
        }
    }
}
