//! Free-form classification tags, created the first time a node uses them.

use crate::asset::AssetId;
use sea_orm::entity::prelude::*;

pub type GenderName = String;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "gender")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: GenderName,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::Entity> for Entity {
    fn to() -> RelationDef {
        super::gender_node::Relation::Node.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::gender_node::Relation::Gender.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
