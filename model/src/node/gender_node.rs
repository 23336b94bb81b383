use crate::asset::AssetId;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "gender_node")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub gender_id: AssetId,
    #[sea_orm(primary_key, auto_increment = false)]
    pub node_id: AssetId,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gender::Entity",
        from = "Column::GenderId",
        to = "super::gender::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Gender,
    #[sea_orm(
        belongs_to = "super::Entity",
        from = "Column::NodeId",
        to = "super::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Node,
}

impl ActiveModelBehavior for ActiveModel {}
