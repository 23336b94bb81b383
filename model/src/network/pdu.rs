use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pdu")]
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
}

impl Related<super::oob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Oob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreatePdu {
    pub name: AssetName,
    pub data: Json,
    pub oob_id: AssetId,
}

impl From<CreatePdu> for ActiveModel {
    fn from(req: CreatePdu) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            data: Set(req.data),
            oob_id: Set(req.oob_id),
        }
    }
}
