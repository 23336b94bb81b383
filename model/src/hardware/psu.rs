use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "psu")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: AssetName,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
    pub chassis_id: Option<AssetId>,
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
}

impl Related<super::chassis::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chassis.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreatePsu {
    pub name: AssetName,
    pub data: Json,
    pub chassis_id: Option<AssetId>,
}

impl From<CreatePsu> for ActiveModel {
    fn from(req: CreatePsu) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            data: Set(req.data),
            chassis_id: Set(req.chassis_id),
        }
    }
}
