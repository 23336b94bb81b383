//! Out-of-band management controllers (BMCs for servers).
//!
//! The owning asset holds the `oob_id` rather than the other way around: every
//! asset with an OOB must have one, while an OOB belongs to exactly one of a
//! server, switch or PDU. Keeping the reference on the asset side lets the
//! non-nullable column enforce that.

use crate::asset::AssetId;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "oob")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
    pub network_id: AssetId,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Entity",
        from = "Column::NetworkId",
        to = "super::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Network,
}

impl Related<super::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Network.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateOob {
    pub data: Json,
    pub network_id: AssetId,
}

impl From<CreateOob> for ActiveModel {
    fn from(req: CreateOob) -> Self {
        Self {
            id: NotSet,
            data: Set(req.data),
            network_id: Set(req.network_id),
        }
    }
}
