//! Networks and the assets attached to them: switches, PDUs, out-of-band
//! controllers and the cables connecting adapter ports to switches.

pub mod network_connection;
pub mod network_switch;
pub mod oob;
pub mod pdu;

use crate::asset::{AssetId, AssetName};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "network")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    #[sea_orm(unique)]
    pub name: AssetName,
    pub cable_colour: String,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "oob::Entity")]
    Oob,
    #[sea_orm(has_many = "network_connection::Entity")]
    NetworkConnection,
}

impl Related<oob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Oob.def()
    }
}

impl Related<network_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkConnection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateNetwork {
    pub name: AssetName,
    pub cable_colour: String,
    pub data: Json,
}

impl From<CreateNetwork> for ActiveModel {
    fn from(req: CreateNetwork) -> Self {
        Self {
            id: NotSet,
            name: Set(req.name),
            cable_colour: Set(req.cable_colour),
            data: Set(req.data),
        }
    }
}
