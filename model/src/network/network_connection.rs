//! A single cable from a network adapter port to a switch on a network.
//!
//! Connections are created from the hardware declarations alone; the node
//! that uses the connection and the interface name it knows it by are filled
//! in afterwards, once the node's rendered configuration agrees with the
//! cabling.

use crate::asset::AssetId;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::Condition;
use sea_orm::entity::prelude::*;

pub type InterfaceName = String;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "network_connection")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: AssetId,
    pub network_id: AssetId,
    #[sea_orm(unique)]
    pub network_adapter_port_id: AssetId,
    pub network_switch_id: AssetId,
    pub node_id: Option<AssetId>,
    pub interface: Option<InterfaceName>,
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
    #[sea_orm(
        belongs_to = "crate::hardware::network_adapter_port::Entity",
        from = "Column::NetworkAdapterPortId",
        to = "crate::hardware::network_adapter_port::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    NetworkAdapterPort,
    #[sea_orm(
        belongs_to = "super::network_switch::Entity",
        from = "Column::NetworkSwitchId",
        to = "super::network_switch::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    NetworkSwitch,
    #[sea_orm(
        belongs_to = "crate::node::Entity",
        from = "Column::NodeId",
        to = "crate::node::Column::Id",
        on_update = "Restrict",
        on_delete = "SetNull"
    )]
    Node,
}

impl Related<super::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Network.def()
    }
}

impl Related<crate::hardware::network_adapter_port::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkAdapterPort.def()
    }
}

impl Related<super::network_switch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkSwitch.def()
    }
}

impl Related<crate::node::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Node.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateNetworkConnection {
    pub network_id: AssetId,
    pub network_adapter_port_id: AssetId,
    pub network_switch_id: AssetId,
}

impl From<CreateNetworkConnection> for ActiveModel {
    fn from(req: CreateNetworkConnection) -> Self {
        Self {
            id: NotSet,
            network_id: Set(req.network_id),
            network_adapter_port_id: Set(req.network_adapter_port_id),
            network_switch_id: Set(req.network_switch_id),
            node_id: Set(None),
            interface: Set(None),
        }
    }
}

/// Associates an existing connection with the node using it.
#[derive(Clone, Debug)]
pub struct AssignNode {
    pub connection_id: AssetId,
    pub node_id: AssetId,
    pub interface: InterfaceName,
}

#[derive(Clone, Debug, Default)]
pub struct GetNetworkConnection {
    pub port_ids: Option<Vec<AssetId>>,
    pub network_id: Option<AssetId>,
    pub node_id: Option<AssetId>,
}

impl GetNetworkConnection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_port_ids(mut self, port_ids: Vec<AssetId>) -> Self {
        self.port_ids = Some(port_ids);
        self
    }

    pub fn with_network_id(mut self, network_id: AssetId) -> Self {
        self.network_id = Some(network_id);
        self
    }

    pub fn with_node_id(mut self, node_id: AssetId) -> Self {
        self.node_id = Some(node_id);
        self
    }
}

impl crate::IntoCondition for GetNetworkConnection {
    fn into_condition(self) -> Condition {
        Condition::all()
            .add_option(self.port_ids.map(|v| Column::NetworkAdapterPortId.is_in(v)))
            .add_option(self.network_id.map(|v| Column::NetworkId.eq(v)))
            .add_option(self.node_id.map(|v| Column::NodeId.eq(v)))
    }
}
