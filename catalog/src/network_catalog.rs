use crate::catalog_errors::CatalogError;
use crate::database::Database;
use crate::find_by_name;
use model::IntoCondition;
use model::asset::AssetKind;
use model::network::network_connection::{
    self, AssignNode, CreateNetworkConnection, Entity as NetworkConnectionEntity,
    GetNetworkConnection,
};
use model::network::network_switch::{self, CreateNetworkSwitch, Entity as NetworkSwitchEntity};
use model::network::oob::{self, CreateOob};
use model::network::pdu::{self, CreatePdu, Entity as PduEntity};
use model::network::{self, CreateNetwork, Entity as NetworkEntity};
use sea_orm::{ActiveModelTrait, ActiveValue, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;

/// Networks, the out-of-band controllers and switches/PDUs attached to them,
/// and the cables between adapter ports and switches.
pub struct NetworkCatalog {
    db: Database,
}

impl NetworkCatalog {
    pub fn from(db: Database) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn create_network(&self, req: CreateNetwork) -> Result<network::Model, CatalogError> {
        network::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_network(&self, name: &str) -> Result<network::Model, CatalogError> {
        find_by_name::<NetworkEntity>(
            &self.db.conn,
            AssetKind::Network,
            network::Column::Name,
            name,
        )
        .await
    }

    pub async fn create_oob(&self, req: CreateOob) -> Result<oob::Model, CatalogError> {
        oob::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn create_network_switch(
        &self,
        req: CreateNetworkSwitch,
    ) -> Result<network_switch::Model, CatalogError> {
        network_switch::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_network_switch(
        &self,
        name: &str,
    ) -> Result<network_switch::Model, CatalogError> {
        find_by_name::<NetworkSwitchEntity>(
            &self.db.conn,
            AssetKind::NetworkSwitch,
            network_switch::Column::Name,
            name,
        )
        .await
    }

    pub async fn create_pdu(&self, req: CreatePdu) -> Result<pdu::Model, CatalogError> {
        pdu::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_pdu(&self, name: &str) -> Result<pdu::Model, CatalogError> {
        find_by_name::<PduEntity>(&self.db.conn, AssetKind::Pdu, pdu::Column::Name, name).await
    }

    pub async fn create_connection(
        &self,
        req: CreateNetworkConnection,
    ) -> Result<network_connection::Model, CatalogError> {
        network_connection::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    /// Connections matching `req`, each paired with the network it is on,
    /// in creation order.
    pub async fn get_connections(
        &self,
        req: GetNetworkConnection,
    ) -> Result<Vec<(network_connection::Model, network::Model)>, CatalogError> {
        Ok(NetworkConnectionEntity::find()
            .filter(req.into_condition())
            .order_by_asc(network_connection::Column::Id)
            .find_also_related(NetworkEntity)
            .all(&self.db.conn)
            .await?
            .into_iter()
            .filter_map(|(connection, network)| network.map(|network| (connection, network)))
            .collect())
    }

    /// Records which node uses a connection and under which interface name.
    pub async fn assign_node(
        &self,
        req: AssignNode,
    ) -> Result<network_connection::Model, CatalogError> {
        let model = network_connection::ActiveModel {
            id: ActiveValue::Unchanged(req.connection_id),
            node_id: Set(Some(req.node_id)),
            interface: Set(Some(req.interface)),
            ..Default::default()
        };

        model.update(&self.db.conn).await.map_err(|e| match e {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => {
                CatalogError::ConnectionNotFound {
                    id: req.connection_id,
                }
            }
            e => e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_connection, seed_network, seed_oob, test_prop};
    use model::testing::arb_create_network;
    use proptest::proptest;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_find_network() {
        let catalog = NetworkCatalog::from(Database::for_test().await);

        let created = catalog
            .create_network(CreateNetwork {
                name: "pri".to_string(),
                cable_colour: "blue".to_string(),
                data: json!({"metadata": {"name": "pri"}}),
            })
            .await
            .expect("Network creation should succeed");

        let found = catalog
            .find_network("pri")
            .await
            .expect("Network should be found by name");
        assert_eq!(found, created);
        assert_eq!(found.cable_colour, "blue");
    }

    #[tokio::test]
    async fn test_find_missing_network() {
        let catalog = NetworkCatalog::from(Database::for_test().await);

        let err = catalog.find_network("mgt").await.unwrap_err();
        assert!(
            matches!(
                &err,
                CatalogError::NotFound { kind: AssetKind::Network, name } if name == "mgt"
            ),
            "Unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn test_oob_requires_network() {
        let catalog = NetworkCatalog::from(Database::for_test().await);

        let result = catalog
            .create_oob(CreateOob {
                data: json!({}),
                network_id: 42,
            })
            .await;
        assert!(result.is_err(), "OOB on a missing network should be rejected");
    }

    #[tokio::test]
    async fn test_switch_oob_is_exclusive() {
        let db = Database::for_test().await;
        let catalog = NetworkCatalog::from(db.clone());
        let network = seed_network(&db, "mgt").await;
        let oob = seed_oob(&db, network.id).await;

        catalog
            .create_network_switch(CreateNetworkSwitch {
                name: "sw1".to_string(),
                data: json!({}),
                oob_id: oob.id,
            })
            .await
            .expect("Switch creation should succeed");

        assert!(
            catalog
                .create_network_switch(CreateNetworkSwitch {
                    name: "sw2".to_string(),
                    data: json!({}),
                    oob_id: oob.id,
                })
                .await
                .is_err(),
            "Two switches cannot share an OOB"
        );
    }

    #[tokio::test]
    async fn test_assign_node_to_connection() {
        let db = Database::for_test().await;
        let catalog = NetworkCatalog::from(db.clone());
        let seeded = seed_connection(&db, "pri").await;

        let unassigned = catalog
            .get_connections(GetNetworkConnection::all().with_port_ids(vec![seeded.port_id]))
            .await
            .unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].1.name, "pri");
        assert_eq!(unassigned[0].0.node_id, None);
        assert_eq!(unassigned[0].0.interface, None);

        let assigned = catalog
            .assign_node(AssignNode {
                connection_id: seeded.connection_id,
                node_id: seeded.node_id,
                interface: "eth0".to_string(),
            })
            .await
            .expect("Assigning a node should succeed");
        assert_eq!(assigned.node_id, Some(seeded.node_id));
        assert_eq!(assigned.interface.as_deref(), Some("eth0"));
        assert_eq!(assigned.network_adapter_port_id, seeded.port_id);

        let by_node = catalog
            .get_connections(GetNetworkConnection::all().with_node_id(seeded.node_id))
            .await
            .unwrap();
        assert_eq!(by_node.len(), 1);
    }

    #[tokio::test]
    async fn test_assign_node_to_missing_connection() {
        let db = Database::for_test().await;
        let catalog = NetworkCatalog::from(db.clone());
        let seeded = seed_connection(&db, "pri").await;

        let result = catalog
            .assign_node(AssignNode {
                connection_id: seeded.connection_id + 100,
                node_id: seeded.node_id,
                interface: "eth0".to_string(),
            })
            .await;
        assert!(result.is_err(), "Updating a missing connection should fail");
    }

    #[tokio::test]
    async fn test_port_has_at_most_one_connection() {
        let db = Database::for_test().await;
        let catalog = NetworkCatalog::from(db.clone());
        let seeded = seed_connection(&db, "pri").await;

        let result = catalog
            .create_connection(CreateNetworkConnection {
                network_id: seeded.network_id,
                network_adapter_port_id: seeded.port_id,
                network_switch_id: seeded.switch_id,
            })
            .await;
        assert!(result.is_err(), "A second cable on one port should be rejected");
    }

    async fn prop_network_name_unique(db: Database, req: CreateNetwork) {
        let catalog = NetworkCatalog::from(db);

        catalog
            .create_network(req.clone())
            .await
            .expect("First network creation should succeed");

        assert!(
            catalog.create_network(req.clone()).await.is_err(),
            "Duplicate network name '{}' should be rejected",
            req.name
        );
    }

    proptest! {
        #[test]
        fn network_name_unique(req in arb_create_network()) {
            test_prop(|db| async move {
                prop_network_name_unique(db, req).await;
            });
        }
    }
}
