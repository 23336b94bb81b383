use crate::database::Database;
use model::asset::AssetId;
use model::hardware::chassis::{self, CreateChassis};
use model::hardware::network_adapter::{self, CreateNetworkAdapter};
use model::hardware::network_adapter_port::{self, CreateNetworkAdapterPort};
use model::hardware::server::{self, CreateServer};
use model::network::network_connection::{self, CreateNetworkConnection};
use model::network::network_switch::{self, CreateNetworkSwitch};
use model::network::oob::{self, CreateOob};
use model::network::{self, CreateNetwork};
use model::node::group::{self, CreateGroup};
use model::node::{self, CreateNode};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use std::future::Future;

/// Helper function to run async property tests with a fresh in-memory database.
/// Creates a new SQLite in-memory database, runs migrations, and passes the
/// resulting Database to the test function.
/// Panics are treated as test failures.
pub fn test_prop<F, Fut>(f: F)
where
    F: FnOnce(Database) -> Fut,
    Fut: Future<Output = ()>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    rt.block_on(async {
        let db = Database::for_test().await;
        f(db).await;
    });
}

pub async fn seed_network(db: &Database, name: &str) -> network::Model {
    network::ActiveModel::from(CreateNetwork {
        name: name.to_string(),
        cable_colour: "blue".to_string(),
        data: json!({}),
    })
    .insert(&db.conn)
    .await
    .expect("Seeding network should succeed")
}

pub async fn seed_oob(db: &Database, network_id: AssetId) -> oob::Model {
    oob::ActiveModel::from(CreateOob {
        data: json!({"ip": "10.10.0.1"}),
        network_id,
    })
    .insert(&db.conn)
    .await
    .expect("Seeding OOB should succeed")
}

/// Creates `server_name` in chassis `chassis_name` (creating the chassis and a
/// management network on first use).
pub async fn seed_server(db: &Database, chassis_name: &str, server_name: &str) -> server::Model {
    let network = match network::Entity::find()
        .filter(network::Column::Name.eq("mgt"))
        .one(&db.conn)
        .await
        .unwrap()
    {
        Some(network) => network,
        None => seed_network(db, "mgt").await,
    };
    let oob = seed_oob(db, network.id).await;

    let chassis = match chassis::Entity::find()
        .filter(chassis::Column::Name.eq(chassis_name))
        .one(&db.conn)
        .await
        .unwrap()
    {
        Some(chassis) => chassis,
        None => chassis::ActiveModel::from(CreateChassis {
            name: chassis_name.to_string(),
            data: json!({}),
        })
        .insert(&db.conn)
        .await
        .unwrap(),
    };

    server::ActiveModel::from(CreateServer {
        name: server_name.to_string(),
        data: json!({}),
        chassis_id: chassis.id,
        oob_id: oob.id,
    })
    .insert(&db.conn)
    .await
    .expect("Seeding server should succeed")
}

pub struct SeededConnection {
    pub network_id: AssetId,
    pub switch_id: AssetId,
    pub port_id: AssetId,
    pub connection_id: AssetId,
    pub node_id: AssetId,
}

/// One server with one single-port adapter cabled to `network_name`, plus a
/// node on that server.
pub async fn seed_connection(db: &Database, network_name: &str) -> SeededConnection {
    let server = seed_server(db, "c1", "s1").await;
    let network = seed_network(db, network_name).await;
    let switch_oob = seed_oob(db, network.id).await;

    let switch = network_switch::ActiveModel::from(CreateNetworkSwitch {
        name: "sw1".to_string(),
        data: json!({}),
        oob_id: switch_oob.id,
    })
    .insert(&db.conn)
    .await
    .unwrap();

    let adapter = network_adapter::ActiveModel::from(CreateNetworkAdapter {
        name: "s1-nic1".to_string(),
        data: json!({}),
        server_id: server.id,
    })
    .insert(&db.conn)
    .await
    .unwrap();

    let port = network_adapter_port::ActiveModel::from(CreateNetworkAdapterPort {
        network_adapter_id: adapter.id,
        number: 1,
    })
    .insert(&db.conn)
    .await
    .unwrap();

    let connection = network_connection::ActiveModel::from(CreateNetworkConnection {
        network_id: network.id,
        network_adapter_port_id: port.id,
        network_switch_id: switch.id,
    })
    .insert(&db.conn)
    .await
    .unwrap();

    let group = group::ActiveModel::from(CreateGroup {
        name: "nodes".to_string(),
        data: json!({}),
    })
    .insert(&db.conn)
    .await
    .unwrap();

    let node = node::ActiveModel::from(CreateNode {
        name: "node01".to_string(),
        data: json!({}),
        server_id: server.id,
        group_id: group.id,
    })
    .insert(&db.conn)
    .await
    .unwrap();

    SeededConnection {
        network_id: network.id,
        switch_id: switch.id,
        port_id: port.id,
        connection_id: connection.id,
        node_id: node.id,
    }
}
