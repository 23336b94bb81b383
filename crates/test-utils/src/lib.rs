//! Test utilities for the inventory crates.
//! Renders inventories into the responses the source of truth gives for each
//! query expression, and provides proptest strategies for well-formed ones.

use proptest::prelude::prop;
use proptest::strategy::Strategy;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

// Re-export proptest for convenience
pub use proptest;

pub fn reference(name: &str) -> String {
    format!("^{name}")
}

fn record(name: &str, fields: Value) -> Value {
    let mut record = match fields {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    record.insert("metadata".to_owned(), json!({ "name": name }));
    Value::Object(record)
}

fn oob(network: &str) -> Value {
    json!({ "network": reference(network), "ip": "10.10.0.1" })
}

fn references(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| reference(name)).collect()
}

/// A port cabled to `network` through `switch`.
pub fn cabled_port(network: &str, switch: &str) -> Value {
    json!({ "network": reference(network), "switch": reference(switch) })
}

/// A port without a cable.
pub fn bare_port() -> Value {
    json!({})
}

#[derive(Clone, Debug)]
pub struct NodeFixture {
    name: String,
    server: String,
    group: String,
    genders: Vec<String>,
    networks: Map<String, Value>,
}

impl NodeFixture {
    pub fn new(name: &str, server: &str, group: &str) -> Self {
        Self {
            name: name.to_owned(),
            server: server.to_owned(),
            group: group.to_owned(),
            genders: Vec::new(),
            networks: Map::new(),
        }
    }

    pub fn gender(mut self, gender: &str) -> Self {
        self.genders.push(gender.to_owned());
        self
    }

    /// Renders `network` on the node under `interface`.
    pub fn network(self, network: &str, interface: &str) -> Self {
        self.rendered(network, json!({ "interface": interface, "defined": true }))
    }

    pub fn undefined_network(self, network: &str) -> Self {
        self.rendered(network, json!({ "defined": false }))
    }

    /// Renders `network` with an arbitrary configuration record.
    pub fn rendered(mut self, network: &str, config: Value) -> Self {
        self.networks.insert(network.to_owned(), config);
        self
    }
}

/// A raw inventory, built up record by record.
#[derive(Clone, Debug, Default)]
pub struct InventoryFixture {
    networks: Vec<Value>,
    switches: Vec<Value>,
    pdus: Vec<Value>,
    chassis: Vec<Value>,
    psus: Vec<Value>,
    servers: Vec<Value>,
    adapters: Vec<Value>,
    groups: Vec<String>,
    nodes: Vec<NodeFixture>,
    listed_only: Vec<String>,
    overrides: BTreeMap<String, Value>,
}

impl InventoryFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network(mut self, name: &str, cable_colour: &str) -> Self {
        self.networks
            .push(record(name, json!({ "cable_colour": cable_colour })));
        self
    }

    pub fn switch(mut self, name: &str, oob_network: &str) -> Self {
        self.switches.push(record(
            name,
            json!({ "model": "Cumulus 4048", "oob": oob(oob_network) }),
        ));
        self
    }

    pub fn pdu(mut self, name: &str, oob_network: &str) -> Self {
        self.pdus.push(record(name, json!({ "oob": oob(oob_network) })));
        self
    }

    pub fn chassis(mut self, name: &str, servers: &[&str], psus: &[&str]) -> Self {
        self.chassis.push(record(
            name,
            json!({
                "manufacturer": "Dell",
                "model": "PowerEdge C6320",
                "servers": references(servers),
                "psus": references(psus),
            }),
        ));
        self
    }

    pub fn psu(mut self, name: &str) -> Self {
        self.psus.push(record(name, json!({ "watts": 1600 })));
        self
    }

    pub fn server(mut self, name: &str, oob_network: &str, adapters: &[&str]) -> Self {
        self.servers.push(record(
            name,
            json!({
                "manufacturer": "Dell",
                "model": "PowerEdge C6320 node",
                "network_adapters": references(adapters),
                "oob": oob(oob_network),
            }),
        ));
        self
    }

    /// An adapter listing its ports in order.
    pub fn adapter(mut self, name: &str, ports: Vec<Value>) -> Self {
        self.adapters
            .push(record(name, json!({ "model": "X520", "ports": ports })));
        self
    }

    /// An adapter listing its ports by interface name, in order.
    pub fn adapter_by_interface(mut self, name: &str, ports: Vec<(&str, Value)>) -> Self {
        let ports: Map<String, Value> = ports
            .into_iter()
            .map(|(interface, port)| (interface.to_owned(), port))
            .collect();
        self.adapters
            .push(record(name, json!({ "model": "X520", "ports": ports })));
        self
    }

    pub fn group(mut self, name: &str) -> Self {
        self.groups.push(name.to_owned());
        self
    }

    pub fn node(mut self, node: NodeFixture) -> Self {
        self.nodes.push(node);
        self
    }

    /// A node name that is listed, but has nothing else recorded.
    pub fn listed_node(mut self, name: &str) -> Self {
        self.listed_only.push(name.to_owned());
        self
    }

    /// Replaces the response to `expression`.
    pub fn respond(mut self, expression: &str, response: Value) -> Self {
        self.overrides.insert(expression.to_owned(), response);
        self
    }

    /// Expression → response for every query an import issues.
    pub fn render(&self) -> BTreeMap<String, Value> {
        let mut responses = BTreeMap::from([
            ("assets.networks".to_owned(), json!(self.networks)),
            ("assets.network_switches".to_owned(), json!(self.switches)),
            ("assets.pdus".to_owned(), json!(self.pdus)),
            ("assets.chassis".to_owned(), json!(self.chassis)),
            ("assets.psus".to_owned(), json!(self.psus)),
            ("assets.servers".to_owned(), json!(self.servers)),
            ("assets.network_adapters".to_owned(), json!(self.adapters)),
            ("groups.map(&:name)".to_owned(), json!(self.groups)),
        ]);

        for group in &self.groups {
            responses.insert(
                format!("groups.{group}.to_h"),
                json!({ "name": group, "answers": {} }),
            );
        }

        let node_names: Vec<&str> = self
            .listed_only
            .iter()
            .map(String::as_str)
            .chain(self.nodes.iter().map(|node| node.name.as_str()))
            .collect();
        responses.insert("nodes.map(&:name)".to_owned(), json!(node_names));

        for node in &self.nodes {
            let name = &node.name;
            responses.insert(
                format!("nodes.{name}.to_h"),
                json!({ "name": name, "genders": node.genders }),
            );
            responses.insert(
                format!("nodes.{name}.asset"),
                json!({ "metadata": { "name": node.server } }),
            );
            responses.insert(format!("nodes.{name}.group.name"), json!(node.group));
            responses.insert(
                format!("nodes.{name}.config.networks"),
                Value::Object(node.networks.clone()),
            );
        }

        responses.extend(self.overrides.clone());
        responses
    }
}

/// A random inventory together with what importing it has to produce.
#[derive(Clone, Debug)]
pub struct GeneratedInventory {
    pub fixture: InventoryFixture,
    pub chassis: usize,
    pub servers: usize,
    pub adapters: usize,
    pub ports: usize,
    pub cabled_ports: usize,
    /// Networks rendered on nodes, all of them reachable.
    pub rendered_networks: usize,
}

pub const DATA_NETWORKS: usize = 3;

/// Per chassis, per server, per adapter: the data network each port is
/// cabled to, if any.
type Shape = Vec<Vec<Vec<Vec<Option<usize>>>>>;

fn build_inventory(shape: Shape) -> GeneratedInventory {
    let mut fixture = InventoryFixture::new()
        .network("mgmt", "yellow")
        .switch("sw1", "mgmt")
        .group("compute");
    for n in 0..DATA_NETWORKS {
        fixture = fixture.network(&format!("data{n}"), "blue");
    }

    let mut generated = GeneratedInventory {
        fixture: InventoryFixture::new(),
        chassis: shape.len(),
        servers: 0,
        adapters: 0,
        ports: 0,
        cabled_ports: 0,
        rendered_networks: 0,
    };

    for (c, servers) in shape.iter().enumerate() {
        let chassis = format!("c{c}");
        let server_names: Vec<String> = (0..servers.len()).map(|s| format!("{chassis}-s{s}")).collect();
        let server_refs: Vec<&str> = server_names.iter().map(String::as_str).collect();
        fixture = fixture.chassis(&chassis, &server_refs, &[]);

        for (server, adapters) in server_names.iter().zip(servers) {
            let adapter_names: Vec<String> =
                (0..adapters.len()).map(|a| format!("{server}-a{a}")).collect();
            let adapter_refs: Vec<&str> = adapter_names.iter().map(String::as_str).collect();
            fixture = fixture.server(server, "mgmt", &adapter_refs);

            let mut node = NodeFixture::new(&format!("{server}-node"), server, "compute")
                .gender("compute");
            let mut rendered: Vec<usize> = Vec::new();

            for (adapter, ports) in adapter_names.iter().zip(adapters) {
                let port_records = ports
                    .iter()
                    .map(|port| match port {
                        Some(n) => {
                            generated.cabled_ports += 1;
                            if !rendered.contains(n) {
                                rendered.push(*n);
                            }
                            cabled_port(&format!("data{n}"), "sw1")
                        }
                        None => bare_port(),
                    })
                    .collect();
                generated.ports += ports.len();
                fixture = fixture.adapter(adapter, port_records);
            }

            for (idx, n) in rendered.iter().enumerate() {
                node = node.network(&format!("data{n}"), &format!("eth{idx}"));
            }
            generated.rendered_networks += rendered.len();
            generated.adapters += adapters.len();
            generated.servers += 1;
            fixture = fixture.node(node);
        }
    }

    generated.fixture = fixture;
    generated
}

/// Strategy for inventories that import without warnings.
pub fn arb_inventory() -> impl Strategy<Value = GeneratedInventory> {
    let port = prop::option::of(0..DATA_NETWORKS);
    let adapter = prop::collection::vec(port, 1..4);
    let server = prop::collection::vec(adapter, 1..3);
    let chassis = prop::collection::vec(server, 1..3);
    prop::collection::vec(chassis, 1..3).prop_map(build_inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_expression() {
        let responses = InventoryFixture::new()
            .network("mgmt", "yellow")
            .group("compute")
            .listed_node("local")
            .node(NodeFixture::new("node01", "s1", "compute").network("mgmt", "eth0"))
            .render();

        assert_eq!(responses["assets.networks"][0]["metadata"]["name"], "mgmt");
        assert_eq!(responses["assets.networks"][0]["cable_colour"], "yellow");
        assert_eq!(responses["nodes.map(&:name)"], json!(["local", "node01"]));
        assert_eq!(responses["nodes.node01.asset"], json!({"metadata": {"name": "s1"}}));
        assert_eq!(responses["nodes.node01.group.name"], json!("compute"));
        assert_eq!(
            responses["nodes.node01.config.networks"],
            json!({"mgmt": {"interface": "eth0", "defined": true}})
        );
        assert!(responses.contains_key("groups.compute.to_h"));
        assert!(!responses.contains_key("nodes.local.to_h"));
    }

    #[test]
    fn test_respond_overrides() {
        let responses = InventoryFixture::new()
            .respond("assets.pdus", json!("oops"))
            .render();
        assert_eq!(responses["assets.pdus"], json!("oops"));
    }

    #[test]
    fn test_adapter_by_interface_keeps_order() {
        let responses = InventoryFixture::new()
            .adapter_by_interface("a1", vec![("eth1", bare_port()), ("eth0", bare_port())])
            .render();
        let ports = responses["assets.network_adapters"][0]["ports"]
            .as_object()
            .unwrap();
        let interfaces: Vec<&str> = ports.keys().map(String::as_str).collect();
        assert_eq!(interfaces, vec!["eth1", "eth0"]);
    }
}
