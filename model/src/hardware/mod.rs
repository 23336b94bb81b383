//! Physical assets: chassis and everything mounted in or plugged into them.

pub mod chassis;
pub mod network_adapter;
pub mod network_adapter_port;
pub mod psu;
pub mod server;
