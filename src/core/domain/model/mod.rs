pub mod availability;
pub mod client_config;
pub mod cluster;
pub mod dashboard_connection;
pub mod host;
pub mod inventory_snapshot;
pub mod statistics;
pub mod virtual_machine;
pub mod vm_action;
