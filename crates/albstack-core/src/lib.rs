pub mod builder;
pub mod config;
pub mod naming;
pub mod types;

pub use builder::{build_container_service, build_execution_identity, build_table, build_topology};
pub use config::DeployConfig;
pub use types::*;
