//! Port traits between the domain and its collaborators.

pub mod config_port;
pub mod export_port;
pub mod market_data_port;
