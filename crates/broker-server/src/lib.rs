//! HTTP surface, housekeeper, and configuration for the broker service.

pub mod config;
pub mod handlers;
pub mod housekeeper;
pub mod rejection;
pub mod server;
pub mod types;

pub use config::ServerConfig;
pub use handlers::{routes, BrokerService};
pub use server::BrokerServer;
