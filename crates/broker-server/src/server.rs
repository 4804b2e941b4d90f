//! Owns the registry, the housekeeper, and the bound warp server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use broker_core::Registry;
use tracing::info;

use crate::config::ServerConfig;
use crate::handlers::{routes, BrokerService};
use crate::housekeeper::Housekeeper;
use crate::rejection::handle_rejection;

pub struct BrokerServer {
    addr: SocketAddr,
    registry: Arc<Registry>,
    housekeeper_interval: Duration,
}

impl BrokerServer {
    pub fn new(config: &ServerConfig) -> Result<Self, crate::config::ConfigError> {
        Ok(BrokerServer {
            addr: config.socket_addr()?,
            registry: Arc::new(Registry::new()),
            housekeeper_interval: Duration::from_secs(config.housekeeper.interval_secs),
        })
    }

    /// Runs until `shutdown` resolves, then cancels the housekeeper and
    /// returns once it has joined.
    pub async fn run(&self, shutdown: impl std::future::Future<Output = ()> + Send + 'static) {
        let housekeeper = Housekeeper::spawn(self.registry.clone(), self.housekeeper_interval);

        let service = BrokerService::new(self.registry.clone());
        let filter = routes(service).recover(handle_rejection);

        info!(addr = %self.addr, "broker listening");
        let (_, serve_future) =
            warp::serve(filter).bind_with_graceful_shutdown(self.addr, shutdown);
        serve_future.await;

        housekeeper.shutdown().await;
        info!("broker shut down");
    }
}
