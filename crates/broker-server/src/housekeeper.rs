//! Background snapshot-and-log task, cooperatively cancelled at shutdown.

use std::sync::Arc;
use std::time::Duration;

use broker_core::Registry;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub struct Housekeeper {
    handle: JoinHandle<()>,
    shutdown: broadcast::Sender<()>,
}

impl Housekeeper {
    pub fn spawn(registry: Arc<Registry>, interval: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = registry.snapshot_flags();
                        debug!(sessions = snapshot.len(), "housekeeper snapshot");
                        for (id, flags) in &snapshot {
                            debug!(client_id = %id.client_id, ?flags, "session flags");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("housekeeper received shutdown signal");
                        break;
                    }
                }
            }
        });

        Housekeeper { handle, shutdown }
    }

    /// Signals cancellation and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.handle.await {
            tracing::warn!(%err, "housekeeper task panicked");
        }
    }
}
