//! Background energy regeneration.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use tycoon_provider::TaskContentProvider;

use crate::controller::GameSession;

/// Spawn the energy ticker.
///
/// Every `period` the session gains one energy point, capped at its
/// maximum. The first tick fires one full period after spawning. The task
/// runs until aborted; abort the returned handle when the session ends.
pub fn spawn_energy_regen<P>(session: GameSession<P>, period: Duration) -> JoinHandle<()>
where
    P: TaskContentProvider + 'static,
{
    info!(period_ms = period.as_millis(), "energy ticker started");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            if let Err(e) = session.regenerate_energy().await {
                warn!(error = %e, "energy regeneration tick failed");
            }
        }
    })
}
