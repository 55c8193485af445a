//! Recovery wait after remediation
//!
//! A restarted server is unreachable for a while. The waiter polls with a
//! fixed delay until a fresh connection yields a reading, with no attempt
//! cap and no backoff growth: nothing else can bring the target back, so
//! there is no useful way to give up.

use crate::sampler::Sampler;
use crate::source::MetricConnector;
use tokio::time::sleep;
use tracing::{debug, info};

/// Fixed delay between reconnection attempts.
pub const RETRY_DELAY: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct RecoveryWaiter;

impl RecoveryWaiter {
    pub fn new() -> Self {
        Self
    }

    /// Block until the metric source is reachable and yielding readings
    /// again, then hand back the fresh connection.
    ///
    /// Reachable means both: the connection attempt succeeds AND the first
    /// sample on that connection is present.
    pub async fn await_recovery<C: MetricConnector>(
        &self,
        connector: &C,
        sampler: &Sampler,
    ) -> C::Connection {
        info!("waiting for server to come back online...");

        loop {
            match connector.connect().await {
                Ok(connection) => {
                    if sampler.sample(&connection).await.is_some() {
                        info!("server is back online");
                        return connection;
                    }
                    debug!("connected but no reading yet");
                }
                Err(e) => debug!("reconnect attempt failed: {e}"),
            }

            sleep(RETRY_DELAY).await;
        }
    }
}
