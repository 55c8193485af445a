//! Watchdog daemon: the control loop
//!
//! One tick flows one direction:
//!
//! ```text
//! connection ──> Sampler ──> reading ──> BreachTracker ──┬──> Continue
//!                                                        │
//!                                                        └──> Remediate:
//!                                                             restart script
//!                                                             cooldown sleep
//!                                                             recovery wait
//! ```
//!
//! The loop runs forever on a single task. Every operation is awaited in
//! program order; the only suspension points are timed sleeps. There is no
//! terminal state: the process ends only by external signal, and nothing
//! inside the loop is allowed to be fatal.

use crate::error::Result;
use crate::policy::WatchdogPolicy;
use crate::recovery::RecoveryWaiter;
use crate::remediator::{RemediationOutcome, Remediator};
use crate::sampler::Sampler;
use crate::source::{MetricConnector, MetricQuery};
use crate::stats::WatchdogStats;
use crate::tracker::{BreachTracker, Verdict};
use tokio::time::sleep;
use tracing::{info, warn};

/// The watchdog: samples, judges, remediates.
pub struct Watchdog<C: MetricConnector, R: Remediator> {
    connector: C,
    remediator: R,
    sampler: Sampler,
    tracker: BreachTracker,
    waiter: RecoveryWaiter,
    policy: WatchdogPolicy,
    stats: WatchdogStats,
}

impl<C: MetricConnector, R: Remediator> Watchdog<C, R> {
    /// Build a watchdog from a validated policy.
    pub fn new(connector: C, remediator: R, policy: WatchdogPolicy) -> Result<Self> {
        policy.validate()?;

        let sampler = Sampler::new(
            MetricQuery {
                object_name: policy.mbean.clone(),
                attribute: policy.attribute.clone(),
            },
            policy.query_timeout(),
        );

        Ok(Self {
            connector,
            remediator,
            sampler,
            tracker: BreachTracker::new(),
            waiter: RecoveryWaiter::new(),
            policy,
            stats: WatchdogStats::new(),
        })
    }

    pub fn stats(&self) -> &WatchdogStats {
        &self.stats
    }

    /// Main loop: one tick, then sleep the poll interval, forever.
    ///
    /// The interval is measured from the end of the previous tick, so a
    /// slow query or a remediation sequence pushes the next sample out
    /// rather than piling ticks up.
    pub async fn run(mut self) {
        info!(
            "🛡️  vigil active | threshold {} GiB | {} consecutive breaches | every {}s",
            self.policy.memory_threshold_gib,
            self.policy.max_consecutive_breaches,
            self.policy.poll_interval_secs
        );

        let mut connection = match self.connector.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                warn!("initial connection failed: {e}");
                self.waiter
                    .await_recovery(&self.connector, &self.sampler)
                    .await
            }
        };

        loop {
            self.tick(&mut connection).await;
            sleep(self.policy.poll_interval()).await;
        }
    }

    /// Execute a single tick: sample, judge, and run the remediation
    /// sequence when the tracker says so.
    ///
    /// Public for integration testing.
    pub async fn tick(&mut self, connection: &mut C::Connection) {
        self.stats.ticks += 1;

        let reading = self.sampler.sample(connection).await;
        match reading {
            Some(usage) => {
                self.stats.readings += 1;
                if usage > self.policy.memory_threshold_gib {
                    self.stats.breaches += 1;
                }
            }
            None => {
                self.stats.missed_readings += 1;
                info!("could not retrieve memory usage");
            }
        }

        let verdict = self.tracker.observe(
            reading,
            self.policy.memory_threshold_gib,
            self.policy.max_consecutive_breaches,
        );

        match verdict {
            Verdict::Continue => {
                if let Some(usage) = reading {
                    if usage > self.policy.memory_threshold_gib {
                        warn!(
                            "⚠️  memory usage {:.2} GiB above threshold ({} GiB), count: {}",
                            usage,
                            self.policy.memory_threshold_gib,
                            self.tracker.consecutive_breaches()
                        );
                    }
                }
            }
            Verdict::Remediate => {
                warn!(
                    "🚨 memory threshold exceeded {} consecutive times, restarting server...",
                    self.policy.max_consecutive_breaches
                );

                self.stats.remediations += 1;
                if self.remediator.execute().await == RemediationOutcome::Failed {
                    // Partial restarts happen; keep going and let the next
                    // breach cycle retry if the server stayed up.
                    self.stats.remediation_failures += 1;
                }

                info!(
                    "sleeping {} minutes after restart...",
                    self.policy.post_restart_sleep_mins
                );
                sleep(self.policy.post_restart_sleep()).await;

                *connection = self
                    .waiter
                    .await_recovery(&self.connector, &self.sampler)
                    .await;

                info!("📊 {}", self.stats.summary());
            }
        }
    }
}
