/*!
 * Vigil - Self-Healing Memory Watchdog
 *
 * Vigil keeps one server process alive. It samples a JVM memory pool over
 * a Jolokia bridge on a fixed cadence, counts consecutive threshold
 * breaches, bounces the server through an external restart script when the
 * breach run gets long enough, then waits for it to come back online.
 *
 * # The loop
 *
 * ```text
 * ┌─────────┐   reading    ┌───────────────┐   Continue
 * │ Sampler │ ───────────> │ BreachTracker │ ────────────> sleep, next tick
 * └─────────┘              └───────┬───────┘
 *                                  │ Remediate
 *                                  v
 *                   restart script -> cooldown -> recovery wait
 * ```
 *
 * Nothing in the loop is fatal: an unreadable metric resets the breach
 * count, a failed restart is logged and the loop keeps going, and the
 * recovery wait retries forever. A watchdog must not itself require
 * watching.
 */

pub mod daemon;
pub mod error;
pub mod jolokia;
pub mod logging;
pub mod policy;
pub mod recovery;
pub mod remediator;
pub mod sampler;
pub mod source;
pub mod stats;
pub mod tracker;

pub use daemon::Watchdog;
pub use error::{Result, VigilError};
pub use jolokia::JolokiaConnector;
pub use policy::WatchdogPolicy;
pub use recovery::RecoveryWaiter;
pub use remediator::{RemediationOutcome, Remediator, RestartScript};
pub use sampler::Sampler;
pub use source::{MetricConnection, MetricConnector, MetricQuery, MetricValue, SourceError};
pub use stats::WatchdogStats;
pub use tracker::{BreachTracker, Verdict};
