//! Watchdog counters
//!
//! Lifetime counters for the loop, reported through the log. Nothing here
//! persists across a process restart.

/// Counters accumulated since startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchdogStats {
    /// Ticks executed
    pub ticks: u64,

    /// Ticks with a present reading
    pub readings: u64,

    /// Ticks where the metric could not be read
    pub missed_readings: u64,

    /// Readings above the threshold
    pub breaches: u64,

    /// Remediation sequences triggered
    pub remediations: u64,

    /// Remediation attempts that failed
    pub remediation_failures: u64,
}

impl WatchdogStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} ticks | {} readings ({} missed) | {} breaches | {} restarts ({} failed)",
            self.ticks,
            self.readings,
            self.missed_readings,
            self.breaches,
            self.remediations,
            self.remediation_failures
        )
    }
}
