//! Sampler: one reading per tick
//!
//! Wraps the metric source with the configured query and timeout, and
//! converts the raw byte count to GiB. Every failure mode collapses to
//! `None`: the control loop treats "could not read" as a single condition,
//! and the failure detail only goes to the log.

use crate::source::{MetricConnection, MetricQuery};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bytes per GiB, the monitoring unit.
const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// Sub-attribute holding the used portion of the pool.
const USED_KEY: &str = "used";

pub struct Sampler {
    query: MetricQuery,
    timeout: Duration,
}

impl Sampler {
    pub fn new(query: MetricQuery, timeout: Duration) -> Self {
        Self { query, timeout }
    }

    /// Take one reading, in GiB. Never errors; logs one line per present
    /// reading.
    pub async fn sample<C: MetricConnection>(&self, connection: &C) -> Option<f64> {
        let values = match connection.query(&self.query, self.timeout).await {
            Ok(values) => values,
            Err(e) => {
                warn!("error retrieving memory usage: {e}");
                return None;
            }
        };

        let Some(used) = values.iter().find(|v| v.attribute_key == USED_KEY) else {
            // Structurally fine response without the sub-key we monitor.
            debug!(
                attribute = %self.query.attribute,
                "response carried no `{USED_KEY}` sub-attribute"
            );
            return None;
        };

        let usage_gib = used.value / BYTES_PER_GIB;
        info!("memory usage: {usage_gib:.2} GiB");
        Some(usage_gib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MetricValue, SourceError};
    use async_trait::async_trait;

    enum Behavior {
        Values(Vec<MetricValue>),
        Fail,
    }

    struct FakeConnection(Behavior);

    #[async_trait]
    impl MetricConnection for FakeConnection {
        async fn query(
            &self,
            _query: &MetricQuery,
            _timeout: Duration,
        ) -> Result<Vec<MetricValue>, SourceError> {
            match &self.0 {
                Behavior::Values(values) => Ok(values.clone()),
                Behavior::Fail => Err(SourceError::Query("mbean not found".to_string())),
            }
        }
    }

    fn sampler() -> Sampler {
        Sampler::new(
            MetricQuery {
                object_name: "java.lang:type=MemoryPool,name=CMS Old Gen".to_string(),
                attribute: "Usage".to_string(),
            },
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_converts_bytes_to_gib() {
        let connection = FakeConnection(Behavior::Values(vec![
            MetricValue {
                attribute_key: "used".to_string(),
                value: 58.0 * BYTES_PER_GIB,
            },
            MetricValue {
                attribute_key: "max".to_string(),
                value: 64.0 * BYTES_PER_GIB,
            },
        ]));

        assert_eq!(sampler().sample(&connection).await, Some(58.0));
    }

    #[tokio::test]
    async fn test_query_error_is_absent_reading() {
        let connection = FakeConnection(Behavior::Fail);
        assert_eq!(sampler().sample(&connection).await, None);
    }

    #[tokio::test]
    async fn test_missing_used_key_is_absent_reading() {
        let connection = FakeConnection(Behavior::Values(vec![MetricValue {
            attribute_key: "committed".to_string(),
            value: 60.0 * BYTES_PER_GIB,
        }]));

        assert_eq!(sampler().sample(&connection).await, None);
    }

    #[tokio::test]
    async fn test_empty_response_is_absent_reading() {
        let connection = FakeConnection(Behavior::Values(Vec::new()));
        assert_eq!(sampler().sample(&connection).await, None);
    }
}
