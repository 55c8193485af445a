//! Metric source boundary
//!
//! The watchdog treats its metric source as an opaque query interface: a
//! connector that establishes connections, and connections that answer a
//! single attribute query with a set of key/value results. The split keeps
//! the control loop and its tests independent of the real management
//! protocol; the Jolokia bridge client in [`crate::jolokia`] is the
//! production implementation.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures inside the metric-source client.
///
/// The sampler collapses all of these into an absent reading; they exist so
/// the log can say what actually went wrong.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not establish a connection to the source
    #[error("connection failed: {0}")]
    Connect(String),

    /// The query itself failed
    #[error("query failed: {0}")]
    Query(String),

    /// The query did not complete within the allotted time
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The source answered with something we could not interpret
    #[error("malformed response: {0}")]
    Protocol(String),
}

/// A query for one named object/attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    /// Managed object name, e.g. `java.lang:type=MemoryPool,name=CMS Old Gen`
    pub object_name: String,
    /// Attribute to read from the object, e.g. `Usage`
    pub attribute: String,
}

/// One attribute key/value pair from a query result.
///
/// Composite attributes fan out into one entry per numeric sub-key
/// (`used`, `committed`, ...); scalar attributes yield a single entry keyed
/// by the attribute name.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    pub attribute_key: String,
    pub value: f64,
}

/// An established connection to the metric source.
#[async_trait]
pub trait MetricConnection: Send + Sync {
    /// Read the attribute described by `query`, waiting at most `timeout`.
    async fn query(
        &self,
        query: &MetricQuery,
        timeout: Duration,
    ) -> Result<Vec<MetricValue>, SourceError>;
}

/// Factory for fresh connections.
///
/// The recovery waiter reconnects through this after a restart; the old
/// connection is dropped wholesale, never reused.
#[async_trait]
pub trait MetricConnector: Send + Sync {
    type Connection: MetricConnection;

    /// Establish a fresh connection to the metric source.
    async fn connect(&self) -> Result<Self::Connection, SourceError>;
}
