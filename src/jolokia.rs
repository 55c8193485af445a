//! Jolokia HTTP bridge client
//!
//! Talks JMX through a [Jolokia](https://jolokia.org) agent: `connect`
//! probes the agent's `version` route so an unreachable endpoint fails
//! there rather than on the first read, and `query` POSTs a `read` request
//! for one MBean attribute. Composite attribute values (`Usage` is a
//! CompositeData of `used`/`committed`/`init`/`max`) are flattened into one
//! [`MetricValue`] per numeric sub-key.

use crate::source::{MetricConnection, MetricConnector, MetricQuery, MetricValue, SourceError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a Jolokia agent.
#[derive(Debug, Clone)]
pub struct JolokiaConnector {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl JolokiaConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
        }
    }

    /// Attach basic-auth credentials to every request.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

#[async_trait]
impl MetricConnector for JolokiaConnector {
    type Connection = JolokiaConnection;

    async fn connect(&self) -> Result<JolokiaConnection, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Connect(e.to_string()))?;

        let probe_url = format!("{}/version", self.base_url.trim_end_matches('/'));
        let mut request = client.get(&probe_url).timeout(CONNECT_TIMEOUT);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Connect(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SourceError::Connect(format!(
                "version probe returned HTTP {}",
                response.status()
            )));
        }

        debug!(url = %self.base_url, "connected to jolokia agent");
        Ok(JolokiaConnection {
            client,
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// A live client for one Jolokia agent.
pub struct JolokiaConnection {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

#[async_trait]
impl MetricConnection for JolokiaConnection {
    async fn query(
        &self,
        query: &MetricQuery,
        timeout: Duration,
    ) -> Result<Vec<MetricValue>, SourceError> {
        let body = json!({
            "type": "read",
            "mbean": query.object_name,
            "attribute": query.attribute,
        });

        let mut request = self.client.post(&self.base_url).json(&body).timeout(timeout);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(SourceError::Timeout(timeout)),
            Err(e) => return Err(SourceError::Query(e.to_string())),
        };

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Protocol(e.to_string()))?;

        // Jolokia reports errors in-band: HTTP 200 with a non-200 status field.
        let status = payload.get("status").and_then(Value::as_u64).unwrap_or(0);
        if status != 200 {
            let detail = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(SourceError::Query(format!(
                "agent returned status {status}: {detail}"
            )));
        }

        let value = payload
            .get("value")
            .ok_or_else(|| SourceError::Protocol("response has no value field".to_string()))?;

        Ok(flatten_value(&query.attribute, value))
    }
}

/// Flatten a Jolokia attribute value into key/value pairs.
///
/// Non-numeric sub-keys are skipped; a non-numeric scalar yields nothing.
fn flatten_value(attribute: &str, value: &Value) -> Vec<MetricValue> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, sub)| {
                sub.as_f64().map(|value| MetricValue {
                    attribute_key: key.clone(),
                    value,
                })
            })
            .collect(),
        scalar => scalar
            .as_f64()
            .map(|value| {
                vec![MetricValue {
                    attribute_key: attribute.to_string(),
                    value,
                }]
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_composite_value() {
        let value = json!({
            "init": 1073741824.0,
            "committed": 64424509440.0,
            "max": 68719476736.0,
            "used": 62277025792.0,
        });

        let mut values = flatten_value("Usage", &value);
        values.sort_by(|a, b| a.attribute_key.cmp(&b.attribute_key));

        assert_eq!(values.len(), 4);
        let used = values.iter().find(|v| v.attribute_key == "used").unwrap();
        assert_eq!(used.value, 62277025792.0);
    }

    #[test]
    fn test_flatten_scalar_value() {
        let values = flatten_value("HeapMemoryUsage", &json!(12345.0));
        assert_eq!(
            values,
            vec![MetricValue {
                attribute_key: "HeapMemoryUsage".to_string(),
                value: 12345.0,
            }]
        );
    }

    #[test]
    fn test_flatten_skips_non_numeric() {
        let value = json!({
            "used": 1024.0,
            "verbose": true,
            "name": "CMS Old Gen",
        });

        let values = flatten_value("Usage", &value);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].attribute_key, "used");
    }

    #[test]
    fn test_flatten_non_numeric_scalar_is_empty() {
        assert!(flatten_value("Name", &json!("CMS Old Gen")).is_empty());
    }
}
