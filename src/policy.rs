//! Watchdog operational policy
//!
//! All tunables live here, fixed at startup: the policy is built once in
//! `main` (TOML file, flag overrides, compiled-in defaults) and passed into
//! the watchdog by value. There is no runtime reconfiguration.

use crate::error::{Result, VigilError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Watchdog operational policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogPolicy {
    /// Jolokia agent base URL
    ///
    /// **Default:** `http://localhost:8778/jolokia`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Optional basic-auth username (absent or empty = unauthenticated)
    #[serde(default)]
    pub username: Option<String>,

    /// Optional basic-auth password
    #[serde(default)]
    pub password: Option<String>,

    /// MBean holding the monitored memory pool
    ///
    /// **Default:** `java.lang:type=MemoryPool,name=CMS Old Gen`
    #[serde(default = "default_mbean")]
    pub mbean: String,

    /// Attribute read from the MBean; its `used` sub-key is the reading
    ///
    /// **Default:** `Usage`
    #[serde(default = "default_attribute")]
    pub attribute: String,

    /// Memory threshold in GiB; readings strictly above this are breaches
    ///
    /// **Default:** 57
    #[serde(default = "default_threshold")]
    pub memory_threshold_gib: f64,

    /// Consecutive breaches required before the restart fires
    ///
    /// **Default:** 5
    #[serde(default = "default_max_breaches")]
    pub max_consecutive_breaches: u32,

    /// Seconds between samples, measured from the end of the previous tick
    ///
    /// **Default:** 60
    #[serde(default = "default_interval")]
    pub poll_interval_secs: u64,

    /// Minutes to wait after a restart before polling again
    ///
    /// **Default:** 7
    #[serde(default = "default_cooldown")]
    pub post_restart_sleep_mins: u64,

    /// Per-query timeout in seconds
    ///
    /// **Default:** 30
    #[serde(default = "default_timeout")]
    pub query_timeout_secs: u64,

    /// Executable invoked, with no arguments, to restart the server
    #[serde(default)]
    pub restart_script: PathBuf,
}

fn default_endpoint() -> String {
    "http://localhost:8778/jolokia".to_string()
}

fn default_mbean() -> String {
    "java.lang:type=MemoryPool,name=CMS Old Gen".to_string()
}

fn default_attribute() -> String {
    "Usage".to_string()
}

fn default_threshold() -> f64 {
    57.0
}

fn default_max_breaches() -> u32 {
    5
}

fn default_interval() -> u64 {
    60
}

fn default_cooldown() -> u64 {
    7
}

fn default_timeout() -> u64 {
    30
}

impl Default for WatchdogPolicy {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: None,
            password: None,
            mbean: default_mbean(),
            attribute: default_attribute(),
            memory_threshold_gib: default_threshold(),
            max_consecutive_breaches: default_max_breaches(),
            poll_interval_secs: default_interval(),
            post_restart_sleep_mins: default_cooldown(),
            query_timeout_secs: default_timeout(),
            restart_script: PathBuf::new(),
        }
    }
}

impl WatchdogPolicy {
    /// Load a policy from a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| VigilError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| VigilError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the policy configuration.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(VigilError::Config("endpoint must not be empty".to_string()));
        }

        if self.mbean.is_empty() || self.attribute.is_empty() {
            return Err(VigilError::Config(
                "mbean and attribute must not be empty".to_string(),
            ));
        }

        if !(self.memory_threshold_gib > 0.0) {
            return Err(VigilError::Config(
                "memory_threshold_gib must be greater than 0".to_string(),
            ));
        }

        if self.max_consecutive_breaches == 0 {
            return Err(VigilError::Config(
                "max_consecutive_breaches must be at least 1".to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(VigilError::Config(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.query_timeout_secs == 0 {
            return Err(VigilError::Config(
                "query_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.restart_script.as_os_str().is_empty() {
            return Err(VigilError::Config(
                "restart_script must be set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn post_restart_sleep(&self) -> Duration {
        Duration::from_secs(self.post_restart_sleep_mins * 60)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_policy() -> WatchdogPolicy {
        WatchdogPolicy {
            restart_script: PathBuf::from("/usr/local/bin/bounce-server.sh"),
            ..WatchdogPolicy::default()
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = WatchdogPolicy::default();

        assert_eq!(policy.endpoint, "http://localhost:8778/jolokia");
        assert_eq!(policy.mbean, "java.lang:type=MemoryPool,name=CMS Old Gen");
        assert_eq!(policy.attribute, "Usage");
        assert_eq!(policy.memory_threshold_gib, 57.0);
        assert_eq!(policy.max_consecutive_breaches, 5);
        assert_eq!(policy.poll_interval_secs, 60);
        assert_eq!(policy.post_restart_sleep_mins, 7);
        assert_eq!(policy.query_timeout_secs, 30);

        // Default policy has no restart script and must not validate
        assert!(policy.validate().is_err());
        assert!(valid_policy().validate().is_ok());
    }

    #[test]
    fn test_duration_helpers() {
        let policy = valid_policy();

        assert_eq!(policy.poll_interval(), Duration::from_secs(60));
        assert_eq!(policy.post_restart_sleep(), Duration::from_secs(7 * 60));
        assert_eq!(policy.query_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validation_failures() {
        let mut policy = valid_policy();

        policy.memory_threshold_gib = 0.0;
        assert!(policy.validate().is_err());
        policy.memory_threshold_gib = 57.0;

        policy.max_consecutive_breaches = 0;
        assert!(policy.validate().is_err());
        policy.max_consecutive_breaches = 5;

        policy.poll_interval_secs = 0;
        assert!(policy.validate().is_err());
        policy.poll_interval_secs = 60;

        policy.query_timeout_secs = 0;
        assert!(policy.validate().is_err());
        policy.query_timeout_secs = 30;

        policy.endpoint = String::new();
        assert!(policy.validate().is_err());
        policy.endpoint = default_endpoint();

        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
endpoint = "http://batch-01:8778/jolokia"
memory_threshold_gib = 48.5
max_consecutive_breaches = 3
restart_script = "/apps/healing/bounce.sh"
"#
        )
        .unwrap();

        let policy = WatchdogPolicy::from_toml_file(file.path()).unwrap();

        assert_eq!(policy.endpoint, "http://batch-01:8778/jolokia");
        assert_eq!(policy.memory_threshold_gib, 48.5);
        assert_eq!(policy.max_consecutive_breaches, 3);
        assert_eq!(policy.restart_script, PathBuf::from("/apps/healing/bounce.sh"));
        // Unspecified keys fall back to defaults
        assert_eq!(policy.poll_interval_secs, 60);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = \"sixty\"").unwrap();

        assert!(WatchdogPolicy::from_toml_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(WatchdogPolicy::from_toml_file("/nonexistent/vigil.toml").is_err());
    }
}
