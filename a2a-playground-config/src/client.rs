use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// HTTP behaviour of discovery and task requests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Seconds a single request may take; `0` disables the limit
    #[serde(default = "ClientConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "ClientConfig::default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: Self::default_request_timeout_secs(),
            connect_timeout_secs: Self::default_connect_timeout_secs(),
        }
    }
}

impl ClientConfig {
    const MAX_TIMEOUT_SECS: u64 = 3_600;

    const fn default_request_timeout_secs() -> u64 {
        30
    }

    const fn default_connect_timeout_secs() -> u64 {
        5
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.request_timeout_secs <= Self::MAX_TIMEOUT_SECS,
            "client.request_timeout_secs must be at most {} seconds (or 0 to disable)",
            Self::MAX_TIMEOUT_SECS
        );
        ensure!(
            (1..=Self::MAX_TIMEOUT_SECS).contains(&self.connect_timeout_secs),
            "client.connect_timeout_secs must be between 1 and {} seconds",
            Self::MAX_TIMEOUT_SECS
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_request_timeout_is_allowed() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_connect_timeout_is_rejected() {
        let config = ClientConfig {
            connect_timeout_secs: 0,
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("connect_timeout_secs"));
    }
}
