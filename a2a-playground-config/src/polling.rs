use std::time::Duration;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// How a sent message is followed up until the agent settles
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Upper bound on `tasks/get` calls per message. At least one is always made.
    #[serde(default = "PollingConfig::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "PollingConfig::default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "PollingConfig::default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Subscribe to the task stream when the agent supports it
    #[serde(default = "PollingConfig::default_prefer_streaming")]
    pub prefer_streaming: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            initial_backoff_ms: Self::default_initial_backoff_ms(),
            max_backoff_ms: Self::default_max_backoff_ms(),
            prefer_streaming: Self::default_prefer_streaming(),
        }
    }
}

impl PollingConfig {
    const MAX_ATTEMPTS: u32 = 100;

    const fn default_max_attempts() -> u32 {
        5
    }

    const fn default_initial_backoff_ms() -> u64 {
        250
    }

    const fn default_max_backoff_ms() -> u64 {
        4_000
    }

    const fn default_prefer_streaming() -> bool {
        true
    }

    /// Delay before poll number `attempt` (0-based): doubles each time, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay = self.initial_backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=Self::MAX_ATTEMPTS).contains(&self.max_attempts),
            "polling.max_attempts must be between 1 and {}",
            Self::MAX_ATTEMPTS
        );
        ensure!(
            self.initial_backoff_ms <= self.max_backoff_ms,
            "polling.initial_backoff_ms must not exceed polling.max_backoff_ms"
        );
        ensure!(
            self.max_backoff_ms <= 60_000,
            "polling.max_backoff_ms must be at most 60000ms"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let config = PollingConfig::default();
        let delays: Vec<u64> = (0..6)
            .map(|attempt| config.backoff(attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![250, 500, 1_000, 2_000, 4_000, 4_000]);
        assert_eq!(config.backoff(200), Duration::from_millis(4_000));
    }

    #[test]
    fn zero_backoff_polls_immediately() {
        let config = PollingConfig {
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            ..PollingConfig::default()
        };
        assert_eq!(config.backoff(3), Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_bounds() {
        let no_attempts = PollingConfig {
            max_attempts: 0,
            ..PollingConfig::default()
        };
        assert!(no_attempts.validate().is_err());

        let inverted = PollingConfig {
            initial_backoff_ms: 5_000,
            max_backoff_ms: 1_000,
            ..PollingConfig::default()
        };
        assert!(inverted.validate().is_err());
    }
}
