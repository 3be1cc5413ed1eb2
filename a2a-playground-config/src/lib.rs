//! Configuration for the A2A playground.
//!
//! ```toml
//! [client]
//! request_timeout_secs = 30
//! connect_timeout_secs = 5
//!
//! [polling]
//! max_attempts = 5
//! initial_backoff_ms = 250
//! max_backoff_ms = 4000
//! prefer_streaming = true
//!
//! [output]
//! mime_types = ["image/*", "text/plain"]
//!
//! [agents]
//! urls = []
//!
//! [debug]
//! enable_tracing = false
//! trace_level = "info"
//! trace_targets = []
//! ```

pub mod client;
pub mod debug;
pub mod loader;
pub mod output;
pub mod polling;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use client::ClientConfig;
pub use debug::{DebugConfig, TraceLevel};
pub use loader::{CONFIG_ENV_VAR, ConfigManager, ConfigSource, load_dotenv};
pub use output::{AgentsConfig, OutputConfig};
pub use polling::PollingConfig;

/// Root of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaygroundConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl PlaygroundConfig {
    pub fn validate(&self) -> Result<()> {
        self.client
            .validate()
            .context("Invalid [client] configuration")?;
        self.polling
            .validate()
            .context("Invalid [polling] configuration")?;
        self.output
            .validate()
            .context("Invalid [output] configuration")?;
        self.agents
            .validate()
            .context("Invalid [agents] configuration")?;
        Ok(())
    }
}
