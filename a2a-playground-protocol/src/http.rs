//! HTTP client construction shared by discovery and the task client

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("a2a-playground/", env!("CARGO_PKG_VERSION"));

/// Timeouts applied to every outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// `None` lets a request wait for as long as the transport does
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

impl HttpSettings {
    /// Settings from whole seconds; `0` disables the request timeout
    pub fn from_secs(request_timeout_secs: u64, connect_timeout_secs: u64) -> Self {
        Self {
            request_timeout: (request_timeout_secs > 0)
                .then(|| Duration::from_secs(request_timeout_secs)),
            connect_timeout: Duration::from_secs(connect_timeout_secs.max(1)),
        }
    }
}

/// Create an HTTP client with the given timeouts
pub fn create_client(settings: HttpSettings) -> Client {
    let mut builder = ClientBuilder::new()
        .user_agent(USER_AGENT)
        .connect_timeout(settings.connect_timeout);
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|_| Client::new())
}

/// Create a default HTTP client with standard timeouts
pub fn create_default_client() -> Client {
    create_client(HttpSettings::default())
}
