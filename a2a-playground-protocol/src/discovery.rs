//! Agent discovery: fetch and validate the descriptor an agent publishes

use reqwest::Client;
use tracing::{debug, info};

use crate::agent_card::{AgentCard, agent_card_url, parse_http_url};
use crate::errors::{DiscoveryError, FailureCause};
use crate::http::create_default_client;

/// Fetches agent descriptors. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct AgentCardFetcher {
    http: Client,
}

impl Default for AgentCardFetcher {
    fn default() -> Self {
        Self::new(create_default_client())
    }
}

impl AgentCardFetcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Fetch the descriptor published under `endpoint_url`.
    ///
    /// Every failure (bad URL, unreachable host, non-2xx status, malformed or
    /// invalid document) is reported as a single [`DiscoveryError`].
    pub async fn fetch(&self, endpoint_url: &str) -> Result<AgentCard, DiscoveryError> {
        let endpoint_url = endpoint_url.trim();
        parse_http_url(endpoint_url)
            .map_err(|reason| DiscoveryError::new(endpoint_url, FailureCause::InvalidUrl(reason)))?;

        let card_url = agent_card_url(endpoint_url);
        debug!(url = %card_url, "Fetching agent card");

        let resp = self
            .http
            .get(&card_url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| DiscoveryError::new(endpoint_url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DiscoveryError::new(
                endpoint_url,
                FailureCause::Status(status),
            ));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| DiscoveryError::new(endpoint_url, e))?;
        let card: AgentCard =
            serde_json::from_slice(&body).map_err(|e| DiscoveryError::new(endpoint_url, e))?;
        card.validate().map_err(|reason| {
            DiscoveryError::new(endpoint_url, FailureCause::InvalidDescriptor(reason))
        })?;

        info!(
            name = %card.name,
            url = %card.url,
            streaming = card.capabilities.streaming,
            "Discovered agent"
        );
        Ok(card)
    }
}
