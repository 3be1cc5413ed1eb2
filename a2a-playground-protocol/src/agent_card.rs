//! Agent descriptor ("agent card") served from the well-known discovery path

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::TEXT_MIME;

/// Path appended to an agent's base URL to fetch its descriptor
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Self-description an agent publishes about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Endpoint that accepts JSON-RPC task requests
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub capabilities: AgentCapabilities,
    #[serde(default = "default_modes")]
    pub default_input_modes: Vec<String>,
    #[serde(default = "default_modes")]
    pub default_output_modes: Vec<String>,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

fn default_modes() -> Vec<String> {
    vec![TEXT_MIME.to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProvider {
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Optional protocol features the agent supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub push_notifications: bool,
    #[serde(default)]
    pub state_transition_history: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl AgentCard {
    /// Check the fields serde cannot express: non-empty identity, a usable
    /// endpoint, and unique skill ids.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        if self.version.trim().is_empty() {
            return Err("version is empty".to_string());
        }
        parse_http_url(&self.url).map_err(|reason| format!("url {}: {reason}", self.url))?;

        let mut seen = HashSet::new();
        for skill in &self.skills {
            if !seen.insert(skill.id.as_str()) {
                return Err(format!("duplicate skill id {}", skill.id));
            }
        }
        Ok(())
    }
}

/// Parse an absolute http(s) URL with a host
pub fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme {other}")),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(url)
}

/// Discovery URL for an agent base URL
pub fn agent_card_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim().trim_end_matches('/'), AGENT_CARD_PATH)
}
