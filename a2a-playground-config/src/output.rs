use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Output modes shown to the user and advertised to agents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_mime_types")]
    pub mime_types: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mime_types: Self::default_mime_types(),
        }
    }
}

impl OutputConfig {
    fn default_mime_types() -> Vec<String> {
        vec!["image/*".to_string(), "text/plain".to_string()]
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.mime_types.is_empty(),
            "output.mime_types must list at least one MIME type"
        );
        for mime in &self.mime_types {
            let well_formed = mime
                .split_once('/')
                .is_some_and(|(kind, sub)| is_token(kind) && is_token(sub));
            ensure!(
                well_formed || mime.trim() == "*",
                "output.mime_types entry {mime:?} is not of the form type/subtype"
            );
        }
        Ok(())
    }
}

fn is_token(part: &str) -> bool {
    !part.is_empty() && !part.contains(char::is_whitespace)
}

/// Agents registered when an interactive session starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub urls: Vec<String>,
}

impl AgentsConfig {
    pub fn validate(&self) -> Result<()> {
        for url in &self.urls {
            ensure!(!url.trim().is_empty(), "agents.urls must not contain blank entries");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mime_types_match_settings_defaults() {
        assert_eq!(
            OutputConfig::default().mime_types,
            vec!["image/*".to_string(), "text/plain".to_string()]
        );
    }

    #[test]
    fn malformed_mime_type_is_rejected() {
        let config = OutputConfig {
            mime_types: vec!["text plain".into()],
        };
        assert!(config.validate().is_err());

        let wildcard = OutputConfig {
            mime_types: vec!["*/*".into(), "*".into()],
        };
        assert!(wildcard.validate().is_ok());
    }

    #[test]
    fn blank_agent_url_is_rejected() {
        let config = AgentsConfig {
            urls: vec!["http://localhost:10000".into(), "  ".into()],
        };
        assert!(config.validate().is_err());
    }
}
