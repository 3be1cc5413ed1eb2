//! Debug and tracing configuration

use serde::{Deserialize, Serialize};

/// Crates whose spans and events are shown when no targets are configured
pub const DEFAULT_TRACE_TARGETS: &[&str] = &[
    "a2a_playground",
    "a2a_playground_protocol",
    "a2a_playground_state",
    "a2a_playground_config",
];

/// Trace level for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl TraceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Unknown levels fall back to the default instead of rejecting the file
impl<'de> Deserialize<'de> for TraceLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DebugConfig {
    /// Emit structured logs to stderr
    #[serde(default)]
    pub enable_tracing: bool,

    #[serde(default)]
    pub trace_level: TraceLevel,

    /// Tracing targets to enable, e.g. "a2a_playground_protocol::client"
    #[serde(default)]
    pub trace_targets: Vec<String>,
}

impl DebugConfig {
    /// `EnvFilter` directive string for this configuration
    pub fn filter_directives(&self) -> String {
        let level = self.trace_level.as_str();
        let targets: Vec<&str> = if self.trace_targets.is_empty() {
            DEFAULT_TRACE_TARGETS.to_vec()
        } else {
            self.trace_targets
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect()
        };
        targets
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_level_parsing() {
        assert_eq!(TraceLevel::parse("error"), Some(TraceLevel::Error));
        assert_eq!(TraceLevel::parse("WARN"), Some(TraceLevel::Warn));
        assert_eq!(TraceLevel::parse(" debug "), Some(TraceLevel::Debug));
        assert_eq!(TraceLevel::parse("invalid"), None);
    }

    #[test]
    fn unknown_level_deserializes_to_default() {
        let config: DebugConfig = toml::from_str("trace_level = \"loud\"").expect("parse");
        assert_eq!(config.trace_level, TraceLevel::Info);
    }

    #[test]
    fn filter_directives_cover_each_target() {
        let config = DebugConfig {
            enable_tracing: true,
            trace_level: TraceLevel::Debug,
            trace_targets: vec!["a2a_playground_protocol".into(), " ".into(), "reqwest".into()],
        };
        assert_eq!(
            config.filter_directives(),
            "a2a_playground_protocol=debug,reqwest=debug"
        );
    }

    #[test]
    fn default_filter_names_workspace_crates() {
        let directives = DebugConfig::default().filter_directives();
        assert!(directives.starts_with("a2a_playground=info"));
        assert!(directives.contains("a2a_playground_state=info"));
    }
}
