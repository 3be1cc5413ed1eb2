//! Locating, parsing and validating the configuration file.
//!
//! The first file found wins, in this order: an explicit path, the
//! `A2A_PLAYGROUND_CONFIG` environment variable, `a2a-playground.toml` in the
//! working directory, then `<config dir>/a2a-playground/config.toml`. With no
//! file at all the defaults are used.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::PlaygroundConfig;

pub const CONFIG_ENV_VAR: &str = "A2A_PLAYGROUND_CONFIG";
pub const WORKSPACE_CONFIG_FILE: &str = "a2a-playground.toml";
const USER_CONFIG_DIR: &str = "a2a-playground";
const USER_CONFIG_FILE: &str = "config.toml";

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    Workspace(PathBuf),
    User(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Env(path) | Self::Workspace(path) | Self::User(path) => {
                Some(path)
            }
            Self::Defaults => None,
        }
    }
}

/// Loaded configuration and its origin
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: PlaygroundConfig,
    source: ConfigSource,
}

impl ConfigManager {
    /// Load from the standard locations; `explicit` comes from `--config`
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV_VAR).ok();
        let workspace = std::env::current_dir().context("Failed to resolve working directory")?;
        let user_dir = dirs::config_dir();
        let source = resolve_source(explicit, env_path.as_deref(), &workspace, user_dir.as_deref());
        Self::load_from_source(source)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_source(ConfigSource::Explicit(path.as_ref().to_path_buf()))
    }

    fn load_from_source(source: ConfigSource) -> Result<Self> {
        let config = match source.path() {
            Some(path) => Self::read_config(path)?,
            None => PlaygroundConfig::default(),
        };
        config
            .validate()
            .with_context(|| match source.path() {
                Some(path) => format!("Configuration in {} failed validation", path.display()),
                None => "Default configuration failed validation".to_string(),
            })?;
        tracing::debug!(?source, "Loaded configuration");
        Ok(Self { config, source })
    }

    fn read_config(path: &Path) -> Result<PlaygroundConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

/// Pick the configuration file by precedence. Explicit and environment paths
/// are returned even when missing so that a typo surfaces as an error.
pub fn resolve_source(
    explicit: Option<&Path>,
    env_path: Option<&str>,
    workspace: &Path,
    user_config_dir: Option<&Path>,
) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = env_path.map(str::trim).filter(|p| !p.is_empty()) {
        return ConfigSource::Env(PathBuf::from(path));
    }
    let workspace_file = workspace.join(WORKSPACE_CONFIG_FILE);
    if workspace_file.is_file() {
        return ConfigSource::Workspace(workspace_file);
    }
    if let Some(dir) = user_config_dir {
        let user_file = dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
        if user_file.is_file() {
            return ConfigSource::User(user_file);
        }
    }
    ConfigSource::Defaults
}

/// Load environment variables from a `.env` file in the working directory.
///
/// A missing file is fine; a malformed one is logged and otherwise ignored.
pub fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment variables from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            tracing::warn!("Failed to load .env file: {}", e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    const SAMPLE: &str = r#"
[client]
request_timeout_secs = 10

[polling]
max_attempts = 3
prefer_streaming = false

[output]
mime_types = ["text/plain"]

[agents]
urls = ["http://localhost:10000"]

[debug]
enable_tracing = true
trace_level = "debug"
"#;

    #[test]
    fn explicit_path_wins_over_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(WORKSPACE_CONFIG_FILE), SAMPLE).expect("write");
        let explicit = dir.path().join("other.toml");

        let source = resolve_source(Some(explicit.as_path()), Some("/env.toml"), dir.path(), None);
        assert_eq!(source, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn env_path_wins_over_workspace() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(WORKSPACE_CONFIG_FILE), SAMPLE).expect("write");

        let source = resolve_source(None, Some(" /tmp/env.toml "), dir.path(), None);
        assert_eq!(source, ConfigSource::Env(PathBuf::from("/tmp/env.toml")));

        let blank = resolve_source(None, Some("  "), dir.path(), None);
        assert!(matches!(blank, ConfigSource::Workspace(_)));
    }

    #[test]
    fn user_dir_is_used_when_workspace_has_no_file() {
        let workspace = tempfile::tempdir().expect("tempdir");
        let user = tempfile::tempdir().expect("tempdir");
        let user_file = user.path().join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
        fs::create_dir_all(user_file.parent().expect("parent")).expect("mkdir");
        fs::write(&user_file, SAMPLE).expect("write");

        let source = resolve_source(None, None, workspace.path(), Some(user.path()));
        assert_eq!(source, ConfigSource::User(user_file));

        let nothing = resolve_source(None, None, workspace.path(), Some(workspace.path()));
        assert_eq!(nothing, ConfigSource::Defaults);
    }

    #[test]
    fn load_from_file_parses_every_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).expect("write");

        let manager = ConfigManager::load_from_file(&path).expect("load");
        let config = manager.config();
        assert_eq!(config.client.request_timeout_secs, 10);
        assert_eq!(config.client.connect_timeout_secs, 5);
        assert_eq!(config.polling.max_attempts, 3);
        assert!(!config.polling.prefer_streaming);
        assert_eq!(config.output.mime_types, vec!["text/plain".to_string()]);
        assert_eq!(config.agents.urls, vec!["http://localhost:10000".to_string()]);
        assert!(config.debug.enable_tracing);
        assert_eq!(manager.source().path(), Some(path.as_path()));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[polling]\nmax_attempts = 0\n").expect("write");

        let err = ConfigManager::load_from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("polling.max_attempts"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ConfigManager::load_from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    #[serial]
    fn load_honours_environment_variable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("env.toml");
        fs::write(&path, "[client]\nrequest_timeout_secs = 0\n").expect("write");

        // SAFETY: serialized with other environment-mutating tests
        unsafe { std::env::set_var(CONFIG_ENV_VAR, &path) };
        let loaded = ConfigManager::load(None);
        unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

        let manager = loaded.expect("load");
        assert_eq!(manager.source(), &ConfigSource::Env(path));
        assert_eq!(manager.config().client.request_timeout_secs, 0);
    }
}
