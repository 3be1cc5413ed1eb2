//! a2a-playground - terminal client for A2A agents

use a2a_playground::cli::{self, Cli};
use a2a_playground_config::{ConfigManager, DebugConfig, load_dotenv};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (non-fatal if missing)
    load_dotenv().ok();

    let args = Cli::parse();

    let manager =
        ConfigManager::load(args.config.as_deref()).context("Failed to load configuration")?;
    initialize_tracing(&manager.config().debug);
    tracing::debug!(source = ?manager.source(), "Configuration ready");

    cli::execute(args, manager.config()).await
}

/// `RUST_LOG` takes precedence; otherwise the `[debug]` section decides.
/// Logs go to stderr so command output stays clean.
fn initialize_tracing(debug_config: &DebugConfig) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if debug_config.enable_tracing => EnvFilter::new(debug_config.filter_directives()),
        Err(_) => return,
    };

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if initialized && debug_config.enable_tracing {
        tracing::info!("Debug tracing enabled: {}", debug_config.filter_directives());
    }
}
