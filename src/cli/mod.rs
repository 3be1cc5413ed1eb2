//! Command-line interface
//!
//! One-shot commands talk to a single agent; `chat` keeps conversations and
//! registered agents in memory for the length of the session.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod chat;
pub mod handlers;

pub use handlers::execute;

/// Terminal client for A2A agents
#[derive(Debug, Parser, Clone)]
#[command(name = "a2a-playground", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (overrides A2A_PLAYGROUND_CONFIG and the default locations)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds; 0 waits indefinitely
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Commands {
    /// Fetch and display the descriptor of an agent
    ///
    /// Examples:
    ///   a2a-playground discover http://localhost:10000
    Discover {
        /// Base URL of the agent
        agent_url: String,
    },

    /// Send one message to an agent and print its reply
    ///
    /// The agent is discovered first; the reply is shown once the task
    /// settles or the polling budget runs out.
    ///
    /// Examples:
    ///   a2a-playground send http://localhost:10000 "Generate Python code for a web scraper."
    Send {
        /// Base URL of the agent
        agent_url: String,

        /// Text of the message
        message: String,

        /// Subscribe to task updates when the agent supports streaming
        #[arg(long)]
        stream: bool,
    },

    /// Show the current state of a task
    GetTask {
        /// Endpoint of the agent
        agent_url: String,

        /// Task identifier
        task_id: String,

        /// Print the raw task as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask an agent to cancel a task
    CancelTask {
        /// Endpoint of the agent
        agent_url: String,

        /// Task identifier
        task_id: String,
    },

    /// Interactive session with one or more agents
    ///
    /// Type `/help` inside the session for the list of commands.
    Chat {
        /// Agent to register at startup; may be repeated
        #[arg(long = "agent", value_name = "URL")]
        agents: Vec<String>,
    },
}
