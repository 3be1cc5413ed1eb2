//! A2A (Agent2Agent) protocol client
//!
//! This crate provides:
//! - Agent discovery via the well-known agent card
//! - A JSON-RPC 2.0 client bound to one agent endpoint (`tasks/send`,
//!   `tasks/get`, `tasks/cancel`, `tasks/sendSubscribe`)
//! - The task, message, and part data model
//! - The discovery / protocol / validation error taxonomy
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use a2a_playground_protocol::{A2aClient, Message};
//!
//! let client = A2aClient::new("http://localhost:10000")?;
//! let card = client.fetch_agent_descriptor().await?;
//! let task = client.submit_task(uuid::Uuid::new_v4().to_string(), Message::user_text("Hi")).await?;
//! ```

pub mod agent_card;
pub mod client;
pub mod discovery;
pub mod errors;
pub mod http;
pub mod rpc;
pub mod types;

pub use agent_card::{AGENT_CARD_PATH, AgentCapabilities, AgentCard, AgentProvider, AgentSkill};
pub use client::A2aClient;
pub use discovery::AgentCardFetcher;
pub use errors::{
    A2aError, A2aErrorCode, A2aResult, DiscoveryError, FailureCause, ProtocolError,
    ValidationError,
};
pub use http::HttpSettings;
pub use rpc::{TaskArtifactUpdateEvent, TaskSendParams, TaskStatusUpdateEvent, TaskStreamEvent};
pub use types::{Artifact, FileContent, Message, MessageRole, Part, Task, TaskState, TaskStatus};
