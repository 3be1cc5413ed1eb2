//! Application state for the A2A playground.
//!
//! Each concern lives in its own [`Registry`]: conversations and messages,
//! discovered agents, tracked tasks, and settings. [`Registries`] bundles
//! them and is handed to whoever needs to read or write state; there are no
//! process-wide singletons.

pub mod agent;
pub mod app;
pub mod host;
pub mod registry;
pub mod settings;

pub use agent::{AgentState, ApplyOutcome, MAX_EVENTS, RequestTicket, TaskEvent, TrackedTask};
pub use app::{AppState, ChatMessage, Conversation, DEFAULT_CONVERSATION_NAME, Delivery};
pub use host::{HostChange, HostState};
pub use registry::Registry;
pub use settings::{DEFAULT_OUTPUT_MIME_TYPES, SettingsState};

/// Every registry of the application. Clones share the same stores.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub app: Registry<AppState>,
    pub hosts: Registry<HostState>,
    pub agents: Registry<AgentState>,
    pub settings: Registry<SettingsState>,
}

impl Registries {
    /// Empty registries with the given starting settings
    pub fn with_settings(settings: SettingsState) -> Self {
        Self {
            settings: Registry::new(settings),
            ..Self::default()
        }
    }
}
