//! Terminal client for A2A agents.
//!
//! The protocol client lives in `a2a-playground-protocol`, in-memory state in
//! `a2a-playground-state`, and configuration in `a2a-playground-config`. This
//! crate ties them together: the [`lifecycle::TaskLifecycleManager`] runs a
//! message from submission to rendered reply, and [`cli`] exposes it as
//! one-shot commands and an interactive chat.

pub mod alerts;
pub mod cli;
pub mod lifecycle;
pub mod render;
pub mod styled;

pub use alerts::{Alert, AlertLevel, AlertSink, MemoryAlerts, StderrAlerts};
pub use lifecycle::{LifecycleOptions, SendOutcome, TaskLifecycleManager};
pub use render::{NULL_RESPONSE_PLACEHOLDER, RenderedReply, render_message, render_task};
