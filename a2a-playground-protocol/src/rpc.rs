//! JSON-RPC 2.0 structures for the A2A task API
//!
//! Request/response envelopes, method names, request parameters, and the
//! events delivered over a `tasks/sendSubscribe` stream.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{Artifact, Message, Metadata, TaskStatus};

// ============================================================================
// A2A RPC Method Constants
// ============================================================================

/// Create a task, or continue one that is waiting for input
pub const METHOD_TASKS_SEND: &str = "tasks/send";

/// Same as `tasks/send`, answered with a server-sent event stream
pub const METHOD_TASKS_SEND_SUBSCRIBE: &str = "tasks/sendSubscribe";

/// Retrieve the current state of a task
pub const METHOD_TASKS_GET: &str = "tasks/get";

/// Request cancellation of a running task
pub const METHOD_TASKS_CANCEL: &str = "tasks/cancel";

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// JSON-RPC 2.0 Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: Value,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    pub fn with_string_id(
        method: impl Into<String>,
        params: Option<Value>,
        id: impl Into<String>,
    ) -> Self {
        Self::new(method, params, Value::String(id.into()))
    }
}

/// JSON-RPC 2.0 Response
///
/// `result` distinguishes an explicit `"result": null` (`Some(Value::Null)`)
/// from a missing member (`None`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Value,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    pub fn success(result: Value, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: JsonRpcError, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Parameters for `tasks/send` and `tasks/sendSubscribe`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSendParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_output_modes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TaskSendParams {
    pub fn new(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            session_id: None,
            message,
            accepted_output_modes: None,
            history_length: None,
            metadata: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_accepted_output_modes(mut self, modes: Vec<String>) -> Self {
        self.accepted_output_modes = (!modes.is_empty()).then_some(modes);
        self
    }
}

/// Parameters for `tasks/get`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
}

/// Parameters for `tasks/cancel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdParams {
    pub id: String,
}

// ============================================================================
// Streaming Events
// ============================================================================

/// Status change pushed over a `tasks/sendSubscribe` stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusUpdateEvent {
    pub id: String,
    pub status: TaskStatus,
    /// True on the last event of the stream
    #[serde(default)]
    pub r#final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Artifact chunk pushed over a `tasks/sendSubscribe` stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskArtifactUpdateEvent {
    pub id: String,
    pub artifact: Artifact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// One event of a task stream, discriminated by shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskStreamEvent {
    Status(TaskStatusUpdateEvent),
    Artifact(TaskArtifactUpdateEvent),
}

impl TaskStreamEvent {
    pub fn task_id(&self) -> &str {
        match self {
            TaskStreamEvent::Status(event) => &event.id,
            TaskStreamEvent::Artifact(event) => &event.id,
        }
    }

    pub fn is_final(&self) -> bool {
        match self {
            TaskStreamEvent::Status(event) => event.r#final,
            TaskStreamEvent::Artifact(_) => false,
        }
    }
}
