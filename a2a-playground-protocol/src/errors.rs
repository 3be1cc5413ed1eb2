//! A2A protocol error types and error codes
//!
//! Three failure families surface from this crate:
//! - [`DiscoveryError`] when an agent descriptor cannot be fetched or validated
//! - [`ProtocolError`] when a task round trip fails (transport, status, envelope)
//! - [`ValidationError`] when local input is rejected before any I/O happens
//!
//! [`A2aError`] wraps all three so orchestration code can use a single `?`.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

// ============================================================================
// JSON-RPC 2.0 and A2A error codes
// ============================================================================

/// Parse error - Invalid JSON was received
pub const JSON_PARSE_ERROR: i32 = -32700;

/// Invalid Request - The JSON sent is not a valid Request object
pub const INVALID_REQUEST_ERROR: i32 = -32600;

/// Method not found - The method does not exist / is not available
pub const METHOD_NOT_FOUND_ERROR: i32 = -32601;

/// Invalid params - Invalid method parameters
pub const INVALID_PARAMS_ERROR: i32 = -32602;

/// Internal error - Internal JSON-RPC error
pub const INTERNAL_ERROR: i32 = -32603;

/// Task not found - The specified task does not exist
pub const TASK_NOT_FOUND_ERROR: i32 = -32001;

/// Task not cancelable - The task cannot be canceled in its current state
pub const TASK_NOT_CANCELABLE_ERROR: i32 = -32002;

/// Push notifications not supported by the agent
pub const PUSH_NOTIFICATION_NOT_SUPPORTED_ERROR: i32 = -32003;

/// Unsupported operation
pub const UNSUPPORTED_OPERATION_ERROR: i32 = -32004;

/// Content type not supported (incompatible output modes)
pub const CONTENT_TYPE_NOT_SUPPORTED_ERROR: i32 = -32005;

/// Error code carried by a JSON-RPC error object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum A2aErrorCode {
    JsonParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    TaskNotFound,
    TaskNotCancelable,
    PushNotificationNotSupported,
    UnsupportedOperation,
    ContentTypeNotSupported,
    /// Any code outside the well-known set
    Custom(i32),
}

impl From<A2aErrorCode> for i32 {
    fn from(code: A2aErrorCode) -> Self {
        match code {
            A2aErrorCode::JsonParseError => JSON_PARSE_ERROR,
            A2aErrorCode::InvalidRequest => INVALID_REQUEST_ERROR,
            A2aErrorCode::MethodNotFound => METHOD_NOT_FOUND_ERROR,
            A2aErrorCode::InvalidParams => INVALID_PARAMS_ERROR,
            A2aErrorCode::InternalError => INTERNAL_ERROR,
            A2aErrorCode::TaskNotFound => TASK_NOT_FOUND_ERROR,
            A2aErrorCode::TaskNotCancelable => TASK_NOT_CANCELABLE_ERROR,
            A2aErrorCode::PushNotificationNotSupported => PUSH_NOTIFICATION_NOT_SUPPORTED_ERROR,
            A2aErrorCode::UnsupportedOperation => UNSUPPORTED_OPERATION_ERROR,
            A2aErrorCode::ContentTypeNotSupported => CONTENT_TYPE_NOT_SUPPORTED_ERROR,
            A2aErrorCode::Custom(code) => code,
        }
    }
}

impl From<i32> for A2aErrorCode {
    fn from(code: i32) -> Self {
        match code {
            JSON_PARSE_ERROR => A2aErrorCode::JsonParseError,
            INVALID_REQUEST_ERROR => A2aErrorCode::InvalidRequest,
            METHOD_NOT_FOUND_ERROR => A2aErrorCode::MethodNotFound,
            INVALID_PARAMS_ERROR => A2aErrorCode::InvalidParams,
            INTERNAL_ERROR => A2aErrorCode::InternalError,
            TASK_NOT_FOUND_ERROR => A2aErrorCode::TaskNotFound,
            TASK_NOT_CANCELABLE_ERROR => A2aErrorCode::TaskNotCancelable,
            PUSH_NOTIFICATION_NOT_SUPPORTED_ERROR => A2aErrorCode::PushNotificationNotSupported,
            UNSUPPORTED_OPERATION_ERROR => A2aErrorCode::UnsupportedOperation,
            CONTENT_TYPE_NOT_SUPPORTED_ERROR => A2aErrorCode::ContentTypeNotSupported,
            other => A2aErrorCode::Custom(other),
        }
    }
}

impl fmt::Display for A2aErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            A2aErrorCode::JsonParseError => write!(f, "JSON parse error"),
            A2aErrorCode::InvalidRequest => write!(f, "Invalid request"),
            A2aErrorCode::MethodNotFound => write!(f, "Method not found"),
            A2aErrorCode::InvalidParams => write!(f, "Invalid params"),
            A2aErrorCode::InternalError => write!(f, "Internal error"),
            A2aErrorCode::TaskNotFound => write!(f, "Task not found"),
            A2aErrorCode::TaskNotCancelable => write!(f, "Task not cancelable"),
            A2aErrorCode::PushNotificationNotSupported => {
                write!(f, "Push notifications not supported")
            }
            A2aErrorCode::UnsupportedOperation => write!(f, "Unsupported operation"),
            A2aErrorCode::ContentTypeNotSupported => write!(f, "Content type not supported"),
            A2aErrorCode::Custom(code) => write!(f, "Custom error ({code})"),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Underlying reason a discovery or protocol round trip failed
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid agent descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("JSON-RPC error ({code}): {message}")]
    Rpc { code: A2aErrorCode, message: String },

    #[error("JSON-RPC response carries neither result nor error")]
    EmptyEnvelope,

    #[error("response id {received} does not match request id {expected}")]
    IdMismatch { expected: String, received: String },

    #[error("malformed event stream: {0}")]
    Stream(String),
}

impl FailureCause {
    /// JSON-RPC code when the server answered with an error object
    pub fn rpc_code(&self) -> Option<A2aErrorCode> {
        match self {
            FailureCause::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Agent discovery failed; carries the URL the caller asked for
#[derive(Debug, Error)]
#[error("agent discovery failed for {url}: {cause}")]
pub struct DiscoveryError {
    pub url: String,
    #[source]
    pub cause: FailureCause,
}

impl DiscoveryError {
    pub fn new(url: impl Into<String>, cause: impl Into<FailureCause>) -> Self {
        Self {
            url: url.into(),
            cause: cause.into(),
        }
    }
}

/// A task round trip failed; tagged with the RPC method and endpoint
#[derive(Debug, Error)]
#[error("{operation} against {endpoint} failed: {cause}")]
pub struct ProtocolError {
    pub operation: &'static str,
    pub endpoint: String,
    #[source]
    pub cause: FailureCause,
}

impl ProtocolError {
    pub fn new(
        operation: &'static str,
        endpoint: impl Into<String>,
        cause: impl Into<FailureCause>,
    ) -> Self {
        Self {
            operation,
            endpoint: endpoint.into(),
            cause: cause.into(),
        }
    }
}

/// Local input rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message text is empty")]
    EmptyMessage,

    #[error("agent URL is empty")]
    EmptyAgentUrl,

    #[error("agent URL {url} is not a valid http(s) URL: {reason}")]
    InvalidAgentUrl { url: String, reason: String },

    #[error("no agent is registered to receive the message")]
    NoAgent,

    #[error("conversation {0} does not exist")]
    UnknownConversation(String),
}

/// Umbrella error for callers that drive discovery and task operations together
#[derive(Debug, Error)]
pub enum A2aError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl A2aError {
    pub fn is_validation(&self) -> bool {
        matches!(self, A2aError::Validation(_))
    }
}

/// A2A Result type alias
pub type A2aResult<T> = Result<T, A2aError>;
