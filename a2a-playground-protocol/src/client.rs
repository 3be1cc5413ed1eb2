//! A2A client bound to a single agent endpoint.
//! Provides discovery, task submission/query/cancel, and streaming submission.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, trace};

use crate::agent_card::{AgentCard, parse_http_url};
use crate::discovery::AgentCardFetcher;
use crate::errors::{A2aErrorCode, DiscoveryError, FailureCause, ProtocolError, ValidationError};
use crate::http::{HttpSettings, create_client};
use crate::rpc::{
    JsonRpcRequest, JsonRpcResponse, METHOD_TASKS_CANCEL, METHOD_TASKS_GET, METHOD_TASKS_SEND,
    METHOD_TASKS_SEND_SUBSCRIBE, TaskArtifactUpdateEvent, TaskIdParams, TaskQueryParams,
    TaskSendParams, TaskStatusUpdateEvent, TaskStreamEvent,
};
use crate::types::{Message, Task};

/// HTTP client for one A2A agent endpoint
#[derive(Clone, Debug)]
pub struct A2aClient {
    endpoint: String,
    http: Client,
    request_id: Arc<AtomicU64>,
}

impl A2aClient {
    /// Create a client with default timeouts
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_settings(endpoint, HttpSettings::default())
    }

    pub fn with_settings(
        endpoint: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, ValidationError> {
        Self::with_http(endpoint, create_client(settings))
    }

    /// Create a client that reuses an existing HTTP connection pool
    pub fn with_http(endpoint: impl Into<String>, http: Client) -> Result<Self, ValidationError> {
        let endpoint = endpoint.into().trim().to_string();
        if endpoint.is_empty() {
            return Err(ValidationError::EmptyAgentUrl);
        }
        parse_http_url(&endpoint).map_err(|reason| ValidationError::InvalidAgentUrl {
            url: endpoint.clone(),
            reason,
        })?;

        Ok(Self {
            endpoint,
            http,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_id(&self) -> String {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        format!("a2a-{id}")
    }

    fn error(&self, operation: &'static str, cause: impl Into<FailureCause>) -> ProtocolError {
        ProtocolError::new(operation, self.endpoint.clone(), cause)
    }

    /// Fetch the descriptor published by this client's endpoint
    pub async fn fetch_agent_descriptor(&self) -> Result<AgentCard, DiscoveryError> {
        AgentCardFetcher::new(self.http.clone())
            .fetch(&self.endpoint)
            .await
    }

    /// Submit `message` as task `id`.
    ///
    /// `Ok(None)` means the agent answered with an explicit null result.
    pub async fn submit_task(
        &self,
        id: impl Into<String>,
        message: Message,
    ) -> Result<Option<Task>, ProtocolError> {
        self.submit_task_with(TaskSendParams::new(id, message)).await
    }

    pub async fn submit_task_with(
        &self,
        params: TaskSendParams,
    ) -> Result<Option<Task>, ProtocolError> {
        let params =
            serde_json::to_value(&params).map_err(|e| self.error(METHOD_TASKS_SEND, e))?;
        let result = self.call_rpc(METHOD_TASKS_SEND, Some(params)).await?;
        self.decode_task(METHOD_TASKS_SEND, result)
    }

    /// Query task `id`. `Ok(None)` means the agent does not know the task.
    pub async fn get_task(&self, id: impl Into<String>) -> Result<Option<Task>, ProtocolError> {
        let params = TaskQueryParams {
            id: id.into(),
            history_length: None,
        };
        let params =
            serde_json::to_value(&params).map_err(|e| self.error(METHOD_TASKS_GET, e))?;
        match self.call_rpc(METHOD_TASKS_GET, Some(params)).await {
            Ok(result) => self.decode_task(METHOD_TASKS_GET, result),
            Err(err) if err.cause.rpc_code() == Some(A2aErrorCode::TaskNotFound) => {
                debug!(endpoint = %self.endpoint, "Agent does not know the task");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Ask the agent to cancel task `id`
    pub async fn cancel_task(&self, id: impl Into<String>) -> Result<Option<Task>, ProtocolError> {
        let params = serde_json::to_value(TaskIdParams { id: id.into() })
            .map_err(|e| self.error(METHOD_TASKS_CANCEL, e))?;
        let result = self.call_rpc(METHOD_TASKS_CANCEL, Some(params)).await?;
        self.decode_task(METHOD_TASKS_CANCEL, result)
    }

    /// Submit a task and consume its status/artifact events as they arrive
    pub async fn submit_task_streaming(
        &self,
        params: TaskSendParams,
    ) -> Result<impl Stream<Item = Result<TaskStreamEvent, ProtocolError>>, ProtocolError> {
        const OP: &str = METHOD_TASKS_SEND_SUBSCRIBE;

        let params = serde_json::to_value(&params).map_err(|e| self.error(OP, e))?;
        let request = JsonRpcRequest::with_string_id(OP, Some(params), self.next_id());
        debug!(method = OP, id = %request.id, endpoint = %self.endpoint, "Opening task stream");

        let response = self
            .http
            .post(&self.endpoint)
            .header("accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.error(OP, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error(OP, FailureCause::Status(status)));
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim_start().starts_with("text/event-stream"));

        // Agents without streaming support answer with a plain JSON-RPC envelope
        let (prefetched, byte_stream) = if is_event_stream {
            (Vec::new(), Some(response.bytes_stream()))
        } else {
            let body = response.bytes().await.map_err(|e| self.error(OP, e))?;
            trace!(method = OP, body = %String::from_utf8_lossy(&body), "Non-stream response");
            let rpc_response: JsonRpcResponse =
                serde_json::from_slice(&body).map_err(|e| self.error(OP, e))?;
            let result = unwrap_envelope(&request.id, rpc_response)
                .map_err(|cause| self.error(OP, cause))?;
            let events = match result {
                Some(result) => events_from_result(result).map_err(|e| self.error(OP, e))?,
                None => Vec::new(),
            };
            (events, None)
        };

        let endpoint = self.endpoint.clone();
        let stream = async_stream::try_stream! {
            let mut yielded = 0usize;
            for event in prefetched {
                yielded += 1;
                yield event;
            }

            if let Some(byte_stream) = byte_stream {
                let mut buffer = Vec::new();
                futures::pin_mut!(byte_stream);

                while let Some(chunk) = byte_stream.next().await {
                    let chunk = chunk.map_err(|e| ProtocolError::new(OP, endpoint.clone(), e))?;
                    buffer.extend_from_slice(&chunk);

                    // Process complete SSE events separated by blank lines
                    while let Some(pos) = find_event_boundary(&buffer) {
                        let event_bytes = buffer.drain(..pos).collect::<Vec<u8>>();
                        if let Some(event) = parse_sse_event(&event_bytes)
                            .map_err(|cause| ProtocolError::new(OP, endpoint.clone(), cause))?
                        {
                            yielded += 1;
                            yield event;
                        }
                    }
                }

                if !buffer.is_empty() {
                    if let Some(event) = parse_sse_event(&buffer)
                        .map_err(|cause| ProtocolError::new(OP, endpoint.clone(), cause))?
                    {
                        yielded += 1;
                        yield event;
                    }
                }
            }

            if yielded == 0 {
                Err::<(), _>(ProtocolError::new(
                    OP,
                    endpoint.clone(),
                    FailureCause::Stream("empty event stream".into()),
                ))?;
            }
        };

        Ok(stream)
    }

    fn decode_task(
        &self,
        operation: &'static str,
        result: Option<Value>,
    ) -> Result<Option<Task>, ProtocolError> {
        result
            .map(serde_json::from_value::<Task>)
            .transpose()
            .map_err(|e| self.error(operation, e))
    }

    /// One JSON-RPC round trip. `Ok(None)` for an explicit null result.
    async fn call_rpc(
        &self,
        method: &'static str,
        params: Option<Value>,
    ) -> Result<Option<Value>, ProtocolError> {
        let request = JsonRpcRequest::with_string_id(method, params, self.next_id());
        debug!(method, id = %request.id, endpoint = %self.endpoint, "Sending JSON-RPC request");

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.error(method, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.error(method, FailureCause::Status(status)));
        }

        let body = resp.bytes().await.map_err(|e| self.error(method, e))?;
        trace!(method, body = %String::from_utf8_lossy(&body), "JSON-RPC response body");

        let rpc_response: JsonRpcResponse =
            serde_json::from_slice(&body).map_err(|e| self.error(method, e))?;
        unwrap_envelope(&request.id, rpc_response).map_err(|cause| self.error(method, cause))
    }
}

/// Check the response id and split result from error
fn unwrap_envelope(
    request_id: &Value,
    response: JsonRpcResponse,
) -> Result<Option<Value>, FailureCause> {
    if !response.id.is_null() && response.id != *request_id {
        return Err(FailureCause::IdMismatch {
            expected: request_id.to_string(),
            received: response.id.to_string(),
        });
    }

    if let Some(err) = response.error {
        return Err(FailureCause::Rpc {
            code: err.code.into(),
            message: err.message,
        });
    }

    match response.result {
        Some(Value::Null) => Ok(None),
        Some(result) => Ok(Some(result)),
        None => Err(FailureCause::EmptyEnvelope),
    }
}

/// Events carried by a single non-streaming result: either one event or a whole task
fn events_from_result(result: Value) -> Result<Vec<TaskStreamEvent>, serde_json::Error> {
    let is_event = result
        .as_object()
        .is_some_and(|fields| fields.contains_key("final") || fields.contains_key("artifact"));
    if is_event {
        return Ok(vec![serde_json::from_value(result)?]);
    }

    let task: Task = serde_json::from_value(result)?;
    let mut events: Vec<TaskStreamEvent> = task
        .artifacts
        .iter()
        .cloned()
        .map(|artifact| {
            TaskStreamEvent::Artifact(TaskArtifactUpdateEvent {
                id: task.id.clone(),
                artifact,
                metadata: None,
            })
        })
        .collect();
    events.push(TaskStreamEvent::Status(TaskStatusUpdateEvent {
        id: task.id,
        status: task.status,
        r#final: true,
        metadata: task.metadata,
    }));
    Ok(events)
}

/// End offset (exclusive) of the first complete SSE event, blank-line delimited
fn find_event_boundary(buf: &[u8]) -> Option<usize> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|pos| pos + 2);
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4);
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Parse one SSE event whose `data:` lines carry a JSON-RPC response
fn parse_sse_event(bytes: &[u8]) -> Result<Option<TaskStreamEvent>, FailureCause> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| FailureCause::Stream(format!("invalid UTF-8 in event: {e}")))?;

    let data = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|payload| payload.strip_prefix(' ').unwrap_or(payload))
        .collect::<Vec<_>>()
        .join("\n");
    if data.trim().is_empty() {
        return Ok(None);
    }

    let response: JsonRpcResponse = serde_json::from_str(&data)?;
    if let Some(err) = response.error {
        return Err(FailureCause::Rpc {
            code: err.code.into(),
            message: err.message,
        });
    }
    match response.result {
        Some(Value::Null) | None => Ok(None),
        Some(result) => Ok(Some(serde_json::from_value(result)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::JsonRpcError;
    use serde_json::json;

    #[test]
    fn test_find_event_boundary() {
        assert_eq!(find_event_boundary(b"data: x\n\nrest"), Some(9));
        assert_eq!(find_event_boundary(b"data: x\r\n\r\nrest"), Some(11));
        assert_eq!(find_event_boundary(b"data: partial"), None);
    }

    #[test]
    fn test_parse_sse_event_without_data() {
        assert!(parse_sse_event(b"event: ping\n\n").expect("parse").is_none());
    }

    #[test]
    fn test_parse_sse_status_event() {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": "a2a-1",
            "result": {"id": "t-1", "status": {"state": "completed"}, "final": true}
        });
        let raw = format!("data: {payload}\n\n");
        let event = parse_sse_event(raw.as_bytes()).expect("parse").expect("event");
        assert!(event.is_final());
        assert_eq!(event.task_id(), "t-1");
    }

    #[test]
    fn test_parse_sse_error_event() {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": "a2a-1",
            "error": {"code": -32603, "message": "boom"}
        });
        let raw = format!("data: {payload}\n\n");
        let err = parse_sse_event(raw.as_bytes()).unwrap_err();
        assert_eq!(err.rpc_code(), Some(A2aErrorCode::InternalError));
    }

    #[test]
    fn envelope_id_mismatch_is_rejected() {
        let response = JsonRpcResponse::success(json!({}), json!("a2a-7"));
        let err = unwrap_envelope(&json!("a2a-1"), response).unwrap_err();
        assert!(matches!(err, FailureCause::IdMismatch { .. }));
    }

    #[test]
    fn envelope_null_result_is_none() {
        let response = JsonRpcResponse::success(Value::Null, json!("a2a-1"));
        assert!(unwrap_envelope(&json!("a2a-1"), response).expect("ok").is_none());
    }

    #[test]
    fn envelope_error_object_becomes_rpc_cause() {
        let error = JsonRpcError::new(-32001, "Task not found");
        let response = JsonRpcResponse::error(error, json!("a2a-1"));
        let err = unwrap_envelope(&json!("a2a-1"), response).unwrap_err();
        assert_eq!(err.rpc_code(), Some(A2aErrorCode::TaskNotFound));
    }

    #[test]
    fn whole_task_result_expands_to_artifacts_then_final_status() {
        let events = events_from_result(json!({
            "id": "t-2",
            "status": {"state": "completed"},
            "artifacts": [{"parts": [{"type": "text", "text": "x"}], "index": 0}]
        }))
        .expect("task result");
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TaskStreamEvent::Artifact(_)));
        assert!(events[1].is_final());

        let single = events_from_result(json!({
            "id": "t-2", "status": {"state": "working"}, "final": false
        }))
        .expect("event result");
        assert_eq!(single.len(), 1);
        assert!(!single[0].is_final());
    }

    #[test]
    fn client_rejects_blank_and_invalid_endpoints() {
        assert_eq!(A2aClient::new("  ").unwrap_err(), ValidationError::EmptyAgentUrl);
        assert!(matches!(
            A2aClient::new("not a url"),
            Err(ValidationError::InvalidAgentUrl { .. })
        ));
        assert!(A2aClient::new("http://localhost:10000").is_ok());
    }
}
