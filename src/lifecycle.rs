//! Task lifecycle: from a user's message to the agent's reply in the conversation.
//!
//! A send is a two-phase write. The user message is appended as `Pending`
//! before any network call. It ends up `Sent` with the agent reply appended
//! after it, or `Failed` with an alert raised. Every response goes through the
//! agent registry with a request ticket, so a late reply cannot overwrite a
//! newer one and terminal states stay put.

use std::sync::Arc;

use a2a_playground_config::{PlaygroundConfig, PollingConfig};
use a2a_playground_protocol::http::create_client;
use a2a_playground_protocol::{
    A2aClient, A2aResult, AgentCard, AgentCardFetcher, Artifact, HttpSettings, Message,
    ProtocolError, Task, TaskSendParams, TaskState, TaskStreamEvent, ValidationError,
};
use a2a_playground_state::{ChatMessage, Delivery, Registries};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::alerts::{Alert, AlertSink};
use crate::render::render_task;

/// Knobs for talking to agents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleOptions {
    pub http: HttpSettings,
    pub polling: PollingConfig,
}

impl LifecycleOptions {
    /// Options from the loaded configuration; `timeout_override` comes from `--timeout`
    pub fn from_config(config: &PlaygroundConfig, timeout_override: Option<u64>) -> Self {
        let request_timeout = timeout_override.unwrap_or(config.client.request_timeout_secs);
        Self {
            http: HttpSettings::from_secs(request_timeout, config.client.connect_timeout_secs),
            polling: config.polling.clone(),
        }
    }
}

/// Result of a send that passed validation
#[derive(Debug)]
pub enum SendOutcome {
    Delivered {
        task_id: String,
        user_message_id: String,
        reply: ChatMessage,
        /// State of the task when the reply was produced; `None` if the agent returned no task
        state: Option<TaskState>,
    },
    /// The user message stays in the conversation marked `Failed`
    Failed {
        task_id: String,
        user_message_id: String,
        error: ProtocolError,
    },
}

impl SendOutcome {
    pub fn task_id(&self) -> &str {
        match self {
            SendOutcome::Delivered { task_id, .. } | SendOutcome::Failed { task_id, .. } => {
                task_id
            }
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

/// The agent a message is addressed to
struct Target {
    endpoint: String,
    streaming: bool,
}

/// Orchestrates discovery, submission and follow-up against the registries
pub struct TaskLifecycleManager {
    registries: Registries,
    options: LifecycleOptions,
    http: reqwest::Client,
    alerts: Arc<dyn AlertSink>,
}

impl TaskLifecycleManager {
    pub fn new(
        registries: Registries,
        options: LifecycleOptions,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let http = create_client(options.http);
        Self {
            registries,
            options,
            http,
            alerts,
        }
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn options(&self) -> &LifecycleOptions {
        &self.options
    }

    /// Discover the agent at `url` and register it.
    ///
    /// A descriptor with the same url replaces the registered one in place.
    pub async fn add_agent(&self, url: &str) -> A2aResult<AgentCard> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyAgentUrl.into());
        }

        match AgentCardFetcher::new(self.http.clone()).fetch(url).await {
            Ok(card) => {
                let change = self.registries.hosts.add_host(card.clone());
                info!(name = %card.name, url = %card.url, ?change, "Agent registered");
                Ok(card)
            }
            Err(err) => {
                error!(%url, error = %err, "Agent discovery failed");
                let detail = format!(
                    "Could not load the agent at {url}; check the URL and try again ({})",
                    err.cause
                );
                self.alerts.alert(Alert::error("Agent not added", detail));
                Err(err.into())
            }
        }
    }

    /// Send `text` as a new task. `target` is an agent url; without it the
    /// primary agent receives the message.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        target: Option<&str>,
    ) -> A2aResult<SendOutcome> {
        self.send_task(conversation_id, &Uuid::new_v4().to_string(), text, target)
            .await
    }

    /// Send another message for an existing task, e.g. after `input-required`.
    /// The agent that handled the task so far receives it.
    pub async fn continue_task(
        &self,
        conversation_id: &str,
        task_id: &str,
        text: &str,
    ) -> A2aResult<SendOutcome> {
        let agent_url = self
            .registries
            .agents
            .task(task_id)
            .map(|tracked| tracked.agent_url);
        self.send_task(conversation_id, task_id, text, agent_url.as_deref())
            .await
    }

    /// Send `text` as task `task_id`
    pub async fn send_task(
        &self,
        conversation_id: &str,
        task_id: &str,
        text: &str,
        target: Option<&str>,
    ) -> A2aResult<SendOutcome> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        if self.registries.app.snapshot().conversation(conversation_id).is_none() {
            return Err(ValidationError::UnknownConversation(conversation_id.to_string()).into());
        }
        let target = self.resolve_target(target)?;
        let client = A2aClient::with_http(&target.endpoint, self.http.clone())?;

        let user_message = ChatMessage::user(conversation_id, text, Some(task_id.to_string()));
        let user_message_id = user_message.id.clone();
        self.registries.app.append_message(user_message)?;
        info!(%task_id, endpoint = %target.endpoint, "Sending message");

        let params = TaskSendParams::new(task_id, Message::user_text(text))
            .with_session_id(conversation_id)
            .with_accepted_output_modes(
                self.registries.settings.snapshot().output_mime_types.clone(),
            );

        let exchange = if target.streaming && self.options.polling.prefer_streaming {
            self.stream_and_confirm(&client, params).await
        } else {
            self.submit_and_confirm(&client, params).await
        };

        match exchange {
            Ok(()) => Ok(self.deliver(conversation_id, task_id, user_message_id)),
            Err(err) => {
                error!(%task_id, error = %err, "Message delivery failed");
                self.registries.app.set_delivery(&user_message_id, Delivery::Failed);
                self.alerts
                    .alert(Alert::error("Message not delivered", err.to_string()));
                Ok(SendOutcome::Failed {
                    task_id: task_id.to_string(),
                    user_message_id,
                    error: err,
                })
            }
        }
    }

    fn resolve_target(&self, target: Option<&str>) -> Result<Target, ValidationError> {
        let hosts = self.registries.hosts.snapshot();
        let card = match target.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => match hosts.find(url) {
                Some(card) => card,
                None => {
                    return Ok(Target {
                        endpoint: url.to_string(),
                        streaming: false,
                    });
                }
            },
            None => hosts.primary().ok_or(ValidationError::NoAgent)?,
        };
        Ok(Target {
            endpoint: card.url.clone(),
            streaming: card.capabilities.streaming,
        })
    }

    /// Mark the user message sent and append the reply built from the latest applied task
    fn deliver(
        &self,
        conversation_id: &str,
        task_id: &str,
        user_message_id: String,
    ) -> SendOutcome {
        let task = self.registries.agents.task(task_id).and_then(|tracked| tracked.task);
        let reply = render_task(task.as_ref(), &self.registries.settings.snapshot());
        let reply = ChatMessage::agent(
            conversation_id,
            reply.text,
            reply.attachments,
            Some(task_id.to_string()),
        );

        self.registries.app.set_delivery(&user_message_id, Delivery::Sent);
        if let Err(err) = self.registries.app.append_message(reply.clone()) {
            warn!(%task_id, error = %err, "Reply arrived for a conversation that no longer exists");
        }
        let state = task.as_ref().map(Task::state);
        info!(%task_id, state = ?state, "Message delivered");

        SendOutcome::Delivered {
            task_id: task_id.to_string(),
            user_message_id,
            reply,
            state,
        }
    }

    async fn submit_and_confirm(
        &self,
        client: &A2aClient,
        params: TaskSendParams,
    ) -> Result<(), ProtocolError> {
        let task_id = params.id.clone();
        let ticket = self.registries.agents.issue_ticket(&task_id, client.endpoint());
        let submitted = client.submit_task_with(params).await?;
        self.registries.agents.apply(&ticket, submitted);
        self.confirm(client, &task_id).await
    }

    async fn stream_and_confirm(
        &self,
        client: &A2aClient,
        params: TaskSendParams,
    ) -> Result<(), ProtocolError> {
        let task_id = params.id.clone();
        let mut task = Task::with_id(&task_id);
        task.session_id.clone_from(&params.session_id);

        let stream = client.submit_task_streaming(params).await?;
        futures::pin_mut!(stream);
        while let Some(event) = stream.next().await {
            let event = event?;
            if event.task_id() != task_id {
                warn!(%task_id, other = %event.task_id(), "Ignoring event for another task");
                continue;
            }
            let is_final = event.is_final();
            match event {
                TaskStreamEvent::Status(update) => task.status = update.status,
                TaskStreamEvent::Artifact(update) => {
                    merge_artifact(&mut task.artifacts, update.artifact);
                }
            }
            let ticket = self.registries.agents.issue_ticket(&task_id, client.endpoint());
            self.registries.agents.apply(&ticket, Some(task.clone()));
            if is_final {
                break;
            }
        }
        debug!(%task_id, "Task stream closed");
        self.confirm(client, &task_id).await
    }

    /// Read the task at least once, then keep polling with backoff while the
    /// agent is still working on it
    async fn confirm(&self, client: &A2aClient, task_id: &str) -> Result<(), ProtocolError> {
        let polling = &self.options.polling;
        let attempts = polling.max_attempts.max(1);
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(polling.backoff(attempt - 1)).await;
            }
            let ticket = self.registries.agents.issue_ticket(task_id, client.endpoint());
            let task = client.get_task(task_id).await?;
            let in_progress = task.as_ref().is_some_and(|t| t.state().is_in_progress());
            debug!(%task_id, attempt, state = ?task.as_ref().map(Task::state), "Polled task");
            self.registries.agents.apply(&ticket, task);
            if !in_progress {
                return Ok(());
            }
        }
        warn!(%task_id, attempts, "Task still in progress after the last poll");
        self.alerts.alert(Alert::warning(
            "Task still running",
            format!("{task_id} had not finished after {attempts} polls"),
        ));
        Ok(())
    }
}

/// Fold a streamed artifact chunk into the task's artifacts
fn merge_artifact(artifacts: &mut Vec<Artifact>, chunk: Artifact) {
    match artifacts.iter_mut().find(|a| a.index == chunk.index) {
        Some(existing) if chunk.append.unwrap_or(false) => {
            existing.parts.extend(chunk.parts);
            existing.last_chunk = chunk.last_chunk;
        }
        Some(existing) => *existing = chunk,
        None => artifacts.push(chunk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::MemoryAlerts;
    use a2a_playground_protocol::{A2aError, Part};
    use pretty_assertions::assert_eq;

    fn manager() -> (TaskLifecycleManager, Arc<MemoryAlerts>) {
        let alerts = Arc::new(MemoryAlerts::default());
        let manager = TaskLifecycleManager::new(
            Registries::default(),
            LifecycleOptions::default(),
            alerts.clone(),
        );
        (manager, alerts)
    }

    fn chunk(index: u32, text: &str, append: bool) -> Artifact {
        Artifact {
            name: None,
            description: None,
            parts: vec![Part::text(text)],
            index,
            append: Some(append),
            last_chunk: None,
            metadata: None,
        }
    }

    #[test]
    fn artifact_chunks_append_or_replace_by_index() {
        let mut artifacts = Vec::new();
        merge_artifact(&mut artifacts, chunk(0, "a", false));
        merge_artifact(&mut artifacts, chunk(0, "b", true));
        merge_artifact(&mut artifacts, chunk(1, "c", false));
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].parts.len(), 2);

        merge_artifact(&mut artifacts, chunk(0, "d", false));
        assert_eq!(artifacts[0].parts, vec![Part::text("d")]);
    }

    #[test]
    fn options_follow_config_and_timeout_override() {
        let config = PlaygroundConfig::default();
        let options = LifecycleOptions::from_config(&config, Some(0));
        assert_eq!(options.http.request_timeout, None);
        assert_eq!(options.polling, config.polling);

        let defaults = LifecycleOptions::from_config(&config, None);
        assert_eq!(defaults.http, HttpSettings::default());
    }

    #[tokio::test]
    async fn validation_happens_before_any_state_change() {
        let (manager, alerts) = manager();
        let before = manager.registries().app.snapshot();

        let blank = manager.send_message("missing", "   ", None).await;
        assert!(matches!(blank, Err(A2aError::Validation(ValidationError::EmptyMessage))));

        let unknown = manager.send_message("missing", "hi", None).await;
        assert!(matches!(
            unknown,
            Err(A2aError::Validation(ValidationError::UnknownConversation(_)))
        ));

        let conversation = manager.registries().app.add_conversation(None);
        let after_add = manager.registries().app.snapshot();
        let no_agent = manager.send_message(&conversation.id, "hi", None).await;
        assert!(matches!(no_agent, Err(A2aError::Validation(ValidationError::NoAgent))));

        assert_eq!(*before, Default::default());
        assert_eq!(manager.registries().app.snapshot(), after_add);
        assert!(alerts.alerts().is_empty());
    }

    #[tokio::test]
    async fn blank_agent_url_is_rejected_without_alert() {
        let (manager, alerts) = manager();
        let err = manager.add_agent("  ").await.unwrap_err();
        assert!(matches!(err, A2aError::Validation(ValidationError::EmptyAgentUrl)));
        assert!(alerts.alerts().is_empty());
    }
}
