//! Conversations and the flattened chat messages shown in them.

use std::collections::HashMap;

use a2a_playground_protocol::{MessageRole, Part, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::registry::Registry;

pub const DEFAULT_CONVERSATION_NAME: &str = "New conversation";

/// Delivery of a user message. Agent messages are always `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Shown optimistically, the agent has not confirmed it yet
    Pending,
    Sent,
    /// Kept in the conversation so the user can see what did not go through
    Failed,
}

impl Delivery {
    pub fn as_str(self) -> &'static str {
        match self {
            Delivery::Pending => "pending",
            Delivery::Sent => "sent",
            Delivery::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub message_ids: Vec<String>,
}

impl Conversation {
    fn new(name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_NAME);
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_active: true,
            message_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    /// Display text
    pub content: String,
    /// Non-text parts that passed the output-mode filter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub delivery: Delivery,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A user message in its optimistic `Pending` phase
    pub fn user(
        conversation_id: impl Into<String>,
        content: impl Into<String>,
        task_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            role: MessageRole::User,
            content: content.into(),
            attachments: Vec::new(),
            task_id,
            delivery: Delivery::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn agent(
        conversation_id: impl Into<String>,
        content: impl Into<String>,
        attachments: Vec<Part>,
        task_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            role: MessageRole::Agent,
            content: content.into(),
            attachments,
            task_id,
            delivery: Delivery::Sent,
            created_at: Utc::now(),
        }
    }
}

/// Conversations in creation order plus every message they reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    conversations: Vec<Conversation>,
    messages: HashMap<String, ChatMessage>,
}

impl AppState {
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn message(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.get(id)
    }

    /// Messages of a conversation in the order they were appended
    pub fn messages_for(&self, conversation_id: &str) -> Vec<&ChatMessage> {
        self.conversation(conversation_id)
            .map(|conversation| {
                conversation
                    .message_ids
                    .iter()
                    .filter_map(|id| self.messages.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    fn push_conversation(&mut self, conversation: Conversation) {
        self.conversations.push(conversation);
    }

    fn insert_message(&mut self, message: ChatMessage) -> Result<bool, ValidationError> {
        if self.messages.contains_key(&message.id) {
            return Ok(false);
        }
        let conversation = self
            .conversation_mut(&message.conversation_id)
            .ok_or_else(|| ValidationError::UnknownConversation(message.conversation_id.clone()))?;
        conversation.message_ids.push(message.id.clone());
        self.messages.insert(message.id.clone(), message);
        Ok(true)
    }

    fn drop_conversation(&mut self, id: &str) -> bool {
        let Some(index) = self.conversations.iter().position(|c| c.id == id) else {
            return false;
        };
        let removed = self.conversations.remove(index);
        for message_id in &removed.message_ids {
            self.messages.remove(message_id);
        }
        true
    }
}

impl Registry<AppState> {
    /// Append a fresh active conversation with no messages
    pub fn add_conversation(&self, name: Option<&str>) -> Conversation {
        let conversation = Conversation::new(name);
        let created = conversation.clone();
        self.update(|state| {
            let mut next = state.clone();
            next.push_conversation(conversation);
            next
        });
        debug!(conversation_id = %created.id, "Added conversation");
        created
    }

    pub fn rename_conversation(&self, id: &str, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        self.update_with(|state| {
            let mut next = state.clone();
            match next.conversation_mut(id) {
                Some(conversation) => {
                    if !name.is_empty() {
                        conversation.name = name.to_string();
                    }
                    (Some(next), Ok(()))
                }
                None => (None, Err(ValidationError::UnknownConversation(id.to_string()))),
            }
        })
    }

    /// Remove a conversation and its messages. Returns false if it was unknown.
    pub fn remove_conversation(&self, id: &str) -> bool {
        self.update_with(|state| {
            let mut next = state.clone();
            if next.drop_conversation(id) {
                (Some(next), true)
            } else {
                (None, false)
            }
        })
    }

    /// Append a message to its conversation.
    ///
    /// Returns `Ok(false)` without writing when a message with the same id
    /// is already present.
    pub fn append_message(&self, message: ChatMessage) -> Result<bool, ValidationError> {
        self.update_with(|state| {
            let mut next = state.clone();
            match next.insert_message(message) {
                Ok(true) => (Some(next), Ok(true)),
                other => (None, other),
            }
        })
    }

    /// Move a message to another delivery phase. Returns false if it is unknown.
    pub fn set_delivery(&self, message_id: &str, delivery: Delivery) -> bool {
        self.update_with(|state| {
            let mut next = state.clone();
            match next.messages.get_mut(message_id) {
                Some(message) => {
                    message.delivery = delivery;
                    (Some(next), true)
                }
                None => (None, false),
            }
        })
    }

    pub fn messages_for(&self, conversation_id: &str) -> Vec<ChatMessage> {
        self.snapshot()
            .messages_for(conversation_id)
            .into_iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_conversation_appends_one_fresh_entry() {
        let app = Registry::<AppState>::default();
        let first = app.add_conversation(None);
        let second = app.add_conversation(Some("  "));

        let state = app.snapshot();
        assert_eq!(state.conversations().len(), 2);
        assert_ne!(first.id, second.id);
        for conversation in state.conversations() {
            assert_eq!(conversation.name, DEFAULT_CONVERSATION_NAME);
            assert!(conversation.is_active);
            assert!(conversation.message_ids.is_empty());
        }
    }

    #[test]
    fn append_message_keeps_order_and_rejects_duplicates() {
        let app = Registry::<AppState>::default();
        let conversation = app.add_conversation(Some("Scraper"));

        let question = ChatMessage::user(&conversation.id, "Hello", Some("T1".into()));
        let answer = ChatMessage::agent(&conversation.id, "Hi", Vec::new(), Some("T1".into()));

        assert_eq!(app.append_message(question.clone()), Ok(true));
        assert_eq!(app.append_message(answer.clone()), Ok(true));
        assert_eq!(app.append_message(question.clone()), Ok(false));

        let contents: Vec<String> = app
            .messages_for(&conversation.id)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["Hello".to_string(), "Hi".to_string()]);

        let state = app.snapshot();
        let ids = &state.conversation(&conversation.id).expect("exists").message_ids;
        assert_eq!(ids, &vec![question.id, answer.id]);
    }

    #[test]
    fn append_to_unknown_conversation_is_rejected() {
        let app = Registry::<AppState>::default();
        let message = ChatMessage::user("missing", "Hello", None);
        assert_eq!(
            app.append_message(message),
            Err(ValidationError::UnknownConversation("missing".into()))
        );
        assert!(app.snapshot().conversations().is_empty());
    }

    #[test]
    fn delivery_moves_through_phases() {
        let app = Registry::<AppState>::default();
        let conversation = app.add_conversation(None);
        let message = ChatMessage::user(&conversation.id, "Hello", None);
        let id = message.id.clone();
        app.append_message(message).expect("append");

        assert_eq!(app.snapshot().message(&id).map(|m| m.delivery), Some(Delivery::Pending));
        assert!(app.set_delivery(&id, Delivery::Failed));
        assert_eq!(app.snapshot().message(&id).map(|m| m.delivery), Some(Delivery::Failed));
        assert!(!app.set_delivery("nope", Delivery::Sent));
    }

    #[test]
    fn rename_and_remove_conversation() {
        let app = Registry::<AppState>::default();
        let conversation = app.add_conversation(None);
        let message = ChatMessage::user(&conversation.id, "Hello", None);
        let message_id = message.id.clone();
        app.append_message(message).expect("append");

        app.rename_conversation(&conversation.id, "Research")
            .expect("rename");
        assert_eq!(
            app.snapshot().conversation(&conversation.id).map(|c| c.name.clone()),
            Some("Research".to_string())
        );
        assert!(app.rename_conversation("missing", "x").is_err());

        assert!(app.remove_conversation(&conversation.id));
        assert!(!app.remove_conversation(&conversation.id));
        assert!(app.snapshot().message(&message_id).is_none());
    }

    #[test]
    fn chat_message_serializes_in_camel_case() {
        let message = ChatMessage::user("c-1", "Hello", Some("T1".into()));
        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(value["conversationId"], "c-1");
        assert_eq!(value["taskId"], "T1");
        assert_eq!(value["delivery"], "pending");
    }
}
