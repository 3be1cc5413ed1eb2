//! Turning agent responses into displayable chat content

use a2a_playground_protocol::{Message, Part, Task, types::TEXT_MIME};
use a2a_playground_state::SettingsState;
use tracing::debug;

/// Content shown when the agent answered without a task
pub const NULL_RESPONSE_PLACEHOLDER: &str = "Response is null";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedReply {
    pub text: String,
    pub attachments: Vec<Part>,
}

/// Display content for the latest known state of a task
pub fn render_task(task: Option<&Task>, settings: &SettingsState) -> RenderedReply {
    match task {
        None => RenderedReply {
            text: NULL_RESPONSE_PLACEHOLDER.to_string(),
            attachments: Vec::new(),
        },
        Some(task) => task
            .status_message()
            .map(|message| render_message(message, settings))
            .unwrap_or_default(),
    }
}

/// Text parts joined by newlines, accepted non-text parts kept as attachments
pub fn render_message(message: &Message, settings: &SettingsState) -> RenderedReply {
    let accepts_text = settings.accepts(TEXT_MIME);
    let mut segments = Vec::new();
    let mut attachments = Vec::new();

    for part in &message.parts {
        match part {
            Part::Text { text, .. } => {
                if accepts_text {
                    segments.push(text.as_str());
                }
            }
            Part::File { .. } | Part::Data { .. } => {
                let mime = part.mime_type().unwrap_or_default();
                if settings.accepts(mime) {
                    attachments.push(part.clone());
                } else {
                    debug!(mime, "Skipping part rejected by output settings");
                }
            }
            Part::Unsupported => debug!("Skipping part of unknown type"),
        }
    }

    RenderedReply {
        text: segments.join("\n"),
        attachments,
    }
}

/// One-line description of an attachment
pub fn describe_attachment(part: &Part) -> String {
    match part {
        Part::Text { text, .. } => text.clone(),
        Part::File { file, .. } => {
            let name = file.name.as_deref().unwrap_or("file");
            let mime = part.mime_type().unwrap_or_default();
            match (&file.uri, &file.bytes) {
                (Some(uri), _) => format!("[{name} ({mime}) {uri}]"),
                (None, Some(bytes)) => format!("[{name} ({mime}) {} base64 chars]", bytes.len()),
                (None, None) => format!("[{name} ({mime})]"),
            }
        }
        Part::Data { data, .. } => format!("[data {data}]"),
        Part::Unsupported => "[unsupported part]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_playground_protocol::{MessageRole, TaskState};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn task_with(parts: Vec<Part>) -> Task {
        let mut task = Task::with_id("T1");
        task.update_status(
            TaskState::Completed,
            Some(Message::new(MessageRole::Agent, parts)),
        );
        task
    }

    #[test]
    fn absent_task_renders_placeholder() {
        let reply = render_task(None, &SettingsState::default());
        assert_eq!(reply.text, "Response is null");
    }

    #[test]
    fn missing_status_message_renders_empty() {
        let task = Task::with_id("T1");
        assert_eq!(render_task(Some(&task), &SettingsState::default()), RenderedReply::default());
    }

    #[test]
    fn text_parts_join_in_order() {
        let task = task_with(vec![Part::text("Here is your scraper:"), Part::text("import requests")]);
        let reply = render_task(Some(&task), &SettingsState::default());
        assert_eq!(reply.text, "Here is your scraper:\nimport requests");
        assert!(reply.attachments.is_empty());
    }

    #[test]
    fn non_text_parts_are_filtered_by_settings() {
        let image = Part::file_uri("http://cdn.local/cat.png", Some("image/png".into()));
        let data = Part::data(json!({"rows": 3}));
        let task = task_with(vec![Part::text("Results"), image.clone(), data.clone()]);

        let defaults = render_task(Some(&task), &SettingsState::default());
        assert_eq!(defaults.text, "Results");
        assert_eq!(defaults.attachments, vec![image.clone()]);

        let everything =
            SettingsState::default().with_output_mime_types(vec!["*/*".into()]);
        let reply = render_task(Some(&task), &everything);
        assert_eq!(reply.attachments, vec![image, data]);
    }

    #[test]
    fn rejected_text_is_dropped() {
        let settings = SettingsState::default().with_output_mime_types(vec!["image/*".into()]);
        let task = task_with(vec![Part::text("hidden")]);
        assert_eq!(render_task(Some(&task), &settings).text, "");
    }

    #[test]
    fn attachments_have_readable_descriptions() {
        let file = Part::file_bytes(b"abc", Some("image/png".into()), Some("dot.png".into()));
        assert_eq!(describe_attachment(&file), "[dot.png (image/png) 4 base64 chars]");
        assert_eq!(describe_attachment(&Part::data(json!(1))), "[data 1]");
    }
}
