//! Interactive chat session
//!
//! Lines starting with `/` are session commands. Anything else is sent to the
//! primary agent in the active conversation, or, when the last reply asked
//! for more input, to the agent handling that task.

use std::io::Write;

use a2a_playground_config::OutputConfig;
use a2a_playground_protocol::{MessageRole, TaskState};
use a2a_playground_state::{ChatMessage, Delivery};
use anyhow::{Context, Result};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::handlers::print_card;
use crate::lifecycle::{SendOutcome, TaskLifecycleManager};
use crate::render::describe_attachment;
use crate::styled::{Palette, Styles};

const HELP: &str = "\
Commands:
  /add <url>            discover an agent and register it
  /agents               list registered agents (the first one is primary)
  /new [name]           start a new conversation
  /conversations        list conversations
  /open <n>             switch to conversation n and show its messages
  /rename <name>        rename the active conversation
  /delete               delete the active conversation
  /tasks                list tracked tasks
  /events               list applied task updates
  /settings [mime,...]  show or set accepted output MIME types
  /help                 show this help
  /quit                 leave the session
Any other line is sent as a message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Add(String),
    Agents,
    New(Option<String>),
    Conversations,
    Open(usize),
    Rename(String),
    Delete,
    Tasks,
    Events,
    Settings(Option<Vec<String>>),
    Help,
    Quit,
    Message(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatCommandError {
    #[error("unknown command /{0}; type /help for the list")]
    Unknown(String),
    #[error("/{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("expected a conversation number, got {0:?}")]
    InvalidIndex(String),
}

/// Parse one line of input
pub fn parse_chat_command(line: &str) -> Result<ChatCommand, ChatCommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ChatCommand::Empty);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(ChatCommand::Message(line.to_string()));
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };
    let argument = (!argument.is_empty()).then(|| argument.to_string());

    let command = match name.to_ascii_lowercase().as_str() {
        "add" => ChatCommand::Add(argument.ok_or(ChatCommandError::MissingArgument {
            command: "add",
            argument: "an agent URL",
        })?),
        "agents" => ChatCommand::Agents,
        "new" => ChatCommand::New(argument),
        "conversations" | "list" => ChatCommand::Conversations,
        "open" => {
            let raw = argument.ok_or(ChatCommandError::MissingArgument {
                command: "open",
                argument: "a conversation number",
            })?;
            match raw.parse::<usize>() {
                Ok(index) if index > 0 => ChatCommand::Open(index),
                _ => return Err(ChatCommandError::InvalidIndex(raw)),
            }
        }
        "rename" => ChatCommand::Rename(argument.ok_or(ChatCommandError::MissingArgument {
            command: "rename",
            argument: "a name",
        })?),
        "delete" => ChatCommand::Delete,
        "tasks" => ChatCommand::Tasks,
        "events" => ChatCommand::Events,
        "settings" => ChatCommand::Settings(argument.map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|mime| !mime.is_empty())
                .map(str::to_string)
                .collect()
        })),
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        other => return Err(ChatCommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

struct ChatSession {
    manager: TaskLifecycleManager,
    active: String,
    /// Task whose last reply was `input-required`
    awaiting_input: Option<String>,
    palette: Palette,
}

/// Run the session until `/quit` or end of input
pub async fn run(
    manager: TaskLifecycleManager,
    configured: &[String],
    requested: &[String],
) -> Result<()> {
    let palette = Palette::stdout();
    for url in configured.iter().chain(requested) {
        match manager.add_agent(url).await {
            Ok(card) => println!(
                "{} {} at {}",
                palette.paint(Styles::success(), "Registered"),
                palette.paint(Styles::agent(), &card.name),
                card.url
            ),
            Err(err) => warn!(%url, error = %err, "Skipping agent"),
        }
    }

    let conversation = manager.registries().app.add_conversation(None);
    let mut session = ChatSession {
        manager,
        active: conversation.id,
        awaiting_input: None,
        palette,
    };
    println!(
        "{}",
        palette.paint(Styles::dim(), "Type /help for commands, /quit to leave.")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        match parse_chat_command(&line) {
            Ok(ChatCommand::Quit) => break,
            Ok(command) => session.handle(command).await,
            Err(err) => println!("{}", palette.paint(Styles::warning(), err)),
        }
    }
    Ok(())
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ").context("Failed to write prompt")?;
    stdout.flush().context("Failed to flush stdout")
}

impl ChatSession {
    async fn handle(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::Add(url) => {
                match self.manager.add_agent(&url).await {
                    Ok(card) => print_card(&card, self.palette),
                    Err(err) if err.is_validation() => self.warn(err),
                    // Discovery failures already went to the alert sink
                    Err(_) => {}
                }
            }
            ChatCommand::Agents => self.list_agents(),
            ChatCommand::New(name) => {
                let app = &self.manager.registries().app;
                let conversation = app.add_conversation(name.as_deref());
                println!("Started \"{}\"", conversation.name);
                self.switch_to(conversation.id);
            }
            ChatCommand::Conversations => self.list_conversations(),
            ChatCommand::Open(index) => self.open(index),
            ChatCommand::Rename(name) => {
                let app = &self.manager.registries().app;
                if let Err(err) = app.rename_conversation(&self.active, &name) {
                    self.warn(err);
                }
            }
            ChatCommand::Delete => self.delete_active(),
            ChatCommand::Tasks => self.list_tasks(),
            ChatCommand::Events => self.list_events(),
            ChatCommand::Settings(mime_types) => self.settings(mime_types),
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Message(text) => self.send(&text).await,
            ChatCommand::Empty | ChatCommand::Quit => {}
        }
    }

    async fn send(&mut self, text: &str) {
        let result = match self.awaiting_input.take() {
            Some(task_id) => self.manager.continue_task(&self.active, &task_id, text).await,
            None => self.manager.send_message(&self.active, text, None).await,
        };

        match result {
            Ok(SendOutcome::Delivered {
                task_id,
                reply,
                state,
                ..
            }) => {
                self.print_message(&reply);
                if state == Some(TaskState::InputRequired) {
                    let hint = "The agent needs more input; your next message continues this task.";
                    println!("{}", self.palette.paint(Styles::dim(), hint));
                    self.awaiting_input = Some(task_id);
                }
            }
            // The alert sink has already reported the failure
            Ok(SendOutcome::Failed { .. }) => {}
            Err(err) => self.warn(err),
        }
    }

    fn switch_to(&mut self, conversation_id: String) {
        self.active = conversation_id;
        self.awaiting_input = None;
    }

    fn list_agents(&self) {
        let hosts = self.manager.registries().hosts.snapshot();
        if hosts.hosts().is_empty() {
            println!("No agents registered; use /add <url>");
            return;
        }
        for (i, card) in hosts.hosts().iter().enumerate() {
            let marker = if i == 0 { " (primary)" } else { "" };
            println!(
                "{}. {} {}{marker}",
                i + 1,
                self.palette.paint(Styles::agent(), &card.name),
                card.url
            );
        }
    }

    fn list_conversations(&self) {
        let state = self.manager.registries().app.snapshot();
        for (i, conversation) in state.conversations().iter().enumerate() {
            let marker = if conversation.id == self.active { "*" } else { " " };
            println!(
                "{marker} {}. {} ({} messages)",
                i + 1,
                conversation.name,
                conversation.message_ids.len()
            );
        }
    }

    fn open(&mut self, index: usize) {
        let id = self
            .manager
            .registries()
            .app
            .snapshot()
            .conversations()
            .get(index - 1)
            .map(|conversation| conversation.id.clone());
        let Some(id) = id else {
            self.warn(format!("There is no conversation {index}"));
            return;
        };
        self.switch_to(id);
        for message in self.manager.registries().app.messages_for(&self.active) {
            self.print_message(&message);
        }
    }

    fn delete_active(&mut self) {
        let app = &self.manager.registries().app;
        app.remove_conversation(&self.active);
        let next = app
            .snapshot()
            .conversations()
            .last()
            .map(|conversation| conversation.id.clone());
        let next = next.unwrap_or_else(|| app.add_conversation(None).id);
        self.switch_to(next);
        println!("Conversation deleted");
    }

    fn list_tasks(&self) {
        let agents = self.manager.registries().agents.snapshot();
        if agents.tasks().is_empty() {
            println!("No tasks yet");
            return;
        }
        for tracked in agents.tasks() {
            let state = tracked.state().map_or("none", |state| state.as_str());
            println!(
                "{} {} {}",
                tracked.task_id,
                self.palette.paint(Styles::info(), state),
                self.palette.paint(Styles::dim(), &tracked.agent_url)
            );
        }
    }

    fn list_events(&self) {
        for event in self.manager.registries().agents.events() {
            let state = event.state.map_or("none", |state| state.as_str());
            println!(
                "{} {} #{} {}",
                event.at.format("%H:%M:%S"),
                event.task_id,
                event.seq,
                state
            );
        }
    }

    fn settings(&self, mime_types: Option<Vec<String>>) {
        let settings = &self.manager.registries().settings;
        if let Some(mime_types) = mime_types {
            let candidate = OutputConfig { mime_types };
            if let Err(err) = candidate.validate() {
                self.warn(err);
                return;
            }
            settings.set_output_mime_types(candidate.mime_types);
        }
        println!(
            "Accepted output: {}",
            settings.snapshot().output_mime_types.join(", ")
        );
    }

    fn print_message(&self, message: &ChatMessage) {
        let speaker = match message.role {
            MessageRole::User => self.palette.paint(Styles::header(), "you"),
            MessageRole::Agent => self.palette.paint(Styles::agent(), "agent"),
        };
        let marker = match message.delivery {
            Delivery::Sent => String::new(),
            other => format!(" [{}]", other.as_str()),
        };
        println!("{speaker}{marker}: {}", message.content);
        for attachment in &message.attachments {
            println!("  {}", self.palette.paint(Styles::dim(), describe_attachment(attachment)));
        }
    }

    fn warn(&self, message: impl std::fmt::Display) {
        println!("{}", self.palette.paint(Styles::warning(), message));
    }
}
