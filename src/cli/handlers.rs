//! Handlers for the one-shot commands

use std::sync::Arc;

use a2a_playground_config::PlaygroundConfig;
use a2a_playground_protocol::http::create_client;
use a2a_playground_protocol::{A2aClient, AgentCard, AgentCardFetcher, Task};
use a2a_playground_state::{Registries, SettingsState};
use anyhow::{Context, Result, bail};

use super::{Cli, Commands, chat};
use crate::alerts::StderrAlerts;
use crate::lifecycle::{LifecycleOptions, SendOutcome, TaskLifecycleManager};
use crate::render::{describe_attachment, render_message};
use crate::styled::{Palette, Styles};

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Execute a parsed command with the loaded configuration
pub async fn execute(cli: Cli, config: &PlaygroundConfig) -> Result<()> {
    let options = LifecycleOptions::from_config(config, cli.timeout);
    match cli.command {
        Commands::Discover { agent_url } => discover_agent(&agent_url, &options).await,
        Commands::Send {
            agent_url,
            message,
            stream,
        } => send_message(&agent_url, &message, stream, options, config).await,
        Commands::GetTask {
            agent_url,
            task_id,
            json,
        } => get_task(&agent_url, &task_id, json, &options).await,
        Commands::CancelTask { agent_url, task_id } => {
            cancel_task(&agent_url, &task_id, &options).await
        }
        Commands::Chat { agents } => {
            let manager = manager_for(options, config);
            chat::run(manager, &config.agents.urls, &agents).await
        }
    }
}

fn manager_for(options: LifecycleOptions, config: &PlaygroundConfig) -> TaskLifecycleManager {
    let settings =
        SettingsState::default().with_output_mime_types(config.output.mime_types.clone());
    TaskLifecycleManager::new(
        Registries::with_settings(settings),
        options,
        Arc::new(StderrAlerts::default()),
    )
}

/// Discover and display information about a remote agent
async fn discover_agent(agent_url: &str, options: &LifecycleOptions) -> Result<()> {
    let palette = Palette::stdout();
    println!("Discovering A2A agent at: {agent_url}");

    let card = AgentCardFetcher::new(create_client(options.http))
        .fetch(agent_url)
        .await?;

    println!("\n{RULE}");
    println!("{}", palette.paint(Styles::header(), "A2A Agent Discovery"));
    println!("{RULE}\n");
    print_card(&card, palette);
    Ok(())
}

pub(crate) fn print_card(card: &AgentCard, palette: Palette) {
    println!("Name: {}", palette.paint(Styles::agent(), &card.name));
    if let Some(description) = &card.description {
        println!("Description: {description}");
    }
    println!("Version: {}", card.version);
    println!("URL: {}", card.url);

    if let Some(provider) = &card.provider {
        println!("\nProvider:");
        println!("  Organization: {}", provider.organization);
        if let Some(url) = &provider.url {
            println!("  URL: {url}");
        }
    }

    println!("\nCapabilities:");
    println!("  Streaming: {}", card.capabilities.streaming);
    println!("  Push Notifications: {}", card.capabilities.push_notifications);
    println!(
        "  State Transition History: {}",
        card.capabilities.state_transition_history
    );

    if !card.skills.is_empty() {
        println!("\nSkills:");
        for skill in &card.skills {
            println!("  - {}", skill.name);
            if let Some(description) = &skill.description {
                println!("    Description: {description}");
            }
            if !skill.tags.is_empty() {
                println!("    Tags: {}", skill.tags.join(", "));
            }
        }
    }

    println!("\nInput Modes: {}", card.default_input_modes.join(", "));
    println!("Output Modes: {}", card.default_output_modes.join(", "));
}

/// Register the agent, open a conversation, send one message and print the reply
async fn send_message(
    agent_url: &str,
    message: &str,
    stream: bool,
    mut options: LifecycleOptions,
    config: &PlaygroundConfig,
) -> Result<()> {
    let palette = Palette::stdout();
    options.polling.prefer_streaming = stream;
    let manager = manager_for(options, config);

    println!("Connecting to A2A agent: {agent_url}");
    let card = manager.add_agent(agent_url).await?;
    let conversation = manager.registries().app.add_conversation(None);

    if stream && !card.capabilities.streaming {
        println!(
            "{}",
            palette.paint(
                Styles::warning(),
                "Agent does not advertise streaming; falling back to polling"
            )
        );
    }
    println!("Sending task...\n");

    match manager
        .send_message(&conversation.id, message, Some(card.url.as_str()))
        .await?
    {
        SendOutcome::Delivered {
            task_id,
            reply,
            state,
            ..
        } => {
            println!("Task: {task_id}");
            let state = state.map_or("unknown", |s| s.as_str());
            println!("Status: {}\n", palette.paint(Styles::info(), state));
            println!("{}", palette.paint(Styles::agent(), &card.name));
            println!("{}", reply.content);
            for attachment in &reply.attachments {
                println!("{}", palette.paint(Styles::dim(), describe_attachment(attachment)));
            }
            if let Some(task) = manager.registries().agents.task(&task_id).and_then(|t| t.task) {
                print_artifacts(&task, palette);
            }
            Ok(())
        }
        SendOutcome::Failed { task_id, error, .. } => {
            Err(error).with_context(|| format!("Task {task_id} was not delivered"))
        }
    }
}

/// Get details about a specific task
async fn get_task(
    agent_url: &str,
    task_id: &str,
    json: bool,
    options: &LifecycleOptions,
) -> Result<()> {
    let client = A2aClient::with_settings(agent_url, options.http)?;
    let task = client.get_task(task_id).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&task).context("Failed to encode task")?;
        println!("{rendered}");
        return Ok(());
    }

    let Some(task) = task else {
        bail!("Agent at {agent_url} returned no task for id {task_id}");
    };
    print_task(&task, Palette::stdout());
    Ok(())
}

/// Request cancellation and show the resulting state
async fn cancel_task(agent_url: &str, task_id: &str, options: &LifecycleOptions) -> Result<()> {
    let palette = Palette::stdout();
    let client = A2aClient::with_settings(agent_url, options.http)?;
    match client.cancel_task(task_id).await? {
        Some(task) => {
            println!(
                "Task {} is now {}",
                task.id,
                palette.paint(Styles::info(), task.state())
            );
            Ok(())
        }
        None => bail!("Agent at {agent_url} returned no task for id {task_id}"),
    }
}

fn print_task(task: &Task, palette: Palette) {
    println!("\n{RULE}");
    println!("{}", palette.paint(Styles::header(), format!("Task: {}", task.id)));
    println!("{RULE}\n");

    println!("Status: {}", palette.paint(Styles::info(), task.state()));
    if let Some(session_id) = &task.session_id {
        println!("Session: {session_id}");
    }

    if let Some(message) = task.status_message() {
        println!("\nLatest Message:");
        let everything = SettingsState::default().with_output_mime_types(vec!["*/*".into()]);
        let rendered = render_message(message, &everything);
        for line in rendered.text.lines() {
            println!("  {line}");
        }
        for attachment in &rendered.attachments {
            println!("  {}", describe_attachment(attachment));
        }
    }

    print_artifacts(task, palette);

    if !task.history.is_empty() {
        println!("\nHistory ({} messages)", task.history.len());
    }
}

fn print_artifacts(task: &Task, palette: Palette) {
    if task.artifacts.is_empty() {
        return;
    }
    println!("\n{}", palette.paint(Styles::header(), "Artifacts:"));
    for artifact in &task.artifacts {
        let name = artifact.name.as_deref().unwrap_or("artifact");
        println!("  - {name} ({} parts)", artifact.parts.len());
        for part in &artifact.parts {
            println!("    {}", preview(&describe_attachment(part), 60));
        }
    }
}

/// First `limit` characters of `text`, marked when cut
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
