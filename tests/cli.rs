use anyhow::Result;
use assert_cmd::Command;
use mockito::Server;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn playground(config_dir: &TempDir) -> Result<Command> {
    let config = config_dir.path().join("a2a-playground.toml");
    std::fs::write(&config, "[client]\nrequest_timeout_secs = 5\n")?;

    let mut cmd = Command::cargo_bin("a2a-playground")?;
    cmd.current_dir(config_dir.path());
    cmd.env_remove("RUST_LOG");
    cmd.arg("--config").arg(config);
    Ok(cmd)
}

#[test]
fn help_lists_commands() -> Result<()> {
    let mut cmd = Command::cargo_bin("a2a-playground")?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("get-task"))
        .stdout(predicate::str::contains("chat"));
    Ok(())
}

#[test]
fn discover_prints_agent_descriptor() -> Result<()> {
    let mut server = Server::new();
    let card = json!({
        "name": "Coder",
        "description": "Writes code on request",
        "url": server.url(),
        "version": "0.1.0",
        "capabilities": {"streaming": true},
        "skills": [{"id": "codegen", "name": "Code generation", "tags": ["python"]}]
    });
    let mock = server
        .mock("GET", "/.well-known/agent.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(card.to_string())
        .create();

    let dir = TempDir::new()?;
    let mut cmd = playground(&dir)?;
    cmd.arg("discover").arg(server.url());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Name: Coder"))
        .stdout(predicate::str::contains("Streaming: true"))
        .stdout(predicate::str::contains("Code generation"));

    mock.assert();
    Ok(())
}

#[test]
fn send_prints_agent_reply() -> Result<()> {
    let mut server = Server::new();
    let url = server.url();
    let _card = server
        .mock("GET", "/.well-known/agent.json")
        .with_status(200)
        .with_body(json!({"name": "Coder", "url": url, "version": "0.1.0"}).to_string())
        .create();
    let task = json!({
        "id": "ignored",
        "status": {
            "state": "completed",
            "message": {"role": "agent", "parts": [{"type": "text", "text": "Here is your scraper:"}]}
        }
    });
    let _rpc = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": null, "result": task}).to_string())
        .expect_at_least(2)
        .create();

    let dir = TempDir::new()?;
    let mut cmd = playground(&dir)?;
    cmd.arg("send")
        .arg(server.url())
        .arg("Generate Python code for a web scraper.");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Status: completed"))
        .stdout(predicate::str::contains("Here is your scraper:"));
    Ok(())
}

#[test]
fn unreachable_agent_fails_with_context() -> Result<()> {
    let mut server = Server::new();
    let _missing = server
        .mock("GET", "/.well-known/agent.json")
        .with_status(404)
        .create();

    let dir = TempDir::new()?;
    let mut cmd = playground(&dir)?;
    cmd.arg("discover").arg(server.url());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("404"));
    Ok(())
}

#[test]
fn invalid_configuration_is_reported() -> Result<()> {
    let dir = TempDir::new()?;
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "[polling]\nmax_attempts = 0\n")?;

    let mut cmd = Command::cargo_bin("a2a-playground")?;
    cmd.current_dir(dir.path());
    cmd.arg("--config").arg(&config).arg("discover").arg("http://localhost:1");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
    Ok(())
}

#[test]
fn debug_section_turns_on_stderr_tracing() -> Result<()> {
    let mut server = Server::new();
    let card = json!({"name": "Coder", "url": server.url(), "version": "0.1.0"});
    let _mock = server
        .mock("GET", "/.well-known/agent.json")
        .with_status(200)
        .with_body(card.to_string())
        .create();

    let dir = TempDir::new()?;
    let config = dir.path().join("traced.toml");
    std::fs::write(&config, "[debug]\nenable_tracing = true\ntrace_level = \"info\"\n")?;

    let mut cmd = Command::cargo_bin("a2a-playground")?;
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .arg("discover")
        .arg(server.url());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Name: Coder"))
        .stderr(predicate::str::contains("Debug tracing enabled"));
    Ok(())
}
