use std::process::Command;

use anyhow::{Context, Result, anyhow};

use super::parse::{error_message, service_error};

pub(super) fn run_curl(url: &str) -> Result<String> {
    let output = Command::new("curl")
        .args([
            "--silent",
            "--show-error",
            "--fail-with-body",
            "--location",
            "--max-time",
            "30",
            "--header",
            "Accept: application/json",
            url,
        ])
        .output()
        .with_context(|| format!("failed to spawn curl for {url}"))?;

    if output.status.success() {
        String::from_utf8(output.stdout).context("graph data response was not valid UTF-8")
    } else {
        Err(request_failure(
            url,
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        ))
    }
}

/// Prefers the service's own `{"error": ...}` body over curl's status line.
fn request_failure(url: &str, body: &str, stderr: &str) -> anyhow::Error {
    match error_message(body) {
        Some(message) => service_error(&message).context(format!("request to {url} failed")),
        None => anyhow!("request to {url} failed: {}", stderr.trim()),
    }
}
