use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::snapshot::GraphSnapshot;

pub(super) fn parse_graph_data(raw: &str) -> Result<GraphSnapshot> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in graph data")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for graph data, expected an object"))?;

    if let Some(error) = object.get("error").and_then(Value::as_str) {
        return Err(service_error(error));
    }

    if !object.contains_key("nodes") {
        return Err(anyhow!("graph data has no `nodes` field"));
    }

    serde_json::from_value::<GraphSnapshot>(parsed).context("malformed graph data")
}

/// The `error` message of a failure body such as `{"error": "..."}`, if it has one.
pub(super) fn error_message(raw: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(raw).ok()?;
    parsed.get("error")?.as_str().map(str::to_owned)
}

pub(super) fn service_error(message: &str) -> anyhow::Error {
    anyhow!("graph data service reported an error: {message}")
}
