use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::curl_cmd::run_curl;
use super::parse::parse_graph_data;
use super::snapshot::GraphSnapshot;

const GRAPH_DATA_PATH: &str = "/api/rdf/graph-data";

/// Source of graph snapshots. Called from a background worker, so it must be shareable.
pub trait GraphDataProvider: Send + Sync {
    fn fetch(&self) -> Result<GraphSnapshot>;

    fn describe(&self) -> String;
}

/// Fetches the snapshot from the ontology service's graph-data endpoint.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    endpoint: String,
}

impl HttpProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}{GRAPH_DATA_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GraphDataProvider for HttpProvider {
    fn fetch(&self) -> Result<GraphSnapshot> {
        let body = run_curl(&self.endpoint)
            .with_context(|| format!("failed to fetch graph data from {}", self.endpoint))?;
        parse_graph_data(&body)
            .with_context(|| format!("failed to parse graph data from {}", self.endpoint))
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Reads a snapshot exported to disk in the same JSON shape as the endpoint.
#[derive(Clone, Debug)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphDataProvider for FileProvider {
    fn fetch(&self) -> Result<GraphSnapshot> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        parse_graph_data(&raw).with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
