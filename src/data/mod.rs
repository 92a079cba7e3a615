mod curl_cmd;
mod fetch;
mod parse;
mod snapshot;

pub use fetch::{FileProvider, GraphDataProvider, HttpProvider};
pub use snapshot::{GraphNode, GraphSnapshot, Stats, scalar_text};
