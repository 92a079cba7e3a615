use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entity of the knowledge store as delivered by the graph-data endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
    #[serde(alias = "sourceId")]
    pub source: String,
    #[serde(alias = "targetId")]
    pub target: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<GraphNode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<GraphRelationship>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub node_count: usize,
    pub relationship_count: usize,
}

impl GraphNode {
    pub fn first_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Text shown under the node: the `label` property, else the first label, else the id.
    pub fn display_label(&self) -> String {
        if let Some(label) = self.properties.get("label").and_then(scalar_text)
            && !label.is_empty()
        {
            return label;
        }

        match self.first_label() {
            Some(label) if !label.is_empty() => label.to_owned(),
            _ => self.id.clone(),
        }
    }
}

impl GraphSnapshot {
    pub fn stats(&self) -> Stats {
        Stats {
            node_count: self.nodes.len(),
            relationship_count: self.relationships.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
