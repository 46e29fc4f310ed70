//! Wire shapes of the graph and progress payloads.
//!
//! Every field is optional at this layer so that a malformed entry surfaces as
//! a [`crate::error::ValidationError`] from the graph builder rather than as a
//! serde failure on the whole document.

use serde::{Deserialize, Serialize};

/// `{ nodes, edges, dependent_edges }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<NodeEnvelope>,

    /// Display (structural) edges
    #[serde(default)]
    pub edges: Vec<EdgeEnvelope>,

    /// Prerequisite edges
    #[serde(default)]
    pub dependent_edges: Vec<EdgeEnvelope>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeEnvelope {
    #[serde(default)]
    pub data: NodeData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default, rename = "type")]
    pub node_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub difficulty: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeEnvelope {
    #[serde(default)]
    pub data: EdgeData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub edge_type: Option<String>,

    #[serde(default)]
    pub weight: Option<f64>,

    #[serde(default)]
    pub label: Option<String>,
}

/// `{ completed_topics: [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressPayload {
    #[serde(default)]
    pub completed_topics: Vec<String>,
}

impl NodeEnvelope {
    /// Convenience constructor used by fixtures and the CLI
    pub fn new(id: &str, label: &str, node_type: Option<&str>) -> Self {
        Self {
            data: NodeData {
                id: Some(id.to_string()),
                label: Some(label.to_string()),
                node_type: node_type.map(str::to_string),
                description: None,
                difficulty: None,
            },
        }
    }
}

impl EdgeEnvelope {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            data: EdgeData {
                source: Some(source.to_string()),
                target: Some(target.to_string()),
                ..EdgeData::default()
            },
        }
    }
}
