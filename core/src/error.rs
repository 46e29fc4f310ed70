//! Error types for curriculum progression.
//!
//! Queries over a graph and a progress snapshot never fail: unknown ids are
//! answered as locked. Errors only arise while building a graph, loading
//! configuration, or writing through a [`crate::progress::ProgressStore`].
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use thiserror::Error;

/// Malformed graph payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A node entry has no `id`
    #[error("Node at index {index} has no id")]
    MissingNodeId { index: usize },

    /// An edge entry has no `source` or `target`
    #[error("Edge {index} in {collection} is missing its {field}")]
    MissingEdgeEndpoint {
        collection: EdgeCollection,
        index: usize,
        field: &'static str,
    },
}

/// Which edge collection a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCollection {
    Display,
    Dependent,
}

impl std::fmt::Display for EdgeCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeCollection::Display => f.write_str("edges"),
            EdgeCollection::Dependent => f.write_str("dependent_edges"),
        }
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum ProgressionError {
    /// Graph payload failed validation
    #[error("Invalid graph payload: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration is out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File access failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A progress store rejected a write
    #[error("Progress store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
