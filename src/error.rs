//! Replay error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::graph::NodeId;

/// Errors produced by the replay library.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("missing input {}: {source}", path.display())]
    MissingInput { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("node {node} has no layout position ({context})")]
    UnknownNode { node: NodeId, context: String },

    #[error("data inconsistency: {0}")]
    DataInconsistency(String),

    #[error("could not write artifact {}: {source}", path.display())]
    ExportFailure { path: PathBuf, source: io::Error },

    #[error("config error ({}): {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

impl ReplayError {
    pub fn inconsistency(msg: impl Into<String>) -> Self {
        Self::DataInconsistency(msg.into())
    }

    pub fn unknown_node(node: NodeId, context: impl Into<String>) -> Self {
        Self::UnknownNode {
            node,
            context: context.into(),
        }
    }
}

pub type ReplayResult<T> = Result<T, ReplayError>;
