use std::path::PathBuf;

use thiserror::Error;

use crate::model::FeedUri;
use crate::requirements::Requirements;

/// Errors raised by a [`crate::repository::FeedProvider`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Feed not found: {0}")]
    NotFound(FeedUri),

    #[error("Failed to parse feed {uri}: {message}")]
    Parse { uri: FeedUri, message: String },
}

#[derive(Error, Debug)]
pub enum SolverError {
    // Search exhausted without meeting every essential demand
    #[error("No solution found for {requirements}")]
    NoSolution { requirements: Box<Requirements> },

    #[error("Solving was cancelled")]
    Cancelled,

    #[error("<executable-in-*> bindings are not supported in command '{command}' of {interface}")]
    UnsupportedBinding { command: String, interface: FeedUri },

    // Feed lookup failures surface unchanged
    #[error(transparent)]
    Feed(#[from] FeedError),
}

impl SolverError {
    /// Whether this is a search failure rather than an abort or upstream error
    pub fn is_no_solution(&self) -> bool {
        matches!(self, SolverError::NoSolution { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, SolverError>;
