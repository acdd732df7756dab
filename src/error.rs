use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeScanError {
    // Input
    #[error("invalid path {path:?}: {problem}")]
    InvalidPath { path: String, problem: PathProblem },

    #[error("invalid source")]
    InvalidSource(PathBuf),

    #[error("invalid url {0:?}")]
    InvalidUrl(String),

    // Acquisition
    #[error("IO error")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walk error: {0}")]
    Walk(String),

    // Config
    #[error("invalid probability {0}")]
    InvalidProbability(f64),

    #[error("invalid timing: {0}")]
    InvalidTiming(&'static str),

    #[error("config error: {0}")]
    Config(String),
}

/// Why a record path was rejected by the hierarchy builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathProblem {
    #[error("path is empty")]
    Empty,

    #[error("segment {index} is empty")]
    EmptySegment { index: usize },
}

impl TreeScanError {
    /// The filesystem path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::InvalidSource(p) | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the error was caused by the batch the caller handed in,
    /// as opposed to configuration or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. } | Self::InvalidSource(_) | Self::InvalidUrl(_)
        )
    }
}
