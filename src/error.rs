//! Import Resolution Errors
//!
//! A single terminal error type for one resolution call. Every variant
//! carries the offending path or coordinate so the failure can be located
//! without re-running with debug logging.

use std::io;

use thiserror::Error;

use crate::remote::FetchError;

/// Taxonomy class of an [`ImportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed coordinate, directive or frontmatter
    Parse,
    /// Missing local file, remote file or section
    NotFound,
    /// Remote collaborator failure (auth, 5xx, network)
    Fetch,
    /// Path escapes the permitted root
    Security,
    /// Frontmatter of a canonical workflow file failed validation
    Validation,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid import '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("import not found: '{path}'")]
    NotFound { path: String },

    #[error("section '{section}' not found in '{path}'")]
    SectionNotFound { path: String, section: String },

    #[error("failed to fetch '{path}': {message}")]
    Fetch { path: String, message: String },

    #[error("security violation: '{path}' resolves outside of '{root}'")]
    Security { path: String, root: String },

    #[error("invalid frontmatter in '{path}': {message}")]
    Validation { path: String, message: String },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ImportError {
    pub fn parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Converts a remote fetch failure, attaching the coordinate being resolved.
    pub fn from_fetch(coordinate: impl Into<String>, err: FetchError) -> Self {
        match err {
            FetchError::NotFound(_) => Self::NotFound {
                path: coordinate.into(),
            },
            FetchError::Failed(message) => Self::Fetch {
                path: coordinate.into(),
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::NotFound { .. } | Self::SectionNotFound { .. } => ErrorKind::NotFound,
            Self::Fetch { .. } | Self::Io { .. } => ErrorKind::Fetch,
            Self::Security { .. } => ErrorKind::Security,
            Self::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// True when an optional import may swallow this error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
