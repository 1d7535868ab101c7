//! Content API Boundary
//!
//! The remote content API is an external collaborator: given
//! `(owner, repo, path, ref)` it returns file bytes or directory-entry
//! metadata. Its error text is not a typed contract, so this module is the
//! one place where that text is matched; everything past
//! [`classify_api_error`] works with [`FetchError`].

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Matches a bare `404` token in collaborator error text.
static BARE_404: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b404\b").expect("valid regex"));

/// Kind of a repository entry as reported by the content API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoEntry {
    File,
    Dir,
    /// A symlink with its raw (possibly relative) target
    Symlink { target: String },
    Submodule,
}

/// Raw failure reported by a content API implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status when the collaborator exposes one
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Some(404), message)
    }
}

/// Typed result of talking to the content API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Recoverable: triggers symlink resolution or an optional-import skip
    #[error("not found: {0}")]
    NotFound(String),

    /// Fatal: auth failure, server error, network error
    #[error("{0}")]
    Failed(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Remote repository content collaborator.
pub trait ContentApi {
    /// Returns the raw bytes of a file.
    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, ApiError>;

    /// Returns metadata for the entry at `path`.
    fn get_entry(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<RepoEntry, ApiError>;
}

/// Classifies a collaborator error.
///
/// HTTP 404, any message containing "not found" (case-insensitive) or a
/// bare `404` token is [`FetchError::NotFound`]; everything else is
/// [`FetchError::Failed`].
pub fn classify_api_error(err: &ApiError) -> FetchError {
    let lower = err.message.to_lowercase();
    if err.status == Some(404) || lower.contains("not found") || BARE_404.is_match(&err.message) {
        FetchError::NotFound(err.message.clone())
    } else {
        FetchError::Failed(err.message.clone())
    }
}

/// Content API used when remote imports are switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledContentApi;

impl DisabledContentApi {
    fn refuse(owner: &str, repo: &str, path: &str) -> ApiError {
        ApiError::new(
            None,
            format!("remote imports are disabled (requested {}/{}/{})", owner, repo, path),
        )
    }
}

impl ContentApi for DisabledContentApi {
    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        _git_ref: &str,
    ) -> Result<Vec<u8>, ApiError> {
        Err(Self::refuse(owner, repo, path))
    }

    fn get_entry(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        _git_ref: &str,
    ) -> Result<RepoEntry, ApiError> {
        Err(Self::refuse(owner, repo, path))
    }
}
