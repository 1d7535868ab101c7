//! Remote Content Access
//!
//! - [`api`]: the content API boundary and error classification
//! - [`cache`]: per-resolution read-through cache
//! - [`symlink`]: repository symlink resolution
//! - [`gh`]: `gh` CLI implementation of the content API

pub mod api;
pub mod cache;
pub mod gh;
pub mod symlink;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{classify_api_error, ApiError, ContentApi, DisabledContentApi, FetchError, RepoEntry};
pub use cache::{ContentFetcher, ContentKey, FetchStats};
pub use gh::GhCliContentApi;
pub use symlink::{resolve_symlinks, SymlinkError};
