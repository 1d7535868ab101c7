//! Repository Symlink Resolution
//!
//! The content API reports a 404 for any path that runs *through* a
//! symlinked directory, e.g. `.github/workflows/shared/tools.md` when
//! `.github/workflows/shared -> ../../library/shared`. This module walks
//! the path prefix by prefix, finds the first symlink and rewrites the
//! path onto its target.

use log::debug;
use thiserror::Error;

use super::api::{classify_api_error, ContentApi, FetchError, RepoEntry};
use crate::spec::coordinate::{clean_repo_path, escapes_root};

#[derive(Debug, Error)]
pub enum SymlinkError {
    #[error("path '{0}' has no parent directory to resolve")]
    NoParent(String),

    #[error("no symlink found along '{0}'")]
    NoSymlink(String),

    #[error("symlink '{link}' points outside the repository ('{target}')")]
    EscapesRepository { link: String, target: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Rewrites `path` through the first symlinked directory on it.
///
/// Prefixes are checked from shortest to longest; the leaf itself is never
/// inspected. A relative target is resolved against the symlink's parent
/// directory with filesystem `..` semantics, so targets may climb above the
/// symlink's own directory, but never above the repository root.
///
/// # Errors
///
/// - [`SymlinkError::NoParent`] for single-component paths
/// - [`SymlinkError::NoSymlink`] when a prefix is missing, is a regular
///   file, or no prefix is a symlink
/// - [`SymlinkError::Fetch`] when the content API fails non-recoverably
pub fn resolve_symlinks(
    api: &dyn ContentApi,
    owner: &str,
    repo: &str,
    path: &str,
    git_ref: &str,
) -> Result<String, SymlinkError> {
    let cleaned = clean_repo_path(path);
    let components: Vec<&str> = cleaned.split('/').filter(|c| !c.is_empty()).collect();

    if components.len() < 2 {
        return Err(SymlinkError::NoParent(path.to_string()));
    }

    for depth in 1..components.len() {
        let prefix = components[..depth].join("/");

        let entry = match api.get_entry(owner, repo, &prefix, git_ref) {
            Ok(entry) => entry,
            Err(err) => match classify_api_error(&err) {
                FetchError::NotFound(_) => {
                    debug!("Prefix '{}' of '{}' does not exist", prefix, path);
                    return Err(SymlinkError::NoSymlink(path.to_string()));
                }
                fatal => return Err(fatal.into()),
            },
        };

        match entry {
            RepoEntry::Dir => continue,
            RepoEntry::Symlink { target } => {
                let parent = components[..depth - 1].join("/");
                let resolved_base = match target.strip_prefix('/') {
                    Some(from_root) => clean_repo_path(from_root),
                    None => clean_repo_path(&format!("{}/{}", parent, target)),
                };

                if escapes_root(&resolved_base) {
                    return Err(SymlinkError::EscapesRepository {
                        link: prefix,
                        target,
                    });
                }

                let rest = components[depth..].join("/");
                let resolved = if resolved_base.is_empty() {
                    rest
                } else {
                    format!("{}/{}", resolved_base, rest)
                };

                debug!(
                    "Symlink '{}' -> '{}': rewrote '{}' to '{}'",
                    prefix, target, path, resolved
                );
                return Ok(resolved);
            }
            RepoEntry::File | RepoEntry::Submodule => {
                return Err(SymlinkError::NoSymlink(path.to_string()));
            }
        }
    }

    Err(SymlinkError::NoSymlink(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::FakeContentApi;

    #[test]
    fn test_single_component_fails_immediately() {
        let api = FakeContentApi::new();
        let result = resolve_symlinks(&api, "o", "r", "README.md", "main");
        assert!(matches!(result, Err(SymlinkError::NoParent(_))));
        assert_eq!(api.entry_calls(), 0);
    }

    #[test]
    fn test_relative_target_climbing_out_of_directory() {
        let api = FakeContentApi::new()
            .with_dir(".github")
            .with_dir(".github/workflows")
            .with_symlink(".github/workflows/shared", "../../library/shared");

        let resolved =
            resolve_symlinks(&api, "o", "r", ".github/workflows/shared/tools/github.md", "main")
                .unwrap();
        assert_eq!(resolved, "library/shared/tools/github.md");
    }

    #[test]
    fn test_sibling_target() {
        let api = FakeContentApi::new()
            .with_dir("docs")
            .with_symlink("docs/latest", "v3");

        let resolved = resolve_symlinks(&api, "o", "r", "docs/latest/intro.md", "main").unwrap();
        assert_eq!(resolved, "docs/v3/intro.md");
    }

    #[test]
    fn test_top_level_symlink() {
        let api = FakeContentApi::new().with_symlink("shared", "library/common");

        let resolved = resolve_symlinks(&api, "o", "r", "shared/a.md", "main").unwrap();
        assert_eq!(resolved, "library/common/a.md");
    }

    #[test]
    fn test_target_escaping_repository() {
        let api = FakeContentApi::new()
            .with_dir("a")
            .with_symlink("a/link", "../../outside");

        let result = resolve_symlinks(&api, "o", "r", "a/link/file.md", "main");
        assert!(matches!(result, Err(SymlinkError::EscapesRepository { .. })));
    }

    #[test]
    fn test_missing_prefix_is_no_symlink() {
        let api = FakeContentApi::new();
        let result = resolve_symlinks(&api, "o", "r", "missing/dir/file.md", "main");
        assert!(matches!(result, Err(SymlinkError::NoSymlink(_))));
    }

    #[test]
    fn test_plain_directories_only() {
        let api = FakeContentApi::new().with_dir("a").with_dir("a/b");
        let result = resolve_symlinks(&api, "o", "r", "a/b/file.md", "main");
        assert!(matches!(result, Err(SymlinkError::NoSymlink(_))));
        assert_eq!(api.entry_calls(), 2);
    }

    #[test]
    fn test_fatal_api_error_propagates() {
        let api = FakeContentApi::new().failing_with("HTTP 500: Internal Server Error");
        let result = resolve_symlinks(&api, "o", "r", "a/b.md", "main");
        assert!(matches!(result, Err(SymlinkError::Fetch(FetchError::Failed(_)))));
    }
}
