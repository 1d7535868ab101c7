//! Remote Origin Tracking
//!
//! A [`RemoteOrigin`] remembers which repository, ref and directory a
//! resolved remote file came from. Local-looking imports found inside that
//! file are resolved against it; imports that are full workflowspecs get a
//! fresh origin instead and never inherit from their including file.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinate::{clean_repo_path, format_workflow_spec};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteOrigin {
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
    /// Directory of the file inside the repository; empty at the repo root
    pub base_path: String,
}

impl RemoteOrigin {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
            base_path: base_path.into(),
        }
    }

    /// Computes the coordinate of a relative import found inside a file
    /// from this origin.
    ///
    /// A leading `./` is stripped and a leading `/` anchors the path at the
    /// repository root. Otherwise the path is joined onto the base path, or
    /// onto `fallback_dir` when the base path is empty (a file sitting at
    /// the repository root keeps its own imports in the workflows
    /// directory by convention).
    ///
    /// # Example
    ///
    /// ```
    /// use workflow_imports::spec::RemoteOrigin;
    ///
    /// let origin = RemoteOrigin::new("octo", "library", "v1", "workflows/shared");
    /// assert_eq!(
    ///     origin.resolve_nested_import("./mcp/github.md", ".github/workflows"),
    ///     "octo/library/workflows/shared/mcp/github.md@v1"
    /// );
    /// ```
    pub fn resolve_nested_import(&self, relative_path: &str, fallback_dir: &str) -> String {
        let mut relative = relative_path.trim();
        while let Some(stripped) = relative.strip_prefix("./") {
            relative = stripped;
        }

        let joined = if let Some(from_root) = relative.strip_prefix('/') {
            clean_repo_path(from_root)
        } else {
            let base = if self.base_path.is_empty() {
                fallback_dir
            } else {
                self.base_path.as_str()
            };
            clean_repo_path(&format!("{}/{}", base, relative))
        };

        format_workflow_spec(&self.owner, &self.repo, &joined, &self.git_ref)
    }
}

/// Diagnostic form `owner/repo@ref`.
impl fmt::Display for RemoteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.git_ref)
    }
}
