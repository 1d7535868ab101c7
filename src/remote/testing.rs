//! In-memory content API used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::api::{ApiError, ContentApi, RepoEntry};

/// Scripted repository contents keyed by `owner/repo/path@ref`.
pub struct FakeContentApi {
    scope: (String, String, String),
    files: HashMap<String, Vec<u8>>,
    entries: HashMap<String, RepoEntry>,
    failure: Option<String>,
    file_calls: RefCell<HashMap<String, usize>>,
    entry_calls: Cell<usize>,
}

fn key(owner: &str, repo: &str, path: &str, git_ref: &str) -> String {
    format!("{}/{}/{}@{}", owner, repo, path, git_ref)
}

impl FakeContentApi {
    pub fn new() -> Self {
        Self {
            scope: ("o".into(), "r".into(), "main".into()),
            files: HashMap::new(),
            entries: HashMap::new(),
            failure: None,
            file_calls: RefCell::new(HashMap::new()),
            entry_calls: Cell::new(0),
        }
    }

    /// Switches the repository subsequent builder calls apply to.
    pub fn in_repo(mut self, owner: &str, repo: &str, git_ref: &str) -> Self {
        self.scope = (owner.into(), repo.into(), git_ref.into());
        self
    }

    fn scoped(&self, path: &str) -> String {
        key(&self.scope.0, &self.scope.1, path, &self.scope.2)
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let k = self.scoped(path);
        self.files.insert(k.clone(), content.as_bytes().to_vec());
        self.entries.insert(k, RepoEntry::File);
        self
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        let k = self.scoped(path);
        self.entries.insert(k, RepoEntry::Dir);
        self
    }

    pub fn with_symlink(mut self, path: &str, target: &str) -> Self {
        let k = self.scoped(path);
        self.entries.insert(
            k,
            RepoEntry::Symlink {
                target: target.to_string(),
            },
        );
        self
    }

    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Number of `get_file` calls made for one key.
    pub fn file_calls_for(&self, owner: &str, repo: &str, path: &str, git_ref: &str) -> usize {
        self.file_calls
            .borrow()
            .get(&key(owner, repo, path, git_ref))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_file_calls(&self) -> usize {
        self.file_calls.borrow().values().sum()
    }

    pub fn entry_calls(&self) -> usize {
        self.entry_calls.get()
    }
}

impl ContentApi for FakeContentApi {
    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let k = key(owner, repo, path, git_ref);
        *self.file_calls.borrow_mut().entry(k.clone()).or_insert(0) += 1;

        if let Some(message) = &self.failure {
            return Err(ApiError::new(Some(500), message.clone()));
        }
        self.files
            .get(&k)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("HTTP 404: Not Found ({})", k)))
    }

    fn get_entry(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<RepoEntry, ApiError> {
        self.entry_calls.set(self.entry_calls.get() + 1);

        if let Some(message) = &self.failure {
            return Err(ApiError::new(Some(500), message.clone()));
        }
        self.entries
            .get(&key(owner, repo, path, git_ref))
            .cloned()
            .ok_or_else(|| ApiError::not_found("Not Found"))
    }
}
