//! Import Queue and Visited Set
//!
//! Every discovered import becomes an [`ImportQueueItem`] once its target
//! has been classified and, for local files, checked against the security
//! boundary. Items are never mutated; a file seen a second time is
//! short-circuited by the [`VisitedSet`].

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{RemoteOrigin, WorkflowSpec};

/// Where an import's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportLocation {
    /// Absolute, normalized path inside the security boundary
    Local(PathBuf),
    /// File in a remote repository
    Remote(WorkflowSpec),
}

impl fmt::Display for ImportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportLocation::Local(path) => write!(f, "{}", path.display()),
            ImportLocation::Remote(spec) => write!(f, "{}", spec.coordinate()),
        }
    }
}

/// One discovered import, ready to be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportQueueItem {
    /// Import path as written in the directive or `imports:` entry
    pub import_path: String,
    /// Resolved target
    pub location: ImportLocation,
    pub section: Option<String>,
    /// Directory of the including file
    pub base_dir: PathBuf,
    /// Origin of the including file when it was fetched remotely
    pub remote_origin: Option<RemoteOrigin>,
    pub optional: bool,
}

impl ImportQueueItem {
    /// Resolved path or coordinate, without the section.
    pub fn full_path(&self) -> String {
        self.location.to_string()
    }

    /// Visited-set key: the resolved target plus its section, so distinct
    /// sections of one file are expanded independently.
    pub fn key(&self) -> String {
        match &self.section {
            Some(section) => format!("{}#{}", self.full_path(), section),
            None => self.full_path(),
        }
    }
}

/// Resolution keys already expanded during one resolution call.
#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    keys: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` visited; false when it already was.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// Forgets `key`, so a later import of the same target is attempted again.
    pub fn remove(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
