//! Remote Content Fetching and Caching
//!
//! [`ContentFetcher`] is the only path from the resolver to the content
//! API. It memoizes every answer, including "not found", for the lifetime
//! of one resolution call, and retries a not-found path through the
//! symlink resolver before giving up. A path that stayed missing after the
//! symlink walk is never walked again.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::api::{classify_api_error, ContentApi, FetchError};
use super::symlink::{resolve_symlinks, SymlinkError};

/// Cache key of one remote file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
    pub path: String,
}

impl ContentKey {
    pub fn new(owner: &str, repo: &str, path: &str, git_ref: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref: git_ref.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum CachedContent {
    Found(Vec<u8>),
    Missing(String),
}

/// Cache counters, reported at the end of a resolution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchStats {
    pub hits: usize,
    pub misses: usize,
    pub symlink_rewrites: usize,
}

/// Read-through cache in front of a [`ContentApi`].
///
/// Never evicts; construct a new fetcher per resolution call.
pub struct ContentFetcher<'a> {
    api: &'a dyn ContentApi,
    cache: HashMap<ContentKey, CachedContent>,
    /// Keys still missing after the symlink walk
    unresolved: HashSet<ContentKey>,
    max_symlink_hops: usize,
    stats: FetchStats,
}

impl<'a> ContentFetcher<'a> {
    pub fn new(api: &'a dyn ContentApi, max_symlink_hops: usize) -> Self {
        Self {
            api,
            cache: HashMap::new(),
            unresolved: HashSet::new(),
            max_symlink_hops,
            stats: FetchStats::default(),
        }
    }

    /// Fetches a remote file, consulting the cache first.
    ///
    /// A not-found answer is retried through symlinked directories on the
    /// path, up to the configured number of hops. Fatal errors are never
    /// cached.
    pub fn fetch(
        &mut self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, FetchError> {
        let key = ContentKey::new(owner, repo, path, git_ref);

        let not_found = match self.fetch_direct(&key) {
            Err(FetchError::NotFound(message)) => message,
            other => return other,
        };
        if self.unresolved.contains(&key) {
            return Err(FetchError::NotFound(not_found));
        }

        let mut current = path.to_string();
        for _ in 0..self.max_symlink_hops {
            let resolved = match resolve_symlinks(self.api, owner, repo, &current, git_ref) {
                Ok(resolved) => resolved,
                Err(SymlinkError::Fetch(FetchError::Failed(message))) => {
                    return Err(FetchError::Failed(message))
                }
                Err(err) => {
                    debug!("No symlink rewrite for '{}': {}", current, err);
                    break;
                }
            };

            if resolved == current {
                break;
            }
            self.stats.symlink_rewrites += 1;

            let resolved_key = ContentKey::new(owner, repo, &resolved, git_ref);
            match self.fetch_direct(&resolved_key) {
                Ok(bytes) => {
                    self.cache.insert(key, CachedContent::Found(bytes.clone()));
                    return Ok(bytes);
                }
                Err(FetchError::NotFound(_)) => current = resolved,
                Err(fatal) => return Err(fatal),
            }
        }

        self.unresolved.insert(key);
        Err(FetchError::NotFound(not_found))
    }

    fn fetch_direct(&mut self, key: &ContentKey) -> Result<Vec<u8>, FetchError> {
        if let Some(cached) = self.cache.get(key) {
            self.stats.hits += 1;
            debug!("Cache hit: {}/{}/{}@{}", key.owner, key.repo, key.path, key.git_ref);
            return match cached {
                CachedContent::Found(bytes) => Ok(bytes.clone()),
                CachedContent::Missing(message) => Err(FetchError::NotFound(message.clone())),
            };
        }

        self.stats.misses += 1;
        debug!("Fetching {}/{}/{}@{}", key.owner, key.repo, key.path, key.git_ref);

        match self.api.get_file(&key.owner, &key.repo, &key.path, &key.git_ref) {
            Ok(bytes) => {
                self.cache.insert(key.clone(), CachedContent::Found(bytes.clone()));
                Ok(bytes)
            }
            Err(err) => match classify_api_error(&err) {
                FetchError::NotFound(message) => {
                    let missing = CachedContent::Missing(message.clone());
                    self.cache.insert(key.clone(), missing);
                    Err(FetchError::NotFound(message))
                }
                fatal => Err(fatal),
            },
        }
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    /// Number of cached keys, found or missing.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
