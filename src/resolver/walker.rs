//! Import Graph Walker
//!
//! Expands a root markdown document into one self-contained document:
//!
//! - `@include`/`@import` directives are replaced inline by the body of the
//!   file they name, recursively
//! - frontmatter `imports:` entries are expanded breadth-first and emitted
//!   ahead of the root body, in discovery order
//! - every file's `tools:` and `mcp-servers:` blocks are folded into one
//!   tools object
//!
//! Each call to [`Resolver::resolve`] runs in a fresh session: its own
//! visited set, content cache and tools accumulator. Nothing is shared
//! between calls, so one resolver can serve many root documents.

use std::collections::VecDeque;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;

use crate::config::ResolverConfig;
use crate::document::directive::FenceTracker;
use crate::document::{extract_section, parse_directive, trim_blank_lines, Document};
use crate::error::{ImportError, Result};
use crate::local::{find_security_root, normalize_path, FileSystem, SecurityBoundary};
use crate::remote::{ContentApi, ContentFetcher, FetchStats};
use crate::spec::{split_section, RemoteOrigin, WorkflowSpec};
use crate::validation::{
    clean_schema_error, FrontmatterValidator, IncludedFileSchema, ValidationMode,
};

use super::queue::{ImportLocation, ImportQueueItem, VisitedSet};
use super::tools::ToolsAccumulator;

/// Label used in errors for content that did not come from a file.
const INLINE_CONTENT: &str = "<input>";

/// Result of one resolution call.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Fully expanded markdown
    pub markdown: String,
    /// Merged tools of every file in the graph; `{}` when none declared any
    pub tools: Value,
    /// Frontmatter of the root document
    pub frontmatter: Value,
    /// Resolution key of every expanded import, in expansion order
    pub imported_files: Vec<String>,
    /// Non-fatal diagnostics (optional-import misses, validation warnings)
    pub notices: Vec<String>,
    pub fetch_stats: FetchStats,
}

impl Resolution {
    /// Merged tools serialized as a JSON object.
    pub fn tools_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(&self.tools)
    }
}

/// Import resolver.
///
/// # Example
///
/// ```rust,no_run
/// use workflow_imports::local::OsFileSystem;
/// use workflow_imports::remote::GhCliContentApi;
/// use workflow_imports::{Resolver, ResolverConfig};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fs = OsFileSystem;
///     let api = GhCliContentApi::new();
///     let resolver = Resolver::new(&fs, &api, ResolverConfig::default());
///
///     let resolution = resolver.resolve(".github/workflows/triage.md")?;
///     println!("{}", resolution.markdown);
///     println!("{}", resolution.tools_json()?);
///     Ok(())
/// }
/// ```
pub struct Resolver<'a> {
    fs: &'a dyn FileSystem,
    api: &'a dyn ContentApi,
    config: ResolverConfig,
    validator: Box<dyn FrontmatterValidator + 'a>,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver validating imports with [`IncludedFileSchema`].
    pub fn new(fs: &'a dyn FileSystem, api: &'a dyn ContentApi, config: ResolverConfig) -> Self {
        Self {
            fs,
            api,
            config,
            validator: Box::new(IncludedFileSchema),
        }
    }

    /// Replaces the frontmatter validator for imported files.
    pub fn set_validator(&mut self, validator: impl FrontmatterValidator + 'a) {
        self.validator = Box::new(validator);
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves the markdown file at `root_path`.
    ///
    /// # Errors
    ///
    /// Any fatal [`ImportError`]: a missing root or required import, a path
    /// escaping the security boundary, a failed remote fetch, malformed
    /// frontmatter, or a strict validation failure. No partial document is
    /// returned.
    pub fn resolve(&self, root_path: impl AsRef<Path>) -> Result<Resolution> {
        let root = absolute(root_path.as_ref())?;
        let label = root.display().to_string();
        info!("Resolving imports of {}", label);

        let bytes = self.fs.read(&root).map_err(|err| read_error(&root, err))?;
        let content = decode(&label, bytes)?;
        let base_dir = root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut session = self.session(&base_dir)?;
        session.visited.insert(label.clone());
        session.run(&label, &content, &base_dir)
    }

    /// Resolves markdown content whose relative imports are rooted at
    /// `base_dir`.
    pub fn resolve_content(&self, content: &str, base_dir: impl AsRef<Path>) -> Result<Resolution> {
        let base_dir = absolute(base_dir.as_ref())?;
        info!("Resolving imports of inline content in {}", base_dir.display());

        let session = self.session(&base_dir)?;
        session.run(INLINE_CONTENT, content, &base_dir)
    }

    fn session(&self, base_dir: &Path) -> Result<Session<'_>> {
        let root = match &self.config.security_root {
            Some(root) => absolute(root)?,
            None => find_security_root(base_dir, &self.config.root_dir_name)
                .unwrap_or_else(|| base_dir.to_path_buf()),
        };
        debug!("Local imports restricted to {}", root.display());

        Ok(Session {
            fs: self.fs,
            config: &self.config,
            validator: &*self.validator,
            boundary: SecurityBoundary::new(root),
            fetcher: ContentFetcher::new(self.api, self.config.max_symlink_hops),
            visited: VisitedSet::new(),
            queue: VecDeque::new(),
            tools: ToolsAccumulator::new(),
            imported_files: Vec::new(),
            notices: Vec::new(),
        })
    }
}

/// A file that has been read and split, ready to expand.
struct Loaded {
    frontmatter: Value,
    /// Body, or only the requested section of it
    body: String,
    /// Directory nested local imports resolve against
    base_dir: PathBuf,
    /// Origin nested imports inherit when the file is remote
    origin: Option<RemoteOrigin>,
}

/// State of one resolution call.
struct Session<'s> {
    fs: &'s dyn FileSystem,
    config: &'s ResolverConfig,
    validator: &'s dyn FrontmatterValidator,
    boundary: SecurityBoundary,
    fetcher: ContentFetcher<'s>,
    visited: VisitedSet,
    queue: VecDeque<ImportQueueItem>,
    tools: ToolsAccumulator,
    imported_files: Vec<String>,
    notices: Vec<String>,
}

impl<'s> Session<'s> {
    fn run(mut self, label: &str, content: &str, base_dir: &Path) -> Result<Resolution> {
        let document =
            Document::parse(content).map_err(|reason| ImportError::parse(label, reason))?;
        self.tools.merge_frontmatter(&document.frontmatter);

        let imports = document
            .imports()
            .map_err(|reason| ImportError::parse(label, reason))?;
        for import in &imports {
            let item = self.plan(import, false, base_dir, None)?;
            self.queue.push_back(item);
        }

        let mut blocks = Vec::new();
        self.drain_queue(&mut blocks)?;
        let body = self.expand_body(&document.body, base_dir, None)?;
        self.drain_queue(&mut blocks)?;

        let root_body = trim_blank_lines(&body);
        if !root_body.is_empty() {
            blocks.push(root_body.to_string());
        }
        let mut markdown = blocks.join("\n\n");
        if !markdown.is_empty() {
            markdown.push('\n');
        }

        let fetch_stats = self.fetcher.stats();
        info!(
            "Expanded {} imports ({} remote fetches, {} cache hits)",
            self.imported_files.len(),
            fetch_stats.misses,
            fetch_stats.hits
        );

        Ok(Resolution {
            markdown,
            tools: self.tools.into_value(),
            frontmatter: document.frontmatter,
            imported_files: self.imported_files,
            notices: self.notices,
            fetch_stats,
        })
    }

    /// Classifies an import string and resolves its target.
    ///
    /// Local targets are checked against the security boundary here, before
    /// anything is read.
    fn plan(
        &self,
        raw: &str,
        optional: bool,
        base_dir: &Path,
        origin: Option<&RemoteOrigin>,
    ) -> Result<ImportQueueItem> {
        let raw = raw.trim();
        let (path, section) = split_section(raw);
        let path = path.trim();
        if path.is_empty() {
            return Err(ImportError::parse(raw, "empty import path"));
        }

        let location = if let Some(spec) = WorkflowSpec::parse(path) {
            ImportLocation::Remote(spec)
        } else if let Some(origin) = origin {
            let coordinate = origin.resolve_nested_import(path, &self.config.workflows_dir);
            match WorkflowSpec::parse(&coordinate) {
                Some(spec) => ImportLocation::Remote(spec),
                None => return Err(nested_import_error(path, &coordinate, origin)),
            }
        } else {
            ImportLocation::Local(self.boundary.resolve(base_dir, path)?)
        };

        Ok(ImportQueueItem {
            import_path: raw.to_string(),
            location,
            section: section.map(str::to_string),
            base_dir: base_dir.to_path_buf(),
            remote_origin: origin.cloned(),
            optional,
        })
    }

    fn drain_queue(&mut self, blocks: &mut Vec<String>) -> Result<()> {
        while let Some(item) = self.queue.pop_front() {
            if let Some(block) = self.expand(&item)? {
                if !block.is_empty() {
                    blocks.push(block);
                }
            }
        }
        Ok(())
    }

    /// Expands one import. `None` when it was already expanded or was an
    /// optional import whose target is missing.
    fn expand(&mut self, item: &ImportQueueItem) -> Result<Option<String>> {
        let key = item.key();
        if !self.visited.insert(key.clone()) {
            debug!("Skipping {}: already expanded", key);
            return Ok(None);
        }

        let loaded = match self.load(item) {
            Ok(loaded) => loaded,
            Err(err) if item.optional && err.is_not_found() => {
                // A later required import of the same target must still fail.
                self.visited.remove(&key);
                let notice = format!("Optional import '{}' not found, skipping", item.import_path);
                info!("{}", notice);
                self.notices.push(notice);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        debug!("Expanding {}", key);
        self.imported_files.push(key.clone());

        self.validate(item, &loaded.frontmatter)?;
        self.tools.merge_frontmatter(&loaded.frontmatter);

        let imports = crate::document::imports_list(&loaded.frontmatter)
            .map_err(|reason| ImportError::parse(&key, reason))?;
        for import in &imports {
            let nested = self.plan(import, false, &loaded.base_dir, loaded.origin.as_ref())?;
            self.queue.push_back(nested);
        }

        let expanded = self.expand_body(&loaded.body, &loaded.base_dir, loaded.origin.as_ref())?;
        Ok(Some(trim_blank_lines(&expanded).to_string()))
    }

    fn load(&mut self, item: &ImportQueueItem) -> Result<Loaded> {
        let (content, base_dir, origin) = match &item.location {
            ImportLocation::Local(path) => {
                let bytes = self.fs.read(path).map_err(|err| read_error(path, err))?;
                let base_dir = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| item.base_dir.clone());
                (decode(&item.full_path(), bytes)?, base_dir, None)
            }
            ImportLocation::Remote(spec) => {
                let bytes = self
                    .fetcher
                    .fetch(&spec.owner, &spec.repo, &spec.file_path, &spec.git_ref)
                    .map_err(|err| ImportError::from_fetch(spec.coordinate(), err))?;
                (
                    decode(&spec.coordinate(), bytes)?,
                    item.base_dir.clone(),
                    Some(spec.origin()),
                )
            }
        };

        let document = Document::parse(&content)
            .map_err(|reason| ImportError::parse(item.full_path(), reason))?;

        let body = match &item.section {
            Some(section) => extract_section(&document.body, section).ok_or_else(|| {
                ImportError::SectionNotFound {
                    path: item.full_path(),
                    section: section.clone(),
                }
            })?,
            None => document.body,
        };

        Ok(Loaded {
            frontmatter: document.frontmatter,
            body,
            base_dir,
            origin,
        })
    }

    /// Validates an imported file's frontmatter. Failures are fatal only for
    /// files under the workflows directory.
    fn validate(&mut self, item: &ImportQueueItem, frontmatter: &Value) -> Result<()> {
        let declared = frontmatter.as_object().is_some_and(|map| !map.is_empty());
        if !self.config.validate_frontmatter || !declared {
            return Ok(());
        }

        let raw = match self.validator.validate(frontmatter) {
            Ok(()) => return Ok(()),
            Err(raw) => raw,
        };
        let message = clean_schema_error(&raw);

        let location = match &item.location {
            ImportLocation::Local(path) => path.display().to_string(),
            ImportLocation::Remote(spec) => spec.file_path.clone(),
        };

        match ValidationMode::for_path(&location, &self.config.workflows_dir) {
            ValidationMode::Strict => Err(ImportError::Validation {
                path: item.full_path(),
                message,
            }),
            ValidationMode::Permissive => {
                let notice = format!(
                    "Ignoring invalid frontmatter in '{}': {}",
                    item.full_path(),
                    message
                );
                warn!("{}", notice);
                self.notices.push(notice);
                Ok(())
            }
        }
    }

    /// Replaces every directive line of `body` with the expanded import.
    fn expand_body(
        &mut self,
        body: &str,
        base_dir: &Path,
        origin: Option<&RemoteOrigin>,
    ) -> Result<String> {
        let mut fences = FenceTracker::default();
        let mut output: Vec<String> = Vec::new();

        for line in body.lines() {
            if fences.observe(line) {
                output.push(line.to_string());
                continue;
            }

            let directive = match parse_directive(line) {
                Some(directive) => directive,
                None => {
                    output.push(line.to_string());
                    continue;
                }
            };

            let item = self.plan(&directive.path, directive.optional, base_dir, origin)?;
            if let Some(block) = self.expand(&item)? {
                if !block.is_empty() {
                    output.push(block);
                }
            }
        }

        let mut expanded = output.join("\n");
        if body.ends_with('\n') {
            expanded.push('\n');
        }
        Ok(expanded)
    }
}

/// Error for a nested import of a remote file that cannot be turned into a
/// coordinate.
fn nested_import_error(path: &str, coordinate: &str, origin: &RemoteOrigin) -> ImportError {
    if path.split('/').any(|segment| segment == "..") {
        ImportError::Security {
            path: path.to_string(),
            root: origin.to_string(),
        }
    } else {
        ImportError::parse(path, format!("'{}' is not a valid coordinate", coordinate))
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = env::current_dir().map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(normalize_path(&cwd.join(path)))
}

fn read_error(path: &Path, err: io::Error) -> ImportError {
    if err.kind() == io::ErrorKind::NotFound {
        ImportError::NotFound {
            path: path.display().to_string(),
        }
    } else {
        ImportError::Io {
            path: path.display().to_string(),
            source: err,
        }
    }
}

fn decode(label: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| ImportError::parse(label, "file is not valid UTF-8"))
}
