//! Resolver Configuration
//!
//! Repository-layout conventions used by the resolver. All fields have
//! defaults matching the conventional `.github/workflows` layout, so an
//! empty YAML file (or no file at all) is a valid configuration.
//!
//! # Example YAML Format
//!
//! ```yaml
//! workflows_dir: .github/workflows
//! root_dir_name: .github
//! security_root: /repo/.github
//! max_symlink_hops: 8
//! validate_frontmatter: true
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Conventional directory holding workflow files.
pub const DEFAULT_WORKFLOWS_DIR: &str = ".github/workflows";

/// Conventional name of the folder local imports must stay inside.
pub const DEFAULT_ROOT_DIR_NAME: &str = ".github";

/// Default bound on repeated symlink rewriting of a single remote path.
pub const DEFAULT_MAX_SYMLINK_HOPS: usize = 8;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Canonical workflows directory.
    ///
    /// Nested imports inside a remote file whose coordinate has an empty
    /// base path are resolved under this directory. Files anywhere under it
    /// are validated strictly.
    pub workflows_dir: String,

    /// Folder name searched upward from the root document to find the
    /// security boundary for local imports
    pub root_dir_name: String,

    /// Explicit security boundary; overrides the upward search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_root: Option<PathBuf>,

    /// Maximum symlink rewrites attempted for one remote path
    pub max_symlink_hops: usize,

    /// Whether included-file frontmatter is validated at all
    pub validate_frontmatter: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            workflows_dir: DEFAULT_WORKFLOWS_DIR.to_string(),
            root_dir_name: DEFAULT_ROOT_DIR_NAME.to_string(),
            security_root: None,
            max_symlink_hops: DEFAULT_MAX_SYMLINK_HOPS,
            validate_frontmatter: true,
        }
    }
}

impl ResolverConfig {
    /// Sets the canonical workflows directory.
    pub fn with_workflows_dir(mut self, dir: impl Into<String>) -> Self {
        self.workflows_dir = dir.into().trim_matches('/').to_string();
        self
    }

    /// Sets an explicit security boundary.
    pub fn with_security_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.security_root = Some(root.into());
        self
    }
}

/// Loads a resolver configuration from a YAML file.
///
/// Missing fields take their defaults.
///
/// # Example
///
/// ```rust,no_run
/// use workflow_imports::config::load_config;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_config("imports.yaml")?;
///     println!("Workflows live in {}", config.workflows_dir);
///     Ok(())
/// }
/// ```
pub fn load_config(path: &str) -> Result<ResolverConfig, Box<dyn Error>> {
    info!("Loading resolver configuration from: {}", path);

    let yaml_content = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read configuration file '{}': {}. Check that the file exists and is readable.",
            path, e
        )
    })?;

    if yaml_content.trim().is_empty() {
        debug!("Configuration file is empty, using defaults");
        return Ok(ResolverConfig::default());
    }

    let config: ResolverConfig = serde_yaml::from_str(&yaml_content).map_err(|e| {
        format!(
            "Failed to parse configuration YAML: {}. Check the file format.",
            e
        )
    })?;

    if config.workflows_dir.trim().is_empty() {
        return Err("workflows_dir must not be empty".into());
    }

    debug!("Resolver configuration: {:?}", config);
    Ok(config)
}
