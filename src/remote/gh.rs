//! GitHub CLI Content API
//!
//! Fetches repository contents by invoking the `gh` CLI, which takes care
//! of authentication and GitHub Enterprise hosts (`GH_HOST`).
//!
//! # Binary Resolution Priority
//!
//! The `gh` binary is resolved in the following order:
//! 1. `GH_PATH` environment variable
//! 2. Next to the wfimports executable
//! 3. System PATH

use std::path::PathBuf;
use std::process::{Command, Output};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::api::{ApiError, ContentApi, RepoEntry};

/// Lazily-initialized path to the `gh` binary.
pub static GH_PATH: Lazy<PathBuf> = Lazy::new(|| {
    // Priority 1: Explicit override
    if let Ok(path) = std::env::var("GH_PATH") {
        if !path.trim().is_empty() {
            info!("Using gh from GH_PATH: {}", path);
            return PathBuf::from(path);
        }
    }

    // Priority 2: Bundled next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let bundled = exe_dir.join("gh");
            if bundled.exists() {
                info!("Using bundled gh: {}", bundled.display());
                return bundled;
            }
        }
    }

    // Priority 3: System PATH
    if let Ok(output) = Command::new("which").arg("gh").output() {
        if output.status.success() {
            let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path_str.is_empty() {
                debug!("Using system gh: {}", path_str);
                return PathBuf::from(path_str);
            }
        }
    }

    warn!("gh binary not found; remote imports will fail");
    warn!("  Install from: https://cli.github.com/");
    PathBuf::from("gh")
});

/// Extracts the HTTP status `gh api` reports on stderr.
static HTTP_STATUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"HTTP (\d{3})").expect("valid regex"));

/// Media type returning the file body instead of a JSON envelope.
const RAW_MEDIA_TYPE: &str = "Accept: application/vnd.github.raw";

/// Entry metadata as returned by the contents endpoint.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    target: Option<String>,
}

/// [`ContentApi`] backed by `gh api`.
#[derive(Debug, Clone)]
pub struct GhCliContentApi {
    binary: PathBuf,
}

impl Default for GhCliContentApi {
    fn default() -> Self {
        Self::new()
    }
}

impl GhCliContentApi {
    pub fn new() -> Self {
        Self {
            binary: GH_PATH.clone(),
        }
    }

    /// Uses a specific `gh` binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, ApiError> {
        debug!("Running {} {}", self.binary.display(), args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| {
                ApiError::new(
                    None,
                    format!("failed to run '{}': {}", self.binary.display(), e),
                )
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(api_error_from_output(&output))
        }
    }
}

/// Builds the contents endpoint for a path at a ref.
fn contents_endpoint(owner: &str, repo: &str, path: &str, git_ref: &str) -> String {
    format!(
        "repos/{}/{}/contents/{}?ref={}",
        owner,
        repo,
        path.trim_start_matches('/'),
        git_ref
    )
}

fn api_error_from_output(output: &Output) -> ApiError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let status = HTTP_STATUS
        .captures(&stderr)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok());

    let message = if stderr.is_empty() {
        format!("gh exited with {}", output.status)
    } else {
        stderr
    };
    ApiError::new(status, message)
}

/// Maps a contents-endpoint response body onto an entry kind.
///
/// Directories come back as a JSON array of their children.
fn parse_entry(body: &[u8]) -> Result<RepoEntry, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::new(None, format!("invalid contents response: {}", e)))?;

    if value.is_array() {
        return Ok(RepoEntry::Dir);
    }

    let entry: ContentEntry = serde_json::from_value(value)
        .map_err(|e| ApiError::new(None, format!("invalid contents entry: {}", e)))?;

    match entry.kind.as_str() {
        "file" => Ok(RepoEntry::File),
        "dir" => Ok(RepoEntry::Dir),
        "submodule" => Ok(RepoEntry::Submodule),
        "symlink" => entry
            .target
            .map(|target| RepoEntry::Symlink { target })
            .ok_or_else(|| ApiError::new(None, "symlink entry without target")),
        other => Err(ApiError::new(None, format!("unknown entry type '{}'", other))),
    }
}

impl ContentApi for GhCliContentApi {
    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let endpoint = contents_endpoint(owner, repo, path, git_ref);
        self.run(&["api", "-H", RAW_MEDIA_TYPE, &endpoint])
    }

    fn get_entry(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<RepoEntry, ApiError> {
        let endpoint = contents_endpoint(owner, repo, path, git_ref);
        let body = self.run(&["api", &endpoint])?;
        parse_entry(&body)
    }
}
