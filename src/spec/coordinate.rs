//! WorkflowSpec Coordinates
//!
//! Parses and formats the compact remote-file coordinate
//! `owner/repo/[basepath/]file.md[@ref][#section]`.
//!
//! Classification and parsing share one code path: a string is a
//! workflowspec exactly when [`WorkflowSpec::parse`] accepts it.

use std::fmt;

use super::origin::RemoteOrigin;

/// Ref used when the coordinate carries no `@ref`.
pub const DEFAULT_REF: &str = "main";

/// Prefixes reserved for local and shared-directory imports.
const RESERVED_PREFIXES: &[&str] = &[".", "/", "shared/"];

/// A parsed remote file coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkflowSpec {
    pub owner: String,
    pub repo: String,
    /// Cleaned repository path of the file, including its directory
    pub file_path: String,
    /// Branch, tag or commit SHA
    pub git_ref: String,
    /// In-document anchor from a trailing `#name`
    pub section: Option<String>,
}

impl WorkflowSpec {
    /// Parses a coordinate string.
    ///
    /// Returns `None` for anything that must be treated as a local path:
    /// fewer than three `/`-separated segments, a reserved prefix
    /// (`.`, `/`, `shared/`), a URL scheme, an empty owner/repo/file name,
    /// an empty `@ref`, or a directory chain that climbs out of the
    /// repository.
    ///
    /// # Example
    ///
    /// ```
    /// use workflow_imports::spec::WorkflowSpec;
    ///
    /// let spec = WorkflowSpec::parse("octo/tools/shared/./lint//rules.md@v2#Setup").unwrap();
    /// assert_eq!(spec.owner, "octo");
    /// assert_eq!(spec.base_path(), "shared/lint");
    /// assert_eq!(spec.git_ref, "v2");
    /// assert_eq!(spec.section.as_deref(), Some("Setup"));
    /// ```
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() || spec.contains("://") {
            return None;
        }
        if RESERVED_PREFIXES.iter().any(|prefix| spec.starts_with(prefix)) {
            return None;
        }

        let (rest, section) = split_section(spec);

        let (path, git_ref) = match rest.split_once('@') {
            Some((path, git_ref)) => {
                let git_ref = git_ref.trim();
                if git_ref.is_empty() {
                    return None;
                }
                (path, git_ref)
            }
            None => (rest, DEFAULT_REF),
        };

        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() < 3 {
            return None;
        }

        let owner = parts[0];
        let repo = parts[1];
        if !is_identifier(owner) || !is_identifier(repo) {
            return None;
        }

        let file_name = parts[parts.len() - 1];
        if !is_identifier(file_name) {
            return None;
        }

        let base_path = clean_repo_path(&parts[2..parts.len() - 1].join("/"));
        if escapes_root(&base_path) {
            return None;
        }

        let file_path = if base_path.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", base_path, file_name)
        };

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            file_path,
            git_ref: git_ref.to_string(),
            section: section.map(str::to_string),
        })
    }

    /// Directory portion of the file path; empty for files at the repo root.
    pub fn base_path(&self) -> &str {
        match self.file_path.rfind('/') {
            Some(idx) => &self.file_path[..idx],
            None => "",
        }
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        match self.file_path.rfind('/') {
            Some(idx) => &self.file_path[idx + 1..],
            None => &self.file_path,
        }
    }

    /// Where this file came from, for resolving its own nested imports.
    pub fn origin(&self) -> RemoteOrigin {
        RemoteOrigin::new(&self.owner, &self.repo, &self.git_ref, self.base_path())
    }

    /// Formatted coordinate without the section anchor.
    pub fn coordinate(&self) -> String {
        format_workflow_spec(&self.owner, &self.repo, &self.file_path, &self.git_ref)
    }
}

impl fmt::Display for WorkflowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coordinate())?;
        if let Some(section) = &self.section {
            write!(f, "#{}", section)?;
        }
        Ok(())
    }
}

/// Formats a coordinate. The `@ref` is always written, even for `main`.
pub fn format_workflow_spec(owner: &str, repo: &str, file_path: &str, git_ref: &str) -> String {
    format!(
        "{}/{}/{}@{}",
        owner,
        repo,
        file_path.trim_start_matches('/'),
        git_ref
    )
}

/// Parses a coordinate into its remote origin.
pub fn parse_workflow_spec(spec: &str) -> Option<RemoteOrigin> {
    WorkflowSpec::parse(spec).map(|parsed| parsed.origin())
}

/// Classification predicate used for every import string.
pub fn is_workflow_spec(path: &str) -> bool {
    WorkflowSpec::parse(path).is_some()
}

/// Splits a trailing `#section` off an import path.
///
/// An empty anchor (`file.md#`) yields no section.
pub fn split_section(path: &str) -> (&str, Option<&str>) {
    match path.split_once('#') {
        Some((rest, section)) => {
            let section = section.trim();
            (rest, (!section.is_empty()).then_some(section))
        }
        None => (path, None),
    }
}

/// Lexically cleans a `/`-separated repository path.
///
/// Drops empty and `.` segments and folds `..` into its parent. A `..`
/// with nothing left to fold is kept, so callers can detect paths that
/// climb above the repository root.
pub fn clean_repo_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// True when a cleaned repository path climbs above the root.
pub fn escapes_root(cleaned: &str) -> bool {
    cleaned == ".." || cleaned.starts_with("../")
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_coordinate() {
        let spec = WorkflowSpec::parse("octo/library/workflows/shared/tools.md@v1.2.0").unwrap();
        assert_eq!(spec.owner, "octo");
        assert_eq!(spec.repo, "library");
        assert_eq!(spec.file_path, "workflows/shared/tools.md");
        assert_eq!(spec.base_path(), "workflows/shared");
        assert_eq!(spec.file_name(), "tools.md");
        assert_eq!(spec.git_ref, "v1.2.0");
        assert!(spec.section.is_none());
    }

    #[test]
    fn test_parse_defaults_ref_to_main() {
        let spec = WorkflowSpec::parse("octo/library/a/b.md").unwrap();
        assert_eq!(spec.git_ref, "main");
    }

    #[test]
    fn test_parse_root_file_has_empty_base_path() {
        let origin = parse_workflow_spec("octo/library/file.md@main").unwrap();
        assert_eq!(origin.base_path, "");
    }

    #[test]
    fn test_parse_deep_paths() {
        let cases = [
            ("o/r/a/file.md@main", "a"),
            ("o/r/a/b/file.md@main", "a/b"),
            ("o/r/a/b/c/d/file.md@main", "a/b/c/d"),
            ("o/r/.github/workflows/shared/mcp/tool.md@abc123", ".github/workflows/shared/mcp"),
        ];
        for (input, expected) in cases {
            let origin = parse_workflow_spec(input).unwrap();
            assert_eq!(origin.base_path, expected, "base path of {}", input);
        }
    }

    #[test]
    fn test_parse_cleans_base_path() {
        let origin = parse_workflow_spec("owner/repo/./a//b/./c///file.md@main").unwrap();
        assert_eq!(origin.base_path, "a/b/c");
        assert_eq!(origin.owner, "owner");
        assert_eq!(origin.repo, "repo");
    }

    #[test]
    fn test_parse_folds_parent_segments() {
        let origin = parse_workflow_spec("o/r/a/b/../c/file.md").unwrap();
        assert_eq!(origin.base_path, "a/c");
        assert!(WorkflowSpec::parse("o/r/../file.md").is_none());
    }

    #[test]
    fn test_parse_section_and_ref() {
        let spec = WorkflowSpec::parse("o/r/docs/guide.md@dev#Install Steps").unwrap();
        assert_eq!(spec.git_ref, "dev");
        assert_eq!(spec.section.as_deref(), Some("Install Steps"));
        assert_eq!(spec.to_string(), "o/r/docs/guide.md@dev#Install Steps");
    }

    #[test]
    fn test_parse_rejects_short_and_reserved() {
        for input in [
            "file.md",
            "shared/file.md",
            "shared/deep/path/file.md",
            "./a/b/c.md",
            "../a/b/c.md",
            ".github/workflows/x.md",
            "/abs/path/file.md",
            "owner/file.md@main",
            "",
            "owner//file.md",
            "owner/repo/file.md@",
        ] {
            assert!(WorkflowSpec::parse(input).is_none(), "{} should be local", input);
        }
    }

    #[test]
    fn test_parse_rejects_url_coordinates() {
        assert!(WorkflowSpec::parse("https://github.com/owner/repo/path/file.md").is_none());
        assert!(!is_workflow_spec("http://example.com/a/b.md"));
    }

    #[test]
    fn test_classifier_agrees_with_parse() {
        let inputs = [
            "o/r/f.md",
            "o/r/f.md@v1",
            "o/r/d/f.md#s",
            "shared/a/b.md",
            "a/b",
            "./x/y/z.md",
            "https://h/o/r/f.md",
            "o/r/../f.md",
            "o/r/f.md@",
            " o/r/f.md ",
        ];
        for input in inputs {
            assert_eq!(
                is_workflow_spec(input),
                WorkflowSpec::parse(input).is_some(),
                "disagreement on {}",
                input
            );
        }
    }

    #[test]
    fn test_format_round_trip() {
        let formatted = format_workflow_spec("o", "r", "p1/p2/file.md", "v3");
        assert_eq!(formatted, "o/r/p1/p2/file.md@v3");

        let spec = WorkflowSpec::parse(&formatted).unwrap();
        assert_eq!(spec.base_path(), "p1/p2");
        assert_eq!(
            format_workflow_spec(&spec.owner, &spec.repo, &spec.file_path, &spec.git_ref),
            formatted
        );
    }

    #[test]
    fn test_format_always_includes_ref() {
        assert_eq!(format_workflow_spec("o", "r", "f.md", "main"), "o/r/f.md@main");
        let spec = WorkflowSpec::parse("o/r/f.md").unwrap();
        assert_eq!(spec.coordinate(), "o/r/f.md@main");
    }

    #[test]
    fn test_split_section() {
        assert_eq!(split_section("a.md#Intro"), ("a.md", Some("Intro")));
        assert_eq!(split_section("a.md#"), ("a.md", None));
        assert_eq!(split_section("a.md"), ("a.md", None));
    }

    #[test]
    fn test_clean_repo_path() {
        assert_eq!(clean_repo_path("a//b/./c/"), "a/b/c");
        assert_eq!(clean_repo_path(".github/workflows/shared/../../library"), ".github/library");
        assert_eq!(clean_repo_path("a/../../b"), "../b");
        assert_eq!(clean_repo_path(""), "");
        assert!(escapes_root(&clean_repo_path("../../x")));
        assert!(!escapes_root(&clean_repo_path("x/..y")));
    }
}
