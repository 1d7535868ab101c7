//! Local Import Security Boundary
//!
//! Local imports must stay inside a configured root folder, conventionally
//! the repository's `.github` tree. Paths are checked lexically, before any
//! filesystem access, and a violation is always an error; paths are never
//! clamped back into the root.

use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::error::ImportError;

/// Lexically normalizes a path: drops `.` and folds `..` into its parent.
///
/// `..` never climbs above a filesystem root; on relative paths an
/// unmatched `..` is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Finds the nearest ancestor of `start_dir` (itself included) named
/// `root_dir_name`.
pub fn find_security_root(start_dir: &Path, root_dir_name: &str) -> Option<PathBuf> {
    let normalized = normalize_path(start_dir);
    normalized
        .ancestors()
        .find(|dir| dir.file_name().is_some_and(|name| name == root_dir_name))
        .map(Path::to_path_buf)
}

/// Root folder that every local import must resolve inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityBoundary {
    root: PathBuf,
}

impl SecurityBoundary {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize_path(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, path: &Path) -> bool {
        normalize_path(path).starts_with(&self.root)
    }

    /// Joins an import path onto `base_dir` and checks the result.
    ///
    /// Absolute import paths are checked as given.
    ///
    /// # Errors
    ///
    /// [`ImportError::Security`] when the normalized path leaves the root.
    pub fn resolve(&self, base_dir: &Path, import_path: &str) -> Result<PathBuf, ImportError> {
        let joined = normalize_path(&base_dir.join(import_path));

        if !joined.starts_with(&self.root) {
            debug!(
                "Rejected '{}' from '{}': resolves to '{}'",
                import_path,
                base_dir.display(),
                joined.display()
            );
            return Err(ImportError::Security {
                path: import_path.to_string(),
                root: self.root.display().to_string(),
            });
        }

        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/repo/.github/workflows/../shared/./a.md")),
            PathBuf::from("/repo/.github/shared/a.md")
        );
        assert_eq!(normalize_path(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_find_security_root() {
        assert_eq!(
            find_security_root(Path::new("/repo/.github/workflows/shared"), ".github"),
            Some(PathBuf::from("/repo/.github"))
        );
        assert_eq!(
            find_security_root(Path::new("/repo/.github"), ".github"),
            Some(PathBuf::from("/repo/.github"))
        );
        assert_eq!(find_security_root(Path::new("/repo/docs"), ".github"), None);
    }

    #[test]
    fn test_resolve_inside_root() {
        let boundary = SecurityBoundary::new("/repo/.github");
        let resolved = boundary
            .resolve(Path::new("/repo/.github/workflows"), "shared/tools.md")
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/repo/.github/workflows/shared/tools.md"));

        let resolved = boundary
            .resolve(Path::new("/repo/.github/workflows"), "../agents/helper.md")
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/repo/.github/agents/helper.md"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let boundary = SecurityBoundary::new("/repo/.github");
        let err = boundary
            .resolve(Path::new("/repo/.github/workflows"), "../../../etc/passwd")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Security);
        assert!(err.to_string().contains("../../../etc/passwd"));
    }

    #[test]
    fn test_resolve_rejects_sibling_with_common_prefix() {
        let boundary = SecurityBoundary::new("/repo/.github");
        let err = boundary
            .resolve(Path::new("/repo/.github/workflows"), "../../.github-evil/a.md")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Security);
    }

    #[test]
    fn test_resolve_rejects_absolute_outside() {
        let boundary = SecurityBoundary::new("/repo/.github");
        assert!(boundary
            .resolve(Path::new("/repo/.github/workflows"), "/etc/passwd")
            .is_err());
        assert!(boundary
            .resolve(Path::new("/repo/.github/workflows"), "/repo/.github/shared/a.md")
            .is_ok());
    }

    #[test]
    fn test_contains() {
        let boundary = SecurityBoundary::new("/repo/.github/");
        assert!(boundary.contains(Path::new("/repo/.github/x/../y.md")));
        assert!(!boundary.contains(Path::new("/repo/README.md")));
    }
}
