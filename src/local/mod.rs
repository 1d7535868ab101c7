//! Local File Access
//!
//! - [`filesystem`]: the filesystem collaborator (real and in-memory)
//! - [`boundary`]: the security boundary for local imports

pub mod boundary;
pub mod filesystem;

pub use boundary::{find_security_root, normalize_path, SecurityBoundary};
pub use filesystem::{FileSystem, MemoryFileSystem, OsFileSystem};
