//! workflow-imports - Import Resolution for Markdown Workflows
//!
//! Expands the `@include`/`@import` directives and frontmatter `imports:`
//! of a markdown workflow file into one self-contained document, and merges
//! the tool declarations of every file it pulls in. Imports may be local
//! files inside the repository's `.github` tree or files in other GitHub
//! repositories, addressed as `owner/repo/path/file.md@ref#section`.
//!
//! # Architecture
//!
//! - [`spec`]: workflowspec coordinates and remote origins
//! - [`remote`]: content API, fetch cache and symlink resolution
//! - [`local`]: filesystem access and the security boundary
//! - [`document`]: frontmatter, directives and sections
//! - [`resolver`]: the import graph walker and tools merger
//! - [`validation`]: included-file schema and error cleanup
//! - [`config`]: resolver configuration
//! - [`error`]: the resolution error type
//!
//! # Example
//!
//! ```rust,no_run
//! use workflow_imports::local::OsFileSystem;
//! use workflow_imports::remote::GhCliContentApi;
//! use workflow_imports::{Resolver, ResolverConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fs = OsFileSystem;
//!     let api = GhCliContentApi::new();
//!
//!     let resolver = Resolver::new(&fs, &api, ResolverConfig::default());
//!     let resolution = resolver.resolve(".github/workflows/triage.md")?;
//!
//!     for notice in &resolution.notices {
//!         eprintln!("{}", notice);
//!     }
//!     println!("{}", resolution.markdown);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod local;
pub mod remote;
pub mod resolver;
pub mod spec;
pub mod validation;

// Re-export commonly used types
pub use config::{load_config, ResolverConfig};
pub use error::{ErrorKind, ImportError};
pub use resolver::{Resolution, Resolver};
pub use spec::{
    format_workflow_spec, is_workflow_spec, parse_workflow_spec, RemoteOrigin, WorkflowSpec,
};
pub use validation::{clean_one_of_message, clean_schema_error};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "wfimports";
