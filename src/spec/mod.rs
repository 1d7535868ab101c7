//! Remote Coordinates
//!
//! - [`coordinate`]: parsing and formatting of `owner/repo/path@ref#section`
//! - [`origin`]: remote origin tracking for nested imports

pub mod coordinate;
pub mod origin;

pub use coordinate::{
    clean_repo_path, format_workflow_spec, is_workflow_spec, parse_workflow_spec, split_section,
    WorkflowSpec, DEFAULT_REF,
};
pub use origin::RemoteOrigin;
