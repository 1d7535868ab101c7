//! Frontmatter Validation
//!
//! - [`schema`]: built-in schema for imported files and validation modes
//! - [`cleanup`]: turns raw schema reports into one readable line

pub mod cleanup;
pub mod schema;

pub use cleanup::{clean_one_of_message, clean_schema_error, GENERIC_SCHEMA_ERROR};
pub use schema::{FrontmatterValidator, IncludedFileSchema, ValidationMode};
