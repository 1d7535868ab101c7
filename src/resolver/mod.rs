//! Import Resolution
//!
//! - [`queue`]: import queue items and the visited set
//! - [`tools`]: tools merging across the import graph
//! - [`walker`]: the import graph walker

pub mod queue;
pub mod tools;
pub mod walker;

pub use queue::{ImportLocation, ImportQueueItem, VisitedSet};
pub use tools::{extract_tools, merge_tools, ToolsAccumulator};
pub use walker::{Resolution, Resolver};
