//! Markdown Document Handling
//!
//! - [`frontmatter`]: frontmatter splitting and field access
//! - [`directive`]: `@include`/`@import` directive recognition
//! - [`section`]: `#section` extraction

pub mod directive;
pub mod frontmatter;
pub mod section;

pub use directive::{find_directives, parse_directive, Directive};
pub use frontmatter::{imports_list, split_frontmatter, Document};
pub use section::extract_section;

/// Removes leading and trailing whitespace-only lines from a block,
/// keeping interior blank lines and indentation.
pub fn trim_blank_lines(block: &str) -> &str {
    let lines: Vec<&str> = block.split_inclusive('\n').collect();

    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());

    match (first, last) {
        (Some(first), Some(last)) => {
            let start: usize = lines[..first].iter().map(|line| line.len()).sum();
            let end: usize = lines[..=last].iter().map(|line| line.len()).sum();
            block[start..end].trim_end_matches(['\n', '\r'])
        }
        _ => "",
    }
}
