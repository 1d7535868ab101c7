//! Include Directives
//!
//! Recognizes one directive per line:
//!
//! - `@include path`, `@include? path`
//! - `@import path`, `@import? path`
//! - `{{#import path}}`, `{{#import? path}}`
//!
//! The `?` form marks the import optional. Lines inside fenced code blocks
//! are never directives.

use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:@(?:include|import)(\?)?\s+(.+?)|\{\{#import(\?)?\s+(.+?)\s*\}\})\s*$")
        .expect("valid regex")
});

/// A parsed include/import directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Import path as written, including any `#section`
    pub path: String,
    pub optional: bool,
}

/// Parses a single line as a directive.
///
/// # Example
///
/// ```
/// use workflow_imports::document::parse_directive;
///
/// let directive = parse_directive("@include? shared/extra.md#Setup").unwrap();
/// assert!(directive.optional);
/// assert_eq!(directive.path, "shared/extra.md#Setup");
/// ```
pub fn parse_directive(line: &str) -> Option<Directive> {
    let caps = DIRECTIVE.captures(line.trim())?;

    let (optional, path) = match (caps.get(2), caps.get(4)) {
        (Some(path), _) => (caps.get(1).is_some(), path.as_str()),
        (None, Some(path)) => (caps.get(3).is_some(), path.as_str()),
        (None, None) => return None,
    };

    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    Some(Directive {
        path: path.to_string(),
        optional,
    })
}

/// Tracks fenced code blocks while scanning markdown line by line.
#[derive(Debug, Default)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feeds one line; returns true when the line is inside (or delimits)
    /// a fenced code block.
    pub fn observe(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let fence = ['`', '~'].into_iter().find_map(|marker| {
            let run = trimmed.chars().take_while(|c| *c == marker).count();
            (run >= 3).then_some((marker, run))
        });

        match (self.open, fence) {
            (None, Some(opened)) => {
                self.open = Some(opened);
                true
            }
            (Some((marker, len)), Some((closing, run)))
                if closing == marker && run >= len && trimmed[run..].trim().is_empty() =>
            {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, None) => false,
        }
    }
}

/// All directives in a markdown body, in order of appearance.
pub fn find_directives(body: &str) -> Vec<Directive> {
    let mut fences = FenceTracker::default();
    body.lines()
        .filter(|line| !fences.observe(line))
        .filter_map(parse_directive)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_include_forms() {
        let cases = [
            ("@include shared/a.md", "shared/a.md", false),
            ("@include? shared/a.md", "shared/a.md", true),
            ("@import shared/a.md", "shared/a.md", false),
            ("@import? shared/a.md", "shared/a.md", true),
            ("{{#import shared/a.md}}", "shared/a.md", false),
            ("{{#import? shared/a.md }}", "shared/a.md", true),
            ("   @include   octo/lib/x.md@v1#Intro  ", "octo/lib/x.md@v1#Intro", false),
        ];
        for (line, path, optional) in cases {
            let directive =
                parse_directive(line).unwrap_or_else(|| panic!("no directive in {}", line));
            assert_eq!(directive.path, path, "{}", line);
            assert_eq!(directive.optional, optional, "{}", line);
        }
    }

    #[test]
    fn test_parse_non_directives() {
        for line in [
            "",
            "@include",
            "@includes shared/a.md",
            "Use @include shared/a.md to pull it in",
            "@mention someone",
            "{{#import}}",
            "email@include.com",
        ] {
            assert!(parse_directive(line).is_none(), "{} should not parse", line);
        }
    }

    #[test]
    fn test_find_directives_skips_code_fences() {
        let body = "\
@include a.md
```markdown
@include b.md
```
~~~~
@import c.md
~~~
still fenced
~~~~
@import? d.md
";
        let found = find_directives(body);
        let paths: Vec<&str> = found.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "d.md"]);
        assert!(found[1].optional);
    }

    #[test]
    fn test_fence_tracker_requires_matching_marker() {
        let mut fences = FenceTracker::default();
        assert!(fences.observe("```"));
        assert!(fences.observe("~~~"));
        assert!(fences.observe("```"));
        assert!(!fences.observe("text"));
    }
}
