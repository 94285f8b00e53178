//! Include/exclude filtering with shell-style glob patterns.
//!
//! Pattern syntax:
//!
//! - `**` matches any run of characters, separators included. A `**/` at the
//!   start of the pattern or right after a `/` may also match zero directories.
//! - `*` matches any run of characters except `/`.
//! - `?` matches exactly one character.
//! - Everything else is literal and compared case-insensitively.
//!
//! Patterns are anchored to the whole relative path. A pattern with no `/`
//! is also tried against the file name alone, so `*.log` applies at any depth.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ScanError;

/// Output format tag carried with a snapshot or diff export.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Html,
}

/// Filter and format settings used to build a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Only paths matching at least one of these are kept (empty = keep all).
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Paths matching any of these are dropped, even if included.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Skip content hashing; entries carry an empty hash.
    #[serde(default)]
    pub no_hash: bool,

    /// Output format requested for the snapshot.
    #[serde(default)]
    pub format: OutputFormat,
}

impl FilterOptions {
    /// Create options that accept every file and hash contents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Disable content hashing.
    pub fn without_hashing(mut self) -> Self {
        self.no_hash = true;
        self
    }

    /// Compile the patterns into a reusable [`PathFilter`].
    pub fn compile(&self) -> Result<PathFilter, ScanError> {
        PathFilter::new(&self.include_patterns, &self.exclude_patterns)
    }
}

/// Normalize path separators to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// One compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
    name_only: bool,
}

impl GlobPattern {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self, ScanError> {
        let normalized = normalize_path(pattern);
        let regex = RegexBuilder::new(&glob_to_regex(&normalized))
            .case_insensitive(true)
            .build()
            .map_err(|e| ScanError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name_only: !normalized.contains('/'),
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check a relative path against this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);
        if self.regex.is_match(&path) {
            return true;
        }
        if self.name_only {
            if let Some((_, name)) = path.rsplit_once('/') {
                return self.regex.is_match(name);
            }
        }
        false
    }
}

/// Check a single path against a single pattern.
///
/// A pattern that fails to compile matches nothing.
pub fn matches_pattern(path: &str, pattern: &str) -> bool {
    match GlobPattern::new(pattern) {
        Ok(glob) => glob.matches(path),
        Err(err) => {
            tracing::warn!(%err, "ignoring unusable pattern");
            false
        }
    }
}

/// Compiled include/exclude lists.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
}

impl PathFilter {
    /// Compile include and exclude pattern lists.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, ScanError> {
        let compile = |patterns: &[S]| {
            patterns
                .iter()
                .map(|p| GlobPattern::new(p.as_ref()))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether a relative path survives the filter. Exclude wins over include.
    pub fn is_included(&self, relative_path: &str) -> bool {
        let path = normalize_path(relative_path);

        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(&path)) {
            return false;
        }

        !self.exclude.iter().any(|p| p.matches(&path))
    }
}

/// Translate a normalized glob into an anchored regex source.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                let at_segment_start = prev.is_none() || prev == Some('/');
                if at_segment_start && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                    prev = Some('/');
                    continue;
                }
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push('.'),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
        prev = Some(c);
    }

    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_translation() {
        assert_eq!(glob_to_regex("*.txt"), r"^[^/]*\.txt$");
        assert_eq!(glob_to_regex("**/bin/**"), "^(?:.*/)?bin/.*$");
        assert_eq!(glob_to_regex("a/**/b"), "^a/(?:.*/)?b$");
        assert_eq!(glob_to_regex("file?.rs"), r"^file.\.rs$");
    }

    #[test]
    fn test_single_star_stops_at_separator() {
        assert!(matches_pattern("src/main.rs", "src/*.rs"));
        assert!(!matches_pattern("src/bin/main.rs", "src/*.rs"));
        assert!(matches_pattern("src/bin/main.rs", "src/**.rs"));
    }

    #[test]
    fn test_name_only_patterns_apply_at_any_depth() {
        assert!(matches_pattern("a.txt", "*.txt"));
        assert!(matches_pattern("sub/c.txt", "*.txt"));
        assert!(!matches_pattern("b.bin", "*.txt"));
    }

    #[test]
    fn test_double_star_segment() {
        assert!(matches_pattern("bin/app.exe", "**/bin/**"));
        assert!(matches_pattern("project/bin/debug/app.exe", "**/bin/**"));
        assert!(!matches_pattern("binary/app.exe", "**/bin/**"));
        assert!(matches_pattern("a/b", "a/**/b"));
        assert!(matches_pattern("a/x/y/b", "a/**/b"));
    }

    #[test]
    fn test_case_insensitive_and_separator_normalization() {
        assert!(matches_pattern("Docs/README.MD", "docs/*.md"));
        assert!(matches_pattern(r"docs\readme.md", "docs/*.md"));
        assert!(matches_pattern("docs/readme.md", r"docs\*.md"));
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        assert!(matches_pattern("a+b(1).txt", "a+b(1).txt"));
        assert!(!matches_pattern("aab1.txt", "a+b(1).txt"));
        assert!(!matches_pattern("fileXtxt", "file.txt"));
    }

    #[test]
    fn test_filter_exclude_wins() {
        let options = FilterOptions::new().include("*.txt").exclude("**/bin/**");
        let filter = options.compile().unwrap();

        assert!(filter.is_included("a.txt"));
        assert!(filter.is_included("sub/c.txt"));
        assert!(!filter.is_included("b.bin"));
        assert!(!filter.is_included("bin/notes.txt"));
        assert!(!filter.is_included("x/bin/notes.txt"));
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = FilterOptions::new().compile().unwrap();
        assert!(filter.is_included("anything/at/all.bin"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::Html.to_string(), "html");
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
