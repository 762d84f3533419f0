//! Requirements manifest classification

use std::fmt;

/// State of a requirements manifest before a build.
///
/// Exactly one state applies to any manifest. Only `Valid` lets the
/// pipeline proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestState {
    /// File does not exist
    Absent,
    /// File exists with no lines at all, or only blank lines
    Empty,
    /// Every non-blank line is a `#` comment
    CommentOnly,
    /// At least one line is neither blank nor a comment
    Valid,
}

impl ManifestState {
    /// Classify manifest content. `None` means the file does not exist.
    pub fn classify(content: Option<&str>) -> Self {
        let Some(content) = content else {
            return Self::Absent;
        };

        let mut saw_comment = false;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('#') {
                saw_comment = true;
                continue;
            }
            return Self::Valid;
        }

        if saw_comment {
            Self::CommentOnly
        } else {
            Self::Empty
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for ManifestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Absent => "missing",
            Self::Empty => "empty",
            Self::CommentOnly => "only comments",
            Self::Valid => "valid",
        };
        f.write_str(text)
    }
}

/// Substantive requirement lines (comments and blanks dropped).
pub fn requirement_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}
