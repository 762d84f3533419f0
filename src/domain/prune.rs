//! Name-based pruning of the staging tree
//!
//! Pruning is planned over a snapshot of relative paths; nothing here
//! touches the filesystem. The plan lists the topmost matching entries only:
//! once a directory is selected, nothing beneath it is listed again.

use std::path::{Path, PathBuf};

use crate::domain::DomainError;

/// File-name pattern with an optional `*` wildcard at either end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    /// `__pycache__`
    Exact(String),
    /// `pip*`
    Prefix(String),
    /// `*dist-info`
    Suffix(String),
    /// `*egg*`
    Contains(String),
}

impl NamePattern {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let (leading, rest) = match raw.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (trailing, inner) = match rest.strip_suffix('*') {
            Some(inner) => (true, inner),
            None => (false, rest),
        };

        if inner.is_empty() || inner.contains('*') || inner.contains('/') {
            return Err(DomainError::InvalidPattern(raw.to_string()));
        }

        let inner = inner.to_string();
        Ok(match (leading, trailing) {
            (false, false) => Self::Exact(inner),
            (false, true) => Self::Prefix(inner),
            (true, false) => Self::Suffix(inner),
            (true, true) => Self::Contains(inner),
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(s) => name == s,
            Self::Prefix(s) => name.starts_with(s.as_str()),
            Self::Suffix(s) => name.ends_with(s.as_str()),
            Self::Contains(s) => name.contains(s.as_str()),
        }
    }
}

/// A named set of patterns applied in one pruning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneRules {
    patterns: Vec<NamePattern>,
}

impl PruneRules {
    pub fn new(patterns: Vec<NamePattern>) -> Self {
        Self { patterns }
    }

    /// Parse every pattern, failing on the first invalid one.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, DomainError> {
        let patterns = raw
            .iter()
            .map(|p| NamePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.patterns.iter().any(|p| p.matches(name)))
    }

    /// Select the entries to remove from a tree snapshot.
    ///
    /// `entries` are paths relative to the staging root (files and
    /// directories, any order). Returns the topmost matches, sorted.
    pub fn plan_removals(&self, entries: &[PathBuf]) -> Vec<PathBuf> {
        let mut sorted: Vec<&PathBuf> = entries.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut selected: Vec<PathBuf> = Vec::new();
        for entry in sorted {
            if selected.iter().any(|s| entry.starts_with(s)) {
                continue;
            }
            if self.matches(entry) {
                selected.push(entry.clone());
            }
        }
        selected
    }
}
