//! Domain entities: core data structures

use serde::Deserialize;

/// Layer version as reported back by the cloud after publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PublishedLayer {
    pub layer_arn: Option<String>,
    pub layer_version_arn: Option<String>,
    pub version: Option<u64>,
    pub compatible_runtimes: Vec<String>,
}

impl PublishedLayer {
    /// Parse the JSON response of a publish call.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Interpret a console answer to a yes/no question.
///
/// Returns `None` for anything that is not a clear answer, so the caller
/// can ask again.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Expand environment variables in a path string.
///
/// Supports:
/// - `$VAR` syntax
/// - `${VAR}` syntax
/// - `~` for home directory
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
