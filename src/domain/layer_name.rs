//! Validated Lambda layer name

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::domain::DomainError;

/// Accepted layer name alphabet, anchored on both ends.
pub const LAYER_NAME_PATTERN: &str = r"^[a-zA-Z0-9.-]+$";

/// Identifier of the layer being built.
///
/// Used as the archive base name (`<name>.zip`), as the key of the build
/// environment directory, and as the published layer name. Input is never
/// trimmed, truncated or escaped: it either matches `[a-zA-Z0-9.-]+` or
/// is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerName(String);

impl LayerName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let re = Regex::new(LAYER_NAME_PATTERN)
            .map_err(|_| DomainError::InvalidLayerName(raw.to_string()))?;
        if re.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidLayerName(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the archive built for this layer.
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.0)
    }
}

impl FromStr for LayerName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LayerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
