//! ETP wire generations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// ETP wire-format generation.
///
/// Both generations expose the same abstract capability set, but message
/// shapes and protocol numbering differ. Identifiers from one generation must
/// never be compared against identifiers from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WireVersion {
    /// ETP 1.1
    #[default]
    #[serde(rename = "1.1")]
    V11,
    /// ETP 1.2
    #[serde(rename = "1.2")]
    V12,
}

impl WireVersion {
    /// Short version string (`"1.1"` / `"1.2"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V11 => "1.1",
            Self::V12 => "1.2",
        }
    }

    /// WebSocket sub-protocol negotiated for this generation.
    #[must_use]
    pub const fn sub_protocol(self) -> &'static str {
        match self {
            Self::V11 => "energistics-tp",
            Self::V12 => "etp12.energistics.org",
        }
    }
}

impl fmt::Display for WireVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireVersion {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.1" | "11" | "v1.1" | "energistics-tp" => Ok(Self::V11),
            "1.2" | "12" | "v1.2" | "etp12.energistics.org" => Ok(Self::V12),
            other => Err(ProtocolError::UnknownVersion(other.to_string())),
        }
    }
}
