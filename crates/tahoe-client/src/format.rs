//! Storage formats a node can be asked to use

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layout of newly uploaded content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    /// Immutable, content-hash keyed
    #[default]
    #[serde(rename = "CHK")]
    Chk,
    /// Small mutable
    #[serde(rename = "SDMF")]
    Sdmf,
    /// Medium (large) mutable
    #[serde(rename = "MDMF")]
    Mdmf,
}

impl Format {
    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Chk => "CHK",
            Format::Sdmf => "SDMF",
            Format::Mdmf => "MDMF",
        }
    }

    pub fn is_mutable(&self) -> bool {
        !matches!(self, Format::Chk)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CHK" => Ok(Format::Chk),
            "SDMF" => Ok(Format::Sdmf),
            "MDMF" => Ok(Format::Mdmf),
            other => Err(format!("unknown format '{}' (expected CHK, SDMF or MDMF)", other)),
        }
    }
}
