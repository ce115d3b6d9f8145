//! Output field selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which fields each emitted record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFields {
    /// Username, id, url, raw creation date and the token in effect (default).
    #[default]
    Full,
    /// Id and url only.
    Minimal,
}

impl OutputFields {
    /// Whether the optional traceability fields are filled in.
    pub fn includes_metadata(&self) -> bool {
        matches!(self, OutputFields::Full)
    }
}

impl fmt::Display for OutputFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFields::Full => write!(f, "full"),
            OutputFields::Minimal => write!(f, "minimal"),
        }
    }
}

impl FromStr for OutputFields {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(OutputFields::Full),
            "minimal" => Ok(OutputFields::Minimal),
            _ => Err(format!("Unknown output field set: {}", s)),
        }
    }
}
