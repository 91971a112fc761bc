//! Platform filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Device platform a query can be restricted to.
///
/// The wire name is what the query endpoint expects in its repeated
/// `platform=` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Windows devices.
    #[default]
    Windows,
    /// macOS devices.
    MacOs,
    /// Mobile devices.
    Mobile,
}

impl Platform {
    /// Returns the wire name of this platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "mac_os",
            Self::Mobile => "mobile",
        }
    }

    /// Returns all platforms.
    pub fn all() -> &'static [Platform] {
        &[Self::Windows, Self::MacOs, Self::Mobile]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "mac_os" | "macos" | "mac" => Ok(Self::MacOs),
            "mobile" => Ok(Self::Mobile),
            _ => Err(CoreError::InvalidPlatform(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform_aliases() {
        assert_eq!("windows".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("macOS".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!("mac_os".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!(" Mobile ".parse::<Platform>().unwrap(), Platform::Mobile);
    }

    #[test]
    fn test_parse_unknown_platform() {
        let err = "linux".parse::<Platform>().unwrap_err();
        assert!(err.to_string().contains("linux"));
    }

    #[test]
    fn test_display_matches_wire_name() {
        for platform in Platform::all() {
            assert_eq!(platform.to_string(), platform.as_str());
        }
    }
}
