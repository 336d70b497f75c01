//! FortiOS firmware versions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("empty firmware version")]
    Empty,
    #[error("invalid firmware version '{0}'")]
    Invalid(String),
}

/// A firmware version such as `v7.2.4`. Missing components count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FirmwareVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl FromStr for FirmwareVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = [0u32; 3];
        for (slot, part) in parts.iter_mut().zip(digits.split('.')) {
            *slot = part
                .parse()
                .map_err(|_| VersionError::Invalid(s.to_string()))?;
        }
        if digits.split('.').count() > 3 {
            return Err(VersionError::Invalid(s.to_string()));
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_version() {
        assert_eq!("v7.2.4".parse(), Ok(FirmwareVersion::new(7, 2, 4)));
        assert_eq!("6.4".parse(), Ok(FirmwareVersion::new(6, 4, 0)));
        assert_eq!("".parse::<FirmwareVersion>(), Err(VersionError::Empty));
        assert!("v7.x".parse::<FirmwareVersion>().is_err());
        assert!("7.0.1.2".parse::<FirmwareVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        let v640: FirmwareVersion = "6.4.0".parse().unwrap();
        let v700: FirmwareVersion = "v7.0.0".parse().unwrap();
        let v7012: FirmwareVersion = "v7.0.12".parse().unwrap();
        assert!(v640 < v700);
        assert!(v700 < v7012);
        assert_eq!(v7012.to_string(), "7.0.12");
    }
}
