//! Decoder limits
//!
//! SAVE files carry their own sizes and counts, so a corrupt file can ask for
//! absurd allocations. These limits bound what a single decode will accept.
//! They can be embedded in a host application's TOML config.

use serde::{Deserialize, Serialize};

use crate::error::SavError;

/// Limits applied while decoding one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Largest array payload accepted, in bytes (default: 1 GiB)
    #[serde(default = "default_max_array_bytes")]
    pub max_array_bytes: u64,
    /// Largest dimension table accepted in an array descriptor (default: 8)
    #[serde(default = "default_max_dims")]
    pub max_dims: u32,
    /// Longest string accepted, in bytes (default: 16 MiB)
    #[serde(default = "default_max_string_len")]
    pub max_string_len: u32,
}

fn default_max_array_bytes() -> u64 {
    1 << 30
}
fn default_max_dims() -> u32 {
    crate::MAX_DIMS
}
fn default_max_string_len() -> u32 {
    16 << 20
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_array_bytes: default_max_array_bytes(),
            max_dims: default_max_dims(),
            max_string_len: default_max_string_len(),
        }
    }
}

impl DecodeConfig {
    /// Parse a config from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SavError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecodeConfig::default();
        assert_eq!(config.max_array_bytes, 1 << 30);
        assert_eq!(config.max_dims, 8);
        assert_eq!(config.max_string_len, 16 * 1024 * 1024);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DecodeConfig::from_toml_str("max_array_bytes = 4096\n").unwrap();
        assert_eq!(config.max_array_bytes, 4096);
        assert_eq!(config.max_dims, 8);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            DecodeConfig::from_toml_str("").unwrap(),
            DecodeConfig::default()
        );
    }

    #[test]
    fn test_bad_toml() {
        let err = DecodeConfig::from_toml_str("max_dims = \"eight\"").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }
}
