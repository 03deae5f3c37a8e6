use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HdskError;

/// Hash primitive used for every keyed-hash, digest and HKDF step.
///
/// Keys derived under one algorithm are unrelated to keys derived under
/// another, so the choice must stay fixed for the lifetime of a secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha512")]
    Sha512,
    #[serde(rename = "sha3-256")]
    Sha3_256,
    #[serde(rename = "blake2b")]
    Blake2b,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Blake2b,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Sha3_256 => "sha3-256",
            Self::Blake2b => "blake2b",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HdskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == wanted)
            .ok_or_else(|| {
                HdskError::Config(format!(
                    "unknown hash algorithm {s:?} (expected one of: sha256, sha512, sha3-256, blake2b)"
                ))
            })
    }
}

/// Log output format for the CLI subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_algorithm_from_str() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!(" SHA512 ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert_eq!("sha3-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha3_256);
        assert_eq!("blake2b".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake2b);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_hash_algorithm_display_matches_parse() {
        for alg in HashAlgorithm::ALL {
            assert_eq!(alg.to_string().parse::<HashAlgorithm>().unwrap(), alg);
        }
    }

    #[test]
    fn test_default_is_sha256() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha256);
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
