//! Commitment Hashing
//!
//! Hash primitives shared by leaf commitments and Merkle nodes.
//!
//! Every value fed to a hash is a 32-byte big-endian word, the same layout an
//! EVM `abi.encode` or a field-element verifier reads. Integers are widened to
//! a word with [`encode_word`]; child hashes are already words.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use thiserror::Error;

/// Hash output type (256 bits / 32 bytes)
pub type NodeHash = [u8; 32];

/// The all-zero word. Used as the sibling of a lone node under
/// [`OddNodePolicy::PairWithZero`](crate::proof::merkle::OddNodePolicy).
pub const ZERO_HASH: NodeHash = [0u8; 32];

/// Hash function used for leaves and internal nodes.
///
/// Must be the same function the external verifier runs; known-answer
/// vectors for each variant are pinned in the tests below.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 (default).
    #[default]
    Sha256,
    /// Keccak-256, as exposed by the EVM `keccak256` opcode.
    Keccak256,
}

impl HashAlgorithm {
    /// Hash a sequence of 32-byte words, in order.
    pub fn hash_words(self, words: &[NodeHash]) -> NodeHash {
        match self {
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                for word in words {
                    hasher.update(word);
                }
                hasher.finalize().into()
            }
            Self::Keccak256 => {
                let mut hasher = Keccak256::new();
                for word in words {
                    hasher.update(word);
                }
                hasher.finalize().into()
            }
        }
    }

    /// Hash two child nodes exactly in the order given.
    #[inline]
    pub fn hash_pair(self, left: &NodeHash, right: &NodeHash) -> NodeHash {
        self.hash_words(&[*left, *right])
    }

    /// Stable lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Keccak256 => "keccak256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised hash algorithm name.
#[derive(Debug, Clone, Error)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownHashAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownHashAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "keccak256" | "keccak-256" | "keccak" => Ok(Self::Keccak256),
            other => Err(UnknownHashAlgorithm(other.to_string())),
        }
    }
}

/// Widen an integer to a 32-byte big-endian word.
#[inline]
pub fn encode_word(value: u64) -> NodeHash {
    let mut word = ZERO_HASH;
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Format a hash as `0x`-prefixed lowercase hex.
pub fn to_hex(hash: &NodeHash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Errors from parsing a hex-encoded hash.
#[derive(Debug, Clone, Error)]
pub enum HashParseError {
    /// Not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// Decoded to the wrong number of bytes.
    #[error("expected 32 bytes, got {0}")]
    WrongLength(usize),
}

/// Parse a hash from hex, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<NodeHash, HashParseError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| HashParseError::WrongLength(len))
}

/// Serde adapter for a list of hashes as `0x` hex strings.
pub mod hex_hashes {
    use super::{parse_hex, to_hex, NodeHash};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as a sequence of `0x` hex strings.
    pub fn serialize<S: Serializer>(hashes: &[NodeHash], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(hashes.len()))?;
        for hash in hashes {
            seq.serialize_element(&to_hex(hash))?;
        }
        seq.end()
    }

    /// Deserialize from a sequence of hex strings.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NodeHash>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| parse_hex(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> NodeHash {
        parse_hex(s).unwrap()
    }

    #[test]
    fn test_sha256_known_answer() {
        // sha256 of 64 zero bytes
        assert_eq!(
            HashAlgorithm::Sha256.hash_pair(&ZERO_HASH, &ZERO_HASH),
            h("f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"),
        );
    }

    #[test]
    fn test_keccak256_known_answer() {
        assert_eq!(
            HashAlgorithm::Keccak256.hash_words(&[]),
            h("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"),
        );
        assert_eq!(
            HashAlgorithm::Keccak256.hash_pair(&ZERO_HASH, &ZERO_HASH),
            h("ad3228b676f7d3cd4284a5443f17f1962b36e491b30a40b2405849e597ba5fb5"),
        );
    }

    #[test]
    fn test_pair_order_matters() {
        let a = encode_word(1);
        let b = encode_word(2);
        for algo in [HashAlgorithm::Sha256, HashAlgorithm::Keccak256] {
            assert_ne!(algo.hash_pair(&a, &b), algo.hash_pair(&b, &a));
        }
    }

    #[test]
    fn test_encode_word_is_big_endian() {
        let word = encode_word(0x0102);
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        // Byte order must agree with numeric order for sorted pairing
        assert!(encode_word(255) < encode_word(256));
    }

    #[test]
    fn test_hex_parse() {
        let word = encode_word(25);
        assert_eq!(parse_hex(&to_hex(&word)).unwrap(), word);
        assert_eq!(parse_hex(&hex::encode(word)).unwrap(), word);
        assert!(matches!(parse_hex("0xabcd"), Err(HashParseError::WrongLength(2))));
        assert!(matches!(parse_hex("0xzz"), Err(HashParseError::InvalidHex(_))));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("Keccak256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Keccak256);
        assert!("poseidon".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha256);
    }
}
