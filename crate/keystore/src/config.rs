use std::fmt::{self, Display};

use keywrap_crypto::SEMIBLOCK_SIZE;
use serde::{Deserialize, Serialize};

/// The key wrap algorithm that produced a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrappingAlgorithm {
    /// AES Key Wrap (RFC 3394) with the default IV
    Rfc3394,
    /// AES Key Wrap with Padding (RFC 5649)
    Rfc5649,
}

impl Display for WrappingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfc3394 => write!(f, "RFC 3394 (KW)"),
            Self::Rfc5649 => write!(f, "RFC 5649 (KWP)"),
        }
    }
}

/// How `Keystore::set` picks the wrapping algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrappingPolicy {
    /// Always RFC 5649, which accepts any key length.
    #[default]
    AlwaysPadded,
    /// RFC 3394 for keys that are a multiple of 8 bytes and at least
    /// 16 bytes long, RFC 5649 otherwise.
    LengthBased,
}

impl WrappingPolicy {
    #[must_use]
    pub const fn algorithm_for(self, key_length: usize) -> WrappingAlgorithm {
        match self {
            Self::AlwaysPadded => WrappingAlgorithm::Rfc5649,
            Self::LengthBased => {
                if key_length % SEMIBLOCK_SIZE == 0 && key_length >= 2 * SEMIBLOCK_SIZE {
                    WrappingAlgorithm::Rfc3394
                } else {
                    WrappingAlgorithm::Rfc5649
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystoreConfig {
    pub wrapping_policy: WrappingPolicy,
}
