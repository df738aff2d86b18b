use keywrap_crypto::CryptoError;
use thiserror::Error;

pub(crate) mod result;

#[derive(Error, Debug)]
pub enum KeystoreError {
    // A failure originating from the key wrap engines:
    // bad KEK size, integrity check failure, ...
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    // Missing or empty arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // When a user requests a key which does not exist
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    // A thread panicked while holding the shared keystore lock
    #[error("Keystore lock poisoned: {0}")]
    LockPoisoned(String),
}

impl KeystoreError {
    /// Whether unwrapping failed its integrity check:
    /// wrong KEK, corrupted or tampered entry.
    #[must_use]
    pub const fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::IntegrityCheckFailed(_)))
    }
}

/// Return early with an error if a condition is not satisfied.
#[macro_export]
macro_rules! keystore_ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
}
