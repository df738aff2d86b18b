//! Named key material kept wrapped (RFC 5649 / RFC 3394) under a
//! caller-supplied key-encrypting key.

pub use config::{KeystoreConfig, WrappingAlgorithm, WrappingPolicy};
pub use error::{KeystoreError, result::KeystoreResult};
pub use keystore::Keystore;
pub use shared::SharedKeystore;

mod config;
mod error;
mod keystore;
mod shared;

#[cfg(test)]
mod tests;

pub mod reexport {
    pub use keywrap_crypto;
}
