use std::{collections::HashMap, fmt};

use keywrap_crypto::{
    check_kek_size, rfc3394_unwrap, rfc3394_wrap, rfc5649_unwrap, rfc5649_wrap,
};
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use crate::{
    config::{KeystoreConfig, WrappingAlgorithm},
    error::{KeystoreError, result::KeystoreResult},
    keystore_ensure,
};

/// A wrapped key, as kept in the store
#[derive(Clone)]
struct StoredKey {
    algorithm: WrappingAlgorithm,
    wrapped: Vec<u8>,
}

/// In-memory store of key material, indexed by name and wrapped under a
/// caller-supplied key-encrypting key (KEK).
///
/// The KEK is never stored: every `set` and `get` takes it as an argument.
/// The store has no internal locking; mutation requires `&mut self`.
/// Use [`crate::SharedKeystore`] to share one store between threads.
#[derive(Clone, Default)]
pub struct Keystore {
    entries: HashMap<String, StoredKey>,
    config: KeystoreConfig,
}

impl Keystore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: KeystoreConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &KeystoreConfig {
        &self.config
    }

    /// Wrap `key_material` under `kek` and store it under `name`,
    /// replacing any previous entry with the same name.
    pub fn set(&mut self, name: &str, key_material: &[u8], kek: &[u8]) -> KeystoreResult<()> {
        keystore_ensure!(
            !name.is_empty(),
            KeystoreError::InvalidInput("the key name cannot be empty".to_owned())
        );
        keystore_ensure!(
            !key_material.is_empty(),
            KeystoreError::InvalidInput(format!("the key material of {name} cannot be empty"))
        );
        check_kek_size(kek)?;

        let algorithm = self
            .config
            .wrapping_policy
            .algorithm_for(key_material.len());
        let wrapped = match algorithm {
            WrappingAlgorithm::Rfc3394 => rfc3394_wrap(key_material, kek, None)?,
            WrappingAlgorithm::Rfc5649 => rfc5649_wrap(key_material, kek)?,
        };
        debug!(
            "storing key {name}: {} bytes wrapped with {algorithm} into {} bytes",
            key_material.len(),
            wrapped.len()
        );

        let previous = self
            .entries
            .insert(name.to_owned(), StoredKey { algorithm, wrapped });
        if previous.is_some() {
            trace!("key {name} replaced");
        }
        Ok(())
    }

    /// Unwrap the key stored under `name` with `kek`.
    ///
    /// A wrong KEK, or an entry which was corrupted or tampered with,
    /// fails the integrity check: nothing is returned but the error.
    pub fn get(&self, name: &str, kek: &[u8]) -> KeystoreResult<Zeroizing<Vec<u8>>> {
        keystore_ensure!(
            !name.is_empty(),
            KeystoreError::InvalidInput("the key name cannot be empty".to_owned())
        );
        check_kek_size(kek)?;

        let stored = self
            .entries
            .get(name)
            .ok_or_else(|| KeystoreError::KeyNotFound(name.to_owned()))?;

        let unwrapped = match stored.algorithm {
            WrappingAlgorithm::Rfc3394 => rfc3394_unwrap(&stored.wrapped, kek, None),
            WrappingAlgorithm::Rfc5649 => rfc5649_unwrap(&stored.wrapped, kek),
        }
        .map_err(|e| {
            warn!("failed unwrapping key {name}: {e}");
            KeystoreError::from(e)
        })?;
        trace!("key {name} unwrapped with {}", stored.algorithm);
        Ok(unwrapped)
    }

    /// Remove the key stored under `name`.
    pub fn delete(&mut self, name: &str) -> KeystoreResult<()> {
        self.entries
            .remove(name)
            .ok_or_else(|| KeystoreError::KeyNotFound(name.to_owned()))?;
        debug!("key {name} deleted");
        Ok(())
    }

    /// Store bytes wrapped elsewhere, by any RFC 3394 / RFC 5649
    /// implementation. They are only checked when unwrapped by `get`.
    pub fn import_wrapped(
        &mut self,
        name: &str,
        algorithm: WrappingAlgorithm,
        wrapped: Vec<u8>,
    ) -> KeystoreResult<()> {
        keystore_ensure!(
            !name.is_empty(),
            KeystoreError::InvalidInput("the key name cannot be empty".to_owned())
        );
        keystore_ensure!(
            !wrapped.is_empty(),
            KeystoreError::InvalidInput(format!("the wrapped key {name} cannot be empty"))
        );
        debug!("importing key {name}: {} bytes wrapped with {algorithm}", wrapped.len());
        self.entries
            .insert(name.to_owned(), StoredKey { algorithm, wrapped });
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the stored keys, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The stored (wrapped) bytes of a key
    #[must_use]
    pub fn wrapped_key(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(|stored| stored.wrapped.as_slice())
    }

    #[must_use]
    pub fn algorithm(&self, name: &str) -> Option<WrappingAlgorithm> {
        self.entries.get(name).map(|stored| stored.algorithm)
    }
}

impl fmt::Debug for Keystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Keystore")
            .field("keys", &names)
            .field("config", &self.config)
            .finish()
    }
}
