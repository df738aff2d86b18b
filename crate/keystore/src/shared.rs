use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use zeroize::Zeroizing;

use crate::{
    Keystore,
    error::{KeystoreError, result::KeystoreResult},
};

/// A cloneable handle on one [`Keystore`], guarded by a single
/// reader-writer lock: `get` calls run concurrently, `set` and `delete`
/// are exclusive.
#[derive(Clone, Default, Debug)]
pub struct SharedKeystore {
    inner: Arc<RwLock<Keystore>>,
}

impl SharedKeystore {
    #[must_use]
    pub fn new(keystore: Keystore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(keystore)),
        }
    }

    fn read(&self) -> KeystoreResult<RwLockReadGuard<'_, Keystore>> {
        self.inner
            .read()
            .map_err(|e| KeystoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> KeystoreResult<RwLockWriteGuard<'_, Keystore>> {
        self.inner
            .write()
            .map_err(|e| KeystoreError::LockPoisoned(e.to_string()))
    }

    pub fn set(&self, name: &str, key_material: &[u8], kek: &[u8]) -> KeystoreResult<()> {
        self.write()?.set(name, key_material, kek)
    }

    pub fn get(&self, name: &str, kek: &[u8]) -> KeystoreResult<Zeroizing<Vec<u8>>> {
        self.read()?.get(name, kek)
    }

    pub fn delete(&self, name: &str) -> KeystoreResult<()> {
        self.write()?.delete(name)
    }

    pub fn contains(&self, name: &str) -> KeystoreResult<bool> {
        Ok(self.read()?.contains(name))
    }

    pub fn len(&self) -> KeystoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Run `op` with exclusive access to the underlying store.
    pub fn with_keystore_mut<R>(&self, op: impl FnOnce(&mut Keystore) -> R) -> KeystoreResult<R> {
        Ok(op(&mut *self.write()?))
    }
}
