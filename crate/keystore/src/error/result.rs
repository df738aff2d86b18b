use crate::error::KeystoreError;

pub type KeystoreResult<R> = Result<R, KeystoreError>;
