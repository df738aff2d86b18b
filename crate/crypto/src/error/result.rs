use crate::error::CryptoError;

pub(crate) type CryptoResult<R> = Result<R, CryptoError>;

/// Attach a message to a missing value or a foreign error,
/// turning it into a [`CryptoError::Default`].
pub trait CryptoResultHelper<T> {
    fn context(self, context: &str) -> CryptoResult<T>;
}

impl<T, E> CryptoResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn context(self, context: &str) -> CryptoResult<T> {
        self.map_err(|e| CryptoError::Default(format!("{context}: {e}")))
    }
}

impl<T> CryptoResultHelper<T> for Option<T> {
    fn context(self, context: &str) -> CryptoResult<T> {
        self.ok_or_else(|| CryptoError::Default(context.to_owned()))
    }
}
