use crate::error::AuthnError;

pub type AResult<R> = Result<R, AuthnError>;

/// Adds a lazily built context to a foreign error.
pub trait AResultHelper<T> {
    /// # Errors
    ///
    /// A `ServerError` prefixed with the context returned by `op`.
    fn with_context<O>(self, op: O) -> AResult<T>
    where
        O: FnOnce() -> String;
}

impl<T, E> AResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn with_context<O>(self, op: O) -> AResult<T>
    where
        O: FnOnce() -> String,
    {
        self.map_err(|e| AuthnError::ServerError(format!("{}: {e}", op())))
    }
}
