use crate::error::CryptoError;

pub type CryptoResult<R> = Result<R, CryptoError>;
