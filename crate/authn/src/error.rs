use tessera_crypto::CryptoError;
use thiserror::Error;

/// Why a bearer token was rejected.
///
/// The reasons stay inside the engine (logs, tests); at the authenticator
/// boundary they all collapse into a single negative result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("malformed token: {0}")]
    Malformed(String),

    // the key was rotated out of the ring or revoked
    #[error("unknown signing key: {0}")]
    UnknownKey(String),

    #[error("bad signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

#[derive(Error, Debug, Clone)]
pub enum AuthnError {
    // Fatal at init: unknown algorithm, invalid ring size, corrupt key file
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token verification failed: {0}")]
    Verification(#[from] VerificationFailure),

    // A credential of a shape the authenticator cannot handle was passed to it
    #[error("Unsupported credential: {0}")]
    UnsupportedCredential(String),

    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    // Reading or writing the persisted signing key failed
    #[error("Key store error: {0}")]
    KeyStore(String),

    #[error("Cryptographic error: {0}")]
    CryptographicError(String),

    #[error("Conversion Error: {0}")]
    ConversionError(String),

    #[error("Unexpected server error: {0}")]
    ServerError(String),
}

impl AuthnError {
    /// The verification failure carried by this error, if any.
    #[must_use]
    pub const fn verification_failure(&self) -> Option<&VerificationFailure> {
        match self {
            Self::Verification(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<CryptoError> for AuthnError {
    fn from(e: CryptoError) -> Self {
        Self::CryptographicError(e.to_string())
    }
}

impl From<std::io::Error> for AuthnError {
    fn from(e: std::io::Error) -> Self {
        Self::KeyStore(e.to_string())
    }
}

impl From<serde_json::Error> for AuthnError {
    fn from(e: serde_json::Error) -> Self {
        Self::ConversionError(e.to_string())
    }
}

impl From<base64::DecodeError> for AuthnError {
    fn from(e: base64::DecodeError) -> Self {
        Self::ConversionError(e.to_string())
    }
}

impl From<toml::de::Error> for AuthnError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConversionError(e.to_string())
    }
}

impl From<toml::ser::Error> for AuthnError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ConversionError(e.to_string())
    }
}

/// Return early with an error if a condition is not satisfied.
///
/// This macro is equivalent to `if !$cond { return Err(From::from($err)); }`.
#[macro_export]
macro_rules! authn_ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::authn_error!($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return ::core::result::Result::Err($crate::authn_error!($fmt, $($arg)*));
        }
    };
}

/// Construct a server error from a string.
#[macro_export]
macro_rules! authn_error {
    ($msg:literal) => {
        $crate::error::AuthnError::ServerError(::core::format_args!($msg).to_string())
    };
    ($err:expr $(,)?) => ({
        $crate::error::AuthnError::ServerError($err.to_string())
    });
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::AuthnError::ServerError(::core::format_args!($fmt, $($arg)*).to_string())
    };
}

/// Return early with an error.
#[macro_export]
macro_rules! authn_bail {
    ($msg:literal) => {
        return ::core::result::Result::Err($crate::authn_error!($msg))
    };
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err($err)
    };
    ($fmt:expr, $($arg:tt)*) => {
        return ::core::result::Result::Err($crate::authn_error!($fmt, $($arg)*))
    };
}
