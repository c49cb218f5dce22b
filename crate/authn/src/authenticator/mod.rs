//! Pluggable authenticators and the chain that drives them.

mod chain;
mod credentials;
mod token_authenticator;

pub use chain::AuthenticatorChain;
pub use credentials::{BearerToken, CredentialSource, UsernamePassword};
pub use token_authenticator::{NOT_AUTHENTICATED, TokenAuthenticator};

use crate::result::AResult;

/// Outcome of an authentication attempt. A rejected credential is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub authenticated: bool,
    pub principal: Option<String>,
    pub cause: Option<String>,
}

impl AuthenticationResult {
    #[must_use]
    pub fn success(principal: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            principal: Some(principal.into()),
            cause: None,
        }
    }

    #[must_use]
    pub fn failure(cause: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            principal: None,
            cause: Some(cause.into()),
        }
    }
}

pub trait Authenticator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether this authenticator understands the shape of `credential`.
    fn supports_credential(&self, credential: &dyn CredentialSource) -> bool;

    /// Authenticate `credential`.
    ///
    /// # Errors
    ///
    /// Only for contract violations, such as a credential this authenticator
    /// does not support. Rejections are negative `AuthenticationResult`s.
    fn authenticate(&self, credential: &dyn CredentialSource) -> AResult<AuthenticationResult>;
}
