use std::fmt;

use zeroize::Zeroizing;

use crate::{authn_ensure, error::AuthnError, result::AResult};

/// What a caller presents to the authenticators.
///
/// Authenticators pick credentials by the capabilities exposed here, never by
/// concrete type.
pub trait CredentialSource: Send + Sync {
    fn principal(&self) -> Option<&str> {
        None
    }

    fn password(&self) -> Option<&str> {
        None
    }

    fn bearer_token(&self) -> Option<&str> {
        None
    }
}

pub struct UsernamePassword {
    username: String,
    password: Zeroizing<String>,
}

impl UsernamePassword {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl CredentialSource for UsernamePassword {
    fn principal(&self) -> Option<&str> {
        Some(&self.username)
    }

    fn password(&self) -> Option<&str> {
        Some(&self.password)
    }
}

impl fmt::Debug for UsernamePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePassword")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Extract the token from an `Authorization` header value.
    ///
    /// The scheme is matched case-insensitively: `Bearer <token>`.
    pub fn from_authorization_header(value: &str) -> AResult<Self> {
        let mut parts = value.trim().splitn(2, ' ');
        let scheme = parts.next().unwrap_or_default();
        let token = parts.next().unwrap_or_default().trim();
        authn_ensure!(
            scheme.eq_ignore_ascii_case("Bearer"),
            AuthnError::InvalidRequest("Bad authorization header content (bad bearer)".to_owned())
        );
        authn_ensure!(
            !token.is_empty(),
            AuthnError::InvalidRequest("Bad authorization header content (empty token)".to_owned())
        );
        Ok(Self::new(token))
    }
}

impl CredentialSource for BearerToken {
    fn bearer_token(&self) -> Option<&str> {
        Some(&self.token)
    }
}
