//! Signing key lifecycle and bearer token authentication.
//!
//! A [`TokenAuthenticator`] issues JWS compact tokens signed by the newest key
//! of a bounded [`SigningKeyRing`], verifies them against every retained key,
//! and plugs into an [`AuthenticatorChain`] next to other authenticators.

pub mod authenticator;
pub mod config;
pub mod error;
pub mod keys;
pub mod result;
pub mod token;

#[cfg(test)]
mod tests;

pub use authenticator::{
    AuthenticationResult, Authenticator, AuthenticatorChain, BearerToken, CredentialSource,
    TokenAuthenticator, UsernamePassword,
};
pub use error::{AuthnError, VerificationFailure};
pub use keys::{SigningKey, SigningKeyRing};
pub use result::{AResult, AResultHelper};
pub use tessera_crypto::SignatureAlgorithm;
pub use token::{ParsedToken, Token, TokenClaims, TokenHeader, TokenMetadata};
