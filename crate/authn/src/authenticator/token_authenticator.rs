use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};

use chrono::{TimeDelta, Utc};
use tessera_crypto::SignatureAlgorithm;
use tracing::{debug, info};

use super::{AuthenticationResult, Authenticator, CredentialSource};
use crate::{
    config::{KeystoreType, TokenAuthParams},
    error::AuthnError,
    keys::{
        SigningKeyRing,
        keystore::{KeyStore, key_store_from_params},
    },
    result::AResult,
    token::{ParsedToken, Token, codec},
};

/// The only cause reported for a rejected bearer token
pub const NOT_AUTHENTICATED: &str = "invalid bearer token";

/// Issues and verifies bearer tokens signed by a rotating key ring.
///
/// Built by [`TokenAuthenticator::init`]; there is no uninitialised state.
/// Safe to share between threads: every operation takes `&self`.
pub struct TokenAuthenticator {
    signature_algorithm: SignatureAlgorithm,
    ring: SigningKeyRing,
    // milliseconds
    token_lifetime: AtomicI64,
}

impl TokenAuthenticator {
    /// Build the key store described by `params` and seed the key ring.
    ///
    /// # Errors
    ///
    /// `AuthnError::Configuration` when the persisted key is corrupt, or a
    /// key store error when the first key cannot be persisted.
    pub fn init(params: &TokenAuthParams) -> AResult<Self> {
        Self::with_key_store(params, key_store_from_params(&params.keystore))
    }

    /// Same as [`TokenAuthenticator::init`] with an explicit key store.
    pub fn with_key_store(params: &TokenAuthParams, key_store: Arc<dyn KeyStore>) -> AResult<Self> {
        let keystore_type = key_store.keystore_type();
        let ring = SigningKeyRing::seeded(
            params.signature_algorithm,
            params.max_in_memory_keys,
            key_store,
        )?;
        info!(
            "token authenticator ready: {} signatures, {keystore_type} keystore, up to {} keys, \
             tokens valid {}s",
            params.signature_algorithm,
            params.max_in_memory_keys,
            params.token_lifetime.num_seconds()
        );
        Ok(Self {
            signature_algorithm: params.signature_algorithm,
            ring,
            token_lifetime: AtomicI64::new(params.token_lifetime.num_milliseconds()),
        })
    }

    /// Issue a token for `principal`, signed with the current key.
    ///
    /// A key is created first when the ring was revoked.
    pub fn generate_token(&self, principal: &str) -> AResult<Token> {
        let key = self.ring.current()?;
        codec::encode(&key, principal, Utc::now(), self.token_lifetime())
    }

    /// Verify `data` and return its subject.
    ///
    /// # Errors
    ///
    /// `AuthnError::Verification` with the reason of the rejection.
    pub fn verify(&self, data: &str) -> AResult<String> {
        codec::verify(&self.ring, data, Utc::now())
    }

    /// Decode `data` without trusting it: neither the signature nor the
    /// expiry is checked.
    pub fn parse_token(&self, data: &str) -> AResult<ParsedToken> {
        codec::parse(data)
    }

    /// Rotate the signing key, returning the id of the new current key.
    pub fn renew_signing_key(&self) -> AResult<String> {
        Ok(self.ring.rotate()?.id().to_owned())
    }

    /// Forget every signing key. All issued tokens become unverifiable.
    pub fn revoke_signing_keys(&self) -> AResult<()> {
        self.ring.clear()
    }

    #[must_use]
    pub const fn max_in_memory_keys(&self) -> usize {
        self.ring.max_size()
    }

    pub fn current_key_list_size(&self) -> AResult<usize> {
        self.ring.size()
    }

    #[must_use]
    pub const fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }

    #[must_use]
    pub const fn uses_symmetric_algorithm(&self) -> bool {
        self.signature_algorithm.is_symmetric()
    }

    #[must_use]
    pub fn token_lifetime(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.token_lifetime.load(Ordering::Relaxed))
    }

    /// Change the lifetime of the tokens issued from now on.
    pub fn set_token_lifetime(&self, lifetime: TimeDelta) {
        self.token_lifetime
            .store(lifetime.num_milliseconds(), Ordering::Relaxed);
    }

    #[must_use]
    pub fn keystore_type(&self) -> KeystoreType {
        self.ring.key_store().keystore_type()
    }

    /// The key file, for a `plainfile` keystore
    #[must_use]
    pub fn keystore_file_path(&self) -> Option<&Path> {
        self.ring.key_store().file_path()
    }
}

impl Authenticator for TokenAuthenticator {
    fn name(&self) -> &str {
        "token"
    }

    fn supports_credential(&self, credential: &dyn CredentialSource) -> bool {
        credential.bearer_token().is_some()
    }

    fn authenticate(&self, credential: &dyn CredentialSource) -> AResult<AuthenticationResult> {
        let Some(data) = credential.bearer_token() else {
            return Err(AuthnError::UnsupportedCredential(
                "the token authenticator requires a bearer token".to_owned(),
            ));
        };
        match self.verify(data) {
            Ok(principal) => Ok(AuthenticationResult::success(principal)),
            Err(AuthnError::Verification(reason)) => {
                debug!("bearer token rejected: {reason}");
                Ok(AuthenticationResult::failure(NOT_AUTHENTICATED))
            }
            Err(e) => Err(e),
        }
    }
}
