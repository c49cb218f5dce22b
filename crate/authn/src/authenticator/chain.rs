use std::sync::Arc;

use tracing::{debug, trace};

use super::{AuthenticationResult, Authenticator, CredentialSource};
use crate::result::AResult;

/// Authenticators tried in registration order.
#[derive(Default)]
pub struct AuthenticatorChain {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl AuthenticatorChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.push(authenticator);
        self
    }

    pub fn push(&mut self, authenticator: Arc<dyn Authenticator>) {
        self.authenticators.push(authenticator);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.authenticators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authenticators.is_empty()
    }

    /// Try every authenticator supporting `credential` until one accepts it.
    ///
    /// Returns the last rejection when none does.
    pub fn authenticate(&self, credential: &dyn CredentialSource) -> AResult<AuthenticationResult> {
        let mut last_rejection = None;
        for authenticator in &self.authenticators {
            if !authenticator.supports_credential(credential) {
                trace!("{} does not support this credential", authenticator.name());
                continue;
            }
            let result = authenticator.authenticate(credential)?;
            if result.authenticated {
                debug!(
                    "{} authenticated {}",
                    authenticator.name(),
                    result.principal.as_deref().unwrap_or_default()
                );
                return Ok(result);
            }
            debug!("{} rejected the credential", authenticator.name());
            last_rejection = Some(result);
        }
        Ok(last_rejection.unwrap_or_else(|| {
            AuthenticationResult::failure("no authenticator supports this credential")
        }))
    }
}
