use std::{collections::HashMap, sync::Arc};

use crate::{
    AuthenticationResult, Authenticator, AuthenticatorChain, BearerToken, CredentialSource,
    UsernamePassword,
    authenticator::NOT_AUTHENTICATED,
    error::AuthnError,
    result::AResult,
    tests::test_utils::{memory_config, token_authenticator},
};

/// Password check against a fixed table, standing in for a user store
struct StaticPasswords {
    users: HashMap<String, String>,
}

impl Authenticator for StaticPasswords {
    fn name(&self) -> &str {
        "static-passwords"
    }

    fn supports_credential(&self, credential: &dyn CredentialSource) -> bool {
        credential.principal().is_some() && credential.password().is_some()
    }

    fn authenticate(&self, credential: &dyn CredentialSource) -> AResult<AuthenticationResult> {
        let (Some(user), Some(password)) = (credential.principal(), credential.password()) else {
            return Err(AuthnError::UnsupportedCredential(
                "a user name and a password are required".to_owned(),
            ));
        };
        if self.users.get(user).is_some_and(|expected| expected == password) {
            Ok(AuthenticationResult::success(user))
        } else {
            Ok(AuthenticationResult::failure("invalid user name or password"))
        }
    }
}

/// A credential exposing no capability at all
struct ClientCertificate;

impl CredentialSource for ClientCertificate {}

fn chain() -> AResult<(AuthenticatorChain, Arc<crate::TokenAuthenticator>)> {
    let tokens = Arc::new(token_authenticator(&memory_config("HS256"))?);
    let passwords = StaticPasswords {
        users: HashMap::from([("frodo".to_owned(), "mellon".to_owned())]),
    };
    let chain = AuthenticatorChain::new()
        .with(Arc::new(passwords))
        .with(tokens.clone());
    Ok((chain, tokens))
}

#[test]
fn test_each_credential_reaches_its_authenticator() -> AResult<()> {
    let (chain, tokens) = chain()?;
    assert_eq!(chain.len(), 2);

    assert_eq!(
        chain.authenticate(&UsernamePassword::new("frodo", "mellon"))?,
        AuthenticationResult::success("frodo")
    );
    let token = tokens.generate_token("sam")?;
    assert_eq!(
        chain.authenticate(&BearerToken::new(token.data()))?,
        AuthenticationResult::success("sam")
    );
    Ok(())
}

#[test]
fn test_rejections_are_results() -> AResult<()> {
    let (chain, tokens) = chain()?;

    let result = chain.authenticate(&UsernamePassword::new("frodo", "friend"))?;
    assert!(!result.authenticated);

    let token = tokens.generate_token("sam")?;
    tokens.revoke_signing_keys()?;
    let result = chain.authenticate(&BearerToken::new(token.data()))?;
    assert!(!result.authenticated);
    assert_eq!(result.cause.as_deref(), Some(NOT_AUTHENTICATED));
    Ok(())
}

#[test]
fn test_unsupported_credential() -> AResult<()> {
    let (chain, _) = chain()?;
    let result = chain.authenticate(&ClientCertificate)?;
    assert!(!result.authenticated);
    assert_eq!(
        result.cause.as_deref(),
        Some("no authenticator supports this credential")
    );

    let empty = AuthenticatorChain::new();
    assert!(empty.is_empty());
    assert!(!empty.authenticate(&BearerToken::new("x"))?.authenticated);
    Ok(())
}
