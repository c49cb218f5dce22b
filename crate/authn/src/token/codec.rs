//! JWS compact serialization of bearer tokens.
//!
//! Verification runs in a fixed order and stops at the first failure:
//! structure, key lookup, signature, expiry.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use super::{ParsedToken, TOKEN_TYPE, Token, TokenClaims, TokenHeader, TokenMetadata};
use crate::{
    authn_ensure,
    error::{AuthnError, VerificationFailure},
    keys::{SigningKey, SigningKeyRing},
    result::AResult,
};

/// Sign a token for `principal`, valid from `issued_at` for `lifetime`.
///
/// A zero or negative lifetime is accepted and yields an already expired token.
/// A positive lifetime is rounded up to whole seconds.
pub fn encode(
    key: &SigningKey,
    principal: &str,
    issued_at: DateTime<Utc>,
    lifetime: TimeDelta,
) -> AResult<Token> {
    authn_ensure!(
        !principal.is_empty(),
        AuthnError::InvalidRequest("cannot issue a token for an empty principal".to_owned())
    );
    let iat = issued_at.timestamp();
    let exp = iat.checked_add(lifetime_seconds(lifetime)).ok_or_else(|| {
        AuthnError::ConversionError(format!("token lifetime overflow: {lifetime}"))
    })?;
    let header = TokenHeader {
        alg: key.algorithm(),
        kid: key.id().to_owned(),
        typ: Some(TOKEN_TYPE.to_owned()),
    };
    let claims = TokenClaims {
        sub: principal.to_owned(),
        iat,
        exp,
    };

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
    );
    let signature = key
        .material()
        .sign(key.algorithm(), signing_input.as_bytes())?;
    trace!("signed a token for {principal} with key {}", key.id());

    let metadata = TokenMetadata {
        created: timestamp(iat)?,
        valid_before: timestamp(exp)?,
    };
    Ok(Token::new(
        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)),
        metadata,
    ))
}

/// Split and decode a token without checking its signature or expiry.
pub fn parse(data: &str) -> AResult<ParsedToken> {
    let mut parts = data.split('.');
    let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed("expected three dot separated parts"));
    };

    let header: TokenHeader = decode_json(header_b64, "header")?;
    authn_ensure!(!header.kid.is_empty(), malformed("empty key id"));
    let claims: TokenClaims = decode_json(claims_b64, "payload")?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| malformed(&format!("signature is not base64url: {e}")))?;

    Ok(ParsedToken {
        signing_input: format!("{header_b64}.{claims_b64}"),
        header,
        claims,
        signature,
    })
}

/// Check the signature of `token` against `key`.
pub fn verify_signature(token: &ParsedToken, key: &SigningKey) -> AResult<()> {
    // the declared algorithm must be the one the key was made for
    authn_ensure!(
        token.header.alg == key.algorithm(),
        AuthnError::Verification(VerificationFailure::BadSignature)
    );
    let valid = key
        .material()
        .verify(
            key.algorithm(),
            token.signing_input.as_bytes(),
            &token.signature,
        )
        .unwrap_or(false);
    authn_ensure!(
        valid,
        AuthnError::Verification(VerificationFailure::BadSignature)
    );
    Ok(())
}

/// Fail with `Expired` once `now` has reached the expiry.
pub fn check_expiry(token: &ParsedToken, now: DateTime<Utc>) -> AResult<()> {
    authn_ensure!(
        now.timestamp() < token.claims.exp,
        AuthnError::Verification(VerificationFailure::Expired)
    );
    Ok(())
}

/// Fully verify `data` against the keys retained by `ring` and return the subject.
pub fn verify(ring: &SigningKeyRing, data: &str, now: DateTime<Utc>) -> AResult<String> {
    let token = parse(data)?;
    let key = ring.find_by_id(token.key_id())?.ok_or_else(|| {
        AuthnError::Verification(VerificationFailure::UnknownKey(token.key_id().to_owned()))
    })?;
    verify_signature(&token, &key)?;
    check_expiry(&token, now)?;
    Ok(token.claims.sub)
}

fn decode_json<T: serde::de::DeserializeOwned>(part: &str, name: &str) -> AResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| malformed(&format!("{name} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| malformed(&format!("invalid {name}: {e}")))
}

fn malformed(reason: &str) -> AuthnError {
    AuthnError::Verification(VerificationFailure::Malformed(reason.to_owned()))
}

fn lifetime_seconds(lifetime: TimeDelta) -> i64 {
    let seconds = lifetime.num_seconds();
    if lifetime.subsec_nanos() > 0 {
        seconds + 1
    } else {
        seconds
    }
}

fn timestamp(seconds: i64) -> AResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AuthnError::ConversionError(format!("timestamp out of range: {seconds}")))
}
