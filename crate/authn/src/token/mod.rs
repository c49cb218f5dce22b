//! Bearer tokens: the issued value and its JWS compact envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_crypto::SignatureAlgorithm;

pub mod codec;

/// Media type written in the `typ` header
pub const TOKEN_TYPE: &str = "JWT";

/// An issued bearer token. Never updated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    data: String,
    metadata: TokenMetadata,
}

impl Token {
    pub(crate) const fn new(data: String, metadata: TokenMetadata) -> Self {
        Self { data, metadata }
    }

    /// The signed string handed to the client
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    #[must_use]
    pub const fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn into_data(self) -> String {
        self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMetadata {
    pub created: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: SignatureAlgorithm,
    pub kid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// Registered claims carried by the payload. Timestamps are seconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A structurally valid token whose signature and expiry have not been checked.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    header: TokenHeader,
    claims: TokenClaims,
    signing_input: String,
    signature: Vec<u8>,
}

impl ParsedToken {
    #[must_use]
    pub const fn header(&self) -> &TokenHeader {
        &self.header
    }

    #[must_use]
    pub const fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.header.kid
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// Expiry as a timestamp, `None` when out of range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claims.exp, 0)
    }

    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claims.iat, 0)
    }
}
