use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::Display;

pub const DEFAULT_SIGNATURE_ALGORITHM: &str = "HS384";
pub const DEFAULT_KEYSTORE_PATH: &str = "./tessera-keys";
pub const DEFAULT_MAX_IN_MEMORY_KEYS: usize = 5;
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Where the active signing key lives between restarts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeystoreType {
    /// Keys only live as long as the process
    #[default]
    #[value(name = "memory")]
    Memory,
    /// The active key is written to `jwt-key.toml` under the keystore path
    #[value(name = "plainfile")]
    Plainfile,
}

/// Bearer token issuance and signing key settings.
///
/// These values are read once, when the authenticator is initialised.
#[derive(Debug, Args, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TokenAuthConfig {
    /// The JWS algorithm used to sign tokens:
    /// HS256, HS384, HS512, ES256, ES384, ES512, RS256, RS384, RS512, PS256, PS384 or PS512
    #[clap(long, env = "TESSERA_JWT_SIGNATURE_ALGORITHM", default_value = DEFAULT_SIGNATURE_ALGORITHM, verbatim_doc_comment)]
    pub signature_algorithm: String,

    /// Where to keep the active signing key: `memory` or `plainfile`
    #[clap(long, env = "TESSERA_KEYSTORE_TYPE", value_enum, default_value = "memory")]
    pub keystore_type: KeystoreType,

    /// The folder holding the `plainfile` keystore.
    /// A relative path is taken relative to the current directory
    #[clap(long, env = "TESSERA_KEYSTORE_PATH", default_value = DEFAULT_KEYSTORE_PATH, verbatim_doc_comment)]
    pub keystore_path: PathBuf,

    /// How many signing keys are kept for verification after rotations
    #[clap(long, env = "TESSERA_MAX_IN_MEMORY_KEYS", default_value_t = DEFAULT_MAX_IN_MEMORY_KEYS)]
    pub max_in_memory_keys: usize,

    /// Lifetime of issued tokens, in seconds.
    /// Zero or negative values issue tokens that are already expired
    #[clap(
        long,
        env = "TESSERA_TOKEN_LIFETIME",
        default_value_t = DEFAULT_TOKEN_LIFETIME_SECS,
        allow_negative_numbers = true,
        verbatim_doc_comment
    )]
    pub token_lifetime: i64,
}

impl Default for TokenAuthConfig {
    fn default() -> Self {
        Self {
            signature_algorithm: DEFAULT_SIGNATURE_ALGORITHM.to_owned(),
            keystore_type: KeystoreType::default(),
            keystore_path: PathBuf::from(DEFAULT_KEYSTORE_PATH),
            max_in_memory_keys: DEFAULT_MAX_IN_MEMORY_KEYS,
            token_lifetime: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}
