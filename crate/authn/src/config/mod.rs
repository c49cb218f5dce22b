mod clap_config;
mod logging;
mod params;
mod token_auth_config;

pub use clap_config::{ClapConfig, TESSERA_CONF};
pub use logging::LoggingConfig;
pub use params::{KeystoreParams, TokenAuthParams, finalize_directory_path};
pub use token_auth_config::{
    DEFAULT_KEYSTORE_PATH, DEFAULT_MAX_IN_MEMORY_KEYS, DEFAULT_SIGNATURE_ALGORITHM,
    DEFAULT_TOKEN_LIFETIME_SECS, KeystoreType, TokenAuthConfig,
};
