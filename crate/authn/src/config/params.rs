use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::TimeDelta;
use tessera_crypto::SignatureAlgorithm;

use super::{KeystoreType, TokenAuthConfig};
use crate::{authn_bail, error::AuthnError, result::AResult};

/// Validated keystore settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeystoreParams {
    Memory,
    /// Canonical path of the folder holding the key file
    Plainfile { directory: PathBuf },
}

/// The validated configuration a `TokenAuthenticator` is initialised from.
pub struct TokenAuthParams {
    pub signature_algorithm: SignatureAlgorithm,
    pub keystore: KeystoreParams,
    pub max_in_memory_keys: usize,
    pub token_lifetime: TimeDelta,
}

impl TokenAuthParams {
    /// Validate a `TokenAuthConfig`.
    ///
    /// # Errors
    ///
    /// Returns `AuthnError::Configuration` when the algorithm is not supported,
    /// the ring size is zero, the lifetime is out of range or the keystore
    /// folder cannot be created.
    pub fn try_from(conf: &TokenAuthConfig) -> AResult<Self> {
        let signature_algorithm = SignatureAlgorithm::from_str(&conf.signature_algorithm)
            .map_err(|_| {
                AuthnError::Configuration(format!(
                    "unsupported signature algorithm: {}",
                    conf.signature_algorithm
                ))
            })?;

        if conf.max_in_memory_keys == 0 {
            authn_bail!(AuthnError::Configuration(
                "the maximum number of in-memory keys must be at least 1".to_owned()
            ))
        }

        let token_lifetime = TimeDelta::try_seconds(conf.token_lifetime).ok_or_else(|| {
            AuthnError::Configuration(format!(
                "token lifetime out of range: {} seconds",
                conf.token_lifetime
            ))
        })?;

        let keystore = match conf.keystore_type {
            KeystoreType::Memory => KeystoreParams::Memory,
            KeystoreType::Plainfile => {
                let relative_root = std::env::current_dir().map_err(|e| {
                    AuthnError::Configuration(format!("cannot read the current directory: {e}"))
                })?;
                KeystoreParams::Plainfile {
                    directory: finalize_directory_path(&conf.keystore_path, &relative_root)?,
                }
            }
        };

        Ok(Self {
            signature_algorithm,
            keystore,
            max_in_memory_keys: conf.max_in_memory_keys,
            token_lifetime,
        })
    }
}

impl fmt::Debug for TokenAuthParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthParams")
            .field("signature_algorithm", &self.signature_algorithm.to_string())
            .field("keystore", &self.keystore)
            .field("max_in_memory_keys", &self.max_in_memory_keys)
            .field("token_lifetime_secs", &self.token_lifetime.num_seconds())
            .finish()
    }
}

/// Transform a path relative to `relative_root` to an absolute path and ensure that the directory exists.
/// An absolute path is left unchanged.
///
/// # Errors
///
/// Returns an error if the directory can't be created or if an error occurs while calling `std::fs::canonicalize`
pub fn finalize_directory_path(path: &Path, relative_root: &Path) -> AResult<PathBuf> {
    let path = if path.is_relative() {
        relative_root.join(path)
    } else {
        path.to_path_buf()
    };
    if !path.exists() {
        fs::create_dir_all(&path).map_err(|e| {
            AuthnError::Configuration(format!(
                "cannot create the keystore folder {}: {e}",
                path.display()
            ))
        })?;
    }
    fs::canonicalize(&path).map_err(|e| {
        AuthnError::Configuration(format!("cannot resolve {}: {e}", path.display()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::tempdir;
    use tessera_crypto::SignatureAlgorithm;

    use super::{KeystoreParams, TokenAuthParams, finalize_directory_path};
    use crate::{
        config::{KeystoreType, TokenAuthConfig},
        error::AuthnError,
        result::AResult,
    };

    #[test]
    fn test_defaults() -> AResult<()> {
        let params = TokenAuthParams::try_from(&TokenAuthConfig::default())?;
        assert_eq!(params.signature_algorithm, SignatureAlgorithm::HS384);
        assert_eq!(params.keystore, KeystoreParams::Memory);
        assert_eq!(params.max_in_memory_keys, 5);
        assert_eq!(params.token_lifetime.num_seconds(), 3600);
        Ok(())
    }

    #[test]
    fn test_unknown_algorithm_is_a_configuration_error() {
        for name in ["XS256", "none", "", "EdDSA", "rs256"] {
            let conf = TokenAuthConfig {
                signature_algorithm: name.to_owned(),
                ..TokenAuthConfig::default()
            };
            let err = TokenAuthParams::try_from(&conf).unwrap_err();
            assert!(matches!(err, AuthnError::Configuration(_)), "{name}: {err}");
        }
    }

    #[test]
    fn test_zero_ring_size_is_rejected() {
        let conf = TokenAuthConfig {
            max_in_memory_keys: 0,
            ..TokenAuthConfig::default()
        };
        assert!(matches!(
            TokenAuthParams::try_from(&conf),
            Err(AuthnError::Configuration(_))
        ));
    }

    #[test]
    fn test_negative_lifetime_is_accepted() -> AResult<()> {
        let conf = TokenAuthConfig {
            token_lifetime: -30,
            ..TokenAuthConfig::default()
        };
        assert_eq!(TokenAuthParams::try_from(&conf)?.token_lifetime.num_seconds(), -30);
        Ok(())
    }

    #[test]
    fn test_plainfile_folder_is_created() -> AResult<()> {
        let dir = tempdir()?;
        let keystore_path = dir.path().join("nested").join("keys");
        let conf = TokenAuthConfig {
            keystore_type: KeystoreType::Plainfile,
            keystore_path: keystore_path.clone(),
            ..TokenAuthConfig::default()
        };
        let params = TokenAuthParams::try_from(&conf)?;
        let KeystoreParams::Plainfile { directory } = params.keystore else {
            panic!("expected a plainfile keystore");
        };
        assert!(directory.is_dir());
        assert_eq!(directory, keystore_path.canonicalize()?);
        Ok(())
    }

    #[test]
    fn test_relative_path_is_joined_to_root() -> AResult<()> {
        let dir = tempdir()?;
        let path = finalize_directory_path(std::path::Path::new("relative"), dir.path())?;
        assert_eq!(path, dir.path().join("relative").canonicalize()?);
        Ok(())
    }
}
