use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_crypto::{AlgorithmFamily, KeyMaterial, SignatureAlgorithm};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::KeyStore;
use crate::{config::KeystoreType, error::AuthnError, keys::SigningKey, result::AResult};

/// Name of the key file inside the keystore folder
pub const KEY_FILE_NAME: &str = "jwt-key.toml";

const RAW_FORMAT: &str = "RAW";
const PKCS8_FORMAT: &str = "PKCS#8";

/// Flat key/value document holding the active key.
///
/// Symmetric keys use `key`; key pairs use `private_key` (PKCS#8 DER) and
/// `public_key` (SPKI DER). All material is standard base64.
#[derive(Serialize, Deserialize)]
struct PersistedKey {
    algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_key: Option<String>,
}

impl PersistedKey {
    fn from_signing_key(key: &SigningKey) -> AResult<Self> {
        let material = key.material();
        let mut persisted = Self {
            algorithm: key.algorithm().to_string(),
            format: None,
            key_id: Some(key.id().to_owned()),
            created_at: Some(key.created_at()),
            key: None,
            private_key: None,
            public_key: None,
        };
        match material.family() {
            AlgorithmFamily::Symmetric => {
                persisted.format = Some(RAW_FORMAT.to_owned());
                persisted.key = material.secret().map(|secret| STANDARD.encode(secret));
            }
            AlgorithmFamily::Asymmetric => {
                persisted.format = Some(PKCS8_FORMAT.to_owned());
                persisted.private_key = material
                    .private_key_pkcs8()?
                    .map(|der| STANDARD.encode(der.as_slice()));
                persisted.public_key = material.public_key_spki()?.map(|der| STANDARD.encode(der));
            }
        }
        Ok(persisted)
    }

    fn material(&self, algorithm: SignatureAlgorithm) -> AResult<KeyMaterial> {
        let decode = |name: &str, value: Option<&String>| -> AResult<Zeroizing<Vec<u8>>> {
            let value = value.ok_or_else(|| corrupt(format!("missing `{name}` entry")))?;
            STANDARD
                .decode(value)
                .map(Zeroizing::new)
                .map_err(|e| corrupt(format!("`{name}` is not valid base64: {e}")))
        };
        match algorithm.family() {
            AlgorithmFamily::Symmetric => {
                let secret = decode("key", self.key.as_ref())?;
                Ok(KeyMaterial::from_secret(secret.to_vec()))
            }
            AlgorithmFamily::Asymmetric => {
                let private_key = decode("private_key", self.private_key.as_ref())?;
                let public_key = decode("public_key", self.public_key.as_ref())?;
                KeyMaterial::from_der_pair(&private_key, &public_key)
                    .map_err(|e| corrupt(e.to_string()))
            }
        }
    }
}

fn corrupt(reason: String) -> AuthnError {
    AuthnError::Configuration(format!("corrupt signing key file: {reason}"))
}

/// Persists the single active signing key to `<directory>/jwt-key.toml`.
#[derive(Debug, Clone)]
pub struct PlainFileKeyStore {
    file_path: PathBuf,
}

impl PlainFileKeyStore {
    #[must_use]
    pub fn new(directory: &Path) -> Self {
        Self {
            file_path: directory.join(KEY_FILE_NAME),
        }
    }

    fn temporary_path(&self) -> PathBuf {
        self.file_path.with_extension("toml.tmp")
    }
}

impl KeyStore for PlainFileKeyStore {
    fn keystore_type(&self) -> KeystoreType {
        KeystoreType::Plainfile
    }

    fn load(&self, algorithm: SignatureAlgorithm) -> AResult<Option<SigningKey>> {
        if !self.file_path.exists() {
            debug!("no signing key file at {}", self.file_path.display());
            return Ok(None);
        }
        let content = Zeroizing::new(fs::read_to_string(&self.file_path).map_err(|e| {
            AuthnError::Configuration(format!(
                "cannot read the signing key file {}: {e}",
                self.file_path.display()
            ))
        })?);
        let persisted: PersistedKey =
            toml::from_str(&content).map_err(|e| corrupt(e.to_string()))?;

        let persisted_algorithm = SignatureAlgorithm::from_str(&persisted.algorithm)
            .map_err(|_| corrupt(format!("unknown algorithm {}", persisted.algorithm)))?;
        if persisted_algorithm != algorithm {
            warn!(
                "the signing key in {} uses {persisted_algorithm} but {algorithm} is configured; \
                 a new key will replace it",
                self.file_path.display()
            );
            return Ok(None);
        }

        let material = persisted.material(algorithm)?;
        let assigned_id = persisted.key_id.is_none();
        let key_id = persisted.key_id.clone().unwrap_or_else(|| {
            let key_id = Uuid::now_v7().to_string();
            warn!("the signing key file has no key id, assigning {key_id}");
            key_id
        });
        let created_at = persisted.created_at.unwrap_or_else(Utc::now);
        let key = SigningKey::from_parts(key_id, algorithm, created_at, material)
            .map_err(|e| corrupt(e.to_string()))?;
        if assigned_id {
            // keep the id stable across restarts
            self.activate(&key)?;
        }
        info!(
            "loaded {algorithm} signing key {} from {}",
            key.id(),
            self.file_path.display()
        );
        Ok(Some(key))
    }

    fn activate(&self, key: &SigningKey) -> AResult<()> {
        let content = Zeroizing::new(toml::to_string(&PersistedKey::from_signing_key(key)?)?);
        let temporary_path = self.temporary_path();
        write_owner_only(&temporary_path, content.as_bytes()).map_err(|e| {
            AuthnError::KeyStore(format!(
                "cannot write the signing key file {}: {e}",
                temporary_path.display()
            ))
        })?;
        fs::rename(&temporary_path, &self.file_path).map_err(|e| {
            AuthnError::KeyStore(format!(
                "cannot replace the signing key file {}: {e}",
                self.file_path.display()
            ))
        })?;
        if let Err(e) = restrict_permissions(&self.file_path) {
            warn!(
                "could not restrict the permissions of {} to the owner: {e}",
                self.file_path.display()
            );
        }
        debug!("persisted signing key {} to {}", key.id(), self.file_path.display());
        Ok(())
    }

    fn discard(&self) -> AResult<()> {
        match fs::remove_file(&self.file_path) {
            Ok(()) => {
                info!("removed the signing key file {}", self.file_path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthnError::KeyStore(format!(
                "cannot remove the signing key file {}: {e}",
                self.file_path.display()
            ))),
        }
    }

    fn file_path(&self) -> Option<&Path> {
        Some(&self.file_path)
    }
}

fn write_owner_only(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "owner only permissions are not supported on this platform",
    ))
}
