//! Persistence of the active signing key.
//!
//! Two strategies exist: [`MemoryKeyStore`] keeps nothing on disk, and
//! [`PlainFileKeyStore`] writes the single active key to `jwt-key.toml`.
//! Only the latest key survives a restart; older keys of the ring are lost.

use std::{path::Path, sync::Arc};

use tessera_crypto::SignatureAlgorithm;

use crate::{
    config::{KeystoreParams, KeystoreType},
    keys::SigningKey,
    result::AResult,
};

mod memory;
mod plainfile;

pub use memory::MemoryKeyStore;
pub use plainfile::{KEY_FILE_NAME, PlainFileKeyStore};

/// Persistence adapter for the signing key ring.
pub trait KeyStore: Send + Sync {
    /// The strategy of this store
    fn keystore_type(&self) -> KeystoreType;

    /// Load the persisted active key, if any.
    ///
    /// Returns `None` when nothing usable with `algorithm` is persisted.
    ///
    /// # Errors
    ///
    /// `AuthnError::Configuration` when the persisted key is corrupt.
    fn load(&self, algorithm: SignatureAlgorithm) -> AResult<Option<SigningKey>>;

    /// Persist `key` as the active key. Must complete before the key is used to sign.
    fn activate(&self, key: &SigningKey) -> AResult<()>;

    /// Forget the persisted key, after a revocation.
    fn discard(&self) -> AResult<()>;

    /// Location of the key file, for file backed stores
    fn file_path(&self) -> Option<&Path>;
}

/// Build the key store described by the configuration.
#[must_use]
pub fn key_store_from_params(params: &KeystoreParams) -> Arc<dyn KeyStore> {
    match params {
        KeystoreParams::Memory => Arc::new(MemoryKeyStore),
        KeystoreParams::Plainfile { directory } => Arc::new(PlainFileKeyStore::new(directory)),
    }
}
