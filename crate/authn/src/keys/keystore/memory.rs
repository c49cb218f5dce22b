use std::path::Path;

use tessera_crypto::SignatureAlgorithm;

use super::KeyStore;
use crate::{config::KeystoreType, keys::SigningKey, result::AResult};

/// Keeps keys for the process lifetime only.
///
/// A restart is equivalent to revoking every issued token.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryKeyStore;

impl KeyStore for MemoryKeyStore {
    fn keystore_type(&self) -> KeystoreType {
        KeystoreType::Memory
    }

    fn load(&self, _algorithm: SignatureAlgorithm) -> AResult<Option<SigningKey>> {
        Ok(None)
    }

    fn activate(&self, _key: &SigningKey) -> AResult<()> {
        Ok(())
    }

    fn discard(&self) -> AResult<()> {
        Ok(())
    }

    fn file_path(&self) -> Option<&Path> {
        None
    }
}
