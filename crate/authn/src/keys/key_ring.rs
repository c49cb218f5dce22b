use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tessera_crypto::SignatureAlgorithm;
use tracing::{debug, info};

use super::{SigningKey, keystore::KeyStore};
use crate::{authn_ensure, error::AuthnError, result::AResult};

type Snapshot = Arc<Vec<Arc<SigningKey>>>;

/// Bounded, ordered set of signing keys, newest first.
///
/// Readers clone an immutable snapshot and never wait on writers for longer
/// than a pointer swap. Writers (rotation, revocation, lazy creation) are
/// serialized by `writer`, which stays held across key generation and
/// persistence. A new key is persisted before it is installed.
pub struct SigningKeyRing {
    algorithm: SignatureAlgorithm,
    max_size: usize,
    key_store: Arc<dyn KeyStore>,
    keys: RwLock<Snapshot>,
    writer: Mutex<()>,
}

impl SigningKeyRing {
    /// Create an empty ring.
    pub fn new(
        algorithm: SignatureAlgorithm,
        max_size: usize,
        key_store: Arc<dyn KeyStore>,
    ) -> AResult<Self> {
        authn_ensure!(
            max_size > 0,
            AuthnError::Configuration("a key ring must hold at least one key".to_owned())
        );
        Ok(Self {
            algorithm,
            max_size,
            key_store,
            keys: RwLock::new(Arc::new(Vec::new())),
            writer: Mutex::new(()),
        })
    }

    /// Create a ring holding exactly one key: the persisted one when the store
    /// has a usable key, a freshly generated and persisted one otherwise.
    pub fn seeded(
        algorithm: SignatureAlgorithm,
        max_size: usize,
        key_store: Arc<dyn KeyStore>,
    ) -> AResult<Self> {
        let ring = Self::new(algorithm, max_size, key_store)?;
        match ring.key_store.load(algorithm)? {
            Some(key) => {
                ring.install(Arc::new(key))?;
            }
            None => {
                let _guard = ring.lock_writer()?;
                ring.create_key()?;
            }
        }
        Ok(ring)
    }

    /// The newest key, created on the spot when the ring is empty.
    pub fn current(&self) -> AResult<Arc<SigningKey>> {
        if let Some(key) = self.snapshot()?.first() {
            return Ok(key.clone());
        }
        let _guard = self.lock_writer()?;
        // another writer may have filled the ring while we waited
        if let Some(key) = self.snapshot()?.first() {
            return Ok(key.clone());
        }
        debug!("the key ring is empty, creating a signing key");
        self.create_key()
    }

    /// The retained key with this id. `None` when it was rotated out or revoked.
    pub fn find_by_id(&self, id: &str) -> AResult<Option<Arc<SigningKey>>> {
        Ok(self
            .snapshot()?
            .iter()
            .find(|key| key.id() == id)
            .cloned())
    }

    /// Generate, persist and install a new current key.
    pub fn rotate(&self) -> AResult<Arc<SigningKey>> {
        let _guard = self.lock_writer()?;
        let key = self.create_key()?;
        info!(
            "rotated the signing key, {} is now current ({} retained)",
            key.id(),
            self.size()?
        );
        Ok(key)
    }

    /// Persist and prepend `key`, evicting the oldest keys beyond `max_size`.
    pub fn push(&self, key: SigningKey) -> AResult<Arc<SigningKey>> {
        authn_ensure!(
            key.algorithm() == self.algorithm,
            AuthnError::Configuration(format!(
                "cannot add a {} key to a {} key ring",
                key.algorithm(),
                self.algorithm
            ))
        );
        let _guard = self.lock_writer()?;
        self.key_store.activate(&key)?;
        let key = Arc::new(key);
        self.install(key.clone())?;
        Ok(key)
    }

    /// Drop every key and forget the persisted one.
    pub fn clear(&self) -> AResult<()> {
        let _guard = self.lock_writer()?;
        self.key_store.discard()?;
        let mut keys = self
            .keys
            .write()
            .map_err(|e| AuthnError::ServerError(format!("cannot lock the key ring: {e}")))?;
        let revoked = keys.len();
        *keys = Arc::new(Vec::new());
        info!("revoked {revoked} signing key(s)");
        Ok(())
    }

    pub fn size(&self) -> AResult<usize> {
        Ok(self.snapshot()?.len())
    }

    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn key_store(&self) -> &dyn KeyStore {
        self.key_store.as_ref()
    }

    fn snapshot(&self) -> AResult<Snapshot> {
        self.keys
            .read()
            .map(|keys| keys.clone())
            .map_err(|e| AuthnError::ServerError(format!("cannot lock the key ring: {e}")))
    }

    fn lock_writer(&self) -> AResult<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|e| AuthnError::ServerError(format!("cannot lock the key ring writer: {e}")))
    }

    // callers hold the writer lock
    fn create_key(&self) -> AResult<Arc<SigningKey>> {
        let key = SigningKey::generate(self.algorithm)?;
        self.key_store.activate(&key)?;
        let key = Arc::new(key);
        self.install(key.clone())?;
        Ok(key)
    }

    fn install(&self, key: Arc<SigningKey>) -> AResult<()> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| AuthnError::ServerError(format!("cannot lock the key ring: {e}")))?;
        let mut next = Vec::with_capacity(self.max_size);
        next.push(key);
        next.extend(keys.iter().take(self.max_size - 1).cloned());
        if keys.len() >= self.max_size {
            debug!("evicted {} signing key(s)", keys.len() + 1 - self.max_size);
        }
        *keys = Arc::new(next);
        Ok(())
    }
}
