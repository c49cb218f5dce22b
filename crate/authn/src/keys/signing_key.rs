use chrono::{DateTime, Utc};
use tessera_crypto::{KeyMaterial, SignatureAlgorithm};
use uuid::Uuid;

use crate::result::AResult;

/// A key of the signing ring. Immutable once created.
#[derive(Debug, Clone)]
pub struct SigningKey {
    id: String,
    algorithm: SignatureAlgorithm,
    created_at: DateTime<Utc>,
    material: KeyMaterial,
}

impl SigningKey {
    /// Generate a key with fresh material and a new time-ordered id.
    pub fn generate(algorithm: SignatureAlgorithm) -> AResult<Self> {
        let material = KeyMaterial::generate(algorithm)?;
        Ok(Self {
            id: Uuid::now_v7().to_string(),
            algorithm,
            created_at: Utc::now(),
            material,
        })
    }

    /// Rebuild a key from persisted parts, checking the material suits `algorithm`.
    pub fn from_parts(
        id: String,
        algorithm: SignatureAlgorithm,
        created_at: DateTime<Utc>,
        material: KeyMaterial,
    ) -> AResult<Self> {
        material.check_algorithm(algorithm)?;
        Ok(Self {
            id,
            algorithm,
            created_at,
            material,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn material(&self) -> &KeyMaterial {
        &self.material
    }
}
