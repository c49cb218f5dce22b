use std::fmt;

use openssl::{
    ec::{EcGroup, EcKey},
    pkey::{PKey, Private, Public},
    rand::rand_bytes,
    rsa::Rsa,
};
use tracing::trace;
use zeroize::Zeroizing;

use crate::{
    algorithm::{AlgorithmFamily, RSA_MODULUS_BITS, SignatureAlgorithm},
    crypto_bail,
    error::{CryptoError, result::CryptoResult},
};

/// Secret or key pair behind a signing key.
///
/// Asymmetric keys hold parsed openssl keys so that signing and verification
/// do not re-parse DER on the hot path.
#[derive(Clone)]
pub enum KeyMaterial {
    Symmetric {
        secret: Zeroizing<Vec<u8>>,
    },
    AsymmetricPair {
        public_key: PKey<Public>,
        private_key: PKey<Private>,
    },
}

impl KeyMaterial {
    /// Generate fresh material sized for `algorithm`.
    pub fn generate(algorithm: SignatureAlgorithm) -> CryptoResult<Self> {
        if let Some(secret_length) = algorithm.secret_length() {
            let mut secret = Zeroizing::new(vec![0_u8; secret_length]);
            rand_bytes(&mut secret)?;
            return Ok(Self::Symmetric { secret });
        }
        let private_key = if let Some(curve) = algorithm.curve() {
            let group = EcGroup::from_curve_name(curve)?;
            PKey::from_ec_key(EcKey::generate(&group)?)?
        } else if algorithm.is_rsa() {
            PKey::from_rsa(Rsa::generate(RSA_MODULUS_BITS)?)?
        } else {
            crypto_bail!(CryptoError::NotSupported(format!(
                "no key generation for algorithm {algorithm}"
            )))
        };
        trace!("generated {} bits key pair for {algorithm}", private_key.bits());
        Self::from_private_key(private_key)
    }

    /// Build a key pair from a private key, deriving its public half.
    pub fn from_private_key(private_key: PKey<Private>) -> CryptoResult<Self> {
        let public_key = PKey::public_key_from_der(&private_key.public_key_to_der()?)?;
        Ok(Self::AsymmetricPair {
            public_key,
            private_key,
        })
    }

    #[must_use]
    pub fn from_secret(secret: Vec<u8>) -> Self {
        Self::Symmetric {
            secret: Zeroizing::new(secret),
        }
    }

    /// Rebuild a key pair from its PKCS#8 private key and SPKI public key DER encodings.
    pub fn from_der_pair(private_key_pkcs8: &[u8], public_key_spki: &[u8]) -> CryptoResult<Self> {
        let private_key = PKey::private_key_from_pkcs8(private_key_pkcs8).map_err(|e| {
            CryptoError::ConversionError(format!("invalid PKCS#8 private key: {e}"))
        })?;
        let public_key = PKey::public_key_from_der(public_key_spki)
            .map_err(|e| CryptoError::ConversionError(format!("invalid SPKI public key: {e}")))?;
        if !public_key.public_eq(&private_key) {
            crypto_bail!(CryptoError::ConversionError(
                "the public key does not match the private key".to_owned()
            ))
        }
        Ok(Self::AsymmetricPair {
            public_key,
            private_key,
        })
    }

    #[must_use]
    pub const fn family(&self) -> AlgorithmFamily {
        match self {
            Self::Symmetric { .. } => AlgorithmFamily::Symmetric,
            Self::AsymmetricPair { .. } => AlgorithmFamily::Asymmetric,
        }
    }

    /// Check that this material can be used with `algorithm`: same family and,
    /// for key pairs, the matching key type and curve.
    pub fn check_algorithm(&self, algorithm: SignatureAlgorithm) -> CryptoResult<()> {
        match self {
            Self::Symmetric { secret } => {
                if !algorithm.is_symmetric() {
                    crypto_bail!(CryptoError::NotSupported(format!(
                        "a symmetric secret cannot sign with {algorithm}"
                    )))
                }
                if secret.is_empty() {
                    crypto_bail!(CryptoError::InvalidSize("empty HMAC secret".to_owned()))
                }
            }
            Self::AsymmetricPair { private_key, .. } => {
                if let Some(curve) = algorithm.curve() {
                    let ec_key = private_key.ec_key().map_err(|_| {
                        CryptoError::NotSupported(format!("{algorithm} requires an EC key"))
                    })?;
                    if ec_key.group().curve_name() != Some(curve) {
                        crypto_bail!(CryptoError::NotSupported(format!(
                            "the EC key curve does not match {algorithm}"
                        )))
                    }
                } else if algorithm.is_rsa() {
                    if private_key.rsa().is_err() {
                        crypto_bail!(CryptoError::NotSupported(format!(
                            "{algorithm} requires an RSA key"
                        )))
                    }
                } else {
                    crypto_bail!(CryptoError::NotSupported(format!(
                        "a key pair cannot sign with {algorithm}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Raw secret bytes, for symmetric material only.
    #[must_use]
    pub fn secret(&self) -> Option<&[u8]> {
        match self {
            Self::Symmetric { secret } => Some(secret.as_slice()),
            Self::AsymmetricPair { .. } => None,
        }
    }

    /// PKCS#8 DER of the private key, for key pairs only.
    pub fn private_key_pkcs8(&self) -> CryptoResult<Option<Zeroizing<Vec<u8>>>> {
        match self {
            Self::Symmetric { .. } => Ok(None),
            Self::AsymmetricPair { private_key, .. } => {
                Ok(Some(Zeroizing::new(private_key.private_key_to_pkcs8()?)))
            }
        }
    }

    /// SPKI DER of the public key, for key pairs only.
    pub fn public_key_spki(&self) -> CryptoResult<Option<Vec<u8>>> {
        match self {
            Self::Symmetric { .. } => Ok(None),
            Self::AsymmetricPair { public_key, .. } => Ok(Some(public_key.public_key_to_der()?)),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symmetric { secret } => f
                .debug_struct("Symmetric")
                .field("secret_len", &secret.len())
                .finish(),
            Self::AsymmetricPair { public_key, .. } => f
                .debug_struct("AsymmetricPair")
                .field("key_type", &public_key.id())
                .field("bits", &public_key.bits())
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use openssl::nid::Nid;
    use tessera_logger::log_init;

    use super::KeyMaterial;
    use crate::{
        algorithm::{AlgorithmFamily, RSA_MODULUS_BITS, SignatureAlgorithm},
        error::result::CryptoResult,
    };

    #[test]
    fn test_symmetric_generation_sizes() -> CryptoResult<()> {
        log_init(None);
        for (algorithm, len) in [
            (SignatureAlgorithm::HS256, 32),
            (SignatureAlgorithm::HS384, 48),
            (SignatureAlgorithm::HS512, 64),
        ] {
            let material = KeyMaterial::generate(algorithm)?;
            assert_eq!(material.family(), AlgorithmFamily::Symmetric);
            assert_eq!(material.secret().unwrap().len(), len);
            material.check_algorithm(algorithm)?;
        }
        let a = KeyMaterial::generate(SignatureAlgorithm::HS256)?;
        let b = KeyMaterial::generate(SignatureAlgorithm::HS256)?;
        assert_ne!(a.secret(), b.secret());
        Ok(())
    }

    #[test]
    fn test_ec_generation_uses_algorithm_curve() -> CryptoResult<()> {
        for (algorithm, curve) in [
            (SignatureAlgorithm::ES256, Nid::X9_62_PRIME256V1),
            (SignatureAlgorithm::ES384, Nid::SECP384R1),
            (SignatureAlgorithm::ES512, Nid::SECP521R1),
        ] {
            let material = KeyMaterial::generate(algorithm)?;
            let KeyMaterial::AsymmetricPair { private_key, .. } = &material else {
                panic!("expected a key pair for {algorithm}");
            };
            assert_eq!(private_key.ec_key()?.group().curve_name(), Some(curve));
            material.check_algorithm(algorithm)?;
        }
        Ok(())
    }

    #[test]
    fn test_rsa_generation_and_der_reload() -> CryptoResult<()> {
        let material = KeyMaterial::generate(SignatureAlgorithm::PS256)?;
        let KeyMaterial::AsymmetricPair { public_key, .. } = &material else {
            panic!("expected a key pair");
        };
        assert_eq!(public_key.bits(), RSA_MODULUS_BITS);

        let private = material.private_key_pkcs8()?.unwrap();
        let public = material.public_key_spki()?.unwrap();
        let reloaded = KeyMaterial::from_der_pair(&private, &public)?;
        reloaded.check_algorithm(SignatureAlgorithm::RS512)?;
        assert_eq!(reloaded.public_key_spki()?.unwrap(), public);
        Ok(())
    }

    #[test]
    fn test_family_mismatch_is_rejected() -> CryptoResult<()> {
        let secret = KeyMaterial::generate(SignatureAlgorithm::HS512)?;
        secret.check_algorithm(SignatureAlgorithm::RS256).unwrap_err();

        let ec = KeyMaterial::generate(SignatureAlgorithm::ES256)?;
        ec.check_algorithm(SignatureAlgorithm::HS256).unwrap_err();
        ec.check_algorithm(SignatureAlgorithm::ES384).unwrap_err();
        ec.check_algorithm(SignatureAlgorithm::RS256).unwrap_err();
        Ok(())
    }

    #[test]
    fn test_mismatched_der_pair_is_rejected() -> CryptoResult<()> {
        let first = KeyMaterial::generate(SignatureAlgorithm::ES256)?;
        let second = KeyMaterial::generate(SignatureAlgorithm::ES256)?;
        let result = KeyMaterial::from_der_pair(
            &first.private_key_pkcs8()?.unwrap(),
            &second.public_key_spki()?.unwrap(),
        );
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_debug_does_not_print_secret() -> CryptoResult<()> {
        let material = KeyMaterial::from_secret(b"very-secret-value".to_vec());
        let debug = format!("{material:?}");
        assert!(!debug.contains("very-secret-value"));
        assert!(debug.contains("secret_len"));
        Ok(())
    }
}
