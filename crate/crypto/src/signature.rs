//! JWS signature schemes (RFC 7518 §3) over openssl.
//!
//! ECDSA signatures use the JOSE fixed-size `r || s` encoding rather than DER.

use openssl::{
    bn::BigNum,
    ecdsa::EcdsaSig,
    hash::hash,
    memcmp,
    pkey::{PKey, PKeyRef, Private, Public},
    rsa::Padding,
    sign::{RsaPssSaltlen, Signer, Verifier},
};
use tracing::trace;

use crate::{
    algorithm::SignatureAlgorithm,
    crypto_bail,
    error::{CryptoError, result::CryptoResult},
    key_material::KeyMaterial,
};

impl KeyMaterial {
    /// Sign `message` with `algorithm`, returning the raw JWS signature bytes.
    pub fn sign(&self, algorithm: SignatureAlgorithm, message: &[u8]) -> CryptoResult<Vec<u8>> {
        self.check_algorithm(algorithm)?;
        match self {
            Self::Symmetric { secret } => hmac(algorithm, secret, message),
            Self::AsymmetricPair { private_key, .. } => {
                if algorithm.curve().is_some() {
                    ecdsa_sign(algorithm, private_key, message)
                } else {
                    rsa_sign(algorithm, private_key, message)
                }
            }
        }
    }

    /// Check a JWS signature.
    ///
    /// Returns `Ok(false)` for any signature that does not verify, including
    /// signatures of the wrong length or shape; errors are reserved for material
    /// that cannot be used with `algorithm` at all.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> CryptoResult<bool> {
        self.check_algorithm(algorithm)?;
        let verified = match self {
            Self::Symmetric { secret } => {
                let expected = hmac(algorithm, secret, message)?;
                expected.len() == signature.len() && memcmp::eq(&expected, signature)
            }
            Self::AsymmetricPair { public_key, .. } => {
                let outcome = if algorithm.curve().is_some() {
                    ecdsa_verify(algorithm, public_key, message, signature)
                } else {
                    rsa_verify(algorithm, public_key, message, signature)
                };
                outcome.unwrap_or_else(|e| {
                    trace!("{algorithm} signature rejected by openssl: {e}");
                    false
                })
            }
        };
        Ok(verified)
    }
}

fn hmac(algorithm: SignatureAlgorithm, secret: &[u8], message: &[u8]) -> CryptoResult<Vec<u8>> {
    let key = PKey::hmac(secret)?;
    let mut signer = Signer::new(algorithm.message_digest(), &key)?;
    Ok(signer.sign_oneshot_to_vec(message)?)
}

fn configure_pss_signer(algorithm: SignatureAlgorithm, signer: &mut Signer<'_>) -> CryptoResult<()> {
    signer.set_rsa_padding(Padding::PKCS1_PSS)?;
    signer.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
    signer.set_rsa_mgf1_md(algorithm.message_digest())?;
    Ok(())
}

fn rsa_sign(
    algorithm: SignatureAlgorithm,
    private_key: &PKeyRef<Private>,
    message: &[u8],
) -> CryptoResult<Vec<u8>> {
    let mut signer = Signer::new(algorithm.message_digest(), private_key)?;
    if algorithm.uses_pss_padding() {
        configure_pss_signer(algorithm, &mut signer)?;
    } else {
        signer.set_rsa_padding(Padding::PKCS1)?;
    }
    Ok(signer.sign_oneshot_to_vec(message)?)
}

fn rsa_verify(
    algorithm: SignatureAlgorithm,
    public_key: &PKeyRef<Public>,
    message: &[u8],
    signature: &[u8],
) -> CryptoResult<bool> {
    let mut verifier = Verifier::new(algorithm.message_digest(), public_key)?;
    if algorithm.uses_pss_padding() {
        verifier.set_rsa_padding(Padding::PKCS1_PSS)?;
        verifier.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
        verifier.set_rsa_mgf1_md(algorithm.message_digest())?;
    } else {
        verifier.set_rsa_padding(Padding::PKCS1)?;
    }
    Ok(verifier.verify_oneshot(signature, message)?)
}

fn ecdsa_component_length(algorithm: SignatureAlgorithm) -> CryptoResult<usize> {
    algorithm
        .ecdsa_component_length()
        .ok_or_else(|| CryptoError::NotSupported(format!("{algorithm} is not an ECDSA algorithm")))
}

fn ecdsa_sign(
    algorithm: SignatureAlgorithm,
    private_key: &PKeyRef<Private>,
    message: &[u8],
) -> CryptoResult<Vec<u8>> {
    let component_length = ecdsa_component_length(algorithm)?;
    let digest = hash(algorithm.message_digest(), message)?;
    let signature = EcdsaSig::sign(&digest, &*private_key.ec_key()?)?;
    let padded_length = i32::try_from(component_length)?;
    let mut raw = signature.r().to_vec_padded(padded_length)?;
    raw.extend_from_slice(&signature.s().to_vec_padded(padded_length)?);
    Ok(raw)
}

fn ecdsa_verify(
    algorithm: SignatureAlgorithm,
    public_key: &PKeyRef<Public>,
    message: &[u8],
    signature: &[u8],
) -> CryptoResult<bool> {
    let component_length = ecdsa_component_length(algorithm)?;
    if signature.len() != 2 * component_length {
        crypto_bail!(CryptoError::InvalidSize(format!(
            "{algorithm} signature must be {} bytes, got {}",
            2 * component_length,
            signature.len()
        )))
    }
    let (r, s) = signature.split_at(component_length);
    let signature = EcdsaSig::from_private_components(BigNum::from_slice(r)?, BigNum::from_slice(s)?)?;
    let digest = hash(algorithm.message_digest(), message)?;
    Ok(signature.verify(&digest, &*public_key.ec_key()?)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use strum::IntoEnumIterator;
    use tessera_logger::log_init;

    use crate::{
        algorithm::SignatureAlgorithm, error::result::CryptoResult, key_material::KeyMaterial,
    };

    const MESSAGE: &[u8] = b"eyJhbGciOiJIUzM4NCJ9.eyJzdWIiOiJmcm9kbyJ9";

    #[test]
    fn test_sign_verify_every_algorithm() -> CryptoResult<()> {
        log_init(None);
        for algorithm in SignatureAlgorithm::iter() {
            let material = KeyMaterial::generate(algorithm)?;
            let signature = material.sign(algorithm, MESSAGE)?;
            assert!(
                material.verify(algorithm, MESSAGE, &signature)?,
                "{algorithm} signature does not verify"
            );
            assert!(
                !material.verify(algorithm, b"tampered", &signature)?,
                "{algorithm} accepted a tampered message"
            );
        }
        Ok(())
    }

    #[test]
    fn test_ecdsa_signatures_are_fixed_size() -> CryptoResult<()> {
        for (algorithm, len) in [
            (SignatureAlgorithm::ES256, 64),
            (SignatureAlgorithm::ES384, 96),
            (SignatureAlgorithm::ES512, 132),
        ] {
            let material = KeyMaterial::generate(algorithm)?;
            assert_eq!(material.sign(algorithm, MESSAGE)?.len(), len);
        }
        Ok(())
    }

    #[test]
    fn test_signature_from_other_key_is_rejected() -> CryptoResult<()> {
        for algorithm in [
            SignatureAlgorithm::HS256,
            SignatureAlgorithm::ES256,
            SignatureAlgorithm::RS256,
        ] {
            let signer = KeyMaterial::generate(algorithm)?;
            let other = KeyMaterial::generate(algorithm)?;
            let signature = signer.sign(algorithm, MESSAGE)?;
            assert!(!other.verify(algorithm, MESSAGE, &signature)?);
        }
        Ok(())
    }

    #[test]
    fn test_malformed_signatures_verify_false() -> CryptoResult<()> {
        for algorithm in [
            SignatureAlgorithm::HS384,
            SignatureAlgorithm::ES384,
            SignatureAlgorithm::PS384,
        ] {
            let material = KeyMaterial::generate(algorithm)?;
            assert!(!material.verify(algorithm, MESSAGE, &[])?);
            assert!(!material.verify(algorithm, MESSAGE, &[0_u8; 7])?);
            let mut signature = material.sign(algorithm, MESSAGE)?;
            signature[0] ^= 0x01;
            assert!(!material.verify(algorithm, MESSAGE, &signature)?);
        }
        Ok(())
    }

    #[test]
    fn test_pss_and_pkcs1_are_not_interchangeable() -> CryptoResult<()> {
        let material = KeyMaterial::generate(SignatureAlgorithm::RS256)?;
        let signature = material.sign(SignatureAlgorithm::RS256, MESSAGE)?;
        assert!(!material.verify(SignatureAlgorithm::PS256, MESSAGE, &signature)?);
        Ok(())
    }

    #[test]
    fn test_wrong_family_is_an_error() -> CryptoResult<()> {
        let material = KeyMaterial::generate(SignatureAlgorithm::HS256)?;
        assert!(material.sign(SignatureAlgorithm::ES256, MESSAGE).is_err());
        assert!(material.verify(SignatureAlgorithm::RS256, MESSAGE, &[1, 2, 3]).is_err());
        Ok(())
    }
}
