//! JWS signature algorithms and the key family each one belongs to.

use openssl::{hash::MessageDigest, nid::Nid};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// RSA modulus length used for every `RS*` and `PS*` key.
pub const RSA_MODULUS_BITS: u32 = 2048;

/// The kind of key material an algorithm signs with.
///
/// A key ring only ever holds keys of a single family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum AlgorithmFamily {
    /// HMAC with a shared secret
    Symmetric,
    /// EC or RSA public/private key pair
    Asymmetric,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum SignatureAlgorithm {
    HS256,
    HS384,
    HS512,
    ES256,
    ES384,
    ES512,
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
}

impl SignatureAlgorithm {
    #[must_use]
    pub const fn family(self) -> AlgorithmFamily {
        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => AlgorithmFamily::Symmetric,
            _ => AlgorithmFamily::Asymmetric,
        }
    }

    #[must_use]
    pub const fn is_symmetric(self) -> bool {
        matches!(self.family(), AlgorithmFamily::Symmetric)
    }

    #[must_use]
    pub fn message_digest(self) -> MessageDigest {
        match self {
            Self::HS256 | Self::ES256 | Self::RS256 | Self::PS256 => MessageDigest::sha256(),
            Self::HS384 | Self::ES384 | Self::RS384 | Self::PS384 => MessageDigest::sha384(),
            Self::HS512 | Self::ES512 | Self::RS512 | Self::PS512 => MessageDigest::sha512(),
        }
    }

    /// Size in bytes of a freshly generated HMAC secret (the digest output size).
    #[must_use]
    pub const fn secret_length(self) -> Option<usize> {
        match self {
            Self::HS256 => Some(32),
            Self::HS384 => Some(48),
            Self::HS512 => Some(64),
            _ => None,
        }
    }

    /// Named curve of the `ES*` algorithms.
    #[must_use]
    pub const fn curve(self) -> Option<Nid> {
        match self {
            Self::ES256 => Some(Nid::X9_62_PRIME256V1),
            Self::ES384 => Some(Nid::SECP384R1),
            Self::ES512 => Some(Nid::SECP521R1),
            _ => None,
        }
    }

    /// Length in bytes of each of the `r` and `s` halves of a JOSE ECDSA signature.
    #[must_use]
    pub const fn ecdsa_component_length(self) -> Option<usize> {
        match self {
            Self::ES256 => Some(32),
            Self::ES384 => Some(48),
            Self::ES512 => Some(66),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_rsa(self) -> bool {
        matches!(
            self,
            Self::RS256 | Self::RS384 | Self::RS512 | Self::PS256 | Self::PS384 | Self::PS512
        )
    }

    #[must_use]
    pub const fn uses_pss_padding(self) -> bool {
        matches!(self, Self::PS256 | Self::PS384 | Self::PS512)
    }
}
