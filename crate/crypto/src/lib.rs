//! Signing key material for Tessera bearer tokens.
//!
//! Generates HMAC secrets and EC/RSA key pairs with openssl and implements the
//! JWS signature schemes used to sign and verify tokens.

pub use algorithm::{AlgorithmFamily, RSA_MODULUS_BITS, SignatureAlgorithm};
pub use error::{CryptoError, result::CryptoResult};
pub use key_material::KeyMaterial;

pub mod algorithm;
mod error;
pub mod key_material;
mod signature;
