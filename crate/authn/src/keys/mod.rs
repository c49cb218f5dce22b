//! Signing keys, their ring and their persistence.

mod key_ring;
pub mod keystore;
mod signing_key;

pub use key_ring::SigningKeyRing;
pub use signing_key::SigningKey;
