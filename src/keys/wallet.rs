//! Wallet-derived key pairs.
//!
//! Replaces the dynamic wallet-adapter callback ("an object with a
//! `signMessage` function property") with a small trait: the re-architecture
//! strategy spec §9 calls for when a union-typed external adapter doesn't
//! translate into Rust.

use crate::curve::{CurvePoint, Scalar};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

pub const KEY_DERIVATION_DOMAIN: &[u8] = b"zVault key derivation v1";
const SPEND_SEED_PREFIX: &[u8] = b"zVault-spend-v1";
const VIEW_SEED_PREFIX: &[u8] = b"zVault-view-v1";

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("wallet rejected the signature request")]
    Rejected,
    #[error("transport error requesting signature: {0}")]
    Transport(String),
}

/// One-method interface a wallet (or a headless keypair) implements to sign
/// the domain-tagged key-derivation message.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Either a live wallet adapter or an already-derived key pair, accepted
/// polymorphically by every key-derivation entry point (spec §9).
pub enum KeySource<'a> {
    Wallet(&'a dyn Signer),
    Derived(&'a KeyPair),
}

/// Deterministically derived `(spendingPriv, viewingPriv)` and their public
/// points. Held only in memory; private scalars are zeroized on drop.
pub struct KeyPair {
    pub spending_priv: Scalar,
    pub viewing_priv: Scalar,
    pub spending_pub: CurvePoint,
    pub viewing_pub: CurvePoint,
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.spending_priv.zeroize();
        self.viewing_priv.zeroize();
    }
}

impl KeyPair {
    /// Request a signature over the fixed domain string and derive both
    /// private scalars from it. Re-hashes with a counter suffix on the
    /// (negligible-probability) event a scalar reduces to zero.
    pub fn derive(signer: &dyn Signer) -> Result<KeyPair, SignerError> {
        let sig = signer.sign(KEY_DERIVATION_DOMAIN)?;

        let spending_priv = derive_nonzero_scalar(SPEND_SEED_PREFIX, &sig);
        let viewing_priv = derive_nonzero_scalar(VIEW_SEED_PREFIX, &sig);

        let spending_pub = CurvePoint::generator().mul(&spending_priv);
        let viewing_pub = CurvePoint::generator().mul(&viewing_priv);

        Ok(KeyPair {
            spending_priv,
            viewing_priv,
            spending_pub,
            viewing_pub,
        })
    }
}

fn derive_nonzero_scalar(prefix: &[u8], sig: &[u8]) -> Scalar {
    for counter in 0u8..=u8::MAX {
        let mut hasher = Sha256::new();
        hasher.update(prefix);
        if counter > 0 {
            hasher.update([counter]);
        }
        hasher.update(sig);
        let seed: [u8; 32] = hasher.finalize().into();
        let scalar = Scalar::from_be_bytes_mod_order(&seed);
        if !scalar.is_zero() {
            return scalar;
        }
    }
    unreachable!("astronomically unlikely: 256 consecutive zero reductions");
}

/// A signer backed by a scalar already in memory, for tests and for the
/// self-custody flow where the caller already holds a derived key pair.
pub struct FixedSigner {
    signature: Vec<u8>,
}

impl FixedSigner {
    pub fn new(signature: Vec<u8>) -> Self {
        Self { signature }
    }
}

impl Signer for FixedSigner {
    fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(self.signature.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let signer = FixedSigner::new(vec![7u8; 64]);
        let kp1 = KeyPair::derive(&signer).unwrap();
        let kp2 = KeyPair::derive(&signer).unwrap();
        assert_eq!(kp1.spending_priv.to_be_bytes(), kp2.spending_priv.to_be_bytes());
        assert_eq!(kp1.viewing_priv.to_be_bytes(), kp2.viewing_priv.to_be_bytes());
    }

    #[test]
    fn spend_and_view_scalars_differ() {
        let signer = FixedSigner::new(vec![1u8; 64]);
        let kp = KeyPair::derive(&signer).unwrap();
        assert_ne!(kp.spending_priv.to_be_bytes(), kp.viewing_priv.to_be_bytes());
    }

    #[test]
    fn public_points_match_private_scalars() {
        let signer = FixedSigner::new(vec![9u8; 64]);
        let kp = KeyPair::derive(&signer).unwrap();
        assert_eq!(kp.spending_pub, CurvePoint::generator().mul(&kp.spending_priv));
        assert_eq!(kp.viewing_pub, CurvePoint::generator().mul(&kp.viewing_priv));
    }
}
