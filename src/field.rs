//! BN254 scalar field arithmetic.
//!
//! `FieldElement` wraps `ark_bn254::Fr`, the field every commitment,
//! nullifier, and Merkle node lives in. Grumpkin point coordinates are
//! elements of this same field, which is what makes point addition cheap
//! inside a BN254 circuit (see `crate::curve`).

use ark_ff::{BigInteger, PrimeField};
use std::fmt;
use zeroize::Zeroize;

/// An element of the BN254 scalar field, reduced mod `p`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldElement(pub(crate) ark_bn254::Fr);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement(ark_ff::MontFp!("0"));
    pub const ONE: FieldElement = FieldElement(ark_ff::MontFp!("1"));

    /// Interpret 32 bytes as a big-endian integer and reduce mod `p`.
    pub fn from_be_bytes_mod_order(bytes: &[u8; 32]) -> Self {
        FieldElement(ark_bn254::Fr::from_be_bytes_mod_order(bytes))
    }

    /// Construct from a `u64`, useful for indices and amounts.
    pub fn from_u64(v: u64) -> Self {
        FieldElement(ark_bn254::Fr::from(v))
    }

    /// 32-byte big-endian encoding, the wire format for every field element.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let bytes = self.0.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        // `to_bytes_be` is already minimal-length and <= 32 bytes for BN254 Fr.
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0 == ark_bn254::Fr::from(0u64)
    }

    pub(crate) fn inner(&self) -> ark_bn254::Fr {
        self.0
    }

    pub(crate) fn from_inner(v: ark_bn254::Fr) -> Self {
        FieldElement(v)
    }
}

impl std::ops::Add for FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: Self) -> Self::Output {
        FieldElement(self.0 + rhs.0)
    }
}

impl std::ops::Sub for FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: Self) -> Self::Output {
        FieldElement(self.0 - rhs.0)
    }
}

impl std::ops::Mul for FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: Self) -> Self::Output {
        FieldElement(self.0 * rhs.0)
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", hex::encode(self.to_be_bytes()))
    }
}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0 = ark_bn254::Fr::from(0u64);
    }
}


impl PartialEq<ark_bn254::Fr> for FieldElement {
    fn eq(&self, other: &ark_bn254::Fr) -> bool {
        self.0 == *other
    }
}
