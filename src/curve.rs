//! Grumpkin point arithmetic and compressed-point codec.
//!
//! Grumpkin's base field equals BN254's scalar field (our [`FieldElement`]),
//! so a point's `x`-coordinate can be fed straight into Poseidon2 without a
//! field conversion. Grumpkin's own scalar field equals BN254's base field,
//! which is what `Scalar` wraps.

use crate::field::FieldElement;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField, Zero};
use std::ops::{Add, Mul};
use thiserror::Error;
use zeroize::Zeroize;

/// A scalar in Grumpkin's scalar field (BN254's base field `Fq`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Scalar(pub(crate) ark_grumpkin::Fr);

impl Scalar {
    /// Reduce 32 big-endian bytes mod the Grumpkin group order `q`.
    pub fn from_be_bytes_mod_order(bytes: &[u8; 32]) -> Self {
        Scalar(ark_grumpkin::Fr::from_be_bytes_mod_order(bytes))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        use ark_ff::BigInteger;
        let bytes = self.0.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Self) -> Self::Output {
        Scalar(self.0 + rhs.0)
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0 = ark_grumpkin::Fr::zero();
    }
}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scalar(<redacted>)")
    }
}

/// An affine Grumpkin point, with the point at infinity represented
/// distinctly rather than as a coordinate pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CurvePoint(pub(crate) ark_grumpkin::Affine);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidPoint {
    #[error("point encoding prefix byte must be 0x02 or 0x03, got {0:#04x}")]
    BadPrefix(u8),
    #[error("x-coordinate has no square root on the curve")]
    NotOnCurve,
    #[error("x-coordinate is not canonically reduced (>= field modulus)")]
    NonCanonical,
    #[error("the identity point may not be compressed or accepted on the wire")]
    Identity,
}

/// y^2 = x^3 + b over Grumpkin's base field (a = 0, b = -17).
fn curve_b() -> ark_grumpkin::Fq {
    -ark_grumpkin::Fq::from(17u64)
}

impl CurvePoint {
    /// The additive identity. Never valid on the wire.
    pub fn identity() -> Self {
        CurvePoint(ark_grumpkin::Affine::zero())
    }

    pub fn generator() -> Self {
        CurvePoint(ark_grumpkin::Affine::generator())
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    /// Project the affine x-coordinate into a BN254 field element, the
    /// bridge every `commit`/`nullifier` formula depends on.
    pub fn x_field_element(&self) -> FieldElement {
        let (x, _y) = self.0.xy().expect("identity has no coordinates");
        FieldElement::from_inner(x)
    }

    pub fn add(&self, other: &CurvePoint) -> CurvePoint {
        CurvePoint((self.0 + other.0).into_affine())
    }

    pub fn double(&self) -> CurvePoint {
        CurvePoint((self.0 + self.0).into_affine())
    }

    pub fn mul(&self, scalar: &Scalar) -> CurvePoint {
        CurvePoint(self.0.mul(scalar.0).into_affine())
    }

    /// One parity byte (0x02 even / 0x03 odd) + 32-byte big-endian x.
    /// Fails on the identity: it has no canonical compressed form here.
    pub fn compress(&self) -> Result<[u8; 33], InvalidPoint> {
        if self.is_identity() {
            return Err(InvalidPoint::Identity);
        }
        let (x, y) = self.0.xy().expect("checked non-identity above");
        let parity = y_parity(&y);
        let mut out = [0u8; 33];
        out[0] = if parity { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&FieldElement::from_inner(x).to_be_bytes());
        Ok(out)
    }

    /// Recover a point from its compressed encoding, rejecting anything
    /// that does not round-trip through a canonical, on-curve, non-identity
    /// representation.
    pub fn decompress(bytes: &[u8; 33]) -> Result<CurvePoint, InvalidPoint> {
        let prefix = bytes[0];
        if prefix != 0x02 && prefix != 0x03 {
            return Err(InvalidPoint::BadPrefix(prefix));
        }
        let mut x_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&bytes[1..]);

        let x = ark_grumpkin::Fq::from_be_bytes_mod_order(&x_bytes);
        // Reject non-canonical encodings: reducing mod p must be a no-op.
        let mut canonical = [0u8; 32];
        {
            use ark_ff::BigInteger;
            let b = x.into_bigint().to_bytes_be();
            canonical[32 - b.len()..].copy_from_slice(&b);
        }
        if canonical != x_bytes {
            return Err(InvalidPoint::NonCanonical);
        }

        let y2 = x * x * x + curve_b();
        let y = y2.sqrt().ok_or(InvalidPoint::NotOnCurve)?;
        let want_odd = prefix == 0x03;
        let y = if y_parity(&y) == want_odd { y } else { -y };

        let point = ark_grumpkin::Affine::new_unchecked(x, y);
        if point.is_zero() || !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(InvalidPoint::NotOnCurve);
        }
        Ok(CurvePoint(point))
    }
}

fn y_parity(y: &ark_grumpkin::Fq) -> bool {
    use ark_ff::BigInteger;
    y.into_bigint().to_bytes_le()[0] & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_round_trips_through_compression() {
        let g = CurvePoint::generator();
        let compressed = g.compress().expect("generator is not the identity");
        let decompressed = CurvePoint::decompress(&compressed).unwrap();
        assert_eq!(g, decompressed);
    }

    #[test]
    fn identity_cannot_be_compressed() {
        let id = CurvePoint::identity();
        assert_eq!(id.compress(), Err(InvalidPoint::Identity));
    }

    #[test]
    fn bad_prefix_byte_is_rejected() {
        let g = CurvePoint::generator();
        let mut compressed = g.compress().unwrap();
        compressed[0] = 0x04;
        assert_eq!(
            CurvePoint::decompress(&compressed),
            Err(InvalidPoint::BadPrefix(0x04))
        );
    }

    #[test]
    fn scalar_mul_is_additive() {
        let g = CurvePoint::generator();
        let two = Scalar(ark_grumpkin::Fr::from(2u64));
        let doubled = g.mul(&two);
        assert_eq!(doubled, g.double());
        assert_eq!(doubled, g.add(&g));
    }
}
