//! Stealth meta-address encode/decode.
//!
//! A meta-address is the shareable `(spendingPub, viewingPub)` pair anyone
//! can use to derive a one-time destination for this recipient.

use crate::curve::{CurvePoint, InvalidPoint};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaAddressError {
    #[error("meta-address must decode to exactly 66 bytes, got {0}")]
    WrongLength(usize),
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),
    #[error("spending key: {0}")]
    SpendingKey(InvalidPoint),
    #[error("viewing key: {0}")]
    ViewingKey(InvalidPoint),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MetaAddress {
    pub spending_pub: CurvePoint,
    pub viewing_pub: CurvePoint,
}

impl MetaAddress {
    /// `compress(spendingPub) || compress(viewingPub)` -> 66 bytes.
    pub fn to_bytes(&self) -> Result<[u8; 66], InvalidPoint> {
        let spend = self.spending_pub.compress()?;
        let view = self.viewing_pub.compress()?;
        let mut out = [0u8; 66];
        out[..33].copy_from_slice(&spend);
        out[33..].copy_from_slice(&view);
        Ok(out)
    }

    /// 132 lowercase hex characters.
    pub fn to_hex(&self) -> Result<String, InvalidPoint> {
        Ok(hex::encode(self.to_bytes()?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetaAddressError> {
        if bytes.len() != 66 {
            return Err(MetaAddressError::WrongLength(bytes.len()));
        }
        let mut spend_bytes = [0u8; 33];
        spend_bytes.copy_from_slice(&bytes[..33]);
        let mut view_bytes = [0u8; 33];
        view_bytes.copy_from_slice(&bytes[33..]);

        let spending_pub =
            CurvePoint::decompress(&spend_bytes).map_err(MetaAddressError::SpendingKey)?;
        let viewing_pub =
            CurvePoint::decompress(&view_bytes).map_err(MetaAddressError::ViewingKey)?;

        Ok(MetaAddress {
            spending_pub,
            viewing_pub,
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, MetaAddressError> {
        let bytes = hex::decode(s).map_err(|e| MetaAddressError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Scalar;

    fn fixed_meta_address() -> MetaAddress {
        let spending_priv = Scalar::from_be_bytes_mod_order(&[3u8; 32]);
        let viewing_priv = Scalar::from_be_bytes_mod_order(&[5u8; 32]);
        MetaAddress {
            spending_pub: CurvePoint::generator().mul(&spending_priv),
            viewing_pub: CurvePoint::generator().mul(&viewing_priv),
        }
    }

    #[test]
    fn round_trips_through_hex() {
        let meta = fixed_meta_address();
        let hex = meta.to_hex().unwrap();
        assert_eq!(hex.len(), 132);
        let decoded = MetaAddress::from_hex(&hex).unwrap();
        assert_eq!(meta, decoded);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = MetaAddress::from_bytes(&[0u8; 10]).unwrap_err();
        assert_eq!(err, MetaAddressError::WrongLength(10));
    }
}
