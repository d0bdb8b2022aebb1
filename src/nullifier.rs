//! Nullifier records: existence on-chain means spent.

use crate::field::FieldElement;
use serde::{Deserialize, Serialize};

pub const NULLIFIER_RECORD_DISCRIMINATOR: u8 = 0x03;

/// What kind of spend produced this nullifier record. The wire layout
/// itself doesn't need this (existence alone encodes "spent"), but the
/// original system's on-chain state carries it for indexing/analytics, so
/// the in-memory `NoteStore` keeps it too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullifierOperationType {
    FullWithdrawal,
    PartialWithdrawal,
    PrivateTransfer,
    Transfer,
    Split,
    Join,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullifierRecord {
    pub nullifier_hash: FieldElement,
    pub operation: NullifierOperationType,
}

impl NullifierRecord {
    pub fn new(nullifier_hash: FieldElement, operation: NullifierOperationType) -> Self {
        Self {
            nullifier_hash,
            operation,
        }
    }

    /// The 32-byte PDA seed this record would be stored under on-chain.
    pub fn pda_seed(&self) -> [u8; 32] {
        self.nullifier_hash.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pda_seed_is_the_hash_bytes() {
        let record = NullifierRecord::new(
            FieldElement::from_u64(42),
            NullifierOperationType::FullWithdrawal,
        );
        assert_eq!(record.pda_seed(), FieldElement::from_u64(42).to_be_bytes());
    }
}
