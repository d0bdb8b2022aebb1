//! On-chain mirror of the commitment tree (discriminator `0x05`).
//!
//! The core never talks to the chain directly for this layout (that's the
//! verifier program's job); this module only encodes/decodes the account
//! bytes so `chain::ChainClient` can compare the in-memory tree against the
//! canonical on-chain state.

use crate::field::FieldElement;
use crate::tree::commitment_tree::ROOT_HISTORY_SIZE;

pub const COMMITMENT_TREE_DISCRIMINATOR: u8 = 0x05;
/// 1 (discriminator) + 7 (bump + padding, implementation-defined up to
/// offset 8) + 32 (root) + 8 (next_index) + 100*32 (history) + 4 (ring ptr).
pub const COMMITMENT_TREE_ACCOUNT_LEN: usize = 8 + 32 + 8 + ROOT_HISTORY_SIZE * 32 + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentTreeAccount {
    pub bump: u8,
    pub current_root: FieldElement,
    pub next_index: u64,
    pub root_history: [FieldElement; ROOT_HISTORY_SIZE],
    pub root_history_index: u32,
}

impl CommitmentTreeAccount {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; COMMITMENT_TREE_ACCOUNT_LEN];
        buf[0] = COMMITMENT_TREE_DISCRIMINATOR;
        buf[1] = self.bump;
        buf[8..40].copy_from_slice(&self.current_root.to_be_bytes());
        buf[40..48].copy_from_slice(&self.next_index.to_le_bytes());
        for (i, root) in self.root_history.iter().enumerate() {
            let off = 48 + i * 32;
            buf[off..off + 32].copy_from_slice(&root.to_be_bytes());
        }
        let tail = 48 + ROOT_HISTORY_SIZE * 32;
        buf[tail..tail + 4].copy_from_slice(&self.root_history_index.to_le_bytes());
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < COMMITMENT_TREE_ACCOUNT_LEN || data[0] != COMMITMENT_TREE_DISCRIMINATOR {
            return None;
        }
        let bump = data[1];
        let mut root_bytes = [0u8; 32];
        root_bytes.copy_from_slice(&data[8..40]);
        let current_root = FieldElement::from_be_bytes_mod_order(&root_bytes);

        let mut next_index_bytes = [0u8; 8];
        next_index_bytes.copy_from_slice(&data[40..48]);
        let next_index = u64::from_le_bytes(next_index_bytes);

        let mut root_history = [FieldElement::ZERO; ROOT_HISTORY_SIZE];
        for (i, slot) in root_history.iter_mut().enumerate() {
            let off = 48 + i * 32;
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&data[off..off + 32]);
            *slot = FieldElement::from_be_bytes_mod_order(&bytes);
        }

        let tail = 48 + ROOT_HISTORY_SIZE * 32;
        let mut idx_bytes = [0u8; 4];
        idx_bytes.copy_from_slice(&data[tail..tail + 4]);
        let root_history_index = u32::from_le_bytes(idx_bytes);

        Some(CommitmentTreeAccount {
            bump,
            current_root,
            next_index,
            root_history,
            root_history_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let mut history = [FieldElement::ZERO; ROOT_HISTORY_SIZE];
        history[0] = FieldElement::from_u64(7);
        let account = CommitmentTreeAccount {
            bump: 254,
            current_root: FieldElement::from_u64(42),
            next_index: 3,
            root_history: history,
            root_history_index: 1,
        };
        let bytes = account.to_bytes();
        assert_eq!(bytes.len(), COMMITMENT_TREE_ACCOUNT_LEN);
        assert_eq!(bytes[0], COMMITMENT_TREE_DISCRIMINATOR);
        let decoded = CommitmentTreeAccount::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn wrong_discriminator_is_rejected() {
        let mut bytes = vec![0u8; COMMITMENT_TREE_ACCOUNT_LEN];
        bytes[0] = 0xFF;
        assert!(CommitmentTreeAccount::from_bytes(&bytes).is_none());
    }
}
