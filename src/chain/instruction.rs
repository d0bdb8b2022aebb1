//! Instruction-data byte layouts for the zVault program (spec §6).
//!
//! These are pure encoders: given already-assembled proof inputs and a
//! proof, produce the exact instruction `data` bytes the program expects.
//! Submission (accounts, signing, RPC) lives in `chain::client`.

use crate::field::FieldElement;

pub const DISC_INITIALIZE_POOL: u8 = 0x00;
pub const DISC_INITIALIZE_TREE: u8 = 0x01;
pub const DISC_CLAIM: u8 = 0x03;
pub const DISC_SPEND_SPLIT: u8 = 0x04;
pub const DISC_DEMO_ADD_STEALTH: u8 = 0x08;
pub const DISC_SPEND_PARTIAL_PUBLIC: u8 = 0x0A;

/// `proof-source` byte in the claim/spend instruction layouts: the proof
/// bytes are appended inline rather than read from a separate account.
pub const PROOF_SOURCE_INLINE: u8 = 0;
/// The proof lives in a separate buffer account; no proof bytes follow.
pub const PROOF_SOURCE_BUFFER_ACCOUNT: u8 = 1;

/// A stealth output's on-chain blob: `(ephemeralPubX, encryptedAmountWithSign)`.
#[derive(Clone, Copy, Debug)]
pub struct StealthBlob {
    pub ephemeral_pub_x: FieldElement,
    pub encrypted_amount_with_sign: FieldElement,
}

impl StealthBlob {
    fn write(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.ephemeral_pub_x.to_be_bytes());
        data.extend_from_slice(&self.encrypted_amount_with_sign.to_be_bytes());
    }
}

/// Claim instruction: `discriminator(1) | proof-source(1) | merkleRoot(32) |
/// nullifierHash(32) | amount(8 LE) | recipientFieldReduced(32) | vkHash(32)
/// | proof(N, inline only)`.
pub struct ClaimInstruction<'a> {
    pub merkle_root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub amount: u64,
    pub recipient_field_reduced: FieldElement,
    pub vk_hash: FieldElement,
    pub proof: &'a [u8],
}

impl ClaimInstruction<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(1 + 1 + 32 + 32 + 8 + 32 + 32 + self.proof.len());
        data.push(DISC_CLAIM);
        data.push(PROOF_SOURCE_INLINE);
        data.extend_from_slice(&self.merkle_root.to_be_bytes());
        data.extend_from_slice(&self.nullifier_hash.to_be_bytes());
        data.extend_from_slice(&self.amount.to_le_bytes());
        data.extend_from_slice(&self.recipient_field_reduced.to_be_bytes());
        data.extend_from_slice(&self.vk_hash.to_be_bytes());
        data.extend_from_slice(self.proof);
        data
    }
}

/// Spend-split instruction: claim layout's head, extended with the two
/// output commitments and their stealth blobs.
pub struct SpendSplitInstruction<'a> {
    pub merkle_root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub output_commitment_1: FieldElement,
    pub output_commitment_2: FieldElement,
    pub output_blobs: [StealthBlob; 2],
    pub vk_hash: FieldElement,
    pub proof: &'a [u8],
}

impl SpendSplitInstruction<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(1 + 1 + 32 * 5 + 32 * 4 + self.proof.len());
        data.push(DISC_SPEND_SPLIT);
        data.push(PROOF_SOURCE_INLINE);
        data.extend_from_slice(&self.merkle_root.to_be_bytes());
        data.extend_from_slice(&self.nullifier_hash.to_be_bytes());
        data.extend_from_slice(&self.output_commitment_1.to_be_bytes());
        data.extend_from_slice(&self.output_commitment_2.to_be_bytes());
        for blob in &self.output_blobs {
            blob.write(&mut data);
        }
        data.extend_from_slice(&self.vk_hash.to_be_bytes());
        data.extend_from_slice(self.proof);
        data
    }
}

/// Spend-partial-public instruction: claim layout's head, extended with a
/// public payout amount/recipient and a single change output.
pub struct SpendPartialPublicInstruction<'a> {
    pub merkle_root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub public_amount: u64,
    pub recipient_field_reduced: FieldElement,
    pub change_commitment: FieldElement,
    pub change_blob: StealthBlob,
    pub vk_hash: FieldElement,
    pub proof: &'a [u8],
}

impl SpendPartialPublicInstruction<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut data =
            Vec::with_capacity(1 + 1 + 32 + 32 + 8 + 32 + 32 + 64 + 32 + self.proof.len());
        data.push(DISC_SPEND_PARTIAL_PUBLIC);
        data.push(PROOF_SOURCE_INLINE);
        data.extend_from_slice(&self.merkle_root.to_be_bytes());
        data.extend_from_slice(&self.nullifier_hash.to_be_bytes());
        data.extend_from_slice(&self.public_amount.to_le_bytes());
        data.extend_from_slice(&self.recipient_field_reduced.to_be_bytes());
        data.extend_from_slice(&self.change_commitment.to_be_bytes());
        self.change_blob.write(&mut data);
        data.extend_from_slice(&self.vk_hash.to_be_bytes());
        data.extend_from_slice(self.proof);
        data
    }
}

/// Authority-gated demo instruction injecting a stealth deposit without a
/// real BTC-side confirmation, for devnet exercise of the claim path.
pub struct DemoAddStealthInstruction {
    pub ephemeral_pub: [u8; 33],
    pub amount: u64,
    pub commitment: FieldElement,
}

impl DemoAddStealthInstruction {
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(1 + 33 + 8 + 32);
        data.push(DISC_DEMO_ADD_STEALTH);
        data.extend_from_slice(&self.ephemeral_pub);
        data.extend_from_slice(&self.amount.to_le_bytes());
        data.extend_from_slice(&self.commitment.to_be_bytes());
        data
    }
}

/// Initialize the pool-state account. No payload beyond the discriminator.
pub fn encode_initialize_pool() -> Vec<u8> {
    vec![DISC_INITIALIZE_POOL]
}

/// Initialize the commitment-tree account for a given tree depth.
pub fn encode_initialize_tree(depth: u8) -> Vec<u8> {
    vec![DISC_INITIALIZE_TREE, depth]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_layout_matches_byte_offsets() {
        let ix = ClaimInstruction {
            merkle_root: FieldElement::from_u64(1),
            nullifier_hash: FieldElement::from_u64(2),
            amount: 1_000,
            recipient_field_reduced: FieldElement::from_u64(3),
            vk_hash: FieldElement::from_u64(4),
            proof: &[0xaa, 0xbb, 0xcc],
        };
        let data = ix.encode();
        assert_eq!(data[0], DISC_CLAIM);
        assert_eq!(data[1], PROOF_SOURCE_INLINE);
        assert_eq!(&data[2..34], &FieldElement::from_u64(1).to_be_bytes());
        assert_eq!(&data[34..66], &FieldElement::from_u64(2).to_be_bytes());
        assert_eq!(&data[66..74], &1_000u64.to_le_bytes());
        assert_eq!(&data[74..106], &FieldElement::from_u64(3).to_be_bytes());
        assert_eq!(&data[106..138], &FieldElement::from_u64(4).to_be_bytes());
        assert_eq!(&data[138..], &[0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn spend_split_includes_both_output_blobs() {
        let blob = StealthBlob {
            ephemeral_pub_x: FieldElement::from_u64(9),
            encrypted_amount_with_sign: FieldElement::from_u64(10),
        };
        let ix = SpendSplitInstruction {
            merkle_root: FieldElement::ZERO,
            nullifier_hash: FieldElement::ZERO,
            output_commitment_1: FieldElement::ZERO,
            output_commitment_2: FieldElement::ZERO,
            output_blobs: [blob, blob],
            vk_hash: FieldElement::ZERO,
            proof: &[],
        };
        let data = ix.encode();
        assert_eq!(data[0], DISC_SPEND_SPLIT);
        assert_eq!(data.len(), 1 + 1 + 32 * 4 + 64 * 2 + 32);
    }

    #[test]
    fn demo_add_stealth_round_trips_amount_le() {
        let ix = DemoAddStealthInstruction {
            ephemeral_pub: [2u8; 33],
            amount: 500_000,
            commitment: FieldElement::from_u64(42),
        };
        let data = ix.encode();
        assert_eq!(data[0], DISC_DEMO_ADD_STEALTH);
        assert_eq!(&data[1..34], &[2u8; 33]);
        assert_eq!(&data[34..42], &500_000u64.to_le_bytes());
    }
}
