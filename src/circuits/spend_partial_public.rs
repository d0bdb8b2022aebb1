//! Spend-partial-public circuit: one input note splits into a public
//! (on-chain visible) payout and a private change output.

use crate::circuits::inputs::ToFieldElements;
use crate::curve::Scalar;
use crate::field::FieldElement;

pub struct SpendPartialPublicPrivateInputs {
    pub input_stealth_priv: Scalar,
    pub input_amount: u64,
    pub input_leaf_index: u64,
    pub input_siblings: Vec<FieldElement>,
    pub input_indices: Vec<u8>,
    pub change_amount: u64,
    pub change_stealth_pub_x: FieldElement,
    pub change_ephemeral_pub_x: FieldElement,
    pub change_encrypted_amount_with_sign: FieldElement,
}

impl ToFieldElements for SpendPartialPublicPrivateInputs {
    fn to_field_elements(&self) -> Vec<FieldElement> {
        let mut out = Vec::new();
        out.push(FieldElement::from_be_bytes_mod_order(
            &self.input_stealth_priv.to_be_bytes(),
        ));
        out.push(FieldElement::from_u64(self.input_amount));
        out.push(FieldElement::from_u64(self.input_leaf_index));
        out.extend_from_slice(&self.input_siblings);
        out.extend(self.input_indices.iter().map(|b| FieldElement::from_u64(*b as u64)));
        out.push(FieldElement::from_u64(self.change_amount));
        out.push(self.change_stealth_pub_x);
        out.push(self.change_ephemeral_pub_x);
        out.push(self.change_encrypted_amount_with_sign);
        out
    }
}

pub struct SpendPartialPublicPublicInputs {
    pub merkle_root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub public_amount: u64,
    pub recipient: FieldElement,
    pub change_commitment: FieldElement,
    pub change_ephemeral_pub_x: FieldElement,
    pub change_encrypted_amount_with_sign: FieldElement,
}

impl ToFieldElements for SpendPartialPublicPublicInputs {
    fn to_field_elements(&self) -> Vec<FieldElement> {
        vec![
            self.merkle_root,
            self.nullifier_hash,
            FieldElement::from_u64(self.public_amount),
            self.recipient,
            self.change_commitment,
            self.change_ephemeral_pub_x,
            self.change_encrypted_amount_with_sign,
        ]
    }
}

/// `amount_in == publicAmount + changeAmount`, checked in-circuit; mirrored
/// here so callers can fail fast before submitting a doomed proof request.
pub fn conserves_amount(private: &SpendPartialPublicPrivateInputs, public_amount: u64) -> bool {
    private.input_amount as u128 == public_amount as u128 + private.change_amount as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_private() -> SpendPartialPublicPrivateInputs {
        SpendPartialPublicPrivateInputs {
            input_stealth_priv: Scalar::from_be_bytes_mod_order(&[7u8; 32]),
            input_amount: 1_000,
            input_leaf_index: 3,
            input_siblings: vec![],
            input_indices: vec![],
            change_amount: 400,
            change_stealth_pub_x: FieldElement::ZERO,
            change_ephemeral_pub_x: FieldElement::ZERO,
            change_encrypted_amount_with_sign: FieldElement::ZERO,
        }
    }

    #[test]
    fn conservation_checks_public_plus_change_against_input() {
        let private = base_private();
        assert!(conserves_amount(&private, 600));
        assert!(!conserves_amount(&private, 601));
    }
}
