//! Spend-split circuit: consumes one note, produces two (spec §4.5).

use crate::circuits::inputs::ToFieldElements;
use crate::curve::Scalar;
use crate::field::FieldElement;

/// One of the two outgoing stealth outputs.
pub struct SplitOutput {
    pub stealth_pub_x: FieldElement,
    pub amount: u64,
    pub ephemeral_pub_x: FieldElement,
    pub encrypted_amount_with_sign: FieldElement,
}

pub struct SpendSplitPrivateInputs {
    pub input_stealth_priv: Scalar,
    pub input_amount: u64,
    pub input_leaf_index: u64,
    pub input_siblings: Vec<FieldElement>,
    pub input_indices: Vec<u8>,
    pub outputs: [SplitOutput; 2],
}

impl ToFieldElements for SpendSplitPrivateInputs {
    fn to_field_elements(&self) -> Vec<FieldElement> {
        let mut out = Vec::new();
        out.push(FieldElement::from_be_bytes_mod_order(
            &self.input_stealth_priv.to_be_bytes(),
        ));
        out.push(FieldElement::from_u64(self.input_amount));
        out.push(FieldElement::from_u64(self.input_leaf_index));
        out.extend_from_slice(&self.input_siblings);
        out.extend(self.input_indices.iter().map(|b| FieldElement::from_u64(*b as u64)));
        for o in &self.outputs {
            out.push(o.stealth_pub_x);
            out.push(FieldElement::from_u64(o.amount));
            out.push(o.ephemeral_pub_x);
            out.push(o.encrypted_amount_with_sign);
        }
        out
    }
}

pub struct OutputStealthBlob {
    pub ephemeral_pub_x: FieldElement,
    pub encrypted_amount_with_sign: FieldElement,
}

pub struct SpendSplitPublicInputs {
    pub merkle_root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub output_commitment_1: FieldElement,
    pub output_commitment_2: FieldElement,
    pub output_blobs: [OutputStealthBlob; 2],
}

impl ToFieldElements for SpendSplitPublicInputs {
    fn to_field_elements(&self) -> Vec<FieldElement> {
        let mut out = vec![
            self.merkle_root,
            self.nullifier_hash,
            self.output_commitment_1,
            self.output_commitment_2,
        ];
        for blob in &self.output_blobs {
            out.push(blob.ephemeral_pub_x);
            out.push(blob.encrypted_amount_with_sign);
        }
        out
    }
}

/// Conservation check enforced in-circuit; the core verifies it locally
/// too, as a cheap sanity pass before submission.
pub fn conserves_amount(private: &SpendSplitPrivateInputs) -> bool {
    let total: u128 = private.outputs.iter().map(|o| o.amount as u128).sum();
    total == private.input_amount as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_output() -> SplitOutput {
        SplitOutput {
            stealth_pub_x: FieldElement::ZERO,
            amount: 0,
            ephemeral_pub_x: FieldElement::ZERO,
            encrypted_amount_with_sign: FieldElement::ZERO,
        }
    }

    #[test]
    fn conservation_holds_when_outputs_sum_to_input() {
        let mut private = SpendSplitPrivateInputs {
            input_stealth_priv: crate::curve::Scalar::from_be_bytes_mod_order(&[1u8; 32]),
            input_amount: 100,
            input_leaf_index: 0,
            input_siblings: vec![],
            input_indices: vec![],
            outputs: [zero_output(), zero_output()],
        };
        private.outputs[0].amount = 60;
        private.outputs[1].amount = 40;
        assert!(conserves_amount(&private));

        private.outputs[1].amount = 41;
        assert!(!conserves_amount(&private));
    }
}
