//! Claim circuit: proves ownership of a note and burns it against a
//! recipient (spec §4.5).

use crate::circuits::inputs::{verify_proof_locally, ToFieldElements};
use crate::curve::{CurvePoint, Scalar};
use crate::field::FieldElement;
use crate::hash::{commit, nullifier, nullifier_hash as compute_nullifier_hash};
use crate::tree::commitment_tree::MerkleProof;
use thiserror::Error;

pub struct ClaimPrivateInputs {
    pub stealth_priv: Scalar,
    pub amount: u64,
    pub leaf_index: u64,
    pub siblings: Vec<FieldElement>,
    pub indices: Vec<u8>,
}

impl ToFieldElements for ClaimPrivateInputs {
    fn to_field_elements(&self) -> Vec<FieldElement> {
        let mut out = Vec::with_capacity(3 + self.siblings.len() + self.indices.len());
        out.push(FieldElement::from_be_bytes_mod_order(&self.stealth_priv.to_be_bytes()));
        out.push(FieldElement::from_u64(self.amount));
        out.push(FieldElement::from_u64(self.leaf_index));
        out.extend_from_slice(&self.siblings);
        out.extend(self.indices.iter().map(|b| FieldElement::from_u64(*b as u64)));
        out
    }
}

/// Errors from assembling claim-circuit inputs (spec §4.5).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimAssemblyError {
    /// The locally folded Merkle proof does not reconstruct the claimed root.
    #[error("merkle proof does not reconstruct the claimed root")]
    ProofMismatch,
}

/// Input-assembly algorithm, claim path (spec §4.5 steps 3-4): given a
/// note's private witness, a Merkle proof already fetched for its
/// commitment, and the public recipient/amount, build the circuit's
/// private and public input structs after the cheap local checks that
/// catch a doomed proof request before it reaches the (out-of-tree)
/// prover.
///
/// Callers are responsible for steps 1-2 (parsing the claim link or
/// locating the note, and fetching `proof` from the indexer) since those
/// depend on which note-derivation path produced the note.
pub fn assemble_claim_inputs(
    stealth_priv: Scalar,
    amount: u64,
    leaf_index: u64,
    recipient: FieldElement,
    proof: &MerkleProof,
) -> Result<(ClaimPrivateInputs, ClaimPublicInputs), ClaimAssemblyError> {
    let stealth_pub = CurvePoint::generator().mul(&stealth_priv);
    let stealth_priv_fe = FieldElement::from_be_bytes_mod_order(&stealth_priv.to_be_bytes());

    let commitment = commit(stealth_pub.x_field_element(), FieldElement::from_u64(amount));
    if !verify_proof_locally(commitment, proof) {
        return Err(ClaimAssemblyError::ProofMismatch);
    }

    let n = nullifier(stealth_priv_fe, FieldElement::from_u64(leaf_index));
    let nullifier_hash_value = compute_nullifier_hash(n);

    let private = ClaimPrivateInputs {
        stealth_priv,
        amount,
        leaf_index,
        siblings: proof.siblings.clone(),
        indices: proof.indices.clone(),
    };
    let public = ClaimPublicInputs {
        merkle_root: proof.root,
        nullifier_hash: nullifier_hash_value,
        amount,
        recipient,
    };

    Ok((private, public))
}

pub struct ClaimPublicInputs {
    pub merkle_root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub amount: u64,
    /// Field-reduced on-chain recipient address.
    pub recipient: FieldElement,
}

impl ToFieldElements for ClaimPublicInputs {
    fn to_field_elements(&self) -> Vec<FieldElement> {
        vec![
            self.merkle_root,
            self.nullifier_hash,
            FieldElement::from_u64(self.amount),
            self.recipient,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::commitment_tree::CommitmentTree;

    #[test]
    fn assembles_valid_inputs_for_an_appended_note() {
        let mut tree: CommitmentTree<20> = CommitmentTree::new();
        let stealth_priv = Scalar::from_be_bytes_mod_order(&[13u8; 32]);
        let stealth_pub = CurvePoint::generator().mul(&stealth_priv);
        let amount = 250_000u64;
        let commitment = commit(stealth_pub.x_field_element(), FieldElement::from_u64(amount));

        let leaf_index = tree.append(commitment, amount).unwrap();
        let proof = tree.prove(&commitment).unwrap();

        let (private, public) = assemble_claim_inputs(
            stealth_priv,
            amount,
            leaf_index,
            FieldElement::from_u64(42),
            &proof,
        )
        .unwrap();

        assert_eq!(public.merkle_root, tree.current_root());
        assert_eq!(public.amount, amount);
        assert_eq!(private.leaf_index, leaf_index);
        assert_eq!(
            public.nullifier_hash,
            compute_nullifier_hash(nullifier(
                FieldElement::from_be_bytes_mod_order(&stealth_priv.to_be_bytes()),
                FieldElement::from_u64(leaf_index)
            ))
        );
    }

    #[test]
    fn rejects_a_proof_for_a_different_commitment() {
        let mut tree: CommitmentTree<20> = CommitmentTree::new();
        let real = FieldElement::from_u64(1);
        tree.append(real, 100).unwrap();
        let proof = tree.prove(&real).unwrap();

        let wrong_stealth_priv = Scalar::from_be_bytes_mod_order(&[99u8; 32]);
        let err = assemble_claim_inputs(
            wrong_stealth_priv,
            100,
            0,
            FieldElement::from_u64(1),
            &proof,
        )
        .unwrap_err();
        assert_eq!(err, ClaimAssemblyError::ProofMismatch);
    }

    #[test]
    fn public_inputs_are_ordered_root_hash_amount_recipient() {
        let inputs = ClaimPublicInputs {
            merkle_root: FieldElement::from_u64(1),
            nullifier_hash: FieldElement::from_u64(2),
            amount: 3,
            recipient: FieldElement::from_u64(4),
        };
        let flattened = inputs.to_field_elements();
        assert_eq!(
            flattened,
            vec![
                FieldElement::from_u64(1),
                FieldElement::from_u64(2),
                FieldElement::from_u64(3),
                FieldElement::from_u64(4),
            ]
        );
    }
}
