//! Shared proof-input assembly helpers.
//!
//! The core marshals circuit inputs as ordered 32-byte field elements; it
//! never touches the SNARK itself (UltraHonk/Barretenberg stays out of
//! tree per spec §1).

use crate::field::FieldElement;
use crate::tree::commitment_tree::{verify_merkle_proof, MerkleProof};

/// Implemented by every circuit's public/private input struct.
pub trait ToFieldElements {
    fn to_field_elements(&self) -> Vec<FieldElement>;
}

/// Flatten a `Vec<FieldElement>` into the 32-byte-chunked byte stream the
/// instruction encoders expect.
pub fn flatten_to_bytes(elements: &[FieldElement]) -> Vec<u8> {
    let mut out = Vec::with_capacity(elements.len() * 32);
    for e in elements {
        out.extend_from_slice(&e.to_be_bytes());
    }
    out
}

/// Cheap sanity check before handing inputs to the (out-of-tree) prover:
/// locally fold the proof and confirm it reconstructs the claimed root.
pub fn verify_proof_locally(commitment: FieldElement, proof: &MerkleProof) -> bool {
    verify_merkle_proof(commitment, proof) == proof.root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_preserves_order_and_width() {
        let elements = vec![FieldElement::from_u64(1), FieldElement::from_u64(2)];
        let bytes = flatten_to_bytes(&elements);
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[..32], &FieldElement::from_u64(1).to_be_bytes());
        assert_eq!(&bytes[32..], &FieldElement::from_u64(2).to_be_bytes());
    }
}
