//! Partial-withdraw circuit: identical shape to the spend-partial-public
//! circuit, but operates against the depth-10 withdrawal tree rather than
//! the main depth-20 deposit tree.

use crate::circuits::inputs::ToFieldElements;
use crate::circuits::spend_partial_public::{
    SpendPartialPublicPrivateInputs, SpendPartialPublicPublicInputs,
};
use crate::field::FieldElement;
use crate::tree::CommitmentTree;

/// The withdrawal-side commitment tree's depth.
pub const WITHDRAW_TREE_DEPTH: usize = 10;

pub type WithdrawTree = CommitmentTree<WITHDRAW_TREE_DEPTH>;

pub type PartialWithdrawPrivateInputs = SpendPartialPublicPrivateInputs;
pub type PartialWithdrawPublicInputs = SpendPartialPublicPublicInputs;

/// Re-exported under this circuit's own name so call sites don't need to
/// know it shares private/public input shapes with the spend-partial-public
/// circuit.
pub fn conserves_amount(private: &PartialWithdrawPrivateInputs, public_amount: u64) -> bool {
    crate::circuits::spend_partial_public::conserves_amount(private, public_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::commit;

    #[test]
    fn withdraw_tree_has_its_own_independent_depth() {
        let tree = WithdrawTree::new();
        assert_eq!(tree.depth(), WITHDRAW_TREE_DEPTH);
        assert_eq!(tree.capacity(), 1u64 << WITHDRAW_TREE_DEPTH);
    }

    #[test]
    fn public_inputs_flatten_matches_spend_partial_public_ordering() {
        let commitment = commit(FieldElement::from_u64(1), FieldElement::from_u64(2));
        let inputs = PartialWithdrawPublicInputs {
            merkle_root: FieldElement::from_u64(10),
            nullifier_hash: FieldElement::from_u64(11),
            public_amount: 500,
            recipient: FieldElement::from_u64(12),
            change_commitment: commitment,
            change_ephemeral_pub_x: FieldElement::ZERO,
            change_encrypted_amount_with_sign: FieldElement::ZERO,
        };
        assert_eq!(inputs.to_field_elements().len(), 7);
    }
}
