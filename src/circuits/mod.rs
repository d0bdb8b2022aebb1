//! Circuit input assembly. The core never runs a prover; it only builds
//! and orders the field elements each circuit expects, and does the cheap
//! local checks that catch a doomed proof request before it's submitted.

pub mod claim;
pub mod inputs;
pub mod partial_withdraw;
pub mod spend_partial_public;
pub mod spend_split;

pub use claim::{assemble_claim_inputs, ClaimAssemblyError, ClaimPrivateInputs, ClaimPublicInputs};
pub use inputs::{flatten_to_bytes, verify_proof_locally, ToFieldElements};
pub use partial_withdraw::{
    PartialWithdrawPrivateInputs, PartialWithdrawPublicInputs, WithdrawTree, WITHDRAW_TREE_DEPTH,
};
pub use spend_partial_public::{SpendPartialPublicPrivateInputs, SpendPartialPublicPublicInputs};
pub use spend_split::{SpendSplitPrivateInputs, SpendSplitPublicInputs};
