//! The incremental commitment accumulator: in-memory tree, its on-chain
//! mirror layout, and its persisted JSON snapshot.

pub mod commitment_tree;
pub mod snapshot;
pub mod sync;
pub mod wire;

pub use commitment_tree::{CommitmentTree, MerkleProof, TreeError, ROOT_HISTORY_SIZE};
pub use snapshot::{TreeSnapshot, SNAPSHOT_VERSION};
pub use sync::{sync_from_announcements, SyncError};
pub use wire::{CommitmentTreeAccount, COMMITMENT_TREE_DISCRIMINATOR};

/// Depth of the main deposit tree. Independent from the split/partial-withdraw
/// trees' depth (see `circuits::partial_withdraw::WITHDRAW_TREE_DEPTH`) per
/// Open Question 4 — one is never derived from the other.
pub const DEPOSIT_TREE_DEPTH: usize = 20;

pub type DepositTree = CommitmentTree<DEPOSIT_TREE_DEPTH>;
