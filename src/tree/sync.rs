//! Rebuild-from-chain sync: replay `Announcement`s in leaf-index order and
//! confirm the resulting root matches the on-chain mirror (spec §4.4's sync
//! protocol, exercised by scenario F — a gap or a tampered announcement must
//! surface as a divergence rather than a silently wrong tree).

use std::collections::HashSet;

use thiserror::Error;

use crate::announcement::Announcement;
use crate::field::FieldElement;
use crate::tree::commitment_tree::{CommitmentTree, TreeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("tree error during replay: {0}")]
    Tree(#[from] TreeError),

    #[error("leaf index {0} is missing from the announcement set")]
    MissingLeafIndex(u64),

    #[error("leaf index {0} appears more than once")]
    DuplicateLeafIndex(u64),

    #[error("rebuilt root disagrees with the on-chain root")]
    Divergence {
        local: FieldElement,
        on_chain: FieldElement,
    },
}

/// Replays `announcements` (in any order) into a fresh `CommitmentTree<D>`
/// and checks the result against `on_chain_root`.
///
/// Announcements are sorted by `leaf_index` before replay; a gap or a
/// repeated index is rejected outright rather than silently producing the
/// wrong tree shape.
pub fn sync_from_announcements<const D: usize>(
    mut announcements: Vec<Announcement>,
    on_chain_root: FieldElement,
) -> Result<CommitmentTree<D>, SyncError> {
    announcements.sort_by_key(|a| a.leaf_index);

    let mut seen = HashSet::with_capacity(announcements.len());
    for a in &announcements {
        if !seen.insert(a.leaf_index) {
            return Err(SyncError::DuplicateLeafIndex(a.leaf_index));
        }
    }

    let mut tree = CommitmentTree::<D>::new();
    for (expected_index, a) in announcements.into_iter().enumerate() {
        if a.leaf_index != expected_index as u64 {
            return Err(SyncError::MissingLeafIndex(expected_index as u64));
        }
        tree.append(a.commitment, a.amount)?;
    }

    if tree.current_root() != on_chain_root {
        return Err(SyncError::Divergence {
            local: tree.current_root(),
            on_chain: on_chain_root,
        });
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurvePoint;
    use crate::hash::commit;

    fn announcement(leaf_index: u64, commitment: FieldElement, amount: u64) -> Announcement {
        Announcement {
            bump: 255,
            ephemeral_pub: CurvePoint::generator(),
            amount,
            commitment,
            leaf_index,
            created_at: 0,
        }
    }

    #[test]
    fn rebuilds_and_matches_on_chain_root() {
        let mut reference: CommitmentTree<10> = CommitmentTree::new();
        let c0 = commit(FieldElement::from_u64(1), FieldElement::from_u64(2));
        let c1 = commit(FieldElement::from_u64(3), FieldElement::from_u64(4));
        reference.append(c0, 100).unwrap();
        reference.append(c1, 200).unwrap();
        let root = reference.current_root();

        let announcements = vec![announcement(1, c1, 200), announcement(0, c0, 100)];
        let rebuilt = sync_from_announcements::<10>(announcements, root).unwrap();
        assert_eq!(rebuilt.current_root(), root);
        assert_eq!(rebuilt.next_index(), 2);
    }

    #[test]
    fn missing_leaf_in_the_middle_is_a_gap_not_a_silent_tree() {
        let c0 = commit(FieldElement::from_u64(1), FieldElement::from_u64(2));
        let c2 = commit(FieldElement::from_u64(5), FieldElement::from_u64(6));
        let announcements = vec![announcement(0, c0, 100), announcement(2, c2, 300)];
        let result = sync_from_announcements::<10>(announcements, FieldElement::ZERO);
        assert_eq!(result, Err(SyncError::MissingLeafIndex(1)));
    }

    #[test]
    fn duplicate_leaf_index_is_rejected() {
        let c0 = commit(FieldElement::from_u64(1), FieldElement::from_u64(2));
        let announcements = vec![announcement(0, c0, 100), announcement(0, c0, 100)];
        let result = sync_from_announcements::<10>(announcements, FieldElement::ZERO);
        assert_eq!(result, Err(SyncError::DuplicateLeafIndex(0)));
    }

    #[test]
    fn wrong_on_chain_root_surfaces_as_divergence() {
        let c0 = commit(FieldElement::from_u64(1), FieldElement::from_u64(2));
        let announcements = vec![announcement(0, c0, 100)];
        let result = sync_from_announcements::<10>(announcements, FieldElement::from_u64(999));
        assert!(matches!(result, Err(SyncError::Divergence { .. })));
    }
}
