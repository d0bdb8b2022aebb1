//! Persisted JSON snapshot of the commitment tree (spec §6).
//!
//! Written via write-temp/fsync/rename so a crash never leaves a torn file
//! behind (spec §5's shared-resource policy).

use crate::field::FieldElement;
use crate::tree::commitment_tree::{CommitmentTree, ROOT_HISTORY_SIZE};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
    #[error(transparent)]
    Tree(#[from] crate::tree::commitment_tree::TreeError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLeaf {
    pub commitment: String,
    pub amount: String,
    pub leaf_index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub version: u32,
    pub next_index: u64,
    pub root: String,
    pub frontier: Vec<String>,
    pub history: Vec<String>,
    pub leaves: Vec<SnapshotLeaf>,
}

impl TreeSnapshot {
    pub fn from_tree<const D: usize>(tree: &CommitmentTree<D>) -> Self {
        let (history, history_index) = tree.root_history_raw();
        // Serialize oldest-first starting from the next-write slot, so a
        // reader walking `history` in order sees chronological roots.
        let ordered: Vec<String> = (0..ROOT_HISTORY_SIZE)
            .map(|i| {
                let idx = (history_index as usize + i) % ROOT_HISTORY_SIZE;
                hex::encode(history[idx].to_be_bytes())
            })
            .collect();

        TreeSnapshot {
            version: SNAPSHOT_VERSION,
            next_index: tree.next_index(),
            root: hex::encode(tree.current_root().to_be_bytes()),
            frontier: tree
                .frontier()
                .iter()
                .map(|f| hex::encode(f.to_be_bytes()))
                .collect(),
            history: ordered,
            leaves: tree
                .leaves()
                .map(|(commitment, amount, leaf_index)| SnapshotLeaf {
                    commitment: hex::encode(commitment.to_be_bytes()),
                    amount: amount.to_string(),
                    leaf_index,
                })
                .collect(),
        }
    }

    /// Rebuild a tree by replaying the stored leaves in order, then verify
    /// the resulting root matches what was persisted.
    pub fn rebuild<const D: usize>(&self) -> Result<CommitmentTree<D>, SnapshotError> {
        let mut tree = CommitmentTree::<D>::new();
        let mut leaves = self.leaves.clone();
        leaves.sort_by_key(|l| l.leaf_index);

        for leaf in &leaves {
            let bytes = decode_field(&leaf.commitment)?;
            let amount: u64 = leaf
                .amount
                .parse()
                .map_err(|_| SnapshotError::Malformed(format!("bad amount {}", leaf.amount)))?;
            let idx = tree.append(FieldElement::from_be_bytes_mod_order(&bytes), amount)?;
            if idx != leaf.leaf_index {
                return Err(SnapshotError::Malformed(format!(
                    "leaf index mismatch: expected {}, replay produced {}",
                    leaf.leaf_index, idx
                )));
            }
        }

        let expected_root = decode_field(&self.root)?;
        if tree.current_root() != FieldElement::from_be_bytes_mod_order(&expected_root) {
            return Err(SnapshotError::Malformed(
                "replayed root does not match persisted root".into(),
            ));
        }

        Ok(tree)
    }

    pub fn write_atomic(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| SnapshotError::Malformed(e.to_string()))?;

        {
            let mut file = std::fs::File::create(&tmp_path)?;
            use std::io::Write;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let data = std::fs::read(path)?;
        serde_json::from_slice(&data).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }
}

fn decode_field(hex_str: &str) -> Result<[u8; 32], SnapshotError> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| SnapshotError::Malformed(format!("invalid hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(SnapshotError::Malformed(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_rebuild() {
        let mut tree: CommitmentTree<10> = CommitmentTree::new();
        tree.append(FieldElement::from_u64(1), 1_000).unwrap();
        tree.append(FieldElement::from_u64(2), 2_000).unwrap();

        let snapshot = TreeSnapshot::from_tree(&tree);
        let rebuilt: CommitmentTree<10> = snapshot.rebuild().unwrap();

        assert_eq!(rebuilt.current_root(), tree.current_root());
        assert_eq!(rebuilt.next_index(), tree.next_index());
    }

    #[test]
    fn write_and_read_atomic() {
        let dir = std::env::temp_dir().join(format!("zvault-snapshot-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("commitment-index.json");

        let mut tree: CommitmentTree<10> = CommitmentTree::new();
        tree.append(FieldElement::from_u64(5), 500).unwrap();
        let snapshot = TreeSnapshot::from_tree(&tree);
        snapshot.write_atomic(&path).unwrap();

        let read_back = TreeSnapshot::read_from(&path).unwrap();
        assert_eq!(read_back.next_index, 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
