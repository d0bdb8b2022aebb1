//! The indexer service: owns the canonical in-memory commitment tree as a
//! single-writer resource (spec §5), and drives the rebuild-from-chain sync
//! protocol (spec §4.4) against a pluggable `ChainReader` so the service is
//! testable without a live RPC connection.

use tokio::sync::RwLock;

use crate::announcement::Announcement;
use crate::chain::ChainError;
use crate::common::error::{Result, ZVaultError};
use crate::curve::{CurvePoint, Scalar};
use crate::field::FieldElement;
use crate::keys::{scan_announcement, ScannedNote};
use crate::tree::{sync_from_announcements, DepositTree, MerkleProof, DEPOSIT_TREE_DEPTH};

/// The indexer's abstraction over "read the canonical on-chain state": the
/// announcement set and the current root. A `SolanaChainReader` backs this
/// with a live RPC connection; `StaticChainReader` backs it with a fixture
/// for tests.
pub trait ChainReader: Send + Sync {
    fn fetch_announcements(&self) -> std::result::Result<Vec<Announcement>, ChainError>;
    fn fetch_current_root(&self) -> std::result::Result<FieldElement, ChainError>;
}

/// Test-only `ChainReader` backed by a fixed announcement set and root.
pub struct StaticChainReader {
    announcements: Vec<Announcement>,
    root: FieldElement,
}

impl StaticChainReader {
    pub fn new(announcements: Vec<Announcement>, root: FieldElement) -> Self {
        Self { announcements, root }
    }
}

impl ChainReader for StaticChainReader {
    fn fetch_announcements(&self) -> std::result::Result<Vec<Announcement>, ChainError> {
        Ok(self.announcements.clone())
    }

    fn fetch_current_root(&self) -> std::result::Result<FieldElement, ChainError> {
        Ok(self.root)
    }
}

/// Result of one sync pass against a `ChainReader`: whether the local tree
/// now agrees with the on-chain root, and the roots/index that produced
/// that verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub synced: bool,
    pub local_root: FieldElement,
    pub on_chain_root: FieldElement,
    pub next_index: u64,
}

/// Notes recovered from one scan pass, plus how many announcements were
/// examined.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub notes: Vec<ScannedNote>,
    pub examined: usize,
}

/// Owns one `CommitmentTree<20>` as the single-writer resource described in
/// spec §5: writers (`append`, `resync`) take the write lock, readers
/// (`scan`, `prove`, `current_root`) take the read lock.
pub struct IndexerService {
    tree: RwLock<DepositTree>,
}

impl IndexerService {
    pub fn new() -> Self {
        Self { tree: RwLock::new(DepositTree::new()) }
    }

    pub fn from_tree(tree: DepositTree) -> Self {
        Self { tree: RwLock::new(tree) }
    }

    pub async fn append(&self, commitment: FieldElement, amount: u64) -> Result<u64> {
        let mut tree = self.tree.write().await;
        tree.append(commitment, amount).map_err(ZVaultError::from)
    }

    pub async fn current_root(&self) -> FieldElement {
        self.tree.read().await.current_root()
    }

    pub async fn next_index(&self) -> u64 {
        self.tree.read().await.next_index()
    }

    pub async fn is_valid_root(&self, root: &FieldElement) -> bool {
        self.tree.read().await.contains_root(root)
    }

    pub async fn prove(&self, commitment: &FieldElement) -> Result<MerkleProof> {
        self.tree.read().await.prove(commitment).map_err(ZVaultError::from)
    }

    /// Rebuild-from-chain sync (spec §4.4): replay announcements in
    /// leaf-index order and compare the result against the on-chain root.
    /// On success the rebuilt tree becomes canonical; on divergence or gap
    /// the existing tree is left untouched and the mismatch is surfaced,
    /// never silently papered over.
    pub async fn resync(&self, reader: &dyn ChainReader) -> Result<SyncStatus> {
        let announcements = reader.fetch_announcements()?;
        let on_chain_root = reader.fetch_current_root()?;
        let local_root_before = self.current_root().await;

        match sync_from_announcements::<DEPOSIT_TREE_DEPTH>(announcements, on_chain_root) {
            Ok(rebuilt) => {
                let next_index = rebuilt.next_index();
                let mut tree = self.tree.write().await;
                *tree = rebuilt;
                Ok(SyncStatus {
                    synced: true,
                    local_root: on_chain_root,
                    on_chain_root,
                    next_index,
                })
            }
            Err(crate::tree::SyncError::Divergence { local, .. }) => Ok(SyncStatus {
                synced: false,
                local_root: local,
                on_chain_root,
                next_index: self.next_index().await,
            }),
            Err(_) => Ok(SyncStatus {
                synced: false,
                local_root: local_root_before,
                on_chain_root,
                next_index: self.next_index().await,
            }),
        }
    }

    /// Read-only scan of a batch of announcements against a viewing key
    /// (spec §4.3). Safe to run against a stale snapshot of announcements —
    /// the caller must re-fetch a Merkle proof before spending anything
    /// this returns.
    pub async fn scan(
        &self,
        viewing_priv: &Scalar,
        spending_pub: &CurvePoint,
        announcements: &[Announcement],
    ) -> ScanResult {
        let mut notes = Vec::new();
        for a in announcements {
            if let Some(note) = scan_announcement(
                viewing_priv,
                spending_pub,
                &a.ephemeral_pub,
                a.amount,
                a.commitment,
            ) {
                notes.push(note);
            }
        }
        ScanResult { notes, examined: announcements.len() }
    }
}

impl Default for IndexerService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::commit;
    use crate::keys::MetaAddress;
    use crate::keys::{derive_stealth_output_with_scalar, StealthOutput};

    fn meta_address() -> (Scalar, Scalar, MetaAddress) {
        let spending_priv = Scalar::from_be_bytes_mod_order(&[7u8; 32]);
        let viewing_priv = Scalar::from_be_bytes_mod_order(&[9u8; 32]);
        let meta = MetaAddress {
            spending_pub: CurvePoint::generator().mul(&spending_priv),
            viewing_pub: CurvePoint::generator().mul(&viewing_priv),
        };
        (spending_priv, viewing_priv, meta)
    }

    fn announcement_for(output: &StealthOutput, leaf_index: u64) -> Announcement {
        Announcement {
            bump: 255,
            ephemeral_pub: output.ephemeral_pub,
            amount: output.amount,
            commitment: output.commitment,
            leaf_index,
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn append_and_prove_round_trip() {
        let indexer = IndexerService::new();
        let commitment = commit(FieldElement::from_u64(1), FieldElement::from_u64(1000));
        let idx = indexer.append(commitment, 1000).await.unwrap();
        assert_eq!(idx, 0);

        let proof = indexer.prove(&commitment).await.unwrap();
        assert_eq!(proof.root, indexer.current_root().await);
        assert!(indexer.is_valid_root(&indexer.current_root().await).await);
    }

    #[tokio::test]
    async fn scan_recovers_notes_addressed_to_the_viewing_key() {
        let (_spending_priv, viewing_priv, meta) = meta_address();
        let e = Scalar::from_be_bytes_mod_order(&[42u8; 32]);
        let output = derive_stealth_output_with_scalar(&meta, 50_000, &e);
        let announcements = vec![announcement_for(&output, 0)];

        let indexer = IndexerService::new();
        let result = indexer.scan(&viewing_priv, &meta.spending_pub, &announcements).await;
        assert_eq!(result.examined, 1);
        assert_eq!(result.notes.len(), 1);
        assert_eq!(result.notes[0].amount, 50_000);
    }

    #[tokio::test]
    async fn resync_rebuilds_tree_and_matches_on_chain_root() {
        let mut reference = DepositTree::new();
        let c0 = commit(FieldElement::from_u64(1), FieldElement::from_u64(100));
        reference.append(c0, 100).unwrap();
        let root = reference.current_root();

        let announcement = Announcement {
            bump: 0,
            ephemeral_pub: CurvePoint::generator(),
            amount: 100,
            commitment: c0,
            leaf_index: 0,
            created_at: 0,
        };
        let reader = StaticChainReader::new(vec![announcement], root);

        let indexer = IndexerService::new();
        let status = indexer.resync(&reader).await.unwrap();
        assert!(status.synced);
        assert_eq!(status.on_chain_root, root);
        assert_eq!(indexer.current_root().await, root);
    }

    #[tokio::test]
    async fn resync_leaves_local_tree_untouched_on_divergence() {
        let announcement = Announcement {
            bump: 0,
            ephemeral_pub: CurvePoint::generator(),
            amount: 100,
            commitment: FieldElement::from_u64(1),
            leaf_index: 0,
            created_at: 0,
        };
        let reader = StaticChainReader::new(vec![announcement], FieldElement::from_u64(999));

        let indexer = IndexerService::new();
        let before = indexer.current_root().await;
        let status = indexer.resync(&reader).await.unwrap();
        assert!(!status.synced);
        assert_eq!(indexer.current_root().await, before);
    }

    #[tokio::test]
    async fn resync_reports_the_rebuilt_divergent_root_verbatim() {
        let mut reference = DepositTree::new();
        let c0 = commit(FieldElement::from_u64(1), FieldElement::from_u64(100));
        reference.append(c0, 100).unwrap();
        let rebuilt_root = reference.current_root();

        let announcement = Announcement {
            bump: 0,
            ephemeral_pub: CurvePoint::generator(),
            amount: 100,
            commitment: c0,
            leaf_index: 0,
            created_at: 0,
        };
        let bogus_on_chain_root = FieldElement::from_u64(999);
        let reader = StaticChainReader::new(vec![announcement], bogus_on_chain_root);

        let indexer = IndexerService::new();
        let status = indexer.resync(&reader).await.unwrap();
        assert!(!status.synced);
        // Scenario F: the rebuild's own computed root, not the pre-resync
        // in-memory root, must be reported.
        assert_eq!(status.local_root, rebuilt_root);
        assert_eq!(status.on_chain_root, bogus_on_chain_root);
    }
}
