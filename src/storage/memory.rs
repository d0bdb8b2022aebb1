//! In-memory note storage, for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::{NoteStore, StorageError, StorageResult};
use crate::field::FieldElement;
use crate::note::Note;

#[derive(Clone)]
struct Entry {
    note: Note,
    spent: bool,
}

/// Thread-safe `Arc<RwLock<HashMap>>`-backed note store.
#[derive(Clone)]
pub struct MemoryNoteStore {
    by_commitment: Arc<RwLock<HashMap<FieldElement, Entry>>>,
    by_nullifier_hash: Arc<RwLock<HashMap<FieldElement, FieldElement>>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self {
            by_commitment: Arc::new(RwLock::new(HashMap::new())),
            by_nullifier_hash: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, note: &Note) -> StorageResult<()> {
        let mut by_commitment = self.by_commitment.write().await;
        if by_commitment.contains_key(&note.commitment) {
            return Err(StorageError::Duplicate(format!(
                "commitment {:?}",
                note.commitment
            )));
        }
        let mut by_nullifier_hash = self.by_nullifier_hash.write().await;
        by_nullifier_hash.insert(note.nullifier_hash, note.commitment);
        by_commitment.insert(
            note.commitment,
            Entry {
                note: *note,
                spent: false,
            },
        );
        Ok(())
    }

    async fn get(&self, commitment: &FieldElement) -> StorageResult<Option<Note>> {
        let by_commitment = self.by_commitment.read().await;
        Ok(by_commitment.get(commitment).map(|e| e.note))
    }

    async fn get_by_nullifier_hash(&self, nullifier_hash: &FieldElement) -> StorageResult<Option<Note>> {
        let by_nullifier_hash = self.by_nullifier_hash.read().await;
        let commitment = match by_nullifier_hash.get(nullifier_hash) {
            Some(c) => *c,
            None => return Ok(None),
        };
        drop(by_nullifier_hash);
        self.get(&commitment).await
    }

    async fn mark_spent(&self, commitment: &FieldElement) -> StorageResult<()> {
        let mut by_commitment = self.by_commitment.write().await;
        let entry = by_commitment
            .get_mut(commitment)
            .ok_or_else(|| StorageError::NotFound(format!("commitment {:?}", commitment)))?;
        entry.spent = true;
        Ok(())
    }

    async fn get_unspent(&self) -> StorageResult<Vec<Note>> {
        let by_commitment = self.by_commitment.read().await;
        Ok(by_commitment
            .values()
            .filter(|e| !e.spent)
            .map(|e| e.note)
            .collect())
    }

    async fn get_all(&self) -> StorageResult<Vec<Note>> {
        let by_commitment = self.by_commitment.read().await;
        Ok(by_commitment.values().map(|e| e.note).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteOrigin;

    fn note(commitment: u64, nullifier_hash: u64) -> Note {
        Note {
            amount: 1_000,
            leaf_index: 0,
            commitment: FieldElement::from_u64(commitment),
            nullifier: FieldElement::from_u64(1),
            nullifier_hash: FieldElement::from_u64(nullifier_hash),
            origin: NoteOrigin::Stealth,
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = MemoryNoteStore::new();
        let n = note(1, 2);
        store.insert(&n).await.unwrap();

        let fetched = store.get(&n.commitment).await.unwrap().unwrap();
        assert_eq!(fetched, n);

        let by_hash = store
            .get_by_nullifier_hash(&n.nullifier_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_hash, n);
    }

    #[tokio::test]
    async fn duplicate_commitment_rejected() {
        let store = MemoryNoteStore::new();
        let n = note(1, 2);
        store.insert(&n).await.unwrap();
        let result = store.insert(&n).await;
        assert!(matches!(result, Err(StorageError::Duplicate(_))));
    }

    #[tokio::test]
    async fn mark_spent_removes_from_unspent_set() {
        let store = MemoryNoteStore::new();
        let n = note(1, 2);
        store.insert(&n).await.unwrap();
        assert_eq!(store.get_unspent().await.unwrap().len(), 1);

        store.mark_spent(&n.commitment).await.unwrap();
        assert_eq!(store.get_unspent().await.unwrap().len(), 0);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_spent_missing_commitment_errors() {
        let store = MemoryNoteStore::new();
        let result = store.mark_spent(&FieldElement::from_u64(99)).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
