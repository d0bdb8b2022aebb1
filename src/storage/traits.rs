//! Storage trait definitions.
//!
//! Defines the abstract persistence interface for notes the indexer has
//! learned about via stealth scanning or a claim link. Implementations:
//! SQLite for production, in-memory for tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::field::FieldElement;
use crate::note::Note;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("connection error: {0}")]
    Connection(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for notes discovered by the indexer.
///
/// Implementations:
/// - `SqliteNoteStore` - production storage with SQLite
/// - `MemoryNoteStore` - in-memory storage for testing
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a newly discovered note. Errors with `Duplicate` if a note
    /// with the same commitment already exists.
    async fn insert(&self, note: &Note) -> StorageResult<()>;

    /// Look up a note by its commitment.
    async fn get(&self, commitment: &FieldElement) -> StorageResult<Option<Note>>;

    /// Look up a note by its nullifier hash, used when reconciling
    /// on-chain `NullifierRecord`s against locally known notes.
    async fn get_by_nullifier_hash(&self, nullifier_hash: &FieldElement) -> StorageResult<Option<Note>>;

    /// Mark a note spent. A no-op if the note is already marked (the
    /// on-chain nullifier record, not this flag, is authoritative).
    async fn mark_spent(&self, commitment: &FieldElement) -> StorageResult<()>;

    /// All notes not yet marked spent.
    async fn get_unspent(&self) -> StorageResult<Vec<Note>>;

    /// Every known note, spent or not.
    async fn get_all(&self) -> StorageResult<Vec<Note>>;
}
