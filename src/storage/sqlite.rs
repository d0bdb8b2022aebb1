//! SQLite-backed persistent note storage.
//!
//! Durable storage for notes the indexer has learned about, surviving
//! service restarts. Uses connection pooling via r2d2 for concurrent access.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::traits::{NoteStore, StorageError, StorageResult};
use crate::field::FieldElement;
use crate::note::{Note, NoteOrigin};

pub struct SqliteNoteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteNoteStore {
    /// Creates the database file (and parent directories) if absent, and
    /// runs migrations.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                commitment TEXT PRIMARY KEY,
                nullifier TEXT NOT NULL,
                nullifier_hash TEXT NOT NULL UNIQUE,
                amount INTEGER NOT NULL,
                leaf_index INTEGER NOT NULL,
                origin TEXT NOT NULL,
                spent INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_notes_nullifier_hash ON notes(nullifier_hash);
            CREATE INDEX IF NOT EXISTS idx_notes_spent ON notes(spent);
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
        let commitment: String = row.get("commitment")?;
        let nullifier: String = row.get("nullifier")?;
        let nullifier_hash: String = row.get("nullifier_hash")?;
        let origin: String = row.get("origin")?;

        Ok(Note {
            amount: row.get::<_, i64>("amount")? as u64,
            leaf_index: row.get::<_, i64>("leaf_index")? as u64,
            commitment: decode_field(&commitment),
            nullifier: decode_field(&nullifier),
            nullifier_hash: decode_field(&nullifier_hash),
            origin: if origin == "claim_link" {
                NoteOrigin::ClaimLink
            } else {
                NoteOrigin::Stealth
            },
        })
    }

    fn insert_sync(&self, note: &Note) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO notes (commitment, nullifier, nullifier_hash, amount, leaf_index, origin, spent)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
            "#,
            params![
                encode_field(&note.commitment),
                encode_field(&note.nullifier),
                encode_field(&note.nullifier_hash),
                note.amount as i64,
                note.leaf_index as i64,
                origin_str(note.origin),
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.extended_code == 1555 || err.extended_code == 2067 {
                    return StorageError::Duplicate(encode_field(&note.commitment));
                }
            }
            StorageError::Database(e.to_string())
        })?;
        Ok(())
    }

    fn get_sync(&self, commitment: &FieldElement) -> Result<Option<Note>, StorageError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT * FROM notes WHERE commitment = ?1",
            params![encode_field(commitment)],
            Self::row_to_note,
        )
        .optional()
        .map_err(|e| StorageError::Database(e.to_string()))
    }

    fn get_by_nullifier_hash_sync(&self, nullifier_hash: &FieldElement) -> Result<Option<Note>, StorageError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT * FROM notes WHERE nullifier_hash = ?1",
            params![encode_field(nullifier_hash)],
            Self::row_to_note,
        )
        .optional()
        .map_err(|e| StorageError::Database(e.to_string()))
    }

    fn mark_spent_sync(&self, commitment: &FieldElement) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let rows = conn
            .execute(
                "UPDATE notes SET spent = 1 WHERE commitment = ?1",
                params![encode_field(commitment)],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        if rows == 0 {
            return Err(StorageError::NotFound(encode_field(commitment)));
        }
        Ok(())
    }

    fn get_unspent_sync(&self) -> Result<Vec<Note>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT * FROM notes WHERE spent = 0 ORDER BY leaf_index ASC")
            .map_err(|e| StorageError::Database(e.to_string()))?;
        stmt.query_map([], Self::row_to_note)
            .map_err(|e| StorageError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    fn get_all_sync(&self) -> Result<Vec<Note>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT * FROM notes ORDER BY leaf_index ASC")
            .map_err(|e| StorageError::Database(e.to_string()))?;
        stmt.query_map([], Self::row_to_note)
            .map_err(|e| StorageError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

fn encode_field(fe: &FieldElement) -> String {
    hex::encode(fe.to_be_bytes())
}

fn decode_field(s: &str) -> FieldElement {
    let mut bytes = [0u8; 32];
    if let Ok(decoded) = hex::decode(s) {
        if decoded.len() == 32 {
            bytes.copy_from_slice(&decoded);
        }
    }
    FieldElement::from_be_bytes_mod_order(&bytes)
}

fn origin_str(origin: NoteOrigin) -> &'static str {
    match origin {
        NoteOrigin::Stealth => "stealth",
        NoteOrigin::ClaimLink => "claim_link",
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn insert(&self, note: &Note) -> StorageResult<()> {
        self.insert_sync(note)
    }

    async fn get(&self, commitment: &FieldElement) -> StorageResult<Option<Note>> {
        self.get_sync(commitment)
    }

    async fn get_by_nullifier_hash(&self, nullifier_hash: &FieldElement) -> StorageResult<Option<Note>> {
        self.get_by_nullifier_hash_sync(nullifier_hash)
    }

    async fn mark_spent(&self, commitment: &FieldElement) -> StorageResult<()> {
        self.mark_spent_sync(commitment)
    }

    async fn get_unspent(&self) -> StorageResult<Vec<Note>> {
        self.get_unspent_sync()
    }

    async fn get_all(&self) -> StorageResult<Vec<Note>> {
        self.get_all_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
        let store = SqliteNoteStore::in_memory().unwrap();
        let n = note(1, 2);
        store.insert(&n).await.unwrap();

        let fetched = store.get(&n.commitment).await.unwrap().unwrap();
        assert_eq!(fetched, n);
    }

    #[tokio::test]
    async fn duplicate_commitment_rejected() {
        let store = SqliteNoteStore::in_memory().unwrap();
        let n = note(1, 2);
        store.insert(&n).await.unwrap();
        let result = store.insert(&n).await;
        assert!(matches!(result, Err(StorageError::Duplicate(_))));
    }

    #[tokio::test]
    async fn mark_spent_then_unspent_excludes_it() {
        let store = SqliteNoteStore::in_memory().unwrap();
        let n = note(1, 2);
        store.insert(&n).await.unwrap();

        store.mark_spent(&n.commitment).await.unwrap();
        assert_eq!(store.get_unspent().await.unwrap().len(), 0);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }
}
