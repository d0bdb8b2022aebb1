//! zVault shielded-bridge cryptographic core.
//!
//! Field/curve arithmetic, Poseidon2 hashing, stealth-address key
//! derivation, the commitment accumulator and its on-chain mirror, and
//! proof-input assembly for the four SNARK circuits (claim, spend-split,
//! spend-partial-public, partial-withdraw). The SNARK prover, the Bitcoin
//! wallet/UTXO/FROST-signing stack, and the verifier program's internals
//! stay out of this crate: it only marshals the bytes they produce and
//! consume.
//!
//! The `zvault-indexer` binary (`src/main.rs`) wraps the accumulator in
//! `indexer::IndexerService` and exposes it over the small REST surface in
//! `api`.

pub mod announcement;
pub mod api;
pub mod chain;
pub mod circuits;
pub mod common;
pub mod config;
pub mod curve;
pub mod field;
pub mod hash;
pub mod indexer;
pub mod keys;
pub mod logging;
pub mod note;
pub mod nullifier;
pub mod storage;
pub mod tree;

pub use common::error::{Result, ZVaultError};
pub use config::{ConfigError, Network, ZVaultConfig};
