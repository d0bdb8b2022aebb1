//! On-chain boundary: instruction encoding and the relayer RPC client.
//!
//! The core never runs the verifier itself; this module only marshals
//! instruction bytes and moves them on/off Solana, grounded in the
//! teacher's `sol_client.rs` relayer pattern.

pub mod client;
pub mod instruction;

pub use client::{nullifier_hash_seed, ChainClient, ChainError, SolanaChainReader};
pub use instruction::{
    ClaimInstruction, DemoAddStealthInstruction, SpendPartialPublicInstruction,
    SpendSplitInstruction, StealthBlob, DISC_CLAIM, DISC_DEMO_ADD_STEALTH, DISC_INITIALIZE_POOL,
    DISC_INITIALIZE_TREE, DISC_SPEND_PARTIAL_PUBLIC, DISC_SPEND_SPLIT,
};
