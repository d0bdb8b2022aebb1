//! Solana-facing relayer client: reads the on-chain commitment-tree mirror
//! and announcement records, and submits the program instructions built in
//! `chain::instruction`.
//!
//! Grounded on the teacher's relayer client: a thin `RpcClient` wrapper that
//! derives PDAs with `Pubkey::find_program_address`, builds `Instruction`s
//! by hand, and submits them with `Transaction::new_signed_with_payer` +
//! `send_and_confirm_transaction`. Those calls are blocking; like the
//! teacher, we invoke them directly inside `async fn` rather than wrapping
//! every call in `spawn_blocking`.

use std::str::FromStr;

use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer as SolanaSigner},
    transaction::Transaction,
};
use thiserror::Error;

use crate::announcement::{Announcement, ANNOUNCEMENT_DISCRIMINATOR};
use crate::chain::instruction::{
    encode_initialize_pool, encode_initialize_tree, ClaimInstruction, DemoAddStealthInstruction,
    SpendPartialPublicInstruction, SpendSplitInstruction,
};
use crate::config::ZVaultConfig;
use crate::field::FieldElement;
use crate::tree::wire::{CommitmentTreeAccount, COMMITMENT_TREE_DISCRIMINATOR};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("no payer keypair configured")]
    NoPayerSet,

    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("commitment-tree account was present but failed to parse")]
    MalformedTreeAccount,

    #[error("announcement account was present but failed to parse: {0}")]
    MalformedAnnouncement(#[from] crate::announcement::AnnouncementError),
}

/// Thin Solana RPC client for the zVault program: fetches the on-chain
/// commitment-tree mirror and announcement set, and submits claim/spend
/// instructions on behalf of a relayer keypair.
pub struct ChainClient {
    rpc: RpcClient,
    payer: Option<Keypair>,
    program_id: Pubkey,
    pool_state: Pubkey,
    commitment_tree: Pubkey,
}

impl ChainClient {
    pub fn new(config: &ZVaultConfig) -> Result<Self, ChainError> {
        let rpc = RpcClient::new_with_commitment(
            config.solana_rpc.clone(),
            CommitmentConfig::confirmed(),
        );
        Ok(Self {
            rpc,
            payer: None,
            program_id: parse_pubkey(&config.program_id)?,
            pool_state: parse_pubkey(&config.pool_state)?,
            commitment_tree: parse_pubkey(&config.commitment_tree)?,
        })
    }

    pub fn with_payer_base58(mut self, encoded: &str) -> Result<Self, ChainError> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| ChainError::InvalidKeypair(e.to_string()))?;
        let keypair =
            Keypair::try_from(bytes.as_slice()).map_err(|e| ChainError::InvalidKeypair(e.to_string()))?;
        self.payer = Some(keypair);
        Ok(self)
    }

    pub fn payer_pubkey(&self) -> Option<Pubkey> {
        self.payer.as_ref().map(|k| k.pubkey())
    }

    /// Fetch and decode the on-chain commitment-tree mirror account.
    pub async fn fetch_tree_account(&self) -> Result<CommitmentTreeAccount, ChainError> {
        let account = self
            .rpc
            .get_account(&self.commitment_tree)
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        CommitmentTreeAccount::from_bytes(&account.data).ok_or(ChainError::MalformedTreeAccount)
    }

    /// Fetch every `Announcement` PDA owned by the program, used to rebuild
    /// the in-memory tree from scratch (`tree::sync::sync_from_announcements`).
    pub async fn fetch_all_announcements(&self) -> Result<Vec<Announcement>, ChainError> {
        let accounts = self
            .rpc
            .get_program_accounts(&self.program_id)
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        let mut out = Vec::new();
        for (_pubkey, account) in accounts {
            if account.data.first() != Some(&ANNOUNCEMENT_DISCRIMINATOR) {
                continue;
            }
            out.push(Announcement::from_bytes(&account.data)?);
        }
        Ok(out)
    }

    pub async fn initialize_pool(&self) -> Result<String, ChainError> {
        let payer = self.payer.as_ref().ok_or(ChainError::NoPayerSet)?;
        let ix = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.pool_state, false),
                AccountMeta::new(payer.pubkey(), true),
                AccountMeta::new_readonly(solana_sdk::system_program::ID, false),
            ],
            data: encode_initialize_pool(),
        };
        self.send_transaction(&[ix], payer).await
    }

    pub async fn initialize_tree(&self, depth: u8) -> Result<String, ChainError> {
        let payer = self.payer.as_ref().ok_or(ChainError::NoPayerSet)?;
        let ix = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.commitment_tree, false),
                AccountMeta::new(payer.pubkey(), true),
                AccountMeta::new_readonly(solana_sdk::system_program::ID, false),
            ],
            data: encode_initialize_tree(depth),
        };
        self.send_transaction(&[ix], payer).await
    }

    pub async fn submit_claim(
        &self,
        recipient: &str,
        ix: &ClaimInstruction<'_>,
    ) -> Result<String, ChainError> {
        let payer = self.payer.as_ref().ok_or(ChainError::NoPayerSet)?;
        let recipient_pubkey = parse_pubkey(recipient)?;

        let (nullifier_record, _) = Pubkey::find_program_address(
            &[b"nullifier", &ix.nullifier_hash.to_be_bytes()],
            &self.program_id,
        );

        let instruction = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.pool_state, false),
                AccountMeta::new_readonly(self.commitment_tree, false),
                AccountMeta::new(nullifier_record, false),
                AccountMeta::new(recipient_pubkey, false),
                AccountMeta::new(payer.pubkey(), true),
                AccountMeta::new_readonly(solana_sdk::system_program::ID, false),
            ],
            data: ix.encode(),
        };
        self.send_transaction(&[instruction], payer).await
    }

    pub async fn submit_spend_split(
        &self,
        ix: &SpendSplitInstruction<'_>,
    ) -> Result<String, ChainError> {
        let payer = self.payer.as_ref().ok_or(ChainError::NoPayerSet)?;
        let (nullifier_record, _) = Pubkey::find_program_address(
            &[b"nullifier", &ix.nullifier_hash.to_be_bytes()],
            &self.program_id,
        );
        let instruction = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.pool_state, false),
                AccountMeta::new(self.commitment_tree, false),
                AccountMeta::new(nullifier_record, false),
                AccountMeta::new(payer.pubkey(), true),
                AccountMeta::new_readonly(solana_sdk::system_program::ID, false),
            ],
            data: ix.encode(),
        };
        self.send_transaction(&[instruction], payer).await
    }

    pub async fn submit_spend_partial_public(
        &self,
        recipient: &str,
        ix: &SpendPartialPublicInstruction<'_>,
    ) -> Result<String, ChainError> {
        let payer = self.payer.as_ref().ok_or(ChainError::NoPayerSet)?;
        let recipient_pubkey = parse_pubkey(recipient)?;
        let (nullifier_record, _) = Pubkey::find_program_address(
            &[b"nullifier", &ix.nullifier_hash.to_be_bytes()],
            &self.program_id,
        );
        let instruction = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.pool_state, false),
                AccountMeta::new(self.commitment_tree, false),
                AccountMeta::new(nullifier_record, false),
                AccountMeta::new(recipient_pubkey, false),
                AccountMeta::new(payer.pubkey(), true),
                AccountMeta::new_readonly(solana_sdk::system_program::ID, false),
            ],
            data: ix.encode(),
        };
        self.send_transaction(&[instruction], payer).await
    }

    /// Authority-gated devnet-only helper: inject a stealth deposit without
    /// a BTC-side confirmation, to exercise the claim path end to end.
    pub async fn demo_add_stealth(
        &self,
        ix: &DemoAddStealthInstruction,
    ) -> Result<String, ChainError> {
        let payer = self.payer.as_ref().ok_or(ChainError::NoPayerSet)?;
        let (announcement, _) = Pubkey::find_program_address(
            &[b"announcement", &ix.ephemeral_pub],
            &self.program_id,
        );
        let instruction = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.pool_state, false),
                AccountMeta::new(self.commitment_tree, false),
                AccountMeta::new(announcement, false),
                AccountMeta::new(payer.pubkey(), true),
                AccountMeta::new_readonly(solana_sdk::system_program::ID, false),
            ],
            data: ix.encode(),
        };
        self.send_transaction(&[instruction], payer).await
    }

    async fn send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
    ) -> Result<String, ChainError> {
        let recent_blockhash = self
            .rpc
            .get_latest_blockhash()
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &[payer],
            recent_blockhash,
        );

        let sig = self
            .rpc
            .send_and_confirm_transaction(&tx)
            .map_err(|e| ChainError::Rpc(format!("transaction failed: {e}")))?;

        Ok(sig.to_string())
    }
}

/// Synchronous `ChainReader` (`crate::indexer::ChainReader`) backing the
/// indexer's sync protocol: the same account reads as `ChainClient`, but
/// invoked directly rather than through `async fn`, since `ChainReader`
/// exists precisely so sync logic can run against a fixture without an
/// async runtime.
pub struct SolanaChainReader {
    rpc: RpcClient,
    program_id: Pubkey,
    commitment_tree: Pubkey,
}

impl SolanaChainReader {
    pub fn new(config: &ZVaultConfig) -> Result<Self, ChainError> {
        let rpc = RpcClient::new_with_commitment(
            config.solana_rpc.clone(),
            CommitmentConfig::confirmed(),
        );
        Ok(Self {
            rpc,
            program_id: parse_pubkey(&config.program_id)?,
            commitment_tree: parse_pubkey(&config.commitment_tree)?,
        })
    }
}

impl crate::indexer::ChainReader for SolanaChainReader {
    fn fetch_announcements(&self) -> Result<Vec<Announcement>, ChainError> {
        let accounts = self
            .rpc
            .get_program_accounts(&self.program_id)
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        let mut out = Vec::new();
        for (_pubkey, account) in accounts {
            if account.data.first() != Some(&ANNOUNCEMENT_DISCRIMINATOR) {
                continue;
            }
            out.push(Announcement::from_bytes(&account.data)?);
        }
        Ok(out)
    }

    fn fetch_current_root(&self) -> Result<FieldElement, ChainError> {
        let account = self
            .rpc
            .get_account(&self.commitment_tree)
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        CommitmentTreeAccount::from_bytes(&account.data)
            .map(|a| a.current_root)
            .ok_or(ChainError::MalformedTreeAccount)
    }
}

fn parse_pubkey(s: &str) -> Result<Pubkey, ChainError> {
    Pubkey::from_str(s).map_err(|e| ChainError::InvalidAddress(e.to_string()))
}

/// Reduces a nullifier hash field element to the 32-byte big-endian form
/// the PDA seed and the on-chain account both expect.
pub fn nullifier_hash_seed(hash: FieldElement) -> [u8; 32] {
    hash.to_be_bytes()
}
