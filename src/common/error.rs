//! Unified error taxonomy for zvault-core.
//!
//! Every subsystem defines its own narrow error enum; `ZVaultError` is the
//! single type that crosses module boundaries and reaches the API layer,
//! converting each subsystem error via `#[from]` the way the kinds in
//! spec §7 are meant to compose.

use thiserror::Error;

use crate::chain::ChainError;
use crate::circuits::ClaimAssemblyError;
use crate::config::ConfigError;
use crate::curve::InvalidPoint;
use crate::logging::LoggingError;
use crate::storage::StorageError;
use crate::tree::{SyncError, TreeError};

/// Root error type for zvault-core.
#[derive(Debug, Error)]
pub enum ZVaultError {
    /// Malformed hex, wrong length, amount out of range, non-canonical encoding.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Point not on the curve, or the identity where disallowed.
    #[error("invalid point: {0}")]
    InvalidPoint(#[from] InvalidPoint),

    /// Commitment not indexed, announcement absent, leaf index out of bounds.
    #[error("not found: {0}")]
    NotFound(String),

    /// Commitment tree errors (full tree, stale root, not found in tree).
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Local root disagrees with on-chain root after a rebuild. Fatal.
    #[error("sync divergence: local root {local} != on-chain root {on_chain}")]
    SyncDivergence { local: String, on_chain: String },

    /// User declined to sign.
    #[error("wallet rejected the signature request")]
    WalletRejected,

    /// Transport error while requesting a wallet signature.
    #[error("signature request failed: {0}")]
    SignatureFailure(String),

    /// Surfaced verbatim from the (out-of-tree) prover.
    #[error("proof generation failed: {0}")]
    ProofGenerationFailed(String),

    /// A local sanity check caught a doomed claim before it reached the prover.
    #[error("claim input assembly failed: {0}")]
    ClaimAssembly(#[from] ClaimAssemblyError),

    /// Nullifier record already exists on-chain: double-spend.
    #[error("note is not spendable: nullifier already recorded")]
    NotSpendable,

    /// Missing/malformed environment configuration at startup.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging subsystem failed to initialize.
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Persistence layer failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// API-layer failure (bad request shape, etc).
    #[error("API error: {0}")]
    Api(String),

    /// On-chain read/write failure via the `chain::ChainClient` boundary.
    #[error("chain error: {0}")]
    Chain(String),

    /// IO errors (snapshot read/write).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZVaultError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn chain(msg: impl Into<String>) -> Self {
        Self::Chain(msg.into())
    }

    /// Whether the caller may retry without operator intervention.
    ///
    /// Per §7's propagation policy: network errors on scanning retry with
    /// bounded backoff; sync divergence never auto-recovers; user-rejection
    /// errors are reported without retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ZVaultError::Chain(_) | ZVaultError::SignatureFailure(_) | ZVaultError::Io(_)
        )
    }

    /// Stable code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ZVaultError::InvalidInput(_) => "INVALID_INPUT",
            ZVaultError::InvalidPoint(_) => "INVALID_POINT",
            ZVaultError::NotFound(_) => "NOT_FOUND",
            ZVaultError::Tree(_) => "TREE_ERROR",
            ZVaultError::SyncDivergence { .. } => "SYNC_DIVERGENCE",
            ZVaultError::WalletRejected => "WALLET_REJECTED",
            ZVaultError::SignatureFailure(_) => "SIGNATURE_FAILURE",
            ZVaultError::ProofGenerationFailed(_) => "PROOF_GENERATION_FAILED",
            ZVaultError::ClaimAssembly(_) => "CLAIM_ASSEMBLY_FAILED",
            ZVaultError::NotSpendable => "NOT_SPENDABLE",
            ZVaultError::Config(_) => "CONFIG_ERROR",
            ZVaultError::Logging(_) => "LOGGING_ERROR",
            ZVaultError::Storage(_) => "STORAGE_ERROR",
            ZVaultError::Api(_) => "API_ERROR",
            ZVaultError::Chain(_) => "CHAIN_ERROR",
            ZVaultError::Io(_) => "IO_ERROR",
        }
    }
}

impl From<ChainError> for ZVaultError {
    fn from(err: ChainError) -> Self {
        ZVaultError::Chain(err.to_string())
    }
}

impl From<SyncError> for ZVaultError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Divergence { local, on_chain } => ZVaultError::SyncDivergence {
                local: format!("{local:?}"),
                on_chain: format!("{on_chain:?}"),
            },
            other => ZVaultError::Chain(other.to_string()),
        }
    }
}

/// Result type alias using `ZVaultError`.
pub type Result<T> = std::result::Result<T, ZVaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_and_retry_are_consistent() {
        let err = ZVaultError::NotSpendable;
        assert_eq!(err.error_code(), "NOT_SPENDABLE");
        assert!(!err.is_retryable());

        let err = ZVaultError::chain("rpc timeout");
        assert_eq!(err.error_code(), "CHAIN_ERROR");
        assert!(err.is_retryable());
    }

    #[test]
    fn sync_divergence_never_retryable() {
        let err = ZVaultError::SyncDivergence {
            local: "aa".into(),
            on_chain: "bb".into(),
        };
        assert!(!err.is_retryable());
    }
}
