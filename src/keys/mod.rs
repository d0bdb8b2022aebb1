//! Key derivation, stealth meta-addresses, and stealth-output derivation.

pub mod meta_address;
pub mod stealth;
pub mod wallet;

pub use meta_address::{MetaAddress, MetaAddressError};
pub use stealth::{
    derive_nullifier, derive_stealth_output, derive_stealth_output_with_scalar,
    derive_stealth_priv, scan_announcement, ScannedNote, StealthDepositRecord,
    StealthDepositStatus, StealthMode, StealthOutput, MAX_AMOUNT_SATS, STEALTH_DEPOSIT_TTL_SECS,
};
pub use wallet::{FixedSigner, KeyPair, KeySource, Signer, SignerError};
