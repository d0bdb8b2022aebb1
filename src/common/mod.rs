//! Common infrastructure: the aggregate error type. Configuration and
//! logging live at the crate root (`crate::config`, `crate::logging`).

pub mod error;

pub use error::{Result, ZVaultError};
