//! Small Axum REST surface for the indexer process (spec §6): liveness,
//! sync status, scan requests, and Merkle-proof lookups, fronted by the
//! same rate-limiting/validation/security-header middleware stack the
//! teacher's API layer uses.

pub mod middleware;
pub mod server;

pub use middleware::{create_rate_limiter, RateLimiter, RateLimitState, ValidationError};
pub use server::{build_router, AppState, SharedAppState};
