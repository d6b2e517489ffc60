//! # StatLocker Common
//!
//! Shared types and errors for the StatLocker client state engine.
//!
//! ## Core Types
//!
//! - [`AthleteSnapshot`]: externally fetched profile view used to seed
//!   client-side stores (XP total, unlocked badges, games played)
//! - [`StatLockerError`]: unified error type for all state-layer operations
//! - [`StorageError`]: persistence failure taxonomy (read / write / parse)

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{Result, StatLockerError, StorageError};
pub use types::athlete::AthleteSnapshot;

/// StatLocker state engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
