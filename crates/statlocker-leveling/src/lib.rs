//! # StatLocker Leveling
//!
//! Pure XP-to-level calculations. No async, no storage: the gamification
//! store feeds a cumulative XP total in and gets derived level fields out,
//! recomputed on every XP change so they are never stored independently of
//! the XP truth.
//!
//! Levels are defined by an ordered table of ascending XP thresholds
//! ([`LEVEL_TIERS`]); the last tier whose threshold is at or below the XP
//! total wins.

pub mod curve;

pub use curve::{calculate_level, calculate_level_progress, xp_to_next_level, LevelTier};

/// Number of defined level tiers
pub const TIER_COUNT: usize = curve::LEVEL_TIERS.len();

/// Highest defined level
pub const MAX_LEVEL: u32 = 10;
