//! Level threshold table and derivation functions

use serde::Serialize;

/// A single level tier: the level number, its display title, and the
/// cumulative XP required to enter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelTier {
    /// Level number (1-based)
    pub level: u32,
    /// Display title shown in the XP widget
    pub title: &'static str,
    /// Cumulative XP at which this tier starts
    pub min_xp: u32,
}

/// Ordered ascending level thresholds. `min_xp` is strictly increasing;
/// lookup is last-match-wins.
pub const LEVEL_TIERS: [LevelTier; 10] = [
    LevelTier { level: 1, title: "Rookie", min_xp: 0 },
    LevelTier { level: 2, title: "Prospect", min_xp: 100 },
    LevelTier { level: 3, title: "Starter", min_xp: 250 },
    LevelTier { level: 4, title: "Playmaker", min_xp: 500 },
    LevelTier { level: 5, title: "Captain", min_xp: 900 },
    LevelTier { level: 6, title: "All-Conference", min_xp: 1500 },
    LevelTier { level: 7, title: "All-State", min_xp: 2400 },
    LevelTier { level: 8, title: "All-American", min_xp: 3600 },
    LevelTier { level: 9, title: "Legend", min_xp: 5200 },
    LevelTier { level: 10, title: "Hall of Famer", min_xp: 7500 },
];

/// Map a cumulative XP total to its level tier.
///
/// The last tier whose `min_xp` is at or below `xp` wins.
pub fn calculate_level(xp: u32) -> &'static LevelTier {
    LEVEL_TIERS
        .iter()
        .rev()
        .find(|tier| tier.min_xp <= xp)
        .unwrap_or(&LEVEL_TIERS[0])
}

/// Fractional progress through the current tier, in `[0.0, 1.0]`.
///
/// Returns `1.0` once the maximum tier is reached.
pub fn calculate_level_progress(xp: u32) -> f32 {
    let current = calculate_level(xp);
    match next_tier(current) {
        Some(next) => {
            let span = (next.min_xp - current.min_xp) as f32;
            ((xp - current.min_xp) as f32 / span).clamp(0.0, 1.0)
        }
        None => 1.0,
    }
}

/// Remaining XP until the next tier, floored at 0 at the maximum tier.
pub fn xp_to_next_level(xp: u32) -> u32 {
    let current = calculate_level(xp);
    match next_tier(current) {
        Some(next) => next.min_xp.saturating_sub(xp),
        None => 0,
    }
}

/// The tier after `current`, if any.
fn next_tier(current: &LevelTier) -> Option<&'static LevelTier> {
    LEVEL_TIERS.get(current.level as usize)
}
