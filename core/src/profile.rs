//! Persistent progression contract.

use serde::{Deserialize, Serialize};

/// Experience needed per squared level step.
const XP_PER_LEVEL_STEP: f64 = 50.0;

/// Progression stored per username.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    /// Lifetime experience.
    pub xp: u32,
    /// Level derived from `xp`.
    pub level: u32,
}

impl Profile {
    /// Profile with `xp` and the matching level.
    #[must_use]
    pub fn with_xp(xp: u32) -> Self {
        Self {
            xp,
            level: level_for_xp(xp),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::with_xp(0)
    }
}

/// Level reached with `xp` experience: `floor(sqrt(xp / 50)) + 1`.
#[must_use]
pub fn level_for_xp(xp: u32) -> u32 {
    let steps = (f64::from(xp) / XP_PER_LEVEL_STEP).sqrt().floor();
    (steps as u32).saturating_add(1)
}

/// Keyed progression storage the session talks to.
///
/// Calls made during a tick only touch in-memory state. Durable writes happen
/// in [`ProfileStore::flush`], which hosts call between ticks.
pub trait ProfileStore {
    /// Failure raised when flushing to durable storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Profile for `username`, created as level one with no experience if unknown.
    fn profile(&mut self, username: &str) -> Profile;

    /// Adds experience, recomputes the level and returns the updated profile.
    fn add_xp(&mut self, username: &str, amount: u32) -> Profile;

    /// Overwrites the stored profile.
    fn save_profile(&mut self, username: &str, profile: Profile);

    /// Persists pending changes.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_the_square_root_curve() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(49), 1);
        assert_eq!(level_for_xp(50), 2);
        assert_eq!(level_for_xp(199), 2);
        assert_eq!(level_for_xp(200), 3);
        assert_eq!(level_for_xp(450), 4);
    }

    #[test]
    fn fresh_profiles_start_at_level_one() {
        assert_eq!(Profile::default(), Profile { xp: 0, level: 1 });
    }
}
