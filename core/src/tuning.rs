//! Gameplay constants grouped the way the configuration file lays them out.
//!
//! Every section implements [`Default`] with the shipped values, and every field
//! is optional when deserialising so partial configuration files only override
//! what they name.

use serde::Deserialize;

use crate::Phase;

/// Aggregated tuning knobs for the whole simulation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Phase durations and enemy head-count bounds.
    pub phase: PhaseTuning,
    /// Player locomotion.
    pub movement: MovementTuning,
    /// Attacks, projectiles and enemy pursuit.
    pub combat: CombatTuning,
    /// Fog-of-war radius.
    pub vision: VisionTuning,
    /// Experience and material payouts.
    pub rewards: RewardTuning,
    /// Host-facing session limits.
    pub session: SessionTuning,
}

/// Phase timer lengths and enemy batch bounds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhaseTuning {
    /// Length of the calm (day) phase in seconds.
    pub calm_seconds: f32,
    /// Length of the hostile (night) phase in seconds.
    pub hostile_seconds: f32,
    /// Fewest enemies spawned at night start.
    pub min_enemies: u32,
    /// Most enemies spawned at night start.
    pub max_enemies: u32,
}

impl PhaseTuning {
    /// Timer value a phase starts with.
    #[must_use]
    pub fn duration(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Calm => self.calm_seconds,
            Phase::Hostile => self.hostile_seconds,
        }
    }

    /// Enemy batch size for the given number of connected players.
    #[must_use]
    pub fn enemy_count(&self, players: usize) -> u32 {
        let wanted = u32::try_from(players).unwrap_or(u32::MAX).saturating_add(1);
        wanted.clamp(self.min_enemies, self.max_enemies.max(self.min_enemies))
    }
}

impl Default for PhaseTuning {
    fn default() -> Self {
        Self {
            calm_seconds: 45.0,
            hostile_seconds: 60.0,
            min_enemies: 2,
            max_enemies: 6,
        }
    }
}

/// Player locomotion constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Tiles per second.
    pub player_speed: f32,
    /// Speed multiplier while the tag debuff is active.
    pub tagged_speed_multiplier: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            tagged_speed_multiplier: 0.45,
        }
    }
}

/// Attack, projectile and pursuit constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Seconds between attacks, independent of weapon.
    pub attack_cooldown: f32,
    /// Enemy speed in tiles per second.
    pub enemy_speed: f32,
    /// Seconds a tag slows its victim.
    pub tag_duration: f32,
    /// Per-axis distance under which an enemy tags its target.
    pub tag_reach: f32,
    /// Per-axis half extent of the projectile hit box.
    pub projectile_hitbox: f32,
    /// Slingshot scaling.
    pub slingshot: SlingshotTuning,
    /// Bat scaling.
    pub bat: BatTuning,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            attack_cooldown: 0.45,
            enemy_speed: 3.2,
            tag_duration: 1.0,
            tag_reach: 0.75,
            projectile_hitbox: 0.7,
            slingshot: SlingshotTuning::default(),
            bat: BatTuning::default(),
        }
    }
}

/// Slingshot projectile parameters as linear functions of tier.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlingshotTuning {
    /// Projectile speed at tier zero, tiles per second.
    pub base_speed: f32,
    /// Speed added per tier.
    pub speed_per_tier: f32,
    /// Projectile lifetime at tier zero, seconds.
    pub base_ttl: f32,
    /// Lifetime added per tier.
    pub ttl_per_tier: f32,
    /// Stun imparted at tier zero, seconds.
    pub base_stun: f32,
    /// Stun added per tier.
    pub stun_per_tier: f32,
}

impl SlingshotTuning {
    /// Projectile speed for `tier`.
    #[must_use]
    pub fn speed(&self, tier: u8) -> f32 {
        self.base_speed + self.speed_per_tier * f32::from(tier)
    }

    /// Projectile lifetime for `tier`.
    #[must_use]
    pub fn ttl(&self, tier: u8) -> f32 {
        self.base_ttl + self.ttl_per_tier * f32::from(tier)
    }

    /// Stun imparted by a projectile of `tier`.
    #[must_use]
    pub fn stun(&self, tier: u8) -> f32 {
        self.base_stun + self.stun_per_tier * f32::from(tier)
    }
}

impl Default for SlingshotTuning {
    fn default() -> Self {
        Self {
            base_speed: 8.0,
            speed_per_tier: 1.0,
            base_ttl: 0.65,
            ttl_per_tier: 0.15,
            base_stun: 0.55,
            stun_per_tier: 0.12,
        }
    }
}

/// Bat swing parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatTuning {
    /// Per-axis reach of the swing in tiles.
    pub reach: f32,
    /// Stun at tier zero, seconds.
    pub base_stun: f32,
    /// Stun added per tier.
    pub stun_per_tier: f32,
}

impl BatTuning {
    /// Stun imparted by a swing of `tier`.
    #[must_use]
    pub fn stun(&self, tier: u8) -> f32 {
        self.base_stun + self.stun_per_tier * f32::from(tier)
    }
}

impl Default for BatTuning {
    fn default() -> Self {
        Self {
            reach: 1.0,
            base_stun: 0.5,
            stun_per_tier: 0.2,
        }
    }
}

/// Fog-of-war parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisionTuning {
    /// Radius in tiles without a torch.
    pub base_radius: f32,
    /// Radius added per torch tier.
    pub radius_per_torch_tier: f32,
    /// Filters the player roster by vision radius like enemies and projectiles.
    pub roster_fog: bool,
}

impl VisionTuning {
    /// Hostile-phase vision radius for a torch tier.
    #[must_use]
    pub fn radius(&self, torch_tier: u8) -> f32 {
        self.base_radius + f32::from(torch_tier) * self.radius_per_torch_tier
    }
}

impl Default for VisionTuning {
    fn default() -> Self {
        Self {
            base_radius: 4.0,
            radius_per_torch_tier: 2.0,
            roster_fog: false,
        }
    }
}

/// Experience and material payouts.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardTuning {
    /// Experience for opening a chest.
    pub chest_xp: u32,
    /// Experience for each harvested tree or rock.
    pub harvest_xp: u32,
    /// Experience every player earns on a successful extraction.
    pub extraction_xp: u32,
    /// Fewest materials a chest yields.
    pub chest_min_amount: u32,
    /// Most materials a chest yields.
    pub chest_max_amount: u32,
    /// Wood per tree.
    pub wood_per_tree: u32,
    /// Stone per rock.
    pub stone_per_rock: u32,
    /// Pebbles per rock.
    pub pebbles_per_rock: u32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            chest_xp: 8,
            harvest_xp: 3,
            extraction_xp: 30,
            chest_min_amount: 2,
            chest_max_amount: 4,
            wood_per_tree: 2,
            stone_per_rock: 2,
            pebbles_per_rock: 1,
        }
    }
}

/// Limits applied by the session around the simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    /// Largest step a single tick may simulate, in milliseconds.
    pub max_tick_millis: u64,
    /// Number of entries retained by the rolling event log.
    pub event_log_capacity: usize,
    /// Usernames are cut to this many characters.
    pub username_max_chars: usize,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            max_tick_millis: 50,
            event_log_capacity: 12,
            username_max_chars: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_count_is_clamped() {
        let phase = PhaseTuning::default();
        assert_eq!(phase.enemy_count(0), 2);
        assert_eq!(phase.enemy_count(1), 2);
        assert_eq!(phase.enemy_count(3), 4);
        assert_eq!(phase.enemy_count(40), 6);
    }

    #[test]
    fn slingshot_scales_with_tier() {
        let sling = SlingshotTuning::default();
        assert!((sling.ttl(2) - 0.95).abs() < 1e-6);
        assert!((sling.stun(2) - 0.79).abs() < 1e-6);
        assert!((sling.speed(3) - 11.0).abs() < 1e-6);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{"phase":{"calm_seconds":10.0}}"#)
            .expect("partial tuning parses");
        assert_eq!(tuning.phase.calm_seconds, 10.0);
        assert_eq!(tuning.phase.hostile_seconds, 60.0);
        assert_eq!(tuning.vision, VisionTuning::default());
    }
}
