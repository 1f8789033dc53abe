//! Live entity state owned by the world.

use glam::Vec2;
use night_shift_core::{
    EnemyId, EnemySnapshot, Gear, Intent, Inventory, PlayerId, PlayerSnapshot, Profile,
    ProjectileId, ProjectileSnapshot, Weapon,
};

/// Mutable state of a connected player.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) id: PlayerId,
    pub(crate) username: String,
    pub(crate) position: Vec2,
    pub(crate) facing: Vec2,
    pub(crate) intent: Intent,
    pub(crate) inventory: Inventory,
    pub(crate) gear: Gear,
    pub(crate) selected_weapon: Weapon,
    pub(crate) tagged_until: f64,
    pub(crate) attack_cooldown_until: f64,
    pub(crate) objective_reached: bool,
    pub(crate) objective_seen: bool,
    pub(crate) profile: Profile,
}

impl Player {
    /// Fresh player standing at `position`, facing east with the bat selected.
    pub(crate) fn new(id: PlayerId, username: String, position: Vec2, profile: Profile) -> Self {
        Self {
            id,
            username,
            position,
            facing: Vec2::X,
            intent: Intent::default(),
            inventory: Inventory::new(),
            gear: Gear::new(),
            selected_weapon: Weapon::Bat,
            tagged_until: 0.0,
            attack_cooldown_until: 0.0,
            objective_reached: false,
            objective_seen: false,
            profile,
        }
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            username: self.username.clone(),
            position: self.position,
            facing: self.facing,
            intent: self.intent,
            inventory: self.inventory,
            gear: self.gear,
            selected_weapon: self.selected_weapon,
            tagged_until: self.tagged_until,
            attack_cooldown_until: self.attack_cooldown_until,
            objective_reached: self.objective_reached,
            objective_seen: self.objective_seen,
            profile: self.profile,
        }
    }
}

/// Mutable state of a hunting enemy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) stunned_until: f64,
}

impl Enemy {
    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            stunned_until: self.stunned_until,
        }
    }
}

/// Mutable state of a projectile in flight.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) owner: PlayerId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) ttl: f32,
    pub(crate) stun: f32,
}

impl Projectile {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            owner: self.owner,
            position: self.position,
            velocity: self.velocity,
            ttl: self.ttl,
            stun: self.stun,
        }
    }
}
