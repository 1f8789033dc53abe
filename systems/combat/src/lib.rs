#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player attacks and projectile flight.

use glam::Vec2;
use night_shift_core::{
    Command, CombatTuning, EnemyId, EnemyView, Event, PlayerSnapshot, PlayerView, ProjectileView,
    Strike, Weapon,
};

/// Pure system that resolves held attack keys into strikes.
#[derive(Debug, Default)]
pub struct Combat;

impl Combat {
    /// Emits a [`Command::Attack`] for every player holding attack whose
    /// cooldown has elapsed.
    pub fn handle(
        &mut self,
        players: &PlayerView,
        enemies: &EnemyView,
        tuning: &CombatTuning,
        now: f64,
        out: &mut Vec<Command>,
    ) {
        for player in players.iter() {
            if !player.intent.attack || now < player.attack_cooldown_until {
                continue;
            }
            out.push(Command::Attack {
                player: player.id,
                strike: strike_for(player, enemies, tuning, now),
            });
        }
    }
}

/// Resolves what an attack by `player` does right now.
///
/// The selected weapon must be owned. A slingshot fires along the facing
/// direction; a bat stuns every enemy within reach on both axes.
#[must_use]
pub fn strike_for(
    player: &PlayerSnapshot,
    enemies: &EnemyView,
    tuning: &CombatTuning,
    now: f64,
) -> Strike {
    let tier = player.gear.tier(player.selected_weapon.gear());
    if tier == 0 {
        return Strike::Empty;
    }

    match player.selected_weapon {
        Weapon::Slingshot => {
            let slingshot = &tuning.slingshot;
            Strike::Projectile {
                velocity: player.facing.normalize_or_zero() * slingshot.speed(tier),
                ttl: slingshot.ttl(tier),
                stun: slingshot.stun(tier),
            }
        }
        Weapon::Bat => {
            let reach = tuning.bat.reach;
            let targets: Vec<EnemyId> = enemies
                .iter()
                .filter(|enemy| {
                    let offset = (enemy.position - player.position).abs();
                    offset.x <= reach && offset.y <= reach
                })
                .map(|enemy| enemy.id)
                .collect();
            Strike::Melee {
                targets,
                stunned_until: now + f64::from(tuning.bat.stun(tier)),
            }
        }
    }
}

/// Pure system that advances projectiles and detects enemy contact.
#[derive(Debug, Default)]
pub struct Ballistics;

impl Ballistics {
    /// Emits a [`Command::AdvanceProjectile`] for every projectile in flight.
    ///
    /// Any enemy closer than `hitbox` on both axes after the move counts as a
    /// hit.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        hitbox: f32,
        out: &mut Vec<Command>,
    ) {
        let dt = elapsed_seconds(events);
        if dt <= 0.0 {
            return;
        }

        for projectile in projectiles.iter() {
            let position = projectile.position + projectile.velocity * dt;
            let hits = enemies
                .iter()
                .filter(|enemy| within(enemy.position, position, hitbox))
                .map(|enemy| enemy.id)
                .collect();
            out.push(Command::AdvanceProjectile {
                projectile: projectile.id,
                position,
                ttl: projectile.ttl - dt,
                hits,
            });
        }
    }
}

fn within(a: Vec2, b: Vec2, reach: f32) -> bool {
    let offset = (a - b).abs();
    offset.x < reach && offset.y < reach
}

fn elapsed_seconds(events: &[Event]) -> f32 {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
            _ => None,
        })
        .sum()
}
