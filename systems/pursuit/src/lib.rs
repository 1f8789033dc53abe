#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy chase behaviour for the hostile phase.
//!
//! Enemies walk straight at the nearest exposed player, one axis at a time,
//! and tag anyone they catch. Players standing on a checkpoint are ignored.

use glam::Vec2;
use night_shift_core::{
    CombatTuning, Command, EnemyView, Event, Phase, PlayerSnapshot, PlayerView, TileMap,
};

/// Pure system that moves enemies and tags the players they reach.
#[derive(Debug, Default)]
pub struct Pursuit;

impl Pursuit {
    /// Emits [`Command::MoveEnemy`] and [`Command::TagPlayer`] commands for one
    /// simulation step. Does nothing outside the hostile phase.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        enemies: &EnemyView,
        players: &PlayerView,
        map: &TileMap,
        tuning: &CombatTuning,
        now: f64,
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Hostile {
            return;
        }
        let dt = elapsed_seconds(events);
        if dt <= 0.0 {
            return;
        }
        let step = tuning.enemy_speed * dt;

        for enemy in enemies.iter() {
            if enemy.is_stunned(now) {
                continue;
            }
            let Some(target) = select_target(enemy.position, players, map) else {
                continue;
            };

            let heading = Vec2::new(
                sign(target.position.x - enemy.position.x),
                sign(target.position.y - enemy.position.y),
            );
            let mut position = enemy.position;
            let across = Vec2::new(position.x + heading.x * step, position.y);
            if map.is_enemy_passable_at(across) {
                position = across;
            }
            let down = Vec2::new(position.x, position.y + heading.y * step);
            if map.is_enemy_passable_at(down) {
                position = down;
            }

            if position != enemy.position {
                out.push(Command::MoveEnemy {
                    enemy: enemy.id,
                    position,
                });
            }

            let gap = (position - target.position).abs();
            if gap.x < tuning.tag_reach && gap.y < tuning.tag_reach {
                out.push(Command::TagPlayer {
                    player: target.id,
                    until: now + f64::from(tuning.tag_duration),
                });
            }
        }
    }
}

/// Chooses the player an enemy at `position` chases.
///
/// Players on a checkpoint are skipped. Among the rest the smallest Manhattan
/// distance wins; ties go to the lowest player id.
#[must_use]
pub fn select_target<'a>(
    position: Vec2,
    players: &'a PlayerView,
    map: &TileMap,
) -> Option<&'a PlayerSnapshot> {
    let mut best: Option<(&PlayerSnapshot, f32)> = None;
    for player in players.iter() {
        if map.is_checkpoint_at(player.position) {
            continue;
        }
        let offset = (player.position - position).abs();
        let distance = offset.x + offset.y;
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((player, distance)),
        }
    }
    best.map(|(player, _)| player)
}

/// Sign that maps zero to zero, unlike [`f32::signum`].
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
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

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use night_shift_core::{
        CellCoord, EnemyId, EnemySnapshot, Intent, PlayerId, Profile, TileKind, Weapon,
    };

    fn player(id: u32, x: f32, y: f32) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(id),
            username: format!("P{id}"),
            position: Vec2::new(x, y),
            facing: Vec2::X,
            intent: Intent::default(),
            inventory: Default::default(),
            gear: Default::default(),
            selected_weapon: Weapon::Bat,
            tagged_until: 0.0,
            attack_cooldown_until: 0.0,
            objective_reached: false,
            objective_seen: false,
            profile: Profile::default(),
        }
    }

    fn enemies(position: Vec2, stunned_until: f64) -> EnemyView {
        EnemyView::from_snapshots(vec![EnemySnapshot {
            id: EnemyId::new(0),
            position,
            stunned_until,
        }])
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }]
    }

    #[test]
    fn zero_has_no_sign() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
    }

    #[test]
    fn nearest_exposed_player_is_targeted() {
        let mut map = TileMap::filled(10, 10, TileKind::Grass);
        let _ = map.set_tile(CellCoord::new(2, 2), TileKind::Checkpoint);
        let players = PlayerView::from_snapshots(vec![
            player(1, 2.0, 2.0),
            player(2, 8.0, 8.0),
            player(3, 6.0, 4.0),
        ]);
        let target = select_target(Vec2::new(3.0, 3.0), &players, &map);
        assert_eq!(target.map(|p| p.id), Some(PlayerId::new(3)));
    }

    #[test]
    fn ties_go_to_the_lowest_id() {
        let map = TileMap::filled(10, 10, TileKind::Grass);
        let players =
            PlayerView::from_snapshots(vec![player(4, 3.0, 5.0), player(2, 5.0, 3.0)]);
        let target = select_target(Vec2::new(3.0, 3.0), &players, &map);
        assert_eq!(target.map(|p| p.id), Some(PlayerId::new(2)));
    }

    #[test]
    fn aligned_enemy_moves_on_one_axis_only() {
        let map = TileMap::filled(10, 10, TileKind::Grass);
        let players = PlayerView::from_snapshots(vec![player(1, 7.0, 3.0)]);
        let mut out = Vec::new();
        Pursuit.handle(
            &tick(),
            Phase::Hostile,
            &enemies(Vec2::new(3.0, 3.0), 0.0),
            &players,
            &map,
            &CombatTuning::default(),
            1.0,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::MoveEnemy {
                enemy: EnemyId::new(0),
                position: Vec2::new(3.0 + 3.2 * 0.1, 3.0),
            }]
        );
    }

    #[test]
    fn blocked_axis_is_skipped_but_the_other_still_moves() {
        let mut map = TileMap::filled(10, 10, TileKind::Grass);
        let _ = map.set_tile(CellCoord::new(4, 3), TileKind::Stall);
        let players = PlayerView::from_snapshots(vec![player(1, 7.0, 6.0)]);
        let mut out = Vec::new();
        Pursuit.handle(
            &tick(),
            Phase::Hostile,
            &enemies(Vec2::new(3.4, 3.0), 0.0),
            &players,
            &map,
            &CombatTuning::default(),
            1.0,
            &mut out,
        );
        let Some(Command::MoveEnemy { position, .. }) = out.first() else {
            panic!("expected a move, got {out:?}");
        };
        assert_eq!(position.x, 3.4);
        assert!(position.y > 3.0);
    }

    #[test]
    fn catching_a_player_tags_them() {
        let map = TileMap::filled(10, 10, TileKind::Grass);
        let players = PlayerView::from_snapshots(vec![player(1, 5.5, 5.0)]);
        let mut out = Vec::new();
        Pursuit.handle(
            &tick(),
            Phase::Hostile,
            &enemies(Vec2::new(5.0, 5.0), 0.0),
            &players,
            &map,
            &CombatTuning::default(),
            4.0,
            &mut out,
        );
        assert!(out.contains(&Command::TagPlayer {
            player: PlayerId::new(1),
            until: 5.0,
        }));
    }

    #[test]
    fn stunned_enemies_and_calm_phase_do_nothing() {
        let map = TileMap::filled(10, 10, TileKind::Grass);
        let players = PlayerView::from_snapshots(vec![player(1, 5.5, 5.0)]);
        let mut out = Vec::new();
        Pursuit.handle(
            &tick(),
            Phase::Hostile,
            &enemies(Vec2::new(5.0, 5.0), 2.0),
            &players,
            &map,
            &CombatTuning::default(),
            1.0,
            &mut out,
        );
        Pursuit.handle(
            &tick(),
            Phase::Calm,
            &enemies(Vec2::new(5.0, 5.0), 0.0),
            &players,
            &map,
            &CombatTuning::default(),
            1.0,
            &mut out,
        );
        assert!(out.is_empty());
    }
}
