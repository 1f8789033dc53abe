#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player locomotion and the tile interactions triggered by standing somewhere.

use glam::Vec2;
use night_shift_core::{
    Command, Direction, Event, MovementTuning, Phase, PlayerView, TileKind, TileMap,
};

/// Neighbour order inspected for harvestable resources.
const HARVEST_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::South,
    Direction::North,
];

/// Pure system that turns held direction keys into movement proposals.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits a [`Command::MovePlayer`] for every player holding a direction.
    ///
    /// The elapsed time is taken from the `TimeAdvanced` events in `events`;
    /// without one no command is produced.
    pub fn handle(
        &mut self,
        events: &[Event],
        players: &PlayerView,
        tuning: &MovementTuning,
        now: f64,
        out: &mut Vec<Command>,
    ) {
        let dt = elapsed_seconds(events);
        if dt <= 0.0 {
            return;
        }

        for player in players.iter() {
            let axis = player.intent.axis();
            if axis == Vec2::ZERO {
                continue;
            }
            let direction = axis / axis.length();
            let slow = if player.is_tagged(now) {
                tuning.tagged_speed_multiplier
            } else {
                1.0
            };
            let step = tuning.player_speed * slow * dt;
            out.push(Command::MovePlayer {
                player: player.id,
                facing: direction,
                destination: player.position + direction * step,
            });
        }
    }
}

/// Pure system that reports chests, adjacent resources and objective contact.
#[derive(Debug, Default)]
pub struct Interaction;

impl Interaction {
    /// Emits interaction commands for each player's current tile.
    ///
    /// Per player the order is chest, then resources east, west, south and
    /// north, then the objective during the hostile phase.
    pub fn handle(
        &mut self,
        phase: Phase,
        players: &PlayerView,
        map: &TileMap,
        out: &mut Vec<Command>,
    ) {
        for player in players.iter() {
            let Some(cell) = player.cell() else {
                continue;
            };
            let standing_on = map.tile(cell);
            if standing_on == Some(TileKind::Chest) {
                out.push(Command::OpenChest {
                    player: player.id,
                    cell,
                });
            }

            for neighbour in HARVEST_ORDER
                .iter()
                .filter_map(|direction| cell.step(*direction))
            {
                let harvestable = matches!(
                    map.tile(neighbour),
                    Some(TileKind::Tree | TileKind::Rock)
                );
                if harvestable && !map.is_border(neighbour) {
                    out.push(Command::Harvest {
                        player: player.id,
                        cell: neighbour,
                    });
                }
            }

            if phase == Phase::Hostile && standing_on == Some(TileKind::Objective) {
                out.push(Command::ReachObjective { player: player.id });
            }
        }
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
    use night_shift_core::{CellCoord, Intent, PlayerId, PlayerSnapshot, Profile};

    fn snapshot(position: Vec2, intent: Intent) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(1),
            username: "Ash".to_owned(),
            position,
            facing: Vec2::X,
            intent,
            inventory: Default::default(),
            gear: Default::default(),
            selected_weapon: night_shift_core::Weapon::Bat,
            tagged_until: 0.0,
            attack_cooldown_until: 0.0,
            objective_reached: false,
            objective_seen: false,
            profile: Profile::default(),
        }
    }

    fn tick(millis: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }]
    }

    #[test]
    fn diagonal_moves_are_normalised() {
        let intent = Intent {
            down: true,
            right: true,
            ..Intent::default()
        };
        let players = PlayerView::from_snapshots(vec![snapshot(Vec2::new(5.0, 5.0), intent)]);
        let mut out = Vec::new();
        Movement.handle(
            &tick(100),
            &players,
            &MovementTuning::default(),
            0.0,
            &mut out,
        );

        let Some(Command::MovePlayer {
            facing,
            destination,
            ..
        }) = out.first()
        else {
            panic!("expected a move, got {out:?}");
        };
        assert!((facing.length() - 1.0).abs() < 1e-6);
        let travelled = destination.distance(Vec2::new(5.0, 5.0));
        assert!((travelled - 0.5).abs() < 1e-5);
    }

    #[test]
    fn tagged_players_are_slowed() {
        let intent = Intent {
            left: true,
            ..Intent::default()
        };
        let mut tagged = snapshot(Vec2::new(5.0, 5.0), intent);
        tagged.tagged_until = 2.0;
        let players = PlayerView::from_snapshots(vec![tagged]);
        let mut out = Vec::new();
        Movement.handle(
            &tick(100),
            &players,
            &MovementTuning::default(),
            1.0,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::MovePlayer {
                player: PlayerId::new(1),
                facing: Vec2::new(-1.0, 0.0),
                destination: Vec2::new(5.0 - 5.0 * 0.45 * 0.1, 5.0),
            }]
        );
    }

    #[test]
    fn idle_players_and_missing_ticks_produce_nothing() {
        let players =
            PlayerView::from_snapshots(vec![snapshot(Vec2::new(5.0, 5.0), Intent::default())]);
        let mut out = Vec::new();
        Movement.handle(&tick(16), &players, &MovementTuning::default(), 0.0, &mut out);
        Movement.handle(&[], &players, &MovementTuning::default(), 0.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn interactions_follow_chest_then_east_west_south_north() {
        let mut map = TileMap::filled(6, 6, TileKind::Grass);
        let _ = map.set_tile(CellCoord::new(2, 2), TileKind::Chest);
        let _ = map.set_tile(CellCoord::new(3, 2), TileKind::Rock);
        let _ = map.set_tile(CellCoord::new(1, 2), TileKind::Tree);
        let _ = map.set_tile(CellCoord::new(2, 1), TileKind::Tree);
        let players =
            PlayerView::from_snapshots(vec![snapshot(Vec2::new(2.2, 1.8), Intent::default())]);
        let mut out = Vec::new();
        Interaction.handle(Phase::Calm, &players, &map, &mut out);

        let player = PlayerId::new(1);
        assert_eq!(
            out,
            vec![
                Command::OpenChest {
                    player,
                    cell: CellCoord::new(2, 2),
                },
                Command::Harvest {
                    player,
                    cell: CellCoord::new(3, 2),
                },
                Command::Harvest {
                    player,
                    cell: CellCoord::new(1, 2),
                },
                Command::Harvest {
                    player,
                    cell: CellCoord::new(2, 1),
                },
            ]
        );
    }

    #[test]
    fn objective_only_counts_at_night() {
        let mut map = TileMap::filled(4, 4, TileKind::Grass);
        let _ = map.set_tile(CellCoord::new(2, 2), TileKind::Objective);
        let players =
            PlayerView::from_snapshots(vec![snapshot(Vec2::new(2.0, 2.0), Intent::default())]);

        let mut out = Vec::new();
        Interaction.handle(Phase::Calm, &players, &map, &mut out);
        assert!(out.is_empty());

        Interaction.handle(Phase::Hostile, &players, &map, &mut out);
        assert_eq!(
            out,
            vec![Command::ReachObjective {
                player: PlayerId::new(1)
            }]
        );
    }
}
