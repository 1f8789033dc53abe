//! Procedural camp layout.

use std::collections::VecDeque;

use night_shift_core::{
    CellCoord, Direction, SafeZone, TileKind, TileMap, Zone, MAP_COLUMNS, MAP_ROWS,
};
use rand::Rng;

/// Scatter densities expressed per mille of interior tiles.
const TREE_DENSITY_PER_MILLE: u32 = 95;
const ROCK_DENSITY_PER_MILLE: u32 = 60;
const CHEST_DENSITY_PER_MILLE: u32 = 22;

const PLACEMENT_ATTEMPTS_PER_TILE: u32 = 40;

/// Trees keep this Manhattan distance (exclusive) clear around the objective.
const OBJECTIVE_CLEARANCE: u32 = 7;

struct SafeZoneBlueprint {
    id: &'static str,
    name: &'static str,
    checkpoint_index: usize,
    max_hits: u32,
}

const SAFE_ZONE_BLUEPRINTS: [SafeZoneBlueprint; 4] = [
    SafeZoneBlueprint {
        id: "safe-a",
        name: "Safe Zone A",
        checkpoint_index: 0,
        max_hits: 5,
    },
    SafeZoneBlueprint {
        id: "safe-b",
        name: "Safe Zone B",
        checkpoint_index: 1,
        max_hits: 5,
    },
    SafeZoneBlueprint {
        id: "safe-c",
        name: "Safe Zone C",
        checkpoint_index: 2,
        max_hits: 6,
    },
    SafeZoneBlueprint {
        id: "safe-d",
        name: "Safe Zone D",
        checkpoint_index: 3,
        max_hits: 6,
    },
];

/// Generates a fresh camp map, drawing decoration positions from `rng`.
///
/// The fixed skeleton (border, market, paths, objective, checkpoints, spawns)
/// never changes between calls. Trees, rocks and chests are scattered by
/// rejection sampling and may fall short of their target counts. Every spawn
/// is guaranteed a walkable route to the objective.
pub fn generate_map<R: Rng>(rng: &mut R) -> TileMap {
    let columns = MAP_COLUMNS;
    let rows = MAP_ROWS;
    let mut map = TileMap::filled(columns, rows, TileKind::Grass);

    for column in 0..columns {
        let _ = map.set_tile(CellCoord::new(column, 0), TileKind::Tree);
        let _ = map.set_tile(CellCoord::new(column, rows - 1), TileKind::Tree);
    }
    for row in 0..rows {
        let _ = map.set_tile(CellCoord::new(0, row), TileKind::Tree);
        let _ = map.set_tile(CellCoord::new(columns - 1, row), TileKind::Tree);
    }

    for row in 2..=11 {
        for column in columns - 18..=columns - 6 {
            let _ = map.set_tile(CellCoord::new(column, row), TileKind::Stall);
        }
    }

    let mid_row = rows / 2;
    let junction = CellCoord::new(columns / 2, mid_row);
    carve_path(
        &mut map,
        CellCoord::new(2, mid_row),
        CellCoord::new(columns - 3, mid_row),
    );
    carve_path(
        &mut map,
        CellCoord::new(columns / 4, 2),
        CellCoord::new(columns / 4, rows - 3),
    );
    carve_path(
        &mut map,
        CellCoord::new(columns / 2, 4),
        CellCoord::new(columns / 2, rows - 5),
    );

    let objective = CellCoord::new(columns - 7, rows - 6);
    carve_path(&mut map, junction, objective);
    let _ = map.set_tile(objective, TileKind::Objective);

    let checkpoints = vec![
        CellCoord::new(6, 5),
        CellCoord::new(columns / 3, rows - 8),
        CellCoord::new(columns / 2, mid_row + 4),
        CellCoord::new(columns - 14, 10),
    ];
    for checkpoint in &checkpoints {
        let _ = map.set_tile(*checkpoint, TileKind::Checkpoint);
    }

    let spawns = vec![
        CellCoord::new(3, 3),
        CellCoord::new(4, rows - 4),
        CellCoord::new(8, mid_row),
        CellCoord::new(5, mid_row + 3),
        CellCoord::new(10, 6),
        CellCoord::new(12, rows - 7),
    ];

    let interior = (columns - 2) * (rows - 2);
    scatter(
        &mut map,
        rng,
        TileKind::Tree,
        interior * TREE_DENSITY_PER_MILLE / 1000,
        |cell| {
            cell.manhattan_distance(objective) > OBJECTIVE_CLEARANCE && !spawns.contains(&cell)
        },
    );
    scatter(
        &mut map,
        rng,
        TileKind::Rock,
        interior * ROCK_DENSITY_PER_MILLE / 1000,
        |cell| !spawns.contains(&cell),
    );
    scatter(
        &mut map,
        rng,
        TileKind::Chest,
        interior * CHEST_DENSITY_PER_MILLE / 1000,
        |cell| !spawns.contains(&cell),
    );

    connect_spawns(&mut map, objective, junction, &spawns);

    let safe_zones = build_safe_zones(&map, &checkpoints);
    map.set_objective(objective);
    map.set_checkpoints(checkpoints);
    map.set_safe_zones(safe_zones);
    map.set_spawns(spawns);
    map.set_zones(zones(columns, rows));
    map
}

/// Closest enemy-passable tile to `cell`, preferring lower rows then columns on ties.
pub(crate) fn nearest_enemy_passable(map: &TileMap, cell: CellCoord) -> Option<CellCoord> {
    map.cells()
        .filter(|(_, kind)| kind.is_enemy_passable())
        .map(|(candidate, _)| candidate)
        .min_by_key(|candidate| {
            (
                candidate.manhattan_distance(cell),
                candidate.row(),
                candidate.column(),
            )
        })
}

/// Sets every tile on the Manhattan route from `from` to `to` to a path,
/// walking columns first and including both ends.
fn carve_path(map: &mut TileMap, from: CellCoord, to: CellCoord) {
    walk_route(from, to, |cell| {
        let _ = map.set_tile(cell, TileKind::Path);
    });
}

fn walk_route<F: FnMut(CellCoord)>(from: CellCoord, to: CellCoord, mut visit: F) {
    let mut column = from.column();
    let mut row = from.row();
    while column != to.column() {
        visit(CellCoord::new(column, row));
        column = if column < to.column() { column + 1 } else { column - 1 };
    }
    while row != to.row() {
        visit(CellCoord::new(column, row));
        row = if row < to.row() { row + 1 } else { row - 1 };
    }
    visit(CellCoord::new(column, row));
}

fn scatter<R, F>(map: &mut TileMap, rng: &mut R, kind: TileKind, count: u32, accept: F)
where
    R: Rng,
    F: Fn(CellCoord) -> bool,
{
    let max_attempts = count.saturating_mul(PLACEMENT_ATTEMPTS_PER_TILE);
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < max_attempts {
        let cell = CellCoord::new(
            rng.gen_range(1..=map.columns() - 2),
            rng.gen_range(1..=map.rows() - 2),
        );
        if map.tile(cell) == Some(TileKind::Grass) && accept(cell) {
            let _ = map.set_tile(cell, kind);
            placed += 1;
        }
        attempts += 1;
    }
}

/// Carves an L-shaped connector toward the junction for every spawn the
/// objective cannot reach. Only blocked tiles on the connector change.
fn connect_spawns(
    map: &mut TileMap,
    objective: CellCoord,
    junction: CellCoord,
    spawns: &[CellCoord],
) {
    let reachable = reachable_from(map, objective);
    for spawn in spawns {
        let reached = index_of(map, *spawn).is_some_and(|index| reachable[index]);
        if reached {
            continue;
        }
        walk_route(*spawn, junction, |cell| {
            if !map.is_walkable(cell) {
                let _ = map.set_tile(cell, TileKind::Path);
            }
        });
    }
}

fn reachable_from(map: &TileMap, start: CellCoord) -> Vec<bool> {
    let capacity = map.cells().count();
    let mut visited = vec![false; capacity];
    let mut frontier = VecDeque::new();
    if let Some(index) = index_of(map, start) {
        visited[index] = true;
        frontier.push_back(start);
    }
    while let Some(cell) = frontier.pop_front() {
        for direction in Direction::CLOCKWISE {
            let Some(next) = cell.step(direction) else {
                continue;
            };
            if !map.is_walkable(next) {
                continue;
            }
            let Some(index) = index_of(map, next) else {
                continue;
            };
            if !visited[index] {
                visited[index] = true;
                frontier.push_back(next);
            }
        }
    }
    visited
}

fn index_of(map: &TileMap, cell: CellCoord) -> Option<usize> {
    if !map.contains(cell) {
        return None;
    }
    let width = usize::try_from(map.columns()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    Some(row * width + column)
}

fn build_safe_zones(map: &TileMap, checkpoints: &[CellCoord]) -> Vec<SafeZone> {
    SAFE_ZONE_BLUEPRINTS
        .iter()
        .filter_map(|blueprint| {
            let checkpoint = *checkpoints.get(blueprint.checkpoint_index)?;
            let entrances = Direction::CLOCKWISE
                .iter()
                .filter_map(|direction| checkpoint.step(*direction))
                .filter(|cell| map.tile(*cell).is_some_and(|kind| !kind.is_obstacle()))
                .collect();
            Some(SafeZone {
                id: blueprint.id,
                name: blueprint.name,
                tiles: vec![checkpoint],
                entrances,
                max_hits: blueprint.max_hits,
                remaining_hits: blueprint.max_hits,
                destroyed: false,
            })
        })
        .collect()
}

fn zones(columns: u32, rows: u32) -> Vec<Zone> {
    vec![
        Zone {
            id: "camp",
            label: "Camp",
            x1: 1,
            y1: 1,
            x2: 20,
            y2: 15,
        },
        Zone {
            id: "market",
            label: "Market",
            x1: columns - 20,
            y1: 1,
            x2: columns - 2,
            y2: 14,
        },
        Zone {
            id: "forest",
            label: "Forest",
            x1: 10,
            y1: 12,
            x2: columns - 14,
            y2: rows - 10,
        },
        Zone {
            id: "outskirts",
            label: "Outskirts",
            x1: 1,
            y1: rows - 12,
            x2: columns - 2,
            y2: rows - 2,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn skeleton_is_fixed_across_seeds() {
        for seed in [1_u64, 2, 99] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate_map(&mut rng);
            assert_eq!(map.objective(), CellCoord::new(27, 16));
            assert_eq!(map.tile(CellCoord::new(27, 16)), Some(TileKind::Objective));
            assert_eq!(
                map.checkpoints(),
                &[
                    CellCoord::new(6, 5),
                    CellCoord::new(11, 14),
                    CellCoord::new(17, 15),
                    CellCoord::new(20, 10),
                ]
            );
            assert_eq!(map.spawns().len(), 6);
            assert_eq!(map.zones().len(), 4);
            assert_eq!(map.safe_zones().len(), 4);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_map() {
        let first = generate_map(&mut ChaCha8Rng::seed_from_u64(42));
        let second = generate_map(&mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn trees_stay_clear_of_the_objective() {
        let map = generate_map(&mut ChaCha8Rng::seed_from_u64(5));
        let objective = map.objective();
        for (cell, kind) in map.cells() {
            if kind == TileKind::Tree && !map.is_border(cell) {
                assert!(
                    cell.manhattan_distance(objective) > OBJECTIVE_CLEARANCE,
                    "tree at {cell:?} too close to the objective"
                );
            }
        }
    }

    #[test]
    fn blocked_checkpoint_neighbours_are_not_entrances() {
        let map = generate_map(&mut ChaCha8Rng::seed_from_u64(3));
        let market_checkpoint = map
            .safe_zones()
            .iter()
            .find(|zone| zone.id == "safe-d")
            .expect("safe zone d exists");
        assert_eq!(market_checkpoint.tiles, vec![CellCoord::new(20, 10)]);
        assert_eq!(market_checkpoint.entrances, vec![CellCoord::new(20, 11)]);
        assert_eq!(market_checkpoint.max_hits, 6);
        assert_eq!(market_checkpoint.remaining_hits, 6);
    }

    #[test]
    fn connector_only_touches_blocked_tiles() {
        let mut map = TileMap::filled(7, 5, TileKind::Rock);
        let _ = map.set_tile(CellCoord::new(3, 1), TileKind::Chest);
        connect_spawns(
            &mut map,
            CellCoord::new(5, 3),
            CellCoord::new(5, 3),
            &[CellCoord::new(1, 1)],
        );
        assert_eq!(map.tile(CellCoord::new(3, 1)), Some(TileKind::Chest));
        assert_eq!(map.tile(CellCoord::new(1, 1)), Some(TileKind::Path));
        assert_eq!(map.tile(CellCoord::new(5, 2)), Some(TileKind::Path));
        assert_eq!(map.tile(CellCoord::new(1, 2)), Some(TileKind::Rock));
    }

    #[test]
    fn enemy_spawns_skip_stalls_and_checkpoints() {
        let mut map = TileMap::filled(5, 5, TileKind::Stall);
        let _ = map.set_tile(CellCoord::new(2, 2), TileKind::Checkpoint);
        let _ = map.set_tile(CellCoord::new(4, 2), TileKind::Grass);
        let _ = map.set_tile(CellCoord::new(0, 2), TileKind::Path);
        assert_eq!(
            nearest_enemy_passable(&map, CellCoord::new(2, 2)),
            Some(CellCoord::new(0, 2))
        );
    }
}
