#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fog of war: vision radii, per-tile visibility and masked map views.
//!
//! During the calm phase everybody sees everything. At night each player sees
//! the tiles and entities within a radius that grows with their torch tier.
//! Checkpoints stay visible regardless, and the objective is remembered once a
//! player has spotted it during the current round.

use glam::Vec2;
use night_shift_core::{
    CellCoord, Command, Gear, GearKind, Phase, PlayerView, TileMap, VisionTuning, HIDDEN_TILE_CODE,
};
use serde::Serialize;

/// How far a player can see.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisionRadius {
    /// No restriction; used during the calm phase.
    Unlimited,
    /// Euclidean radius in tiles.
    Limited(f32),
}

impl VisionRadius {
    /// Reports whether `target` lies within the radius around `observer`.
    #[must_use]
    pub fn covers(self, observer: Vec2, target: Vec2) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(radius) => is_within_vision(observer, target, radius),
        }
    }

    /// Radius in tiles, or `None` when unrestricted.
    #[must_use]
    pub const fn limit(self) -> Option<f32> {
        match self {
            Self::Unlimited => None,
            Self::Limited(radius) => Some(radius),
        }
    }
}

/// Vision radius of a player with `gear` during `phase`.
#[must_use]
pub fn vision_radius(phase: Phase, gear: &Gear, tuning: &VisionTuning) -> VisionRadius {
    match phase {
        Phase::Calm => VisionRadius::Unlimited,
        Phase::Hostile => VisionRadius::Limited(tuning.radius(gear.tier(GearKind::Torch))),
    }
}

/// Reports whether `target` is no further than `radius` from `observer`.
#[must_use]
pub fn is_within_vision(observer: Vec2, target: Vec2, radius: f32) -> bool {
    observer.distance(target) <= radius
}

/// Visibility policy for a special tile kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileVisibility {
    /// Visible at any distance.
    Always,
    /// Visible within the radius, and from then on for the rest of the round.
    HiddenUntilSeen,
}

/// Visibility policies published to clients alongside every snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VisibilityRules {
    /// Policy for checkpoints.
    pub checkpoint: TileVisibility,
    /// Policy for the objective.
    pub objective: TileVisibility,
}

impl VisibilityRules {
    /// Checkpoints always visible, objective hidden until seen.
    pub const DEFAULT: Self = Self {
        checkpoint: TileVisibility::Always,
        objective: TileVisibility::HiddenUntilSeen,
    };
}

impl Default for VisibilityRules {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-tile visibility flags for one observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityMask {
    columns: u32,
    rows: u32,
    visible: Vec<bool>,
}

impl VisibilityMask {
    /// Mask of the given size with every tile visible.
    #[must_use]
    pub fn revealed(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            visible: vec![true; (columns * rows) as usize],
        }
    }

    /// Reports whether `cell` is visible. Cells outside the mask are not.
    #[must_use]
    pub fn is_visible(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.visible.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of visible tiles.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|visible| **visible).count()
    }

    fn reveal(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.visible.get_mut(index)) {
            *slot = true;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        Some((cell.row() * self.columns + cell.column()) as usize)
    }
}

/// Computes which tiles an observer at `observer` can see.
///
/// `objective_seen` is the observer's memory of having spotted the objective
/// earlier in the round.
#[must_use]
pub fn visible_tiles(
    map: &TileMap,
    observer: Vec2,
    radius: VisionRadius,
    objective_seen: bool,
    rules: &VisibilityRules,
) -> VisibilityMask {
    let Some(limit) = radius.limit() else {
        return VisibilityMask::revealed(map.columns(), map.rows());
    };

    let mut mask = VisibilityMask {
        columns: map.columns(),
        rows: map.rows(),
        visible: Vec::with_capacity((map.columns() * map.rows()) as usize),
    };
    for row in 0..map.rows() {
        for column in 0..map.columns() {
            let centre = CellCoord::new(column, row).center();
            mask.visible.push(is_within_vision(observer, centre, limit));
        }
    }

    if rules.checkpoint == TileVisibility::Always {
        for checkpoint in map.checkpoints() {
            mask.reveal(*checkpoint);
        }
    }
    if rules.objective == TileVisibility::Always || objective_seen {
        mask.reveal(map.objective());
    }
    mask
}

/// Tile codes of `map` with every hidden tile replaced by
/// [`HIDDEN_TILE_CODE`]. Dimensions are preserved.
#[must_use]
pub fn mask_map(map: &TileMap, mask: &VisibilityMask) -> Vec<Vec<u8>> {
    map.rows_iter()
        .enumerate()
        .map(|(row, tiles)| {
            tiles
                .iter()
                .enumerate()
                .map(|(column, tile)| {
                    if mask.is_visible(CellCoord::new(column as u32, row as u32)) {
                        tile.code()
                    } else {
                        HIDDEN_TILE_CODE
                    }
                })
                .collect()
        })
        .collect()
}

/// Pure system that records when players first spot the objective at night.
#[derive(Debug, Default)]
pub struct Visibility;

impl Visibility {
    /// Emits [`Command::RevealObjective`] for every player who has not yet seen
    /// the objective this round and now has it within their vision radius.
    pub fn handle(
        &mut self,
        phase: Phase,
        players: &PlayerView,
        map: &TileMap,
        tuning: &VisionTuning,
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Hostile {
            return;
        }
        let objective = map.objective();
        for player in players.iter() {
            if player.objective_seen {
                continue;
            }
            let radius = vision_radius(phase, &player.gear, tuning);
            if radius.covers(player.position, objective.center()) {
                out.push(Command::RevealObjective { player: player.id });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use night_shift_core::{Intent, PlayerId, PlayerSnapshot, Profile, TileKind, Weapon};

    fn grass_map() -> TileMap {
        let mut map = TileMap::filled(12, 8, TileKind::Grass);
        let _ = map.set_tile(CellCoord::new(10, 6), TileKind::Objective);
        map.set_objective(CellCoord::new(10, 6));
        let _ = map.set_tile(CellCoord::new(11, 0), TileKind::Checkpoint);
        map.set_checkpoints(vec![CellCoord::new(11, 0)]);
        map
    }

    fn scout(position: Vec2, torch: u8, objective_seen: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(3),
            username: "Scout".to_owned(),
            position,
            facing: Vec2::X,
            intent: Intent::default(),
            inventory: Default::default(),
            gear: Gear::new().with_tier(GearKind::Torch, torch),
            selected_weapon: Weapon::Bat,
            tagged_until: 0.0,
            attack_cooldown_until: 0.0,
            objective_reached: false,
            objective_seen,
            profile: Profile::default(),
        }
    }

    #[test]
    fn radius_grows_with_torch_tier() {
        let tuning = VisionTuning::default();
        let radii: Vec<Option<f32>> = (0..=3)
            .map(|tier| {
                vision_radius(
                    Phase::Hostile,
                    &Gear::new().with_tier(GearKind::Torch, tier),
                    &tuning,
                )
                .limit()
            })
            .collect();
        assert_eq!(radii, vec![Some(4.0), Some(6.0), Some(8.0), Some(10.0)]);
        assert_eq!(
            vision_radius(Phase::Calm, &Gear::new(), &tuning),
            VisionRadius::Unlimited
        );
    }

    #[test]
    fn calm_phase_reveals_everything() {
        let map = grass_map();
        let mask = visible_tiles(
            &map,
            Vec2::ZERO,
            VisionRadius::Unlimited,
            false,
            &VisibilityRules::DEFAULT,
        );
        assert_eq!(mask.visible_count(), 12 * 8);
    }

    #[test]
    fn night_mask_keeps_checkpoints_and_hides_the_unseen_objective() {
        let map = grass_map();
        let observer = Vec2::new(2.0, 2.0);
        let mask = visible_tiles(
            &map,
            observer,
            VisionRadius::Limited(2.0),
            false,
            &VisibilityRules::DEFAULT,
        );
        assert!(mask.is_visible(CellCoord::new(4, 2)));
        assert!(!mask.is_visible(CellCoord::new(4, 3)));
        assert!(mask.is_visible(CellCoord::new(11, 0)));
        assert!(!mask.is_visible(CellCoord::new(10, 6)));

        let remembered = visible_tiles(
            &map,
            observer,
            VisionRadius::Limited(2.0),
            true,
            &VisibilityRules::DEFAULT,
        );
        assert!(remembered.is_visible(CellCoord::new(10, 6)));

        let codes = mask_map(&map, &mask);
        assert_eq!(codes.len(), 8);
        assert!(codes.iter().all(|row| row.len() == 12));
        assert_eq!(codes[2][2], TileKind::Grass.code());
        assert_eq!(codes[6][10], HIDDEN_TILE_CODE);
        assert_eq!(codes[0][11], TileKind::Checkpoint.code());
    }

    #[test]
    fn objective_is_revealed_once_in_range() {
        let map = grass_map();
        let tuning = VisionTuning::default();
        let players = PlayerView::from_snapshots(vec![scout(Vec2::new(7.0, 6.0), 0, false)]);
        let mut out = Vec::new();

        Visibility.handle(Phase::Calm, &players, &map, &tuning, &mut out);
        assert!(out.is_empty());

        Visibility.handle(Phase::Hostile, &players, &map, &tuning, &mut out);
        assert_eq!(
            out,
            vec![Command::RevealObjective {
                player: PlayerId::new(3)
            }]
        );

        let remembered = PlayerView::from_snapshots(vec![scout(Vec2::new(7.0, 6.0), 0, true)]);
        out.clear();
        Visibility.handle(Phase::Hostile, &remembered, &map, &tuning, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn rules_use_kebab_case_on_the_wire() {
        let json = serde_json::to_value(VisibilityRules::DEFAULT).expect("serialise rules");
        assert_eq!(
            json,
            serde_json::json!({
                "checkpoint": "always",
                "objective": "hidden-until-seen",
            })
        );
    }
}
