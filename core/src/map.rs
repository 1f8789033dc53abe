//! Tile grid contracts shared by the generator, the world and the systems.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Direction;

/// Number of tile columns in every generated map.
pub const MAP_COLUMNS: u32 = 34;

/// Number of tile rows in every generated map.
pub const MAP_ROWS: u32 = 22;

/// Wire code published in place of tiles hidden by fog of war.
pub const HIDDEN_TILE_CODE: u8 = 99;

/// Enumerates the contents a single map tile can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Open ground.
    Grass,
    /// Harvestable tree; also used for the impassable border.
    Tree,
    /// Harvestable rock.
    Rock,
    /// Market stall, permanently blocked.
    Stall,
    /// Carved path connecting camp, junction and objective.
    Path,
    /// Safe haven that enemies cannot enter.
    Checkpoint,
    /// Extraction point players must reach during the hostile phase.
    Objective,
    /// Loot chest opened by standing on it.
    Chest,
}

impl TileKind {
    /// Numeric code used on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Grass => 0,
            Self::Tree => 1,
            Self::Rock => 2,
            Self::Stall => 3,
            Self::Path => 4,
            Self::Checkpoint => 5,
            Self::Objective => 6,
            Self::Chest => 7,
        }
    }

    /// Reports whether players may stand on the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(
            self,
            Self::Grass | Self::Path | Self::Checkpoint | Self::Objective | Self::Chest
        )
    }

    /// Reports whether enemies may stand on the tile. Checkpoints are excluded.
    #[must_use]
    pub const fn is_enemy_passable(self) -> bool {
        self.is_walkable() && !matches!(self, Self::Checkpoint)
    }

    /// Reports whether the tile closes off a safe-zone entrance.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::Tree | Self::Rock | Self::Stall)
    }
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "x")]
    column: u32,
    #[serde(rename = "y")]
    row: u32,
}

impl CellCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Resolves the tile a continuous position rounds to.
    ///
    /// Negative or non-finite positions have no tile.
    #[must_use]
    pub fn containing(position: Vec2) -> Option<Self> {
        let column = position.x.round();
        let row = position.y.round();
        if !(column >= 0.0 && row >= 0.0) || !column.is_finite() || !row.is_finite() {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }

    /// Continuous position of the tile centre.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }

    /// Neighbouring coordinate one step in `direction`, if it does not underflow.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };
        Some(Self::new(column?, row?))
    }
}

/// Named rectangle used by clients to label regions of the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Zone {
    /// Stable identifier of the zone.
    pub id: &'static str,
    /// Human readable label.
    pub label: &'static str,
    /// Inclusive left column.
    pub x1: u32,
    /// Inclusive top row.
    pub y1: u32,
    /// Inclusive right column.
    pub x2: u32,
    /// Inclusive bottom row.
    pub y2: u32,
}

impl Zone {
    /// Reports whether the zone rectangle covers the provided tile.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        (self.x1..=self.x2).contains(&cell.column()) && (self.y1..=self.y2).contains(&cell.row())
    }
}

/// Safe zone built around a checkpoint.
///
/// `remaining_hits` and `destroyed` are published but no gameplay rule consumes
/// them yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeZone {
    /// Stable identifier of the safe zone.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Tiles covered by the zone.
    pub tiles: Vec<CellCoord>,
    /// Orthogonal neighbours of the checkpoint that are not obstacles.
    pub entrances: Vec<CellCoord>,
    /// Durability the zone starts with.
    pub max_hits: u32,
    /// Durability left.
    pub remaining_hits: u32,
    /// Whether the zone has been destroyed.
    pub destroyed: bool,
}

/// Dense tile grid plus the metadata generated alongside it.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
    objective: CellCoord,
    checkpoints: Vec<CellCoord>,
    safe_zones: Vec<SafeZone>,
    spawns: Vec<CellCoord>,
    zones: Vec<Zone>,
}

impl TileMap {
    /// Creates a map of the given size where every tile holds `kind`.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, kind: TileKind) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![kind; capacity],
            objective: CellCoord::new(0, 0),
            checkpoints: Vec::new(),
            safe_zones: Vec::new(),
            spawns: Vec::new(),
            zones: Vec::new(),
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the coordinate lies on the outermost ring of the grid.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 >= self.columns
            || cell.row() + 1 >= self.rows
    }

    /// Tile stored at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Tile a continuous position rounds to.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> Option<TileKind> {
        CellCoord::containing(position).and_then(|cell| self.tile(cell))
    }

    /// Overwrites the tile at `cell`. Returns `false` outside the grid.
    pub fn set_tile(&mut self, cell: CellCoord, kind: TileKind) -> bool {
        match self.index(cell).and_then(|index| self.tiles.get_mut(index)) {
            Some(slot) => {
                *slot = kind;
                true
            }
            None => false,
        }
    }

    /// Reports whether players may stand on `cell`. Out of range fails closed.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(TileKind::is_walkable)
    }

    /// Reports whether players may stand at the rounded position.
    #[must_use]
    pub fn is_walkable_at(&self, position: Vec2) -> bool {
        self.tile_at(position).is_some_and(TileKind::is_walkable)
    }

    /// Reports whether enemies may stand at the rounded position.
    #[must_use]
    pub fn is_enemy_passable_at(&self, position: Vec2) -> bool {
        self.tile_at(position)
            .is_some_and(TileKind::is_enemy_passable)
    }

    /// Reports whether the rounded position is a checkpoint tile.
    #[must_use]
    pub fn is_checkpoint_at(&self, position: Vec2) -> bool {
        self.tile_at(position) == Some(TileKind::Checkpoint)
    }

    /// Iterates rows from top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[TileKind]> {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.tiles.chunks(width)
    }

    /// Iterates every tile together with its coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, TileKind)> + '_ {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    /// Extraction tile players must reach.
    #[must_use]
    pub const fn objective(&self) -> CellCoord {
        self.objective
    }

    /// Checkpoint tiles in generation order.
    #[must_use]
    pub fn checkpoints(&self) -> &[CellCoord] {
        &self.checkpoints
    }

    /// Safe-zone descriptors built around the checkpoints.
    #[must_use]
    pub fn safe_zones(&self) -> &[SafeZone] {
        &self.safe_zones
    }

    /// Player spawn tiles in round-robin order.
    #[must_use]
    pub fn spawns(&self) -> &[CellCoord] {
        &self.spawns
    }

    /// Named regions for client labels.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Records the extraction tile.
    pub fn set_objective(&mut self, objective: CellCoord) {
        self.objective = objective;
    }

    /// Records the checkpoint tiles.
    pub fn set_checkpoints(&mut self, checkpoints: Vec<CellCoord>) {
        self.checkpoints = checkpoints;
    }

    /// Records the safe-zone descriptors.
    pub fn set_safe_zones(&mut self, safe_zones: Vec<SafeZone>) {
        self.safe_zones = safe_zones;
    }

    /// Records the spawn tiles.
    pub fn set_spawns(&mut self, spawns: Vec<CellCoord>) {
        self.spawns = spawns;
    }

    /// Records the labelled regions.
    pub fn set_zones(&mut self, zones: Vec<Zone>) {
        self.zones = zones;
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
