#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Night Shift simulation.
//!
//! This crate defines the message surface that connects the session host, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems read immutable snapshots and respond
//! exclusively with new command batches.

mod gear;
mod input;
mod map;
mod profile;
mod tuning;

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use gear::{
    recipe, CraftAction, CraftStep, Cost, Gear, GearKind, Inventory, Material, Recipe, Weapon,
    MAX_GEAR_TIER, RECIPES,
};
pub use input::{InboundEvent, InputPayload, Intent};
pub use map::{
    CellCoord, SafeZone, TileKind, TileMap, Zone, HIDDEN_TILE_CODE, MAP_COLUMNS, MAP_ROWS,
};
pub use profile::{level_for_xp, Profile, ProfileStore};
pub use tuning::{
    BatTuning, CombatTuning, MovementTuning, PhaseTuning, RewardTuning, SessionTuning,
    SlingshotTuning, Tuning, VisionTuning,
};

/// Canonical banner emitted when the host boots.
pub const WELCOME_BANNER: &str = "Night Shift server running.";

/// Phases of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Gathering and crafting phase without enemies.
    #[serde(rename = "day")]
    Calm,
    /// Extraction phase with enemies and fog of war.
    #[serde(rename = "night")]
    Hostile,
}

impl Phase {
    /// Label published to clients for both the phase and the lighting mode.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calm => "day",
            Self::Hostile => "night",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a hostile phase came to an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundOutcome {
    /// Every connected player reached the objective.
    Won,
    /// The hostile timer ran out.
    Lost,
}

/// Cardinal directions on the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Decreasing row index.
    North,
    /// Increasing column index.
    East,
    /// Increasing row index.
    South,
    /// Decreasing column index.
    West,
}

impl Direction {
    /// Order in which a checkpoint's neighbours are inspected for entrances.
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Identifier assigned to a connected player.
///
/// Rendered as `p<n>` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Parses the `p<n>` wire form.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        text.strip_prefix('p')?.parse().ok().map(Self)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl Serialize for PlayerId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid player id `{text}`")))
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Effect of a single attack attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Strike {
    /// Launches a slingshot projectile from the attacker's position.
    Projectile {
        /// Velocity in tiles per second.
        velocity: Vec2,
        /// Seconds the projectile stays airborne.
        ttl: f32,
        /// Stun applied to the first enemies it touches.
        stun: f32,
    },
    /// Swings the bat at every enemy in reach.
    Melee {
        /// Enemies inside the swing.
        targets: Vec<EnemyId>,
        /// Simulation time the stun lasts until.
        stunned_until: f64,
    },
    /// No usable weapon is selected; only the cooldown starts.
    Empty,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock and the phase countdown.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Starts the hostile phase and spawns the enemy batch.
    BeginHostilePhase,
    /// Ends the current round and resets the camp for a new calm phase.
    ResetRound {
        /// Whether the team extracted.
        outcome: RoundOutcome,
    },
    /// Adds a player at the next spawn.
    JoinPlayer {
        /// Identifier allocated by the session.
        player: PlayerId,
        /// Sanitised display name.
        username: String,
        /// Progression loaded from the profile store.
        profile: Profile,
    },
    /// Removes a player.
    RemovePlayer {
        /// Player that disconnected.
        player: PlayerId,
    },
    /// Replaces the player's held intent.
    SetIntent {
        /// Player whose intent changes.
        player: PlayerId,
        /// Flags decoded from the latest input.
        intent: Intent,
    },
    /// Selects a weapon when it is owned.
    SelectWeapon {
        /// Player changing loadout.
        player: PlayerId,
        /// Requested weapon.
        weapon: Weapon,
    },
    /// Proposes a new position for a player.
    MovePlayer {
        /// Player that moves.
        player: PlayerId,
        /// Unit vector the player now faces.
        facing: Vec2,
        /// Unclamped destination; rejected when its tile is not walkable.
        destination: Vec2,
    },
    /// Opens the chest on the provided tile.
    OpenChest {
        /// Player standing on the chest.
        player: PlayerId,
        /// Tile holding the chest.
        cell: CellCoord,
    },
    /// Harvests a tree or rock adjacent to a player.
    Harvest {
        /// Player next to the resource.
        player: PlayerId,
        /// Tile holding the resource.
        cell: CellCoord,
    },
    /// Marks that a player stands on the objective during the hostile phase.
    ReachObjective {
        /// Player on the objective.
        player: PlayerId,
    },
    /// Consumes a craft pulse, applying the resolved action if any.
    Craft {
        /// Player crafting.
        player: PlayerId,
        /// Action selected by the crafting planner.
        action: Option<CraftAction>,
    },
    /// Consumes a weapon swap pulse.
    SwapWeapon {
        /// Player swapping.
        player: PlayerId,
    },
    /// Resolves an attack attempt and starts the cooldown.
    Attack {
        /// Attacking player.
        player: PlayerId,
        /// Resolved effect of the attack.
        strike: Strike,
    },
    /// Moves a projectile and applies its hits.
    AdvanceProjectile {
        /// Projectile being advanced.
        projectile: ProjectileId,
        /// New position.
        position: Vec2,
        /// Remaining lifetime after this step.
        ttl: f32,
        /// Enemies overlapped at the new position.
        hits: Vec<EnemyId>,
    },
    /// Moves an enemy.
    MoveEnemy {
        /// Enemy that moves.
        enemy: EnemyId,
        /// New position.
        position: Vec2,
    },
    /// Applies the tag slow to a player.
    TagPlayer {
        /// Player caught by an enemy.
        player: PlayerId,
        /// Simulation time the slow lasts until.
        until: f64,
    },
    /// Records that the objective entered a player's vision this round.
    RevealObjective {
        /// Player that saw the objective.
        player: PlayerId,
    },
    /// Mirrors progression returned by the profile store.
    SyncProfile {
        /// Player whose progression changed.
        player: PlayerId,
        /// Latest stored profile.
        profile: Profile,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The countdown of the active phase reached zero.
    PhaseTimerExpired {
        /// Phase whose timer ran out.
        phase: Phase,
    },
    /// A new phase became active.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// A round finished and the camp was reset.
    RoundEnded {
        /// How the round ended.
        outcome: RoundOutcome,
    },
    /// A player entered the world.
    PlayerJoined {
        /// Identifier of the new player.
        player: PlayerId,
        /// Spawn tile assigned to the player.
        spawn: CellCoord,
    },
    /// A player left the world.
    PlayerLeft {
        /// Identifier of the departed player.
        player: PlayerId,
        /// Display name the player used.
        username: String,
    },
    /// A player's position changed.
    PlayerMoved {
        /// Player that moved.
        player: PlayerId,
        /// Clamped position.
        position: Vec2,
    },
    /// A player earned experience that must reach the profile store.
    XpEarned {
        /// Player that earned the experience.
        player: PlayerId,
        /// Amount earned.
        amount: u32,
    },
    /// A chest or resource tile was turned into grass.
    TileConsumed {
        /// Tile that changed.
        cell: CellCoord,
        /// Contents before consumption.
        kind: TileKind,
    },
    /// A gear item was built or upgraded.
    ItemCrafted {
        /// Crafting player.
        player: PlayerId,
        /// Item affected.
        gear: GearKind,
        /// Tier after crafting.
        tier: u8,
    },
    /// A player's selected weapon changed.
    WeaponSelected {
        /// Player changing loadout.
        player: PlayerId,
        /// Weapon now selected.
        weapon: Weapon,
    },
    /// A projectile was launched.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Player that fired it.
        owner: PlayerId,
    },
    /// A projectile expired, hit something or left walkable ground.
    ProjectileExpired {
        /// Identifier of the removed projectile.
        projectile: ProjectileId,
    },
    /// An enemy entered the world.
    EnemySpawned {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Spawn position.
        position: Vec2,
    },
    /// An enemy was stunned.
    EnemyStunned {
        /// Enemy affected.
        enemy: EnemyId,
        /// Simulation time the stun lasts until.
        until: f64,
    },
    /// An enemy tagged a player.
    PlayerTagged {
        /// Player affected.
        player: PlayerId,
        /// Simulation time the slow lasts until.
        until: f64,
    },
    /// A player reached the objective during the hostile phase.
    ObjectiveReached {
        /// Player that reached it.
        player: PlayerId,
    },
}

/// Immutable representation of a player's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Identifier of the player.
    pub id: PlayerId,
    /// Display name.
    pub username: String,
    /// Continuous position in tile units.
    pub position: Vec2,
    /// Unit vector the player faces.
    pub facing: Vec2,
    /// Latest decoded intent.
    pub intent: Intent,
    /// Materials carried.
    pub inventory: Inventory,
    /// Crafted gear tiers.
    pub gear: Gear,
    /// Weapon used by attacks.
    pub selected_weapon: Weapon,
    /// Simulation time the tag slow lasts until.
    pub tagged_until: f64,
    /// Simulation time the next attack becomes available.
    pub attack_cooldown_until: f64,
    /// Whether the player reached the objective this hostile phase.
    pub objective_reached: bool,
    /// Whether the objective has entered the player's vision this round.
    pub objective_seen: bool,
    /// Progression mirrored from the profile store.
    pub profile: Profile,
}

impl PlayerSnapshot {
    /// Reports whether the tag slow is active at `now`.
    #[must_use]
    pub fn is_tagged(&self, now: f64) -> bool {
        now < self.tagged_until
    }

    /// Tile the player's position rounds to.
    #[must_use]
    pub fn cell(&self) -> Option<CellCoord> {
        CellCoord::containing(self.position)
    }
}

/// Read-only view of all players ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct PlayerView {
    snapshots: Vec<PlayerSnapshot>,
}

impl PlayerView {
    /// Builds a view from snapshots, sorting them by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PlayerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured player snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of a specific player.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&PlayerSnapshot> {
        self.snapshots
            .binary_search_by_key(&player, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of players captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no player is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PlayerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Continuous position in tile units.
    #[serde(flatten, with = "position_fields")]
    pub position: Vec2,
    /// Simulation time the stun lasts until.
    pub stunned_until: f64,
}

impl EnemySnapshot {
    /// Reports whether the enemy is stunned at `now`.
    #[must_use]
    pub fn is_stunned(&self, now: f64) -> bool {
        self.stunned_until > now
    }
}

/// Read-only view of all enemies ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Builds a view from snapshots, sorting them by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Player that fired it.
    #[serde(rename = "ownerId")]
    pub owner: PlayerId,
    /// Continuous position in tile units.
    #[serde(flatten, with = "position_fields")]
    pub position: Vec2,
    /// Velocity in tiles per second.
    #[serde(flatten, with = "velocity_fields")]
    pub velocity: Vec2,
    /// Remaining lifetime in seconds.
    pub ttl: f32,
    /// Stun imparted on hit.
    pub stun: f32,
}

/// Read-only view of all projectiles ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Builds a view from snapshots, sorting them by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Entry of the rolling event log shown to every client.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    /// Human readable message.
    pub message: String,
    /// Simulation time in seconds when the entry was written.
    pub at: f64,
}

/// Serialises a `Vec2` as flattened `x`/`y` fields.
pub mod position_fields {
    use glam::Vec2;
    use serde::{Serialize, Serializer};

    #[derive(Serialize)]
    struct Fields {
        x: f32,
        y: f32,
    }

    /// Writes `position` as `{ "x": .., "y": .. }`.
    pub fn serialize<S: Serializer>(position: &Vec2, serializer: S) -> Result<S::Ok, S::Error> {
        Fields {
            x: position.x,
            y: position.y,
        }
        .serialize(serializer)
    }
}

/// Serialises a velocity as flattened `vx`/`vy` fields.
pub mod velocity_fields {
    use glam::Vec2;
    use serde::{Serialize, Serializer};

    #[derive(Serialize)]
    struct Fields {
        vx: f32,
        vy: f32,
    }

    /// Writes `velocity` as `{ "vx": .., "vy": .. }`.
    pub fn serialize<S: Serializer>(velocity: &Vec2, serializer: S) -> Result<S::Ok, S::Error> {
        Fields {
            vx: velocity.x,
            vy: velocity.y,
        }
        .serialize(serializer)
    }
}
