#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Night Shift.

mod generation;
mod roster;

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use night_shift_core::{
    CellCoord, Command, CraftAction, CraftStep, EnemyId, Event, Inventory, LogEntry, Material,
    Phase, PlayerId, ProjectileId, RoundOutcome, Strike, TileKind, TileMap, Tuning, Weapon,
    WELCOME_BANNER,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use generation::generate_map;

use generation::nearest_enemy_passable;
use roster::{Enemy, Player, Projectile};

/// Represents the authoritative Night Shift world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tuning: Tuning,
    rng: ChaCha8Rng,
    map: TileMap,
    phase: Phase,
    phase_timer: f32,
    clock: f64,
    players: BTreeMap<PlayerId, Player>,
    enemies: BTreeMap<EnemyId, Enemy>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    log: EventLog,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates a world in the calm phase with a map generated from `seed`.
    #[must_use]
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let map = generate_map(&mut rng);
        let log = EventLog::new(tuning.session.event_log_capacity);
        Self {
            banner: WELCOME_BANNER,
            phase: Phase::Calm,
            phase_timer: tuning.phase.duration(Phase::Calm),
            clock: 0.0,
            tuning,
            rng,
            map,
            players: BTreeMap::new(),
            enemies: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            log,
            next_enemy_id: 0,
            next_projectile_id: 0,
        }
    }

    fn begin_hostile_phase(&mut self, out_events: &mut Vec<Event>) {
        self.phase = Phase::Hostile;
        self.phase_timer = self.tuning.phase.duration(Phase::Hostile);
        self.enemies.clear();

        let count = self.tuning.phase.enemy_count(self.players.len());
        for index in 0..count {
            let column = self.map.columns().saturating_sub(4 + index % 3);
            let preferred = CellCoord::new(column, 3 + 2 * index);
            let Some(cell) = nearest_enemy_passable(&self.map, preferred) else {
                continue;
            };
            let id = EnemyId::new(self.next_enemy_id);
            self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
            let position = cell.center();
            let _ = self.enemies.insert(
                id,
                Enemy {
                    id,
                    position,
                    stunned_until: 0.0,
                },
            );
            out_events.push(Event::EnemySpawned {
                enemy: id,
                position,
            });
        }

        for player in self.players.values_mut() {
            player.objective_reached = false;
            player.objective_seen = false;
        }

        tracing::info!(enemies = self.enemies.len(), "hostile phase started");
        self.log.push("Night has fallen. Get to objective together!", self.clock);
        out_events.push(Event::PhaseChanged {
            phase: Phase::Hostile,
        });
    }

    fn reset_round(&mut self, outcome: RoundOutcome, out_events: &mut Vec<Event>) {
        match outcome {
            RoundOutcome::Won => {
                let amount = self.tuning.rewards.extraction_xp;
                for player in self.players.keys() {
                    out_events.push(Event::XpEarned {
                        player: *player,
                        amount,
                    });
                }
                self.log
                    .push("Round success! Team extracted and gained XP.", self.clock);
            }
            RoundOutcome::Lost => {
                self.log.push("Round failed. Resetting camp...", self.clock);
            }
        }
        tracing::info!(?outcome, players = self.players.len(), "round ended");

        self.phase = Phase::Calm;
        self.phase_timer = self.tuning.phase.duration(Phase::Calm);
        self.enemies.clear();
        self.projectiles.clear();
        self.map = generate_map(&mut self.rng);

        let spawns = self.map.spawns().to_vec();
        for (index, player) in self.players.values_mut().enumerate() {
            if let Some(spawn) = spawn_at(&spawns, index) {
                player.position = spawn.center();
            }
            player.objective_reached = false;
            player.objective_seen = false;
            player.tagged_until = self.clock;
        }

        out_events.push(Event::RoundEnded { outcome });
        out_events.push(Event::PhaseChanged { phase: Phase::Calm });
    }

    fn open_chest(&mut self, player: PlayerId, cell: CellCoord, out_events: &mut Vec<Event>) {
        if !self.players.contains_key(&player) || self.map.tile(cell) != Some(TileKind::Chest) {
            return;
        }
        let _ = self.map.set_tile(cell, TileKind::Grass);

        let rewards = &self.tuning.rewards;
        let material = Material::ALL[self.rng.gen_range(0..Material::ALL.len())];
        let low = rewards.chest_min_amount;
        let high = rewards.chest_max_amount.max(low);
        let amount = self.rng.gen_range(low..=high);
        let xp = rewards.chest_xp;

        if let Some(state) = self.players.get_mut(&player) {
            state.inventory.add(material, amount);
            let message = format!("{} opened a chest (+{amount} {material}).", state.username);
            self.log.push(message, self.clock);
        }
        out_events.push(Event::TileConsumed {
            cell,
            kind: TileKind::Chest,
        });
        out_events.push(Event::XpEarned { player, amount: xp });
    }

    fn harvest(&mut self, player: PlayerId, cell: CellCoord, out_events: &mut Vec<Event>) {
        if self.map.is_border(cell) {
            return;
        }
        let Some(kind) = self.map.tile(cell) else {
            return;
        };
        let rewards = &self.tuning.rewards;
        let yields = match kind {
            TileKind::Tree => Inventory::new().with(Material::Wood, rewards.wood_per_tree),
            TileKind::Rock => Inventory::new()
                .with(Material::Stone, rewards.stone_per_rock)
                .with(Material::Pebbles, rewards.pebbles_per_rock),
            _ => return,
        };
        let Some(state) = self.players.get_mut(&player) else {
            return;
        };
        for material in Material::ALL {
            state.inventory.add(material, yields.get(material));
        }
        let _ = self.map.set_tile(cell, TileKind::Grass);
        out_events.push(Event::TileConsumed { cell, kind });
        out_events.push(Event::XpEarned {
            player,
            amount: rewards.harvest_xp,
        });
    }

    fn craft(&mut self, player: PlayerId, action: Option<CraftAction>, out_events: &mut Vec<Event>) {
        let Some(state) = self.players.get_mut(&player) else {
            return;
        };
        state.intent.craft = false;
        let Some(action) = action else {
            return;
        };

        let mut gear = state.gear;
        let advanced = match action.step {
            CraftStep::Build => gear.build(action.gear),
            CraftStep::Upgrade => gear.upgrade(action.gear),
        };
        if !advanced || !state.inventory.spend(action.cost()) {
            return;
        }
        state.gear = gear;

        let tier = state.gear.tier(action.gear);
        let message = match action.step {
            CraftStep::Build => format!("{} crafted {} T1.", state.username, action.gear),
            CraftStep::Upgrade => {
                format!("{} upgraded {} to T{tier}.", state.username, action.gear)
            }
        };
        self.log.push(message, self.clock);
        out_events.push(Event::ItemCrafted {
            player,
            gear: action.gear,
            tier,
        });
    }

    fn select_weapon(&mut self, player: PlayerId, weapon: Weapon, out_events: &mut Vec<Event>) {
        let Some(state) = self.players.get_mut(&player) else {
            return;
        };
        if !state.gear.owns(weapon.gear()) || state.selected_weapon == weapon {
            return;
        }
        state.selected_weapon = weapon;
        out_events.push(Event::WeaponSelected { player, weapon });
    }

    fn attack(&mut self, player: PlayerId, strike: Strike, out_events: &mut Vec<Event>) {
        let Some(state) = self.players.get_mut(&player) else {
            return;
        };
        if self.clock < state.attack_cooldown_until {
            return;
        }
        state.attack_cooldown_until = self.clock + f64::from(self.tuning.combat.attack_cooldown);

        match strike {
            Strike::Projectile {
                velocity,
                ttl,
                stun,
            } => {
                let id = ProjectileId::new(self.next_projectile_id);
                self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
                let _ = self.projectiles.insert(
                    id,
                    Projectile {
                        id,
                        owner: player,
                        position: state.position,
                        velocity,
                        ttl,
                        stun,
                    },
                );
                let message = format!("{} fired slingshot.", state.username);
                self.log.push(message, self.clock);
                out_events.push(Event::ProjectileFired {
                    projectile: id,
                    owner: player,
                });
            }
            Strike::Melee {
                targets,
                stunned_until,
            } => {
                let message = format!("{} swung bat.", state.username);
                for target in targets {
                    if let Some(enemy) = self.enemies.get_mut(&target) {
                        enemy.stunned_until = stunned_until;
                        out_events.push(Event::EnemyStunned {
                            enemy: target,
                            until: stunned_until,
                        });
                    }
                }
                self.log.push(message, self.clock);
            }
            Strike::Empty => {}
        }
    }

    fn advance_projectile(
        &mut self,
        projectile: ProjectileId,
        position: Vec2,
        ttl: f32,
        hits: Vec<EnemyId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.projectiles.get_mut(&projectile) else {
            return;
        };
        state.position = position;
        state.ttl = ttl;

        let stun_until = self.clock + f64::from(state.stun);
        for hit in hits {
            if let Some(enemy) = self.enemies.get_mut(&hit) {
                enemy.stunned_until = enemy.stunned_until.max(stun_until);
                state.ttl = 0.0;
                out_events.push(Event::EnemyStunned {
                    enemy: hit,
                    until: enemy.stunned_until,
                });
            }
        }

        if state.ttl <= 0.0 || !self.map.is_walkable_at(state.position) {
            let _ = self.projectiles.remove(&projectile);
            out_events.push(Event::ProjectileExpired { projectile });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock += dt.as_secs_f64();
            world.phase_timer -= dt.as_secs_f32();
            out_events.push(Event::TimeAdvanced { dt });
            if world.phase_timer <= 0.0 {
                out_events.push(Event::PhaseTimerExpired { phase: world.phase });
            }
        }
        Command::BeginHostilePhase => {
            if world.phase == Phase::Calm {
                world.begin_hostile_phase(out_events);
            }
        }
        Command::ResetRound { outcome } => {
            if world.phase == Phase::Hostile {
                world.reset_round(outcome, out_events);
            }
        }
        Command::JoinPlayer {
            player,
            username,
            profile,
        } => {
            if world.players.contains_key(&player) {
                return;
            }
            let spawns = world.map.spawns();
            let spawn = spawn_at(spawns, world.players.len()).unwrap_or(CellCoord::new(1, 1));
            world.log.push(format!("{username} joined the shift."), world.clock);
            tracing::info!(%player, %username, "player joined");
            let _ = world.players.insert(
                player,
                Player::new(player, username, spawn.center(), profile),
            );
            out_events.push(Event::PlayerJoined { player, spawn });
        }
        Command::RemovePlayer { player } => {
            if let Some(state) = world.players.remove(&player) {
                world
                    .log
                    .push(format!("{} signed off.", state.username), world.clock);
                tracing::info!(%player, username = %state.username, "player left");
                out_events.push(Event::PlayerLeft {
                    player,
                    username: state.username,
                });
            }
        }
        Command::SetIntent { player, intent } => {
            if let Some(state) = world.players.get_mut(&player) {
                state.intent = intent;
            }
        }
        Command::SelectWeapon { player, weapon } => {
            world.select_weapon(player, weapon, out_events);
        }
        Command::MovePlayer {
            player,
            facing,
            destination,
        } => {
            let Some(state) = world.players.get_mut(&player) else {
                return;
            };
            state.facing = facing;
            if !world.map.is_walkable_at(destination) {
                return;
            }
            let max_column = world.map.columns().saturating_sub(2) as f32;
            let max_row = world.map.rows().saturating_sub(2) as f32;
            state.position = Vec2::new(
                destination.x.clamp(1.0, max_column.max(1.0)),
                destination.y.clamp(1.0, max_row.max(1.0)),
            );
            out_events.push(Event::PlayerMoved {
                player,
                position: state.position,
            });
        }
        Command::OpenChest { player, cell } => world.open_chest(player, cell, out_events),
        Command::Harvest { player, cell } => world.harvest(player, cell, out_events),
        Command::ReachObjective { player } => {
            if world.phase != Phase::Hostile {
                return;
            }
            let objective = world.map.objective();
            if let Some(state) = world.players.get_mut(&player) {
                let on_objective = CellCoord::containing(state.position) == Some(objective);
                if on_objective && !state.objective_reached {
                    state.objective_reached = true;
                    out_events.push(Event::ObjectiveReached { player });
                }
            }
        }
        Command::Craft { player, action } => world.craft(player, action, out_events),
        Command::SwapWeapon { player } => {
            let Some(state) = world.players.get_mut(&player) else {
                return;
            };
            state.intent.swap_weapon = false;
            let next = state.selected_weapon.other();
            world.select_weapon(player, next, out_events);
        }
        Command::Attack { player, strike } => world.attack(player, strike, out_events),
        Command::AdvanceProjectile {
            projectile,
            position,
            ttl,
            hits,
        } => world.advance_projectile(projectile, position, ttl, hits, out_events),
        Command::MoveEnemy { enemy, position } => {
            if !world.map.is_enemy_passable_at(position) {
                return;
            }
            if let Some(state) = world.enemies.get_mut(&enemy) {
                state.position = position;
            }
        }
        Command::TagPlayer { player, until } => {
            if let Some(state) = world.players.get_mut(&player) {
                state.tagged_until = until;
                out_events.push(Event::PlayerTagged { player, until });
            }
        }
        Command::RevealObjective { player } => {
            if let Some(state) = world.players.get_mut(&player) {
                state.objective_seen = true;
            }
        }
        Command::SyncProfile { player, profile } => {
            if let Some(state) = world.players.get_mut(&player) {
                state.profile = profile;
            }
        }
    }
}

fn spawn_at(spawns: &[CellCoord], index: usize) -> Option<CellCoord> {
    if spawns.is_empty() {
        return None;
    }
    spawns.get(index % spawns.len()).copied()
}

/// Bounded log of gameplay messages; the oldest entry is evicted first.
#[derive(Debug)]
struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, message: impl Into<String>, at: f64) {
        self.entries.push_back(LogEntry {
            message: message.into(),
            at,
        });
        while self.entries.len() > self.capacity {
            let _ = self.entries.pop_front();
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use night_shift_core::{
        EnemyView, LogEntry, Phase, PlayerId, PlayerSnapshot, PlayerView, ProjectileView,
        TileMap, Tuning,
    };

    use super::World;

    /// Retrieves the welcome banner that hosts may display.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Provides read-only access to the current map.
    #[must_use]
    pub fn map(world: &World) -> &TileMap {
        &world.map
    }

    /// Phase currently active.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Seconds left in the active phase. May dip below zero until the
    /// transition is applied.
    #[must_use]
    pub fn phase_timer(world: &World) -> f32 {
        world.phase_timer
    }

    /// Simulation clock in seconds.
    #[must_use]
    pub fn clock(world: &World) -> f64 {
        world.clock
    }

    /// Number of connected players.
    #[must_use]
    pub fn player_count(world: &World) -> usize {
        world.players.len()
    }

    /// Captures a read-only view of every player.
    #[must_use]
    pub fn player_view(world: &World) -> PlayerView {
        PlayerView::from_snapshots(world.players.values().map(|player| player.snapshot()).collect())
    }

    /// Snapshot of a single player.
    #[must_use]
    pub fn player(world: &World, player: PlayerId) -> Option<PlayerSnapshot> {
        world.players.get(&player).map(|state| state.snapshot())
    }

    /// Captures a read-only view of every enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.values().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .values()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Rolling event log, oldest entry first.
    pub fn event_log(world: &World) -> impl Iterator<Item = &LogEntry> {
        world.log.entries.iter()
    }
}

/// Direct state manipulation used to stage scenarios in tests.
#[cfg(any(test, feature = "scaffolding"))]
pub mod scaffolding {
    use glam::Vec2;
    use night_shift_core::{CellCoord, EnemyId, Gear, Inventory, PlayerId, TileKind};

    use super::{roster::Enemy, World};

    /// Replaces a player's inventory.
    pub fn set_inventory(world: &mut World, player: PlayerId, inventory: Inventory) {
        if let Some(state) = world.players.get_mut(&player) {
            state.inventory = inventory;
        }
    }

    /// Replaces a player's gear tiers.
    pub fn set_gear(world: &mut World, player: PlayerId, gear: Gear) {
        if let Some(state) = world.players.get_mut(&player) {
            state.gear = gear;
        }
    }

    /// Teleports a player without any walkability check.
    pub fn place_player(world: &mut World, player: PlayerId, position: Vec2) {
        if let Some(state) = world.players.get_mut(&player) {
            state.position = position;
        }
    }

    /// Adds an enemy at `position` without any walkability check.
    pub fn place_enemy(world: &mut World, position: Vec2) -> EnemyId {
        let id = EnemyId::new(world.next_enemy_id);
        world.next_enemy_id = world.next_enemy_id.wrapping_add(1);
        let _ = world.enemies.insert(
            id,
            Enemy {
                id,
                position,
                stunned_until: 0.0,
            },
        );
        id
    }

    /// Removes every enemy.
    pub fn clear_enemies(world: &mut World) {
        world.enemies.clear();
    }

    /// Overwrites a single map tile.
    pub fn set_tile(world: &mut World, cell: CellCoord, kind: TileKind) {
        let _ = world.map.set_tile(cell, kind);
    }

    /// Overwrites the active phase countdown.
    pub fn set_phase_timer(world: &mut World, seconds: f32) {
        world.phase_timer = seconds;
    }
}
