//! Per-viewer outbound state.

use glam::Vec2;
use night_shift_core::{
    CellCoord, EnemySnapshot, Gear, Inventory, LogEntry, Material, Phase, PlayerId,
    PlayerSnapshot, ProjectileSnapshot, SafeZone, TileMap, Weapon, Zone, RECIPES,
};
use night_shift_system_visibility::{
    mask_map, vision_radius, visible_tiles, VisibilityRules, VisionRadius,
};
use night_shift_world::{query, World};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Everything a client needs to render one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Map, masked by fog of war for players at night.
    pub map: MapSnapshot,
    /// Active phase.
    pub phase: Phase,
    /// Lighting label; mirrors the phase.
    pub lighting_mode: &'static str,
    /// Whole seconds left in the phase, rounded up.
    pub timer: i64,
    /// Players the viewer can see.
    pub players: Vec<RosterEntry>,
    /// Enemies the viewer can see.
    pub enemies: Vec<EnemySnapshot>,
    /// Projectiles the viewer can see.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Rolling event log, oldest first.
    pub events: Vec<LogEntry>,
    /// Recipe table.
    pub recipes: RecipeBook,
    /// Material names in canonical order.
    pub materials: [Material; 5],
    /// Visibility policies for special tiles.
    pub visibility: VisibilityRules,
    /// Vision radius in tiles; `None` by day and for spectators.
    pub vision_radius: Option<f32>,
}

/// Map portion of a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Columns of the playable world.
    pub world_width: u32,
    /// Rows of the playable world.
    pub world_height: u32,
    /// Tile codes indexed `[row][column]`; hidden tiles read 99.
    pub tiles: Vec<Vec<u8>>,
    /// Objective tile.
    pub objective: CellCoord,
    /// Checkpoint tiles.
    pub checkpoints: Vec<CellCoord>,
    /// Player spawn tiles.
    pub spawns: Vec<CellCoord>,
    /// Named regions.
    pub zones: Vec<Zone>,
    /// Safe zones; only published in unmasked maps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_zones: Option<Vec<SafeZone>>,
}

impl MapSnapshot {
    fn new(map: &TileMap, tiles: Vec<Vec<u8>>, safe_zones: Option<Vec<SafeZone>>) -> Self {
        Self {
            width: map.columns(),
            height: map.rows(),
            world_width: map.columns(),
            world_height: map.rows(),
            tiles,
            objective: map.objective(),
            checkpoints: map.checkpoints().to_vec(),
            spawns: map.spawns().to_vec(),
            zones: map.zones().to_vec(),
            safe_zones,
        }
    }
}

/// One player as published to clients.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Connection identifier.
    pub id: PlayerId,
    /// Display name.
    pub username: String,
    /// Column position.
    pub x: f32,
    /// Row position.
    pub y: f32,
    /// Facing column component.
    pub facing_x: f32,
    /// Facing row component.
    pub facing_y: f32,
    /// Materials carried.
    pub inventory: Inventory,
    /// Gear tiers.
    pub gear: Gear,
    /// Weapon in hand.
    pub selected_weapon: Weapon,
    /// Whether the player is currently slowed by a tag.
    pub tagged: bool,
    /// Whether the player reached the objective this night.
    pub objective_reached: bool,
    /// Lifetime experience.
    pub xp: u32,
    /// Level derived from experience.
    pub level: u32,
}

impl RosterEntry {
    fn new(player: &PlayerSnapshot, now: f64) -> Self {
        Self {
            id: player.id,
            username: player.username.clone(),
            x: player.position.x,
            y: player.position.y,
            facing_x: player.facing.x,
            facing_y: player.facing.y,
            inventory: player.inventory,
            gear: player.gear,
            selected_weapon: player.selected_weapon,
            tagged: player.is_tagged(now),
            objective_reached: player.objective_reached,
            xp: player.profile.xp,
            level: player.profile.level,
        }
    }
}

/// Serialises the recipe table as `{ item: { base: {..}, upgrade: {..} } }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecipeBook;

impl Serialize for RecipeBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Steps {
            base: CostMap,
            upgrade: CostMap,
        }

        let mut map = serializer.serialize_map(Some(RECIPES.len()))?;
        for recipe in &RECIPES {
            map.serialize_entry(
                recipe.gear.name(),
                &Steps {
                    base: CostMap(recipe.base),
                    upgrade: CostMap(recipe.upgrade),
                },
            )?;
        }
        map.end()
    }
}

struct CostMap(&'static [(Material, u32)]);

impl Serialize for CostMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (material, amount) in self.0 {
            map.serialize_entry(material.name(), amount)?;
        }
        map.end()
    }
}

/// Builds the snapshot `viewer` receives.
pub(crate) fn build(world: &World, viewer: Option<PlayerId>) -> Snapshot {
    let map = query::map(world);
    let phase = query::phase(world);
    let now = query::clock(world);
    let tuning = query::tuning(world);
    let players = query::player_view(world);

    let observer = viewer.and_then(|id| players.get(id));
    let radius = observer
        .map(|player| vision_radius(phase, &player.gear, &tuning.vision))
        .unwrap_or(VisionRadius::Unlimited);
    let rules = VisibilityRules::DEFAULT;
    let covers =
        |target: Vec2| observer.map_or(true, |player| radius.covers(player.position, target));

    let map_snapshot = match (observer, radius) {
        (Some(player), VisionRadius::Limited(_)) => {
            let mask = visible_tiles(map, player.position, radius, player.objective_seen, &rules);
            MapSnapshot::new(map, mask_map(map, &mask), None)
        }
        _ => {
            let tiles = map
                .rows_iter()
                .map(|row| row.iter().map(|tile| tile.code()).collect())
                .collect();
            MapSnapshot::new(map, tiles, Some(map.safe_zones().to_vec()))
        }
    };

    let roster_fog = tuning.vision.roster_fog;
    let roster = players
        .iter()
        .filter(|player| !roster_fog || covers(player.position))
        .map(|player| RosterEntry::new(player, now))
        .collect();
    let enemies = query::enemy_view(world)
        .into_vec()
        .into_iter()
        .filter(|enemy| covers(enemy.position))
        .collect();
    let projectiles = query::projectile_view(world)
        .into_vec()
        .into_iter()
        .filter(|projectile| covers(projectile.position))
        .collect();

    Snapshot {
        map: map_snapshot,
        phase,
        lighting_mode: phase.label(),
        timer: f64::from(query::phase_timer(world)).ceil() as i64,
        players: roster,
        enemies,
        projectiles,
        events: query::event_log(world).cloned().collect(),
        recipes: RecipeBook,
        materials: Material::ALL,
        visibility: rules,
        vision_radius: observer.and(radius.limit()),
    }
}
