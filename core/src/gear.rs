//! Materials, inventories, gear tiers and the recipe table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest tier any gear item can reach.
pub const MAX_GEAR_TIER: u8 = 3;

/// Crafting materials a player can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    /// Harvested from trees.
    Wood,
    /// Harvested from rocks.
    Stone,
    /// Found in chests.
    Cloth,
    /// Found in chests.
    Oil,
    /// Harvested from rocks.
    Pebbles,
}

impl Material {
    /// Every material in canonical order.
    pub const ALL: [Material; 5] = [
        Material::Wood,
        Material::Stone,
        Material::Cloth,
        Material::Oil,
        Material::Pebbles,
    ];

    /// Lowercase name used in logs and on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Cloth => "cloth",
            Self::Oil => "oil",
            Self::Pebbles => "pebbles",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Material amounts required by a recipe step.
pub type Cost = &'static [(Material, u32)];

/// Counters for each material a player carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    wood: u32,
    stone: u32,
    cloth: u32,
    oil: u32,
    pebbles: u32,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wood: 0,
            stone: 0,
            cloth: 0,
            oil: 0,
            pebbles: 0,
        }
    }

    /// Returns a copy holding `amount` of `material` in addition to current stock.
    #[must_use]
    pub fn with(mut self, material: Material, amount: u32) -> Self {
        self.add(material, amount);
        self
    }

    /// Amount of `material` carried.
    #[must_use]
    pub const fn get(&self, material: Material) -> u32 {
        match material {
            Material::Wood => self.wood,
            Material::Stone => self.stone,
            Material::Cloth => self.cloth,
            Material::Oil => self.oil,
            Material::Pebbles => self.pebbles,
        }
    }

    /// Adds `amount` of `material`.
    pub fn add(&mut self, material: Material, amount: u32) {
        let slot = self.slot_mut(material);
        *slot = slot.saturating_add(amount);
    }

    /// Reports whether every entry of `cost` is covered.
    #[must_use]
    pub fn can_afford(&self, cost: Cost) -> bool {
        cost.iter()
            .all(|(material, amount)| self.get(*material) >= *amount)
    }

    /// Deducts `cost` when affordable. Leaves the inventory untouched otherwise.
    pub fn spend(&mut self, cost: Cost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (material, amount) in cost {
            let slot = self.slot_mut(*material);
            *slot -= *amount;
        }
        true
    }

    fn slot_mut(&mut self, material: Material) -> &mut u32 {
        match material {
            Material::Wood => &mut self.wood,
            Material::Stone => &mut self.stone,
            Material::Cloth => &mut self.cloth,
            Material::Oil => &mut self.oil,
            Material::Pebbles => &mut self.pebbles,
        }
    }
}

/// Craftable gear items, listed in crafting priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearKind {
    /// Light source that widens the vision radius.
    Torch,
    /// Melee weapon.
    Bat,
    /// Ranged weapon.
    Slingshot,
}

impl GearKind {
    /// Every gear item in crafting priority order.
    pub const ALL: [GearKind; 3] = [GearKind::Torch, GearKind::Bat, GearKind::Slingshot];

    /// Lowercase name used in logs and on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Torch => "torch",
            Self::Bat => "bat",
            Self::Slingshot => "slingshot",
        }
    }
}

impl fmt::Display for GearKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gear tiers owned by a player. Tier zero means the item is not owned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Gear {
    torch: u8,
    bat: u8,
    slingshot: u8,
}

impl Gear {
    /// Gear set with nothing crafted.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            torch: 0,
            bat: 0,
            slingshot: 0,
        }
    }

    /// Returns a copy with `kind` set to `tier`, capped at [`MAX_GEAR_TIER`].
    #[must_use]
    pub fn with_tier(mut self, kind: GearKind, tier: u8) -> Self {
        *self.slot_mut(kind) = tier.min(MAX_GEAR_TIER);
        self
    }

    /// Tier of `kind`.
    #[must_use]
    pub const fn tier(&self, kind: GearKind) -> u8 {
        match kind {
            GearKind::Torch => self.torch,
            GearKind::Bat => self.bat,
            GearKind::Slingshot => self.slingshot,
        }
    }

    /// Reports whether at least tier one of `kind` is owned.
    #[must_use]
    pub const fn owns(&self, kind: GearKind) -> bool {
        self.tier(kind) > 0
    }

    /// Raises an unowned item to tier one.
    pub fn build(&mut self, kind: GearKind) -> bool {
        let slot = self.slot_mut(kind);
        if *slot != 0 {
            return false;
        }
        *slot = 1;
        true
    }

    /// Raises an owned item by one tier, never past [`MAX_GEAR_TIER`].
    pub fn upgrade(&mut self, kind: GearKind) -> bool {
        let slot = self.slot_mut(kind);
        if *slot == 0 || *slot >= MAX_GEAR_TIER {
            return false;
        }
        *slot += 1;
        true
    }

    fn slot_mut(&mut self, kind: GearKind) -> &mut u8 {
        match kind {
            GearKind::Torch => &mut self.torch,
            GearKind::Bat => &mut self.bat,
            GearKind::Slingshot => &mut self.slingshot,
        }
    }
}

/// Weapons a player can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weapon {
    /// Area stun around the player.
    Bat,
    /// Fires a stunning projectile.
    Slingshot,
}

impl Weapon {
    /// Gear item backing the weapon.
    #[must_use]
    pub const fn gear(self) -> GearKind {
        match self {
            Self::Bat => GearKind::Bat,
            Self::Slingshot => GearKind::Slingshot,
        }
    }

    /// Weapon a swap request toggles to.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Bat => Self::Slingshot,
            Self::Slingshot => Self::Bat,
        }
    }

    /// Parses the exact wire names `"bat"` and `"slingshot"`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bat" => Some(Self::Bat),
            "slingshot" => Some(Self::Slingshot),
            _ => None,
        }
    }
}

/// Base and upgrade costs of a gear item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recipe {
    /// Item produced by the recipe.
    pub gear: GearKind,
    /// Cost of crafting tier one.
    pub base: Cost,
    /// Cost of each further tier.
    pub upgrade: Cost,
}

/// Recipe table in crafting priority order.
pub static RECIPES: [Recipe; 3] = [
    Recipe {
        gear: GearKind::Torch,
        base: &[(Material::Wood, 2), (Material::Cloth, 1)],
        upgrade: &[(Material::Wood, 2), (Material::Oil, 1)],
    },
    Recipe {
        gear: GearKind::Bat,
        base: &[(Material::Wood, 3)],
        upgrade: &[(Material::Wood, 2), (Material::Stone, 1)],
    },
    Recipe {
        gear: GearKind::Slingshot,
        base: &[(Material::Wood, 2), (Material::Pebbles, 2)],
        upgrade: &[
            (Material::Wood, 1),
            (Material::Pebbles, 2),
            (Material::Cloth, 1),
        ],
    },
];

/// Recipe for `kind`.
#[must_use]
pub fn recipe(kind: GearKind) -> &'static Recipe {
    match kind {
        GearKind::Torch => &RECIPES[0],
        GearKind::Bat => &RECIPES[1],
        GearKind::Slingshot => &RECIPES[2],
    }
}

/// Whether a craft creates an item or raises its tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CraftStep {
    /// Tier zero to tier one.
    Build,
    /// One tier up.
    Upgrade,
}

/// A single resolved crafting decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CraftAction {
    /// Item affected.
    pub gear: GearKind,
    /// Whether the item is built or upgraded.
    pub step: CraftStep,
}

impl CraftAction {
    /// Materials the action consumes.
    #[must_use]
    pub fn cost(&self) -> Cost {
        let recipe = recipe(self.gear);
        match self.step {
            CraftStep::Build => recipe.base,
            CraftStep::Upgrade => recipe.upgrade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_is_all_or_nothing() {
        let mut inventory = Inventory::new().with(Material::Wood, 1);
        assert!(!inventory.spend(recipe(GearKind::Torch).base));
        assert_eq!(inventory, Inventory::new().with(Material::Wood, 1));

        let mut inventory = inventory.with(Material::Wood, 1).with(Material::Cloth, 1);
        assert!(inventory.spend(recipe(GearKind::Torch).base));
        assert_eq!(inventory, Inventory::new());
    }

    #[test]
    fn gear_never_exceeds_max_tier() {
        let mut gear = Gear::new();
        assert!(!gear.upgrade(GearKind::Bat));
        assert!(gear.build(GearKind::Bat));
        assert!(!gear.build(GearKind::Bat));
        assert!(gear.upgrade(GearKind::Bat));
        assert!(gear.upgrade(GearKind::Bat));
        assert!(!gear.upgrade(GearKind::Bat));
        assert_eq!(gear.tier(GearKind::Bat), MAX_GEAR_TIER);
        assert_eq!(Gear::new().with_tier(GearKind::Torch, 9).tier(GearKind::Torch), 3);
    }

    #[test]
    fn weapon_names_parse_exactly() {
        assert_eq!(Weapon::parse("bat"), Some(Weapon::Bat));
        assert_eq!(Weapon::parse("slingshot"), Some(Weapon::Slingshot));
        assert_eq!(Weapon::parse("Bat"), None);
        assert_eq!(Weapon::parse("sling"), None);
    }
}
