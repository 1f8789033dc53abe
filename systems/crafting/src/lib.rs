#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Automatic crafting and weapon swapping driven by input pulses.

use night_shift_core::{
    recipe, Command, CraftAction, CraftStep, Gear, GearKind, Inventory, PlayerView, MAX_GEAR_TIER,
};

/// Pure system that consumes craft and swap pulses.
#[derive(Debug, Default)]
pub struct Crafting;

impl Crafting {
    /// Emits one [`Command::Craft`] per pending craft pulse and one
    /// [`Command::SwapWeapon`] per pending swap pulse.
    ///
    /// A craft command is emitted even when nothing is affordable so that the
    /// pulse is cleared.
    pub fn handle(&mut self, players: &PlayerView, out: &mut Vec<Command>) {
        for player in players.iter() {
            if player.intent.craft {
                out.push(Command::Craft {
                    player: player.id,
                    action: plan_craft(&player.inventory, &player.gear),
                });
            }
            if player.intent.swap_weapon {
                out.push(Command::SwapWeapon { player: player.id });
            }
        }
    }
}

/// Picks the single action one craft pulse performs.
///
/// The first unowned item (torch, bat, slingshot) whose base cost is covered is
/// built. Failing that, the first owned item below the tier cap whose upgrade
/// cost is covered is upgraded.
#[must_use]
pub fn plan_craft(inventory: &Inventory, gear: &Gear) -> Option<CraftAction> {
    let build = GearKind::ALL.into_iter().find(|kind| {
        !gear.owns(*kind) && inventory.can_afford(recipe(*kind).base)
    });
    if let Some(gear) = build {
        return Some(CraftAction {
            gear,
            step: CraftStep::Build,
        });
    }

    GearKind::ALL
        .into_iter()
        .find(|kind| {
            let tier = gear.tier(*kind);
            tier >= 1 && tier < MAX_GEAR_TIER && inventory.can_afford(recipe(*kind).upgrade)
        })
        .map(|gear| CraftAction {
            gear,
            step: CraftStep::Upgrade,
        })
}
