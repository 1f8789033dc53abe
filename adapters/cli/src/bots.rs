//! Scripted players that stand in for real clients during headless runs.

use glam::Vec2;
use night_shift_core::{CellCoord, InputPayload, Intent, Phase, PlayerId, PlayerSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const NAMES: [&str; 6] = ["Ash", "Birch", "Cedar", "Dune", "Elm", "Fern"];

/// Ticks a wandering bot keeps its heading.
const WANDER_TICKS: u64 = 45;
/// Ticks between craft pulses.
const CRAFT_TICKS: u64 = 120;
/// Distance below which an axis counts as aligned with the objective.
const ALIGNED: f32 = 0.2;

/// A bot that gathers by wandering in daylight and makes for the objective at night.
#[derive(Debug)]
pub(crate) struct ScriptedBot {
    player: PlayerId,
    username: String,
    rng: ChaCha8Rng,
    heading: Intent,
}

impl ScriptedBot {
    /// Creates the `index`-th bot, seeding its wandering from `seed`.
    pub(crate) fn new(index: u32, seed: u64) -> Self {
        let name = NAMES[index as usize % NAMES.len()];
        let round = index as usize / NAMES.len();
        let username = if round == 0 {
            name.to_owned()
        } else {
            format!("{name}{round}")
        };
        Self {
            player: PlayerId::new(index + 1),
            username,
            rng: ChaCha8Rng::seed_from_u64(seed ^ u64::from(index).wrapping_mul(0x9E37_79B9)),
            heading: Intent::default(),
        }
    }

    /// Connection identifier the bot joins with.
    pub(crate) fn player(&self) -> PlayerId {
        self.player
    }

    /// Name the bot requests when joining.
    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    /// Controls for `tick`, given the bot's current state.
    pub(crate) fn next_input(
        &mut self,
        tick: u64,
        me: &PlayerSnapshot,
        phase: Phase,
        objective: CellCoord,
    ) -> InputPayload {
        let intent = match phase {
            Phase::Calm => {
                if tick % WANDER_TICKS == 0 {
                    self.heading = self.random_heading();
                }
                Intent {
                    craft: tick % CRAFT_TICKS == 0,
                    ..self.heading
                }
            }
            Phase::Hostile => Intent {
                attack: true,
                ..toward(me.position, objective.center())
            },
        };
        InputPayload {
            intent,
            selected_weapon: None,
        }
    }

    fn random_heading(&mut self) -> Intent {
        let mut intent = Intent::default();
        match self.rng.gen_range(0..4) {
            0 => intent.up = true,
            1 => intent.right = true,
            2 => intent.down = true,
            _ => intent.left = true,
        }
        intent
    }
}

fn toward(from: Vec2, to: Vec2) -> Intent {
    let delta = to - from;
    Intent {
        up: delta.y < -ALIGNED,
        down: delta.y > ALIGNED,
        left: delta.x < -ALIGNED,
        right: delta.x > ALIGNED,
        ..Intent::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use night_shift_core::{Gear, Inventory, Profile, Weapon};

    fn snapshot_at(position: Vec2) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId::new(1),
            username: "Ash".to_owned(),
            position,
            facing: Vec2::X,
            intent: Intent::default(),
            inventory: Inventory::default(),
            gear: Gear::default(),
            selected_weapon: Weapon::Bat,
            tagged_until: 0.0,
            attack_cooldown_until: 0.0,
            objective_reached: false,
            objective_seen: false,
            profile: Profile::default(),
        }
    }

    #[test]
    fn names_repeat_with_a_suffix() {
        assert_eq!(ScriptedBot::new(0, 1).username(), "Ash");
        assert_eq!(ScriptedBot::new(7, 1).username(), "Birch1");
        assert_eq!(ScriptedBot::new(7, 1).player(), PlayerId::new(8));
    }

    #[test]
    fn night_bots_head_for_the_objective_swinging() {
        let mut bot = ScriptedBot::new(0, 3);
        let input = bot.next_input(
            10,
            &snapshot_at(Vec2::new(5.0, 10.0)),
            Phase::Hostile,
            CellCoord::new(20, 4),
        );
        assert!(input.intent.right && input.intent.up);
        assert!(!input.intent.left && !input.intent.down);
        assert!(input.intent.attack);
    }

    #[test]
    fn day_bots_wander_and_pulse_crafting() {
        let mut bot = ScriptedBot::new(0, 3);
        let me = snapshot_at(Vec2::new(5.0, 10.0));
        let first = bot.next_input(0, &me, Phase::Calm, CellCoord::new(20, 4));
        assert!(first.intent.craft);
        assert_eq!(first.intent.axis().length(), 1.0);
        let later = bot.next_input(1, &me, Phase::Calm, CellCoord::new(20, 4));
        assert!(!later.intent.craft);
        assert_eq!(later.intent.axis(), first.intent.axis());
    }
}
