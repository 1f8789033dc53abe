#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick orchestration of the Night Shift simulation.
//!
//! A [`Session`] owns the authoritative [`World`] and the profile store. The
//! transport feeds it [`InboundEvent`]s between ticks, drives [`Session::tick`]
//! at a fixed rate and asks for per-viewer [`Snapshot`]s on its broadcast
//! cadence.

mod snapshot;

use std::time::Duration;

use night_shift_core::{
    Command, Event, InboundEvent, InputPayload, PlayerId, ProfileStore, Tuning,
};
use night_shift_system_combat::{Ballistics, Combat};
use night_shift_system_crafting::Crafting;
use night_shift_system_movement::{Interaction, Movement};
use night_shift_system_phase::{resolve_objective, PhaseMachine};
use night_shift_system_pursuit::Pursuit;
use night_shift_system_visibility::Visibility;
use night_shift_world::{self as world, query, World};

pub use snapshot::{MapSnapshot, RecipeBook, RosterEntry, Snapshot};

/// Authoritative game session: world state, systems and profile store.
#[derive(Debug)]
pub struct Session<S> {
    world: World,
    store: S,
    movement: Movement,
    interaction: Interaction,
    crafting: Crafting,
    combat: Combat,
    ballistics: Ballistics,
    pursuit: Pursuit,
    phase_machine: PhaseMachine,
    visibility: Visibility,
}

impl<S: ProfileStore> Session<S> {
    /// Creates a session around a fresh world generated from `seed`.
    #[must_use]
    pub fn new(tuning: Tuning, seed: u64, store: S) -> Self {
        Self::from_world(World::new(tuning, seed), store)
    }

    /// Creates a session around an existing world.
    #[must_use]
    pub fn from_world(world: World, store: S) -> Self {
        Self {
            world,
            store,
            movement: Movement,
            interaction: Interaction,
            crafting: Crafting,
            combat: Combat,
            ballistics: Ballistics,
            pursuit: Pursuit,
            phase_machine: PhaseMachine,
            visibility: Visibility,
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the profile store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies one inbound transport message.
    pub fn handle(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Join {
                connection,
                username,
            } => self.join(connection, &username),
            InboundEvent::Input {
                connection,
                payload,
            } => self.input(connection, payload),
            InboundEvent::Disconnect { connection } => self.disconnect(connection),
        }
    }

    /// Adds a player for `connection`. Repeated joins are ignored.
    pub fn join(&mut self, connection: PlayerId, username: &str) {
        if query::player(&self.world, connection).is_some() {
            tracing::debug!(%connection, "duplicate join ignored");
            return;
        }
        let limit = query::tuning(&self.world).session.username_max_chars;
        let username = sanitize_username(username, connection, limit);
        let profile = self.store.profile(&username);
        tracing::debug!(%connection, xp = profile.xp, level = profile.level, "profile loaded");

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::JoinPlayer {
                player: connection,
                username,
                profile,
            },
            &mut events,
        );
    }

    /// Replaces the held controls of `connection` and applies an explicit
    /// weapon choice when one is present.
    pub fn input(&mut self, connection: PlayerId, payload: InputPayload) {
        if query::player(&self.world, connection).is_none() {
            tracing::debug!(%connection, "input from unknown connection dropped");
            return;
        }
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SetIntent {
                player: connection,
                intent: payload.intent,
            },
            &mut events,
        );
        if let Some(weapon) = payload.selected_weapon {
            world::apply(
                &mut self.world,
                Command::SelectWeapon {
                    player: connection,
                    weapon,
                },
                &mut events,
            );
        }
    }

    /// Saves the profile of `connection` and removes the player.
    pub fn disconnect(&mut self, connection: PlayerId) {
        let Some(player) = query::player(&self.world, connection) else {
            tracing::debug!(%connection, "disconnect from unknown connection ignored");
            return;
        };
        self.store.save_profile(&player.username, player.profile);

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::RemovePlayer { player: connection },
            &mut events,
        );
    }

    /// Advances the simulation by `dt`, capped at the configured maximum, and
    /// returns every event the step produced.
    ///
    /// Stages run in a fixed order: clock and phase transition, movement, tile
    /// interactions, crafting and weapon swaps, attacks, projectiles, enemy
    /// pursuit, the objective win check, objective reveal and finally
    /// experience forwarding to the profile store.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let cap = Duration::from_millis(query::tuning(&self.world).session.max_tick_millis);
        let dt = dt.min(cap);

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let tick_events = events.clone();
        let mut commands = Vec::new();

        self.phase_machine.handle(&tick_events, &mut commands);
        apply_all(&mut self.world, &mut commands, &mut events);

        let now = query::clock(&self.world);
        self.movement.handle(
            &tick_events,
            &query::player_view(&self.world),
            &query::tuning(&self.world).movement,
            now,
            &mut commands,
        );
        apply_all(&mut self.world, &mut commands, &mut events);

        self.interaction.handle(
            query::phase(&self.world),
            &query::player_view(&self.world),
            query::map(&self.world),
            &mut commands,
        );
        apply_all(&mut self.world, &mut commands, &mut events);

        self.crafting
            .handle(&query::player_view(&self.world), &mut commands);
        apply_all(&mut self.world, &mut commands, &mut events);

        self.combat.handle(
            &query::player_view(&self.world),
            &query::enemy_view(&self.world),
            &query::tuning(&self.world).combat,
            now,
            &mut commands,
        );
        apply_all(&mut self.world, &mut commands, &mut events);

        self.ballistics.handle(
            &tick_events,
            &query::projectile_view(&self.world),
            &query::enemy_view(&self.world),
            query::tuning(&self.world).combat.projectile_hitbox,
            &mut commands,
        );
        apply_all(&mut self.world, &mut commands, &mut events);

        self.pursuit.handle(
            &tick_events,
            query::phase(&self.world),
            &query::enemy_view(&self.world),
            &query::player_view(&self.world),
            query::map(&self.world),
            &query::tuning(&self.world).combat,
            now,
            &mut commands,
        );
        apply_all(&mut self.world, &mut commands, &mut events);

        resolve_objective(
            query::phase(&self.world),
            &query::player_view(&self.world),
            &mut commands,
        );
        apply_all(&mut self.world, &mut commands, &mut events);

        self.visibility.handle(
            query::phase(&self.world),
            &query::player_view(&self.world),
            query::map(&self.world),
            &query::tuning(&self.world).vision,
            &mut commands,
        );
        apply_all(&mut self.world, &mut commands, &mut events);

        self.forward_experience(&mut events);
        events
    }

    /// Builds the view of the world published to `viewer`, or the unfiltered
    /// spectator view when `viewer` is `None` or unknown.
    #[must_use]
    pub fn snapshot_for(&self, viewer: Option<PlayerId>) -> Snapshot {
        snapshot::build(&self.world, viewer)
    }

    /// Persists pending profile changes. Call between ticks.
    pub fn flush_profiles(&mut self) -> Result<(), S::Error> {
        self.store.flush()
    }

    /// Credits every `XpEarned` event in `events` to the profile store and
    /// mirrors the updated profile back onto the player.
    fn forward_experience(&mut self, events: &mut Vec<Event>) {
        let earned: Vec<(PlayerId, u32)> = events
            .iter()
            .filter_map(|event| match event {
                Event::XpEarned { player, amount } => Some((*player, *amount)),
                _ => None,
            })
            .collect();

        let mut commands = Vec::new();
        for (player, amount) in earned {
            let Some(snapshot) = query::player(&self.world, player) else {
                continue;
            };
            let profile = self.store.add_xp(&snapshot.username, amount);
            commands.push(Command::SyncProfile { player, profile });
        }
        apply_all(&mut self.world, &mut commands, events);
    }
}

/// Drains `commands` into the world, collecting the resulting events.
fn apply_all(world: &mut World, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
    for command in commands.drain(..) {
        world::apply(world, command, events);
    }
}

/// Trims the requested name and cuts it to `limit` characters. Names that are
/// empty after trimming fall back to `Ranger-<connection>`.
#[must_use]
pub fn sanitize_username(requested: &str, connection: PlayerId, limit: usize) -> String {
    let trimmed: String = requested.trim().chars().take(limit).collect();
    if trimmed.is_empty() {
        format!("Ranger-{connection}")
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_trimmed_and_cut() {
        let id = PlayerId::new(4);
        assert_eq!(sanitize_username("  Ash  ", id, 20), "Ash");
        assert_eq!(
            sanitize_username("abcdefghijklmnopqrstuvwxyz", id, 20),
            "abcdefghijklmnopqrst"
        );
        assert_eq!(sanitize_username("   ", id, 20), "Ranger-p4");
        assert_eq!(sanitize_username("", id, 20), "Ranger-p4");
    }

    #[test]
    fn cut_counts_characters_not_bytes() {
        let id = PlayerId::new(1);
        assert_eq!(sanitize_username("ÅÅÅÅ", id, 2), "ÅÅ");
    }
}
