use std::time::Duration;

use night_shift_core::{Command, Event, Phase, PlayerId, Profile, RoundOutcome, Tuning};
use night_shift_system_phase::{resolve_objective, PhaseMachine};
use night_shift_world::{self as world, query, scaffolding, World};

fn camp(players: u32) -> World {
    let mut world = World::new(Tuning::default(), 34);
    let mut events = Vec::new();
    for id in 1..=players {
        world::apply(
            &mut world,
            Command::JoinPlayer {
                player: PlayerId::new(id),
                username: format!("Ranger{id}"),
                profile: Profile::default(),
            },
            &mut events,
        );
    }
    world
}

fn step(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    let mut commands = Vec::new();
    PhaseMachine.handle(&events, &mut commands);
    resolve_objective(query::phase(world), &query::player_view(world), &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn expire(world: &mut World) -> Vec<Event> {
    scaffolding::set_phase_timer(world, 0.01);
    step(world, 50)
}

#[test]
fn calm_expiry_starts_the_night_with_scaled_enemies() {
    let mut world = camp(3);
    let events = expire(&mut world);
    assert!(events.contains(&Event::PhaseChanged {
        phase: Phase::Hostile
    }));
    assert_eq!(query::phase(&world), Phase::Hostile);
    assert_eq!(query::enemy_view(&world).iter().count(), 4);
    assert!((query::phase_timer(&world) - 60.0).abs() < 1e-6);
}

#[test]
fn night_timeout_loses_and_regenerates_the_camp() {
    let mut world = camp(1);
    let _ = expire(&mut world);
    let events = expire(&mut world);
    assert!(events.contains(&Event::RoundEnded {
        outcome: RoundOutcome::Lost
    }));
    assert_eq!(query::phase(&world), Phase::Calm);
    assert_eq!(query::enemy_view(&world).iter().count(), 0);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::XpEarned { .. })));
}

#[test]
fn everyone_on_the_objective_wins_the_round() {
    let mut world = camp(2);
    let _ = expire(&mut world);

    let objective = query::map(&world).objective();
    for id in [1, 2] {
        let player = PlayerId::new(id);
        scaffolding::place_player(&mut world, player, objective.center());
        let mut events = Vec::new();
        world::apply(&mut world, Command::ReachObjective { player }, &mut events);
    }

    let events = step(&mut world, 16);
    assert!(events.contains(&Event::RoundEnded {
        outcome: RoundOutcome::Won
    }));
    let awarded: u32 = events
        .iter()
        .filter_map(|event| match event {
            Event::XpEarned { amount, .. } => Some(*amount),
            _ => None,
        })
        .sum();
    assert_eq!(awarded, 60);
    assert_eq!(query::phase(&world), Phase::Calm);
}
