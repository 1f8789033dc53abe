use glam::Vec2;
use night_shift_core::{Command, Phase, PlayerId, Profile, RoundOutcome, Tuning};
use night_shift_system_visibility::{
    mask_map, vision_radius, visible_tiles, Visibility, VisibilityRules,
};
use night_shift_world::{self as world, query, scaffolding, World};

fn night_world() -> (World, PlayerId) {
    let mut world = World::new(Tuning::default(), 55);
    let player = PlayerId::new(1);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::JoinPlayer {
            player,
            username: "Ash".to_owned(),
            profile: Profile::default(),
        },
        &mut events,
    );
    world::apply(&mut world, Command::BeginHostilePhase, &mut events);
    (world, player)
}

fn reveal(world: &mut World) {
    let mut commands = Vec::new();
    Visibility.handle(
        query::phase(world),
        &query::player_view(world),
        query::map(world),
        &query::tuning(world).vision,
        &mut commands,
    );
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

fn objective_code(world: &World, player: PlayerId) -> u8 {
    let snapshot = query::player(world, player).expect("player exists");
    let map = query::map(world);
    let radius = vision_radius(
        query::phase(world),
        &snapshot.gear,
        &query::tuning(world).vision,
    );
    let mask = visible_tiles(
        map,
        snapshot.position,
        radius,
        snapshot.objective_seen,
        &VisibilityRules::DEFAULT,
    );
    let objective = map.objective();
    mask_map(map, &mask)[objective.row() as usize][objective.column() as usize]
}

#[test]
fn objective_stays_visible_after_walking_away() {
    let (mut world, player) = night_world();
    let objective = query::map(&world).objective();
    let far = Vec2::new(2.0, 2.0);

    scaffolding::place_player(&mut world, player, far);
    reveal(&mut world);
    assert_eq!(objective_code(&world, player), 99);

    scaffolding::place_player(
        &mut world,
        player,
        objective.center() - Vec2::new(3.0, 0.0),
    );
    reveal(&mut world);
    assert!(
        query::player(&world, player)
            .expect("player exists")
            .objective_seen
    );

    scaffolding::place_player(&mut world, player, far);
    assert_eq!(objective_code(&world, player), 6);
}

#[test]
fn memory_is_forgotten_when_the_round_resets() {
    let (mut world, player) = night_world();
    let objective = query::map(&world).objective();
    scaffolding::place_player(&mut world, player, objective.center());
    reveal(&mut world);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResetRound {
            outcome: RoundOutcome::Lost,
        },
        &mut events,
    );
    assert_eq!(query::phase(&world), Phase::Calm);
    let snapshot = query::player(&world, player).expect("player exists");
    assert!(!snapshot.objective_seen);
}
