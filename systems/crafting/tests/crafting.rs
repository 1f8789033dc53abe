use night_shift_core::{
    Command, Event, Gear, GearKind, Intent, Inventory, Material, PlayerId, Profile, Tuning, Weapon,
};
use night_shift_system_crafting::Crafting;
use night_shift_world::{self as world, query, scaffolding, World};

fn world_with_player() -> (World, PlayerId) {
    let mut world = World::new(Tuning::default(), 21);
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
    (world, player)
}

fn press(world: &mut World, player: PlayerId, intent: Intent) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::SetIntent { player, intent }, &mut events);

    let mut commands = Vec::new();
    Crafting.handle(&query::player_view(world), &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn one_pulse_crafts_exactly_one_item() {
    let (mut world, player) = world_with_player();
    let stock = Inventory::new()
        .with(Material::Wood, 7)
        .with(Material::Cloth, 1)
        .with(Material::Pebbles, 2);
    scaffolding::set_inventory(&mut world, player, stock);

    let craft = Intent {
        craft: true,
        ..Intent::default()
    };
    let events = press(&mut world, player, craft);
    assert_eq!(
        events,
        vec![Event::ItemCrafted {
            player,
            gear: GearKind::Torch,
            tier: 1,
        }]
    );

    let snapshot = query::player(&world, player).expect("player exists");
    assert!(!snapshot.intent.craft, "pulse is consumed");
    assert_eq!(snapshot.inventory.get(Material::Wood), 5);
    assert_eq!(snapshot.inventory.get(Material::Cloth), 0);

    // The pulse was cleared, so a second pass does nothing.
    let mut commands = Vec::new();
    Crafting.handle(&query::player_view(&world), &mut commands);
    assert!(commands.is_empty());
}

#[test]
fn repeated_pulses_walk_down_the_recipe_list() {
    let (mut world, player) = world_with_player();
    let stock = Inventory::new()
        .with(Material::Wood, 7)
        .with(Material::Cloth, 1)
        .with(Material::Pebbles, 2);
    scaffolding::set_inventory(&mut world, player, stock);

    let craft = Intent {
        craft: true,
        ..Intent::default()
    };
    for _ in 0..3 {
        let _ = press(&mut world, player, craft);
    }

    let snapshot = query::player(&world, player).expect("player exists");
    assert_eq!(
        snapshot.gear,
        Gear::new()
            .with_tier(GearKind::Torch, 1)
            .with_tier(GearKind::Bat, 1)
            .with_tier(GearKind::Slingshot, 1)
    );
    assert_eq!(snapshot.inventory, Inventory::new());
    let last = query::event_log(&world)
        .last()
        .map(|entry| entry.message.clone());
    assert_eq!(last.as_deref(), Some("Ash crafted slingshot T1."));
}

#[test]
fn swapping_needs_the_other_weapon() {
    let (mut world, player) = world_with_player();
    let swap = Intent {
        swap_weapon: true,
        ..Intent::default()
    };

    let events = press(&mut world, player, swap);
    assert!(events.is_empty());

    scaffolding::set_gear(
        &mut world,
        player,
        Gear::new()
            .with_tier(GearKind::Bat, 1)
            .with_tier(GearKind::Slingshot, 1),
    );
    let events = press(&mut world, player, swap);
    assert_eq!(
        events,
        vec![Event::WeaponSelected {
            player,
            weapon: Weapon::Slingshot,
        }]
    );
    let snapshot = query::player(&world, player).expect("player exists");
    assert!(!snapshot.intent.swap_weapon);
}
