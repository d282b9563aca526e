//! End-to-end lifecycle checks through the public command surface.

use std::time::Duration;

use tilescape_core::{Command, Event, LevelState, ObjectKind, Position, TileDescription};
use tilescape_world::{query, World};

const STEP: Duration = Duration::from_millis(250);

fn classic_tile() -> TileDescription {
    TileDescription::new(70, 81, 35, 20, 35, 60)
}

fn configured_world(width: u32, height: u32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    tilescape_world::apply(
        &mut world,
        Command::ConfigureField {
            width,
            height,
            tile: classic_tile(),
        },
        &mut events,
    );
    world
}

fn spawn(world: &mut World, kind: ObjectKind, position: Position, seed: u64) -> Vec<Event> {
    let mut events = Vec::new();
    tilescape_world::apply(
        world,
        Command::SpawnObject {
            kind,
            position,
            seed,
        },
        &mut events,
    );
    events
}

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    tilescape_world::apply(world, Command::Tick { dt: STEP }, &mut events);
    events
}

/// Every occupancy reference must point at a live object whose footprint
/// includes the referencing cell.
fn assert_occupancy_consistent(world: &World) {
    let objects = query::object_view(world).into_vec();
    let occupancy = query::occupancy_view(world);
    let (width, height) = occupancy.dimensions();

    for row in 0..height as i32 {
        for column in 0..width as i32 {
            let cell = Position::new(row, column);
            if let Some(id) = occupancy.occupant(cell) {
                let owner = objects
                    .iter()
                    .find(|snapshot| snapshot.id == id)
                    .unwrap_or_else(|| panic!("dangling occupancy at ({row}, {column})"));
                assert!(
                    owner.begin == cell || owner.end == cell,
                    "cell ({row}, {column}) referenced by {id:?} outside its footprint"
                );
            }
        }
    }
}

#[test]
fn occupancy_never_dangles_across_a_full_run() {
    let mut world = configured_world(10, 10);
    let spawn_cells = [
        Position::new(3, 3),
        Position::new(5, 6),
        Position::new(7, 2),
    ];
    for (index, cell) in spawn_cells.iter().enumerate() {
        let events = spawn(&mut world, ObjectKind::Wanderer, *cell, 100 + index as u64);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ObjectSpawned { .. })));
    }

    for _ in 0..200 {
        let _ = tick(&mut world);
        assert_occupancy_consistent(&world);
        if query::level_state(&world) != LevelState::Playing {
            break;
        }
    }
}

#[test]
fn every_run_reaches_a_terminal_level_state() {
    let mut world = configured_world(8, 8);
    let _ = spawn(&mut world, ObjectKind::Wanderer, Position::new(4, 4), 17);
    let _ = spawn(&mut world, ObjectKind::Sentinel, Position::new(6, 6), 0);

    // Wanderers live 64 steps and sentinels 96; either a wanderer finds
    // the finish first or the collection empties.
    let mut transitions = Vec::new();
    for _ in 0..200 {
        for event in tick(&mut world) {
            if let Event::LevelStateChanged { state } = event {
                transitions.push(state);
            }
        }
        if query::level_state(&world) != LevelState::Playing {
            break;
        }
    }

    let terminal = query::level_state(&world);
    assert_ne!(terminal, LevelState::Playing, "run never terminated");
    assert_eq!(transitions, vec![terminal], "state must change exactly once");
}

#[test]
fn retirement_events_account_for_every_spawned_object() {
    let mut world = configured_world(8, 8);
    let _ = spawn(&mut world, ObjectKind::Sentinel, Position::new(3, 3), 0);
    let _ = spawn(&mut world, ObjectKind::Sentinel, Position::new(5, 5), 0);

    let mut retired = 0;
    for _ in 0..200 {
        retired += tick(&mut world)
            .iter()
            .filter(|event| matches!(event, Event::ObjectRetired { .. }))
            .count();
        if query::level_state(&world) != LevelState::Playing {
            break;
        }
    }

    assert_eq!(retired, 2);
    assert_eq!(query::level_state(&world), LevelState::GameOver);
    assert!(query::object_view(&world).into_vec().is_empty());
}
