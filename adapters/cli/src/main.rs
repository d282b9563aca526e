#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tilescape experience.
//!
//! The binary owns the frame driver: it configures the world, seeds the
//! initial objects, and hands the rendering backend a per-frame closure
//! that advances the simulation, handles pointer input, and rebuilds the
//! ordered draw list from a fresh compositor.

mod settings;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tilescape_core::{
    Command, Event, Footprint, LevelState, ObjectKind, Position, TileDescription, TileState,
};
use tilescape_rendering::{
    cell_under_cursor, Color, FieldPresentation, FrameInput, Presentation, RenderingBackend,
    Scene, SceneOverlay, SpriteInstance, SpriteKey,
};
use tilescape_rendering_macroquad::MacroquadBackend;
use tilescape_system_bootstrap::Bootstrap;
use tilescape_system_draw_order::DrawOrder;
use tilescape_world::{query, World, MIN_FIELD_EXTENT};

use settings::{Args, Config};

const CLEAR_COLOR: Color = Color::from_rgb_u8(24, 26, 32);
const EMPTY_TILE_COLOR: Color = Color::from_rgb_u8(96, 140, 72);
const WALL_TILE_COLOR: Color = Color::from_rgb_u8(72, 68, 64);
const FINISH_TILE_COLOR: Color = Color::from_rgb_u8(196, 164, 60);
const HOVER_MARKER_COLOR: Color = Color::from_rgb_u8(240, 240, 240);
const FINISH_MARKER_COLOR: Color = Color::from_rgb_u8(255, 220, 120);
const WANDERER_COLOR: Color = Color::from_rgb_u8(202, 74, 64);
const SENTINEL_COLOR: Color = Color::from_rgb_u8(70, 110, 190);

/// Attempts made to find a free cell for each seeded object.
const PLACEMENT_ATTEMPTS: u32 = 64;

/// Entry point for the Tilescape command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::resolve(&args).context("failed to resolve configuration")?;
    log::debug!("resolved configuration: {config:?}");

    let mut world = World::new();
    let mut events = Vec::new();
    let tile = TileDescription::new(70, 81, 35, 20, 35, 60);

    apply_command(
        &mut world,
        Command::ConfigureField {
            width: config.field_width,
            height: config.field_height,
            tile,
        },
        &mut events,
    );
    anyhow::ensure!(
        events
            .iter()
            .any(|event| matches!(event, Event::FieldConfigured { .. })),
        "field dimensions {}x{} were rejected",
        config.field_width,
        config.field_height,
    );

    println!("{}", Bootstrap::default().welcome_banner(&world));

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    seed_objects(&mut world, &mut rng, ObjectKind::Wanderer, config.wanderers);
    seed_objects(&mut world, &mut rng, ObjectKind::Sentinel, config.sentinels);

    let field = FieldPresentation::new(config.field_width, config.field_height, tile)
        .context("failed to describe the field for rendering")?;
    let scene = Scene::new(field);
    let presentation = Presentation::new("Tilescape", CLEAR_COLOR, scene);

    let backend = MacroquadBackend::new()
        .with_window_size(config.window_width, config.window_height)
        .with_fullscreen(config.fullscreen)
        .with_vsync(config.vsync)
        .with_show_fps(config.show_fps);

    backend.run(presentation, move |dt, input, scene| {
        drive_frame(&mut world, &mut rng, dt, input, scene);
    })
}

/// Applies a command and logs the outcome events at debug level.
fn apply_command(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    out_events.clear();
    tilescape_world::apply(world, command, out_events);
    for event in out_events.iter() {
        match event {
            Event::ObjectSpawnRejected { kind, position, reason } => {
                log::debug!(
                    "rejected {kind:?} spawn at ({}, {}): {reason:?}",
                    position.row(),
                    position.column(),
                );
            }
            Event::ObjectRetired { id, .. } => log::debug!("object {id:?} retired"),
            Event::LevelStateChanged { state } => log::info!("level state: {state:?}"),
            _ => {}
        }
    }
}

/// Spawns `count` objects of one kind on randomly chosen correct cells.
fn seed_objects(world: &mut World, rng: &mut ChaCha8Rng, kind: ObjectKind, count: u32) {
    let mut events = Vec::new();
    for _ in 0..count {
        let Some(position) = random_correct_position(world, rng) else {
            log::warn!("no free cell found while seeding {kind:?}");
            break;
        };
        apply_command(
            world,
            Command::SpawnObject {
                kind,
                position,
                seed: rng.gen(),
            },
            &mut events,
        );
    }
}

/// Picks a random cell that currently accepts placement, if any can be
/// found within the attempt budget.
fn random_correct_position(world: &World, rng: &mut ChaCha8Rng) -> Option<Position> {
    let view = query::field_view(world);
    let (width, height) = (view.width(), view.height());
    if width < MIN_FIELD_EXTENT || height < MIN_FIELD_EXTENT {
        return None;
    }

    for _ in 0..PLACEMENT_ATTEMPTS {
        let row = rng.gen_range(1..height - 1) as i32;
        let column = rng.gen_range(1..width - 1) as i32;
        let position = Position::new(row, column);
        if query::is_correct_position(world, position) {
            return Some(position);
        }
    }
    None
}

/// One atomic frame: advance time, react to input, rebuild the draw list.
fn drive_frame(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    dt: Duration,
    input: FrameInput,
    scene: &mut Scene,
) {
    if input.quit_requested {
        // Final snapshot before the backend stops its loop; the frame
        // is never presented, so skip the scene rebuild.
        log::info!("quit requested, leaving the frame loop");
        return;
    }

    let mut events = Vec::new();
    apply_command(world, Command::Tick { dt }, &mut events);

    scene.camera_offset += input.pan_delta;

    let tile = scene.field.tile;
    let hover = input
        .cursor_world_space
        .map(|point| cell_under_cursor(point, &tile))
        .filter(|cell| query::field_view(world).state(*cell).is_some());
    scene.hover = hover;

    if let Some(cell) = hover {
        if input.spawn_action && query::level_state(world) == LevelState::Playing {
            if query::is_correct_position(world, cell) {
                apply_command(
                    world,
                    Command::SpawnObject {
                        kind: ObjectKind::Wanderer,
                        position: cell,
                        seed: rng.gen(),
                    },
                    &mut events,
                );
            }
        }
        if input.inspect_action {
            if let Some(id) = query::occupancy_view(world).occupant(cell) {
                log::info!(
                    "cell ({}, {}) is occupied by {id:?}",
                    cell.row(),
                    cell.column(),
                );
            }
        }
    }

    populate_scene(world, scene);
}

/// Rebuilds the ordered draw list from a fresh compositor.
fn populate_scene(world: &World, scene: &mut Scene) {
    let view = query::field_view(world);
    let field = scene.field;
    let mut order: DrawOrder<SpriteInstance> = DrawOrder::new(view.width(), view.height());

    for (position, state) in view.iter() {
        let (key, tint) = match state {
            TileState::Empty => (SpriteKey::TileEmpty, EMPTY_TILE_COLOR),
            TileState::WallBorder => (SpriteKey::TileWall, WALL_TILE_COLOR),
            TileState::Finish => (SpriteKey::TileFinish, FINISH_TILE_COLOR),
        };
        let tint = if scene.hover == Some(position) {
            tint.lighten(0.25)
        } else {
            tint
        };
        order.insert_tile(
            Footprint::single(position),
            SpriteInstance::new(field.anchor(position), key, tint),
        );
    }

    let finish = view.finish_position();
    order.insert_marker(
        Footprint::single(finish),
        SpriteInstance::new(field.anchor(finish), SpriteKey::FinishMarker, FINISH_MARKER_COLOR),
    );
    if let Some(cell) = scene.hover {
        order.insert_marker(
            Footprint::single(cell),
            SpriteInstance::new(field.anchor(cell), SpriteKey::HoverMarker, HOVER_MARKER_COLOR),
        );
    }

    let mut snapshots = query::object_view(world).into_vec();
    snapshots.sort_by_key(|snapshot| (snapshot.begin.row(), snapshot.begin.column()));
    for snapshot in snapshots {
        let (key, tint) = match snapshot.kind {
            ObjectKind::Wanderer => (SpriteKey::Wanderer, WANDERER_COLOR),
            ObjectKind::Sentinel => (SpriteKey::Sentinel, SENTINEL_COLOR),
        };
        // Mid-transition bodies sit halfway between the two anchors.
        let offset = (field.anchor(snapshot.begin) + field.anchor(snapshot.end)) * 0.5;
        order.insert_object(snapshot.footprint(), SpriteInstance::new(offset, key, tint));
    }

    scene.draw_list = order.into_sorted();
    scene.overlay = SceneOverlay::for_level_state(query::level_state(world));
}
