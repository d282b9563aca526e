#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scene state management for Tilescape.
//!
//! The world owns the [`Field`] and the live dynamic-object collection.
//! Adapters mutate it exclusively through [`apply`] with [`Command`]
//! values; reads go through the [`query`] module. One [`Command::Tick`]
//! runs the object lifecycle pass once per elapsed step quantum.

mod field;
mod lifecycle;
mod objects;

pub use field::{Field, FieldError, MIN_FIELD_EXTENT};
pub use objects::{DynamicObject, FieldProbe};

use std::time::Duration;

use tilescape_core::{
    Command, Event, LevelState, ObjectId, Position, SpawnError, TileDescription, TileState,
    WELCOME_BANNER,
};

use lifecycle::ObjectEntry;

const DEFAULT_FIELD_SIZE: u32 = 30;
const DEFAULT_TILE: TileDescription = TileDescription::new(70, 81, 35, 20, 35, 60);

/// Minimum simulated time between successive lifecycle passes.
const STEP_QUANTUM: Duration = Duration::from_millis(250);

/// Represents the authoritative Tilescape world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    field: Field,
    objects: Vec<ObjectEntry>,
    level_state: LevelState,
    next_object_id: u32,
    spawned_any: bool,
    accumulator: Duration,
}

impl World {
    /// Creates a new world with the compiled-in default field.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            field: Field::build(DEFAULT_FIELD_SIZE, DEFAULT_FIELD_SIZE, DEFAULT_TILE),
            objects: Vec::new(),
            level_state: LevelState::Playing,
            next_object_id: 0,
            spawned_any: false,
            accumulator: Duration::ZERO,
        }
    }

    fn allocate_object_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object_id);
        self.next_object_id = self.next_object_id.wrapping_add(1);
        id
    }

    fn transition_level_state(&mut self, state: LevelState, out_events: &mut Vec<Event>) {
        if self.level_state != state {
            self.level_state = state;
            out_events.push(Event::LevelStateChanged { state });
        }
    }

    fn spawn_error_for(&self, position: Position) -> Option<SpawnError> {
        if self.level_state != LevelState::Playing {
            return Some(SpawnError::LevelOver);
        }
        match self.field.state(position) {
            Err(_) => Some(SpawnError::OutOfBounds),
            Ok(TileState::WallBorder | TileState::Finish) => Some(SpawnError::Impassable),
            Ok(TileState::Empty) => match self.field.occupant_at(position) {
                Some(_) => Some(SpawnError::Occupied),
                None => None,
            },
        }
    }

    fn run_lifecycle_steps(&mut self, out_events: &mut Vec<Event>) {
        while self.accumulator >= STEP_QUANTUM {
            self.accumulator -= STEP_QUANTUM;
            if self.level_state != LevelState::Playing {
                // Terminal states freeze the scene; drain time unspent.
                self.accumulator = Duration::ZERO;
                break;
            }

            let entries = std::mem::take(&mut self.objects);
            let (survivors, outcome) = lifecycle::sweep(&mut self.field, entries, out_events);
            self.objects = survivors;

            if outcome.reached_finish {
                self.transition_level_state(LevelState::Completed, out_events);
            } else if self.spawned_any && self.objects.is_empty() {
                self.transition_level_state(LevelState::GameOver, out_events);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureField {
            width,
            height,
            tile,
        } => {
            // Dimensions too small for a wall ring leave the field as-is;
            // adapters validate before submitting.
            if let Ok(generated) = Field::generate(width, height, tile) {
                world.field = generated;
                world.objects.clear();
                world.level_state = LevelState::Playing;
                world.next_object_id = 0;
                world.spawned_any = false;
                world.accumulator = Duration::ZERO;
                out_events.push(Event::FieldConfigured { width, height });
            }
        }
        Command::SpawnObject {
            kind,
            position,
            seed,
        } => {
            if let Some(reason) = world.spawn_error_for(position) {
                out_events.push(Event::ObjectSpawnRejected {
                    kind,
                    position,
                    reason,
                });
                return;
            }

            let id = world.allocate_object_id();
            let object = objects::create_object(kind, position, seed);
            world.field.occupy(position, id);
            world.objects.push(ObjectEntry { id, kind, object });
            world.spawned_any = true;
            out_events.push(Event::ObjectSpawned { id, kind, position });
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.accumulator = world.accumulator.saturating_add(dt);
            world.run_lifecycle_steps(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tilescape_core::{
        Footprint, LevelState, ObjectId, ObjectKind, Position, ScreenPoint, TileDescription,
        TileState,
    };

    use super::{Field, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of the field's tiles and geometry.
    #[must_use]
    pub fn field_view(world: &World) -> FieldView<'_> {
        FieldView {
            field: &world.field,
        }
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            field: &world.field,
        }
    }

    /// Captures a read-only view of the live dynamic objects.
    #[must_use]
    pub fn object_view(world: &World) -> ObjectView {
        let mut snapshots: Vec<ObjectSnapshot> = world
            .objects
            .iter()
            .map(|entry| ObjectSnapshot {
                id: entry.id,
                kind: entry.kind,
                begin: entry.object.begin_position(),
                end: entry.object.end_position(),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        ObjectView { snapshots }
    }

    /// Current progress state of the level.
    #[must_use]
    pub fn level_state(world: &World) -> LevelState {
        world.level_state
    }

    /// Reports whether `position` can accept interactive placement.
    #[must_use]
    pub fn is_correct_position(world: &World, position: Position) -> bool {
        world.field.is_correct_position(position)
    }

    /// Read-only view of the field's tile states and geometry.
    #[derive(Clone, Copy, Debug)]
    pub struct FieldView<'a> {
        pub(super) field: &'a Field,
    }

    impl FieldView<'_> {
        /// Number of tile columns.
        #[must_use]
        pub fn width(&self) -> u32 {
            self.field.width()
        }

        /// Number of tile rows.
        #[must_use]
        pub fn height(&self) -> u32 {
            self.field.height()
        }

        /// Isometric geometry shared by every coordinate conversion.
        #[must_use]
        pub fn tile(&self) -> &TileDescription {
            self.field.tile()
        }

        /// Cell carrying the finish marker.
        #[must_use]
        pub fn finish_position(&self) -> Position {
            self.field.finish_position()
        }

        /// Tile state at `position`, or `None` outside the field.
        #[must_use]
        pub fn state(&self, position: Position) -> Option<TileState> {
            self.field.state(position).ok()
        }

        /// Screen-space anchor of the tile at `position`.
        #[must_use]
        pub fn screen_anchor(&self, position: Position) -> ScreenPoint {
            self.field.screen_anchor(position)
        }

        /// Iterates every cell with its state in row-major order.
        pub fn iter(&self) -> impl Iterator<Item = (Position, TileState)> + '_ {
            let width = self.field.width() as usize;
            self.field
                .states()
                .iter()
                .enumerate()
                .map(move |(index, state)| {
                    let position =
                        Position::new((index / width) as i32, (index % width) as i32);
                    (position, *state)
                })
        }
    }

    /// Read-only view into the dense occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        pub(super) field: &'a Field,
    }

    impl OccupancyView<'_> {
        /// Returns the object occupying the provided cell, if any.
        #[must_use]
        pub fn occupant(&self, position: Position) -> Option<ObjectId> {
            self.field.occupant_at(position)
        }

        /// Reports whether the cell is currently free for traversal.
        #[must_use]
        pub fn is_free(&self, position: Position) -> bool {
            self.field.occupant_at(position).is_none()
        }

        /// Provides the dimensions of the underlying occupancy grid.
        #[must_use]
        pub fn dimensions(&self) -> (u32, u32) {
            (self.field.width(), self.field.height())
        }

        /// Returns an iterator over all cells in row-major order.
        pub fn iter(&self) -> impl Iterator<Item = Option<ObjectId>> + '_ {
            self.field.occupancy().iter().copied()
        }
    }

    /// Read-only snapshot describing all live dynamic objects.
    #[derive(Clone, Debug, Default)]
    pub struct ObjectView {
        snapshots: Vec<ObjectSnapshot>,
    }

    impl ObjectView {
        /// Iterator over the captured snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &ObjectSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<ObjectSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single object's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ObjectSnapshot {
        /// Identifier allocated to the object by the world.
        pub id: ObjectId,
        /// Variant of the object.
        pub kind: ObjectKind,
        /// Cell the object is anchored to.
        pub begin: Position,
        /// Cell the object is entering; equals `begin` when settled.
        pub end: Position,
    }

    impl ObjectSnapshot {
        /// Grid footprint the object currently occupies.
        #[must_use]
        pub fn footprint(&self) -> Footprint {
            Footprint::span(self.begin, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objects::{DynamicObject, FieldProbe};
    use tilescape_core::ObjectKind;

    const TICK: Command = Command::Tick { dt: STEP_QUANTUM };

    fn configured_world(width: u32, height: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureField {
                width,
                height,
                tile: DEFAULT_TILE,
            },
            &mut events,
        );
        assert!(events.contains(&Event::FieldConfigured { width, height }));
        world
    }

    /// Test object with a scripted footprint and lifespan.
    #[derive(Debug)]
    struct Scripted {
        begin: Position,
        end: Position,
        updates_until_death: u32,
        walk_to: Option<Position>,
    }

    impl Scripted {
        fn settled(position: Position, updates_until_death: u32) -> Self {
            Self {
                begin: position,
                end: position,
                updates_until_death,
                walk_to: None,
            }
        }
    }

    impl DynamicObject for Scripted {
        fn is_alive(&self) -> bool {
            self.updates_until_death > 0
        }

        fn update(&mut self, _probe: &FieldProbe<'_>) {
            self.updates_until_death = self.updates_until_death.saturating_sub(1);
            if let Some(destination) = self.walk_to.take() {
                self.begin = destination;
                self.end = destination;
            }
        }

        fn begin_position(&self) -> Position {
            self.begin
        }

        fn end_position(&self) -> Position {
            self.end
        }
    }

    fn insert_scripted(world: &mut World, object: Scripted) -> ObjectId {
        let id = world.allocate_object_id();
        world.field.occupy(object.begin, id);
        world.field.occupy(object.end, id);
        world.objects.push(ObjectEntry {
            id,
            kind: ObjectKind::Sentinel,
            object: Box::new(object),
        });
        world.spawned_any = true;
        id
    }

    #[test]
    fn configure_field_generates_borders_and_finish() {
        let world = configured_world(9, 7);
        let view = query::field_view(&world);

        assert_eq!(view.width(), 9);
        assert_eq!(view.height(), 7);
        for column in 0..9 {
            assert_eq!(view.state(Position::new(0, column)), Some(TileState::WallBorder));
            assert_eq!(view.state(Position::new(6, column)), Some(TileState::WallBorder));
        }
        assert_eq!(view.state(view.finish_position()), Some(TileState::Finish));
    }

    #[test]
    fn configure_field_ignores_undersized_dimensions() {
        let mut world = configured_world(9, 7);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureField {
                width: 2,
                height: 2,
                tile: DEFAULT_TILE,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::field_view(&world).width(), 9);
    }

    #[test]
    fn spawn_claims_occupancy_and_assigns_sequential_ids() {
        let mut world = configured_world(8, 8);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnObject {
                kind: ObjectKind::Wanderer,
                position: Position::new(3, 3),
                seed: 1,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnObject {
                kind: ObjectKind::Sentinel,
                position: Position::new(5, 5),
                seed: 2,
            },
            &mut events,
        );

        let ids: Vec<ObjectId> = query::object_view(&world)
            .iter()
            .map(|snapshot| snapshot.id)
            .collect();
        assert_eq!(ids, vec![ObjectId::new(0), ObjectId::new(1)]);
        assert_eq!(
            query::occupancy_view(&world).occupant(Position::new(3, 3)),
            Some(ObjectId::new(0))
        );
    }

    #[test]
    fn spawn_rejections_report_specific_reasons() {
        let mut world = configured_world(8, 8);
        let mut events = Vec::new();

        let cases = [
            (Position::new(0, 4), SpawnError::Impassable),
            (Position::new(40, 4), SpawnError::OutOfBounds),
        ];
        for (position, expected) in cases {
            events.clear();
            apply(
                &mut world,
                Command::SpawnObject {
                    kind: ObjectKind::Sentinel,
                    position,
                    seed: 0,
                },
                &mut events,
            );
            assert_eq!(
                events,
                vec![Event::ObjectSpawnRejected {
                    kind: ObjectKind::Sentinel,
                    position,
                    reason: expected,
                }]
            );
        }

        events.clear();
        apply(
            &mut world,
            Command::SpawnObject {
                kind: ObjectKind::Sentinel,
                position: Position::new(4, 4),
                seed: 0,
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::SpawnObject {
                kind: ObjectKind::Sentinel,
                position: Position::new(4, 4),
                seed: 0,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ObjectSpawnRejected {
                kind: ObjectKind::Sentinel,
                position: Position::new(4, 4),
                reason: SpawnError::Occupied,
            }]
        );
    }

    #[test]
    fn spawn_rejected_once_level_is_over() {
        let mut world = configured_world(8, 8);
        world.level_state = LevelState::Completed;
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnObject {
                kind: ObjectKind::Wanderer,
                position: Position::new(4, 4),
                seed: 0,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ObjectSpawnRejected {
                kind: ObjectKind::Wanderer,
                position: Position::new(4, 4),
                reason: SpawnError::LevelOver,
            }]
        );
    }

    #[test]
    fn lifecycle_pass_without_deaths_changes_nothing() {
        let mut world = configured_world(8, 8);
        let home = Position::new(4, 4);
        let id = insert_scripted(&mut world, Scripted::settled(home, 100));

        let mut events = Vec::new();
        apply(&mut world, TICK, &mut events);

        assert_eq!(query::object_view(&world).into_vec().len(), 1);
        assert_eq!(query::occupancy_view(&world).occupant(home), Some(id));
        assert_eq!(
            events,
            vec![Event::TimeAdvanced { dt: STEP_QUANTUM }],
            "no retirement or state change expected"
        );
    }

    #[test]
    fn dead_object_is_unlinked_after_exactly_one_pass() {
        let mut world = configured_world(8, 8);
        let begin = Position::new(4, 4);
        let end = Position::new(4, 5);
        let mut scripted = Scripted::settled(begin, 1);
        scripted.end = end;
        let id = insert_scripted(&mut world, scripted);

        let mut events = Vec::new();
        apply(&mut world, TICK, &mut events);

        assert!(query::object_view(&world).into_vec().is_empty());
        let occupancy = query::occupancy_view(&world);
        assert!(occupancy.is_free(begin));
        assert!(occupancy.is_free(end));
        assert!(events.contains(&Event::ObjectRetired { id, begin, end }));
    }

    #[test]
    fn death_never_erases_another_objects_claim() {
        let mut world = configured_world(8, 8);
        let contested = Position::new(4, 4);

        let dying = insert_scripted(&mut world, Scripted::settled(contested, 1));
        let survivor = insert_scripted(&mut world, Scripted::settled(Position::new(5, 5), 100));
        // The survivor claimed the contested cell after the dying object
        // last touched it.
        world.field.occupy(contested, survivor);

        let mut events = Vec::new();
        apply(&mut world, TICK, &mut events);

        assert_eq!(
            query::occupancy_view(&world).occupant(contested),
            Some(survivor),
            "check-then-clear must not erase the survivor's claim"
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ObjectRetired { id, .. } if *id == dying
        )));
    }

    #[test]
    fn reaching_the_finish_completes_the_level() {
        let mut world = configured_world(8, 8);
        let finish = query::field_view(&world).finish_position();
        let mut scripted = Scripted::settled(Position::new(2, 1), 50);
        scripted.walk_to = Some(finish);
        let _ = insert_scripted(&mut world, scripted);

        let mut events = Vec::new();
        apply(&mut world, TICK, &mut events);

        assert_eq!(query::level_state(&world), LevelState::Completed);
        assert!(events.contains(&Event::LevelStateChanged {
            state: LevelState::Completed
        }));
    }

    #[test]
    fn losing_every_object_ends_the_level() {
        let mut world = configured_world(8, 8);
        let _ = insert_scripted(&mut world, Scripted::settled(Position::new(4, 4), 1));

        let mut events = Vec::new();
        apply(&mut world, TICK, &mut events);

        assert_eq!(query::level_state(&world), LevelState::GameOver);
        assert!(events.contains(&Event::LevelStateChanged {
            state: LevelState::GameOver
        }));
    }

    #[test]
    fn tick_accumulates_time_until_the_step_quantum() {
        let mut world = configured_world(8, 8);
        let _ = insert_scripted(&mut world, Scripted::settled(Position::new(4, 4), 1));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: STEP_QUANTUM / 2,
            },
            &mut events,
        );
        assert_eq!(
            query::object_view(&world).into_vec().len(),
            1,
            "no lifecycle pass below the quantum"
        );

        apply(
            &mut world,
            Command::Tick {
                dt: STEP_QUANTUM / 2,
            },
            &mut events,
        );
        assert!(query::object_view(&world).into_vec().is_empty());
    }

    #[test]
    fn objects_are_frozen_once_the_level_is_over() {
        let mut world = configured_world(8, 8);
        world.level_state = LevelState::Completed;
        let home = Position::new(4, 4);
        let id = insert_scripted(&mut world, Scripted::settled(home, 1));

        let mut events = Vec::new();
        apply(&mut world, TICK, &mut events);

        assert_eq!(query::occupancy_view(&world).occupant(home), Some(id));
        assert_eq!(query::object_view(&world).into_vec().len(), 1);
    }
}
