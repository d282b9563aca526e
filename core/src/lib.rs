#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilescape engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and pure systems: grid positions and directions,
//! the isometric coordinate model, drawable footprints, and the
//! [`Command`]/[`Event`] message surface. Adapters submit commands, the
//! world executes them via its `apply` entry point, and systems consume
//! the broadcast events together with immutable query views.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tilescape.";

/// Location of a single grid cell expressed as row and column indices.
///
/// The derived ordering is lexicographic by `(row, column)`, which is the
/// row-major "farther back first" order used when feeding objects into the
/// draw-order compositor.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    row: i32,
    column: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Isometric viewer distance of the cell: lower values sit farther from
    /// the viewer and must be painted first.
    #[must_use]
    pub const fn depth(&self) -> i32 {
        self.row + self.column
    }
}

/// Cardinal movement directions available to dynamic objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Right,
        Direction::Up,
        Direction::Left,
    ];

    /// Returns the opposite direction. Applying `invert` twice yields the
    /// original direction.
    #[must_use]
    pub const fn invert(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
        }
    }

    /// Reports whether the direction moves along the column axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Right | Direction::Left)
    }

    /// Reports whether the direction moves along the row axis.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Down | Direction::Up)
    }
}

/// Returns the cell adjacent to `position` in the given direction.
///
/// Pure function with no bounds knowledge; callers validate the result
/// against their own grid extent.
#[must_use]
pub const fn next_position(position: Position, direction: Direction) -> Position {
    match direction {
        Direction::Down => Position::new(position.row() + 1, position.column()),
        Direction::Right => Position::new(position.row(), position.column() + 1),
        Direction::Up => Position::new(position.row() - 1, position.column()),
        Direction::Left => Position::new(position.row(), position.column() - 1),
    }
}

/// State held by a single field tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileState {
    /// Passable ground with no decoration.
    Empty,
    /// Impassable perimeter wall segment.
    WallBorder,
    /// The level's single finish cell.
    Finish,
}

/// Isometric tile geometry shared by every coordinate conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileDescription {
    sprite_width: u32,
    sprite_height: u32,
    half_horizontal_diag: i32,
    half_vertical_diag: i32,
    tile_x: i32,
    tile_y: i32,
}

impl TileDescription {
    /// Creates a new tile geometry description.
    #[must_use]
    pub const fn new(
        sprite_width: u32,
        sprite_height: u32,
        half_horizontal_diag: i32,
        half_vertical_diag: i32,
        tile_x: i32,
        tile_y: i32,
    ) -> Self {
        Self {
            sprite_width,
            sprite_height,
            half_horizontal_diag,
            half_vertical_diag,
            tile_x,
            tile_y,
        }
    }

    /// Width of a tile sprite in pixels.
    #[must_use]
    pub const fn sprite_width(&self) -> u32 {
        self.sprite_width
    }

    /// Height of a tile sprite in pixels.
    #[must_use]
    pub const fn sprite_height(&self) -> u32 {
        self.sprite_height
    }

    /// Half the horizontal diagonal of the tile diamond.
    #[must_use]
    pub const fn half_horizontal_diag(&self) -> i32 {
        self.half_horizontal_diag
    }

    /// Half the vertical diagonal of the tile diamond.
    #[must_use]
    pub const fn half_vertical_diag(&self) -> i32 {
        self.half_vertical_diag
    }

    /// Horizontal anchor offset applied to every tile.
    #[must_use]
    pub const fn tile_x(&self) -> i32 {
        self.tile_x
    }

    /// Vertical anchor offset applied to every tile.
    #[must_use]
    pub const fn tile_y(&self) -> i32 {
        self.tile_y
    }
}

/// Screen-space point produced by the grid coordinate model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    x: i32,
    y: i32,
}

impl ScreenPoint {
    /// Creates a new screen point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical pixel coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// Converts a grid position to its screen-space top-left anchor under the
/// standard isometric projection.
///
/// Distinct in-bounds cells always map to distinct anchors, so cell
/// identity and screen-region identity are interchangeable downstream.
/// Out-of-range positions are a caller contract violation; the conversion
/// itself is total over `i32` coordinates.
#[must_use]
pub const fn screen_anchor(position: Position, tile: &TileDescription) -> ScreenPoint {
    let x = (position.column() - position.row()) * tile.half_horizontal_diag() + tile.tile_x();
    let y = (position.column() + position.row()) * tile.half_vertical_diag() + tile.tile_y();
    ScreenPoint::new(x, y)
}

/// Set of grid cells a drawable entry is anchored to.
///
/// Static tiles and markers occupy one cell; an object mid-transition
/// between tiles spans its begin and end cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    begin: Position,
    end: Position,
}

impl Footprint {
    /// Creates a single-cell footprint.
    #[must_use]
    pub const fn single(position: Position) -> Self {
        Self {
            begin: position,
            end: position,
        }
    }

    /// Creates a footprint spanning two cells; collapses to a single cell
    /// when both positions coincide.
    #[must_use]
    pub const fn span(begin: Position, end: Position) -> Self {
        Self { begin, end }
    }

    /// First cell of the footprint.
    #[must_use]
    pub const fn begin(&self) -> Position {
        self.begin
    }

    /// Last cell of the footprint; equals `begin` for single-cell entries.
    #[must_use]
    pub const fn end(&self) -> Position {
        self.end
    }

    /// Reports whether the footprint occupies exactly one cell.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.begin == self.end
    }

    /// Iterates the distinct cells of the footprint.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let extra = if self.begin == self.end {
            None
        } else {
            Some(self.end)
        };
        std::iter::once(self.begin).chain(extra)
    }
}

/// Unique identifier assigned to a dynamic object.
///
/// The identifier is the only link between the active-object collection
/// and Field occupancy, keeping a single ownership path with no cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Concrete dynamic-object variants the world can spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Randomly walking actor that expires after a finite lifespan or upon
    /// reaching the finish cell.
    Wanderer,
    /// Static occupant that holds a single cell for a finite lifespan.
    Sentinel,
}

/// Progress state of the running level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelState {
    /// The level is active and accepts interaction.
    Playing,
    /// A wanderer reached the finish cell.
    Completed,
    /// Every object expired before reaching the finish cell.
    GameOver,
}

/// Reasons the world may reject a spawn request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The requested cell lies outside the field.
    OutOfBounds,
    /// The requested cell is a wall or finish tile.
    Impassable,
    /// Another object already occupies the requested cell.
    Occupied,
    /// The level is no longer in the playing state.
    LevelOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Regenerates the field with the provided dimensions and geometry,
    /// clearing every live object.
    ConfigureField {
        /// Number of tile columns; must be at least 3.
        width: u32,
        /// Number of tile rows; must be at least 3.
        height: u32,
        /// Isometric geometry shared by all coordinate math.
        tile: TileDescription,
    },
    /// Requests that a new dynamic object be placed on the field.
    SpawnObject {
        /// Variant of object to create.
        kind: ObjectKind,
        /// Cell the object should initially occupy.
        position: Position,
        /// Seed driving the object's internal randomness.
        seed: u64,
    },
    /// Advances the simulation clock, running one object lifecycle pass.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the field was regenerated.
    FieldConfigured {
        /// Number of tile columns in the new field.
        width: u32,
        /// Number of tile rows in the new field.
        height: u32,
    },
    /// Confirms that a dynamic object entered the field.
    ObjectSpawned {
        /// Identifier assigned to the object by the world.
        id: ObjectId,
        /// Variant of the spawned object.
        kind: ObjectKind,
        /// Cell the object occupies after spawning.
        position: Position,
    },
    /// Reports that a spawn request was rejected.
    ObjectSpawnRejected {
        /// Variant requested in the spawn command.
        kind: ObjectKind,
        /// Cell provided in the spawn command.
        position: Position,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that an expired object was unlinked from the field and
    /// removed from the active collection.
    ObjectRetired {
        /// Identifier of the retired object.
        id: ObjectId,
        /// Begin cell of the object's final footprint.
        begin: Position,
        /// End cell of the object's final footprint.
        end: Position,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the level entered a new progress state.
    LevelStateChanged {
        /// State that became active after processing the tick.
        state: LevelState,
    },
}
