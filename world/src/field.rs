//! Owned tile grid with per-cell state and object occupancy.

use std::{error::Error, fmt};

use tilescape_core::{screen_anchor, ObjectId, Position, ScreenPoint, TileDescription, TileState};

/// Minimum field extent along either axis: a one-cell wall ring must fit
/// around at least one interior cell.
pub const MIN_FIELD_EXTENT: u32 = 3;

/// Interior cell marked as the level finish during generation.
const FINISH_POSITION: Position = Position::new(1, 1);

/// Owned `width x height` grid of tiles plus the dense occupancy index.
///
/// The field is a dumb spatial index: it records tile states and which
/// object claims each cell, but never validates footprints or owns the
/// objects themselves. Footprint consistency is maintained by the world's
/// lifecycle pass.
#[derive(Clone, Debug)]
pub struct Field {
    width: u32,
    height: u32,
    tile: TileDescription,
    states: Vec<TileState>,
    occupancy: Vec<Option<ObjectId>>,
    finish: Position,
}

impl Field {
    /// Generates a bordered field: every cell of row `0`, row `height - 1`,
    /// column `0` and column `width - 1` becomes [`TileState::WallBorder`],
    /// and exactly one interior cell becomes [`TileState::Finish`].
    ///
    /// Generation is idempotent for fixed dimensions. Dimensions below
    /// [`MIN_FIELD_EXTENT`] are rejected.
    pub fn generate(
        width: u32,
        height: u32,
        tile: TileDescription,
    ) -> Result<Self, FieldError> {
        if width < MIN_FIELD_EXTENT || height < MIN_FIELD_EXTENT {
            return Err(FieldError::TooSmall { width, height });
        }
        Ok(Self::build(width, height, tile))
    }

    /// Infallible construction path for dimensions already known to be
    /// valid (the world's compiled-in defaults).
    pub(crate) fn build(width: u32, height: u32, tile: TileDescription) -> Self {
        let capacity = (width as usize) * (height as usize);
        let mut states = vec![TileState::Empty; capacity];

        for (index, state) in states.iter_mut().enumerate() {
            let row = (index / width as usize) as u32;
            let column = (index % width as usize) as u32;
            if row == 0 || row == height - 1 || column == 0 || column == width - 1 {
                *state = TileState::WallBorder;
            }
        }

        let finish = FINISH_POSITION;
        let finish_index =
            (finish.row() as usize) * (width as usize) + finish.column() as usize;
        states[finish_index] = TileState::Finish;

        Self {
            width,
            height,
            tile,
            states,
            occupancy: vec![None; capacity],
            finish,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Isometric geometry shared by every coordinate conversion.
    #[must_use]
    pub const fn tile(&self) -> &TileDescription {
        &self.tile
    }

    /// Cell carrying the [`TileState::Finish`] marker.
    #[must_use]
    pub const fn finish_position(&self) -> Position {
        self.finish
    }

    /// Reports whether the position lies inside `[0,height) x [0,width)`.
    #[must_use]
    pub fn in_bounds(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Overwrites the tile state at `position` unconditionally.
    ///
    /// Border and finish invariants are caller-maintained during
    /// generation; this method performs no transition validation.
    pub fn set_state(&mut self, position: Position, state: TileState) -> Result<(), FieldError> {
        let index = self
            .index(position)
            .ok_or(FieldError::OutOfBounds { position })?;
        self.states[index] = state;
        Ok(())
    }

    /// Retrieves the tile state at `position`.
    pub fn state(&self, position: Position) -> Result<TileState, FieldError> {
        self.index(position)
            .map(|index| self.states[index])
            .ok_or(FieldError::OutOfBounds { position })
    }

    /// Retrieves the object currently occupying `position`, if any.
    pub fn object(&self, position: Position) -> Result<Option<ObjectId>, FieldError> {
        self.index(position)
            .map(|index| self.occupancy[index])
            .ok_or(FieldError::OutOfBounds { position })
    }

    /// Sets or clears the occupant reference at `position`.
    ///
    /// Does not validate that the object's footprint includes `position`;
    /// that check belongs to the lifecycle pass.
    pub fn set_object(
        &mut self,
        position: Position,
        object: Option<ObjectId>,
    ) -> Result<(), FieldError> {
        let index = self
            .index(position)
            .ok_or(FieldError::OutOfBounds { position })?;
        self.occupancy[index] = object;
        Ok(())
    }

    /// Reports whether `position` can accept interactive placement:
    /// in bounds, passable ground, and unoccupied.
    #[must_use]
    pub fn is_correct_position(&self, position: Position) -> bool {
        match self.index(position) {
            Some(index) => {
                self.states[index] == TileState::Empty && self.occupancy[index].is_none()
            }
            None => false,
        }
    }

    /// Screen-space anchor of the tile at `position`.
    #[must_use]
    pub fn screen_anchor(&self, position: Position) -> ScreenPoint {
        screen_anchor(position, &self.tile)
    }

    /// Claims `position` for `object`, ignoring out-of-bounds cells.
    pub(crate) fn occupy(&mut self, position: Position, object: ObjectId) {
        if let Some(index) = self.index(position) {
            self.occupancy[index] = Some(object);
        }
    }

    /// Clears the occupant at `position` only when the field still
    /// references this exact object.
    pub(crate) fn vacate_if_owned(&mut self, position: Position, object: ObjectId) {
        if let Some(index) = self.index(position) {
            if self.occupancy[index] == Some(object) {
                self.occupancy[index] = None;
            }
        }
    }

    /// Infallible occupant lookup; out-of-bounds cells read as free.
    pub(crate) fn occupant_at(&self, position: Position) -> Option<ObjectId> {
        self.index(position).and_then(|index| self.occupancy[index])
    }

    pub(crate) fn states(&self) -> &[TileState] {
        &self.states
    }

    pub(crate) fn occupancy(&self) -> &[Option<ObjectId>] {
        &self.occupancy
    }

    fn index(&self, position: Position) -> Option<usize> {
        let row = u32::try_from(position.row()).ok()?;
        let column = u32::try_from(position.column()).ok()?;
        if row < self.height && column < self.width {
            Some((row as usize) * (self.width as usize) + column as usize)
        } else {
            None
        }
    }
}

/// Errors produced by field construction and cell access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The addressed cell lies outside the field extent.
    OutOfBounds {
        /// Position provided by the caller.
        position: Position,
    },
    /// The requested dimensions cannot fit a wall ring around an interior.
    TooSmall {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { position } => {
                write!(
                    f,
                    "position ({}, {}) lies outside the field",
                    position.row(),
                    position.column()
                )
            }
            Self::TooSmall { width, height } => {
                write!(
                    f,
                    "field dimensions {width}x{height} cannot fit a wall ring (minimum {MIN_FIELD_EXTENT})"
                )
            }
        }
    }
}

impl Error for FieldError {}
