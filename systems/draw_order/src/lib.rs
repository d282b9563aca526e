#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure draw-order compositor for isometric scenes.
//!
//! A [`DrawOrder`] is built fresh every frame, filled with render payloads
//! in three phases, and consumed by [`DrawOrder::into_sorted`], which
//! yields the payloads in back-to-front paint order. The order is total:
//! ascending tile depth (`row + column`), ties broken by phase rank, and
//! remaining ties by insertion sequence.

use tilescape_core::{Footprint, Position};

/// Paint phase of an entry; lower phases paint first at equal depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Field,
    Marker,
    Object,
}

#[derive(Debug)]
struct Entry<T> {
    depth: i32,
    phase: Phase,
    sequence: u32,
    payload: T,
}

/// Per-frame priority structure producing back-to-front paint order.
///
/// The structure is parameterized by its render payload so the compositor
/// stays independent of any particular backend's sprite representation.
/// Consuming it via [`DrawOrder::into_sorted`] enforces the one-frame
/// lifetime.
#[derive(Debug)]
pub struct DrawOrder<T> {
    width: u32,
    height: u32,
    sequence: u32,
    entries: Vec<Entry<T>>,
}

impl<T> DrawOrder<T> {
    /// Creates an empty compositor for a `width x height` grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sequence: 0,
            entries: Vec::with_capacity((width as usize) * (height as usize)),
        }
    }

    /// Inserts a field-phase payload (ground tiles).
    ///
    /// # Panics
    ///
    /// Panics when any footprint cell lies outside the grid.
    pub fn insert_tile(&mut self, footprint: Footprint, payload: T) {
        self.insert(Phase::Field, footprint, payload);
    }

    /// Inserts a marker-phase payload (hover and finish markers).
    ///
    /// Markers paint above the tile at the same cell and below any object
    /// standing on it.
    ///
    /// # Panics
    ///
    /// Panics when any footprint cell lies outside the grid.
    pub fn insert_marker(&mut self, footprint: Footprint, payload: T) {
        self.insert(Phase::Marker, footprint, payload);
    }

    /// Inserts an object-phase payload (dynamic objects).
    ///
    /// # Panics
    ///
    /// Panics when any footprint cell lies outside the grid.
    pub fn insert_object(&mut self, footprint: Footprint, payload: T) {
        self.insert(Phase::Object, footprint, payload);
    }

    /// Consumes the compositor and yields payloads in paint order.
    ///
    /// The sort is stable over `(depth, phase, sequence)`, so two entries
    /// never compare equal and the order is fully deterministic.
    #[must_use]
    pub fn into_sorted(self) -> Vec<T> {
        let mut entries = self.entries;
        entries.sort_by_key(|entry| (entry.depth, entry.phase, entry.sequence));
        entries.into_iter().map(|entry| entry.payload).collect()
    }

    fn insert(&mut self, phase: Phase, footprint: Footprint, payload: T) {
        let anchor = self.anchor(footprint);
        let entry = Entry {
            depth: anchor.depth(),
            phase,
            sequence: self.sequence,
            payload,
        };
        self.sequence += 1;
        self.entries.push(entry);
    }

    /// Later cell of the footprint: maximum by `(depth, row, column)`.
    /// Mid-transition, the cell being entered dominates occlusion.
    fn anchor(&self, footprint: Footprint) -> Position {
        let mut anchor = None;
        for cell in footprint.cells() {
            assert!(
                self.contains(cell),
                "footprint cell ({}, {}) outside {}x{} grid",
                cell.row(),
                cell.column(),
                self.width,
                self.height,
            );
            let key = (cell.depth(), cell.row(), cell.column());
            anchor = match anchor {
                Some((best_key, _)) if best_key >= key => anchor,
                _ => Some((key, cell)),
            };
        }
        match anchor {
            Some((_, cell)) => cell,
            // Footprint always yields at least one cell.
            None => unreachable!("footprint produced no cells"),
        }
    }

    fn contains(&self, position: Position) -> bool {
        let row_ok = u32::try_from(position.row())
            .map_or(false, |row| row < self.height);
        let column_ok = u32::try_from(position.column())
            .map_or(false, |column| column < self.width);
        row_ok && column_ok
    }
}
