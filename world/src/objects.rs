//! Dynamic-object capability contract and the concrete variants.

use tilescape_core::{next_position, Direction, ObjectId, ObjectKind, Position, TileState};

use crate::field::Field;

/// Lifespan granted to a freshly spawned wanderer, in lifecycle steps.
const WANDERER_LIFESPAN: u32 = 64;

/// Lifespan granted to a freshly spawned sentinel, in lifecycle steps.
const SENTINEL_LIFESPAN: u32 = 96;

/// Capability contract every dynamic object fulfils.
///
/// `update` advances object-internal state (and may change the begin/end
/// positions) but must not mutate the field; occupancy reconciliation is
/// centralized in the world's lifecycle pass so one object's movement or
/// death can never corrupt another's claims.
pub trait DynamicObject: std::fmt::Debug {
    /// Reports whether the object should remain in the active collection.
    fn is_alive(&self) -> bool;

    /// Advances the object by one lifecycle step.
    fn update(&mut self, probe: &FieldProbe<'_>);

    /// Cell the object is anchored to (or departing from, mid-transition).
    fn begin_position(&self) -> Position;

    /// Cell the object is entering; equals `begin_position` when settled.
    fn end_position(&self) -> Position;
}

/// Read-only field access handed to objects during their update step.
///
/// The probe is scoped to a single mover so occupancy checks treat the
/// mover's own claims as free.
#[derive(Debug)]
pub struct FieldProbe<'a> {
    field: &'a Field,
    mover: ObjectId,
}

impl<'a> FieldProbe<'a> {
    pub(crate) fn new(field: &'a Field, mover: ObjectId) -> Self {
        Self { field, mover }
    }

    /// Reports whether the mover may step onto `position`: in bounds,
    /// passable ground or the finish cell, and not claimed by another
    /// object.
    #[must_use]
    pub fn can_enter(&self, position: Position) -> bool {
        let passable = matches!(
            self.field.state(position),
            Ok(TileState::Empty | TileState::Finish)
        );
        let free = match self.field.occupant_at(position) {
            None => true,
            Some(occupant) => occupant == self.mover,
        };
        passable && free
    }

    /// Tile state at `position`, or `None` outside the field.
    #[must_use]
    pub fn state(&self, position: Position) -> Option<TileState> {
        self.field.state(position).ok()
    }

    /// Cell carrying the finish marker.
    #[must_use]
    pub fn finish_position(&self) -> Position {
        self.field.finish_position()
    }
}

/// Creates the boxed object behind a spawn command.
pub(crate) fn create_object(
    kind: ObjectKind,
    position: Position,
    seed: u64,
) -> Box<dyn DynamicObject> {
    match kind {
        ObjectKind::Wanderer => Box::new(Wanderer::new(position, seed)),
        ObjectKind::Sentinel => Box::new(Sentinel::new(position)),
    }
}

/// Randomly walking actor.
///
/// A wanderer alternates between settled frames (single-cell footprint)
/// and transition frames spanning the departed and entered cells, exactly
/// the two-cell footprint the draw-order compositor must disambiguate.
/// It expires when its lifespan runs out or when it arrives on the finish
/// cell.
#[derive(Debug)]
pub(crate) struct Wanderer {
    begin: Position,
    end: Position,
    lifespan: u32,
    rng_state: u64,
}

impl Wanderer {
    pub(crate) fn new(position: Position, seed: u64) -> Self {
        Self {
            begin: position,
            end: position,
            lifespan: WANDERER_LIFESPAN,
            rng_state: seed,
        }
    }

    fn choose_step(&mut self, probe: &FieldProbe<'_>) -> Option<Position> {
        self.rng_state = next_random(self.rng_state);
        let offset = (self.rng_state >> 32) as usize;

        for index in 0..Direction::ALL.len() {
            let direction = Direction::ALL[(offset + index) % Direction::ALL.len()];
            let candidate = next_position(self.begin, direction);
            if probe.can_enter(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

impl DynamicObject for Wanderer {
    fn is_alive(&self) -> bool {
        self.lifespan > 0
    }

    fn update(&mut self, probe: &FieldProbe<'_>) {
        if self.begin != self.end {
            // Complete the pending transition before anything else.
            self.begin = self.end;
            if self.begin == probe.finish_position() {
                self.lifespan = 0;
            }
            return;
        }

        self.lifespan = self.lifespan.saturating_sub(1);
        if self.lifespan == 0 {
            return;
        }

        if let Some(destination) = self.choose_step(probe) {
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

/// Static occupant that holds one cell until its lifespan expires.
#[derive(Debug)]
pub(crate) struct Sentinel {
    position: Position,
    lifespan: u32,
}

impl Sentinel {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            lifespan: SENTINEL_LIFESPAN,
        }
    }
}

impl DynamicObject for Sentinel {
    fn is_alive(&self) -> bool {
        self.lifespan > 0
    }

    fn update(&mut self, _probe: &FieldProbe<'_>) {
        self.lifespan = self.lifespan.saturating_sub(1);
    }

    fn begin_position(&self) -> Position {
        self.position
    }

    fn end_position(&self) -> Position {
        self.position
    }
}

/// Deterministic LCG used for object-internal randomness.
fn next_random(state: u64) -> u64 {
    state.wrapping_mul(636_413_622_384_679_3005).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilescape_core::TileDescription;

    fn test_field() -> Field {
        Field::generate(8, 8, TileDescription::new(70, 81, 35, 20, 35, 60))
            .expect("valid dimensions")
    }

    #[test]
    fn probe_rejects_walls_and_foreign_occupants() {
        let mut field = test_field();
        field.occupy(Position::new(3, 3), ObjectId::new(2));

        let probe = FieldProbe::new(&field, ObjectId::new(1));
        assert!(!probe.can_enter(Position::new(0, 4)), "wall ring");
        assert!(!probe.can_enter(Position::new(3, 3)), "foreign occupant");
        assert!(!probe.can_enter(Position::new(-1, 0)), "out of bounds");
        assert!(probe.can_enter(Position::new(4, 4)));
        assert!(probe.can_enter(field.finish_position()), "finish is enterable");
    }

    #[test]
    fn probe_treats_own_claim_as_free() {
        let mut field = test_field();
        let mover = ObjectId::new(5);
        field.occupy(Position::new(2, 2), mover);

        let probe = FieldProbe::new(&field, mover);
        assert!(probe.can_enter(Position::new(2, 2)));
    }

    #[test]
    fn wanderer_alternates_between_settled_and_transition_frames() {
        let field = test_field();
        let mover = ObjectId::new(1);
        let mut wanderer = Wanderer::new(Position::new(4, 4), 0x5eed);

        let probe = FieldProbe::new(&field, mover);
        wanderer.update(&probe);
        assert_ne!(
            wanderer.begin_position(),
            wanderer.end_position(),
            "first update starts a transition on an open field"
        );
        let destination = wanderer.end_position();

        wanderer.update(&probe);
        assert_eq!(wanderer.begin_position(), destination);
        assert_eq!(wanderer.end_position(), destination);
    }

    #[test]
    fn wanderer_expires_after_lifespan_steps() {
        let field = test_field();
        let mut wanderer = Wanderer::new(Position::new(4, 4), 9);
        let probe = FieldProbe::new(&field, ObjectId::new(1));

        let mut updates = 0;
        while wanderer.is_alive() {
            wanderer.update(&probe);
            updates += 1;
            assert!(updates < 10_000, "wanderer never expired");
        }
        assert!(!wanderer.is_alive());
    }

    #[test]
    fn wanderer_expires_upon_arriving_at_finish() {
        let field = test_field();
        let finish = field.finish_position();
        let mut wanderer = Wanderer::new(Position::new(2, 1), 3);
        wanderer.end = finish;

        let probe = FieldProbe::new(&field, ObjectId::new(1));
        wanderer.update(&probe);

        assert_eq!(wanderer.begin_position(), finish);
        assert!(!wanderer.is_alive());
    }

    #[test]
    fn wanderer_stays_settled_when_fully_boxed_in() {
        let mut field = test_field();
        let home = Position::new(4, 4);
        for direction in Direction::ALL {
            field.occupy(next_position(home, direction), ObjectId::new(99));
        }

        let mut wanderer = Wanderer::new(home, 11);
        let probe = FieldProbe::new(&field, ObjectId::new(1));
        wanderer.update(&probe);

        assert_eq!(wanderer.begin_position(), home);
        assert_eq!(wanderer.end_position(), home);
    }

    #[test]
    fn sentinel_never_leaves_its_cell() {
        let field = test_field();
        let home = Position::new(5, 2);
        let mut sentinel = Sentinel::new(home);
        let probe = FieldProbe::new(&field, ObjectId::new(1));

        for _ in 0..SENTINEL_LIFESPAN {
            sentinel.update(&probe);
            assert_eq!(sentinel.begin_position(), home);
            assert_eq!(sentinel.end_position(), home);
        }
        assert!(!sentinel.is_alive());
    }
}
