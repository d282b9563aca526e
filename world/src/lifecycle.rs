//! Per-tick object lifecycle pass.
//!
//! The pass owns every occupancy mutation that follows from object
//! updates: survivors have their footprints reconciled against the field,
//! and expired objects are unlinked from both the field and the active
//! collection. Objects themselves never touch the field, so one object's
//! movement or death can never corrupt another's claims.

use tilescape_core::{Event, ObjectId, ObjectKind, Position};

use crate::field::Field;
use crate::objects::{DynamicObject, FieldProbe};

/// Live entry of the active-object collection.
#[derive(Debug)]
pub(crate) struct ObjectEntry {
    pub(crate) id: ObjectId,
    pub(crate) kind: ObjectKind,
    pub(crate) object: Box<dyn DynamicObject>,
}

/// Result of one full lifecycle pass.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SweepOutcome {
    /// A live object's begin position landed on the finish cell.
    pub(crate) reached_finish: bool,
}

/// Runs one lifecycle pass over the collection in its current order.
///
/// The pass consumes the current generation and builds the next one in a
/// single sweep, so removal never invalidates iteration and no element is
/// skipped or visited twice. For each entry: update while alive,
/// reconcile occupancy, then retire if the update left the object dead.
pub(crate) fn sweep(
    field: &mut Field,
    entries: Vec<ObjectEntry>,
    out_events: &mut Vec<Event>,
) -> (Vec<ObjectEntry>, SweepOutcome) {
    let mut survivors = Vec::with_capacity(entries.len());
    let mut outcome = SweepOutcome::default();
    let finish = field.finish_position();

    for mut entry in entries {
        if entry.object.is_alive() {
            let before_begin = entry.object.begin_position();
            let before_end = entry.object.end_position();

            {
                let probe = FieldProbe::new(field, entry.id);
                entry.object.update(&probe);
            }

            let after_begin = entry.object.begin_position();
            let after_end = entry.object.end_position();
            reconcile_occupancy(
                field,
                entry.id,
                [before_begin, before_end],
                [after_begin, after_end],
            );

            if after_begin == finish {
                outcome.reached_finish = true;
            }
        }

        if entry.object.is_alive() {
            survivors.push(entry);
        } else {
            retire(field, &entry, out_events);
        }
    }

    (survivors, outcome)
}

/// Claims the cells of the new footprint and releases departed cells,
/// touching only claims that still reference this exact object.
fn reconcile_occupancy(
    field: &mut Field,
    id: ObjectId,
    before: [Position; 2],
    after: [Position; 2],
) {
    for cell in after {
        // If another object claimed the cell first, leave its claim alone.
        if field
            .occupant_at(cell)
            .map_or(true, |occupant| occupant == id)
        {
            field.occupy(cell, id);
        }
    }

    for cell in before {
        if cell != after[0] && cell != after[1] {
            field.vacate_if_owned(cell, id);
        }
    }
}

/// Unlinks a dead object from the field and reports its removal.
fn retire(field: &mut Field, entry: &ObjectEntry, out_events: &mut Vec<Event>) {
    let begin = entry.object.begin_position();
    let end = entry.object.end_position();

    field.vacate_if_owned(begin, entry.id);
    field.vacate_if_owned(end, entry.id);

    out_events.push(Event::ObjectRetired {
        id: entry.id,
        begin,
        end,
    });
}
