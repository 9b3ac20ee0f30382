//! Status-driven reordering and full rebuilds of a [`FlightSequence`].

use std::collections::HashMap;

use serde::Serialize;

use super::FlightSequence;
use crate::error::SequenceError;
use crate::models::{Flight, FlightId, FlightStatus};

/// Where a status change left the flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "position")]
pub enum Placement {
    /// Status did not change; nothing moved.
    Unchanged,
    /// Moved to the front (emergency).
    Front,
    /// Moved to the back (delayed).
    Back,
    /// Put back at the position it held before the change.
    Restored(usize),
    /// The flight was not in the sequence, so nothing moved.
    Missing,
}

/// Move `updated` to where its new status belongs.
///
/// `previous` is the status the flight had before the change. The entry in
/// the sequence is replaced by `updated`, never mutated in place.
pub fn apply_status_change(
    sequence: &mut FlightSequence,
    updated: Flight,
    previous: FlightStatus,
) -> Result<Placement, SequenceError> {
    if updated.status == previous {
        return Ok(Placement::Unchanged);
    }

    let original_position = match sequence.remove_by_id(updated.id) {
        Ok((_, position)) => position,
        Err(SequenceError::NotFound(id)) => {
            tracing::warn!(flight_id = %id, code = %updated.code, "Status changed for a flight missing from the sequence");
            return Ok(Placement::Missing);
        }
        Err(e) => return Err(e),
    };

    let placement = match updated.status {
        FlightStatus::Emergency => {
            sequence.push_front(updated);
            Placement::Front
        }
        FlightStatus::Delayed => {
            sequence.push_back(updated);
            Placement::Back
        }
        FlightStatus::Scheduled => {
            let position = original_position.min(sequence.count());
            sequence.insert_at(updated, position)?;
            Placement::Restored(position)
        }
    };

    tracing::debug!(?placement, previous = %previous, "Reordered flight after status change");
    Ok(placement)
}

/// Build a new sequence holding `order`'s flights in that order.
///
/// Every id must be present in `known`; otherwise nothing is built and
/// `UnknownIdentifier` names the first missing id. Repeated ids keep only
/// their last occurrence.
pub fn rebuild(
    order: &[FlightId],
    known: &HashMap<FlightId, Flight>,
) -> Result<FlightSequence, SequenceError> {
    if let Some(missing) = order.iter().find(|id| !known.contains_key(id)) {
        return Err(SequenceError::UnknownIdentifier(missing.to_string()));
    }

    Ok(order
        .iter()
        .filter_map(|id| known.get(id).cloned())
        .collect())
}
