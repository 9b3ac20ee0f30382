//! In-memory priority order of flights.
//!
//! [`FlightSequence`] is a doubly-linked chain bounded by two sentinels. Front
//! and back operations are O(1), positional operations walk from the nearer
//! end, and identity lookups go through an id to node index.
//!
//! The sequence has no internal locking. Callers sharing it between tasks must
//! serialize access themselves (see [`AppState`](crate::state::AppState)).

mod links;
pub mod reorder;

use std::collections::HashMap;

pub use links::LinkError;
use links::{LinkStore, NodeKey};
pub use reorder::{apply_status_change, rebuild, Placement};

use crate::error::SequenceError;
use crate::models::{Flight, FlightId};

/// Ordered collection of flights where position encodes priority.
///
/// At most one entry exists per [`FlightId`]: every insertion first removes
/// any entry already holding the same id.
#[derive(Debug, Default)]
pub struct FlightSequence {
    links: LinkStore,
    index: HashMap<FlightId, NodeKey>,
}

impl FlightSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flights in the sequence.
    pub fn count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Insert at the front (emergencies).
    pub fn push_front(&mut self, flight: Flight) {
        self.evict(flight.id);
        let head = self.links.head();
        let first = self.links.next(head);
        self.link(flight, head, first);
    }

    /// Insert at the back (regular and delayed flights).
    pub fn push_back(&mut self, flight: Flight) {
        self.evict(flight.id);
        let tail = self.links.tail();
        let last = self.links.prev(tail);
        self.link(flight, last, tail);
    }

    pub fn peek_front(&self) -> Result<&Flight, SequenceError> {
        self.links
            .get(self.links.next(self.links.head()))
            .ok_or(SequenceError::EmptyCollection)
    }

    pub fn peek_back(&self) -> Result<&Flight, SequenceError> {
        self.links
            .get(self.links.prev(self.links.tail()))
            .ok_or(SequenceError::EmptyCollection)
    }

    /// Place `flight` at `position`, moving it if its id is already present.
    ///
    /// `position` is checked against the count before the move. If removing
    /// the old entry leaves `position` past the end, the flight is appended.
    pub fn insert_at(&mut self, flight: Flight, position: usize) -> Result<(), SequenceError> {
        if position > self.count() {
            return Err(self.invalid_position(position));
        }

        self.evict(flight.id);
        let position = position.min(self.count());

        if position == 0 {
            self.push_front(flight);
        } else if position == self.count() {
            self.push_back(flight);
        } else {
            let at = self.node_at(position);
            let prev = self.links.prev(at);
            self.link(flight, prev, at);
        }
        Ok(())
    }

    /// Remove and return the flight at `position`.
    pub fn remove_at(&mut self, position: usize) -> Result<Flight, SequenceError> {
        if position >= self.count() {
            return Err(self.invalid_position(position));
        }

        let key = self.node_at(position);
        let flight = self.links.delete_node(key)?;
        self.index.remove(&flight.id);
        Ok(flight)
    }

    pub fn find_by_id(&self, id: FlightId) -> Result<&Flight, SequenceError> {
        self.index
            .get(&id)
            .and_then(|key| self.links.get(*key))
            .ok_or(SequenceError::NotFound(id))
    }

    /// Current position of `id`, if it is in the sequence.
    pub fn position_of(&self, id: FlightId) -> Option<usize> {
        self.index.get(&id).map(|key| self.position_of_node(*key))
    }

    /// Remove the flight with `id`, returning it with the position it held.
    pub fn remove_by_id(&mut self, id: FlightId) -> Result<(Flight, usize), SequenceError> {
        let key = *self.index.get(&id).ok_or(SequenceError::NotFound(id))?;
        let position = self.position_of_node(key);
        let flight = self.links.delete_node(key)?;
        self.index.remove(&id);
        Ok((flight, position))
    }

    /// Snapshot of all flights, front to back.
    pub fn to_ordered_list(&self) -> Vec<Flight> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            links: &self.links,
            front: self.links.next(self.links.head()),
            remaining: self.count(),
        }
    }

    fn link(&mut self, flight: Flight, prev: NodeKey, next: NodeKey) {
        let id = flight.id;
        let key = self.links.insert_between(flight, prev, next);
        self.index.insert(id, key);
    }

    fn evict(&mut self, id: FlightId) -> Option<(Flight, usize)> {
        self.remove_by_id(id).ok()
    }

    /// Node at `position`, or the tail sentinel when `position == count`.
    fn node_at(&self, position: usize) -> NodeKey {
        let len = self.count();
        if position <= len / 2 {
            let mut cursor = self.links.next(self.links.head());
            for _ in 0..position {
                cursor = self.links.next(cursor);
            }
            cursor
        } else {
            let mut cursor = self.links.tail();
            for _ in 0..(len - position) {
                cursor = self.links.prev(cursor);
            }
            cursor
        }
    }

    fn position_of_node(&self, key: NodeKey) -> usize {
        let head = self.links.head();
        let mut position = 0;
        let mut cursor = self.links.prev(key);
        while cursor != head {
            position += 1;
            cursor = self.links.prev(cursor);
        }
        position
    }

    fn invalid_position(&self, position: usize) -> SequenceError {
        SequenceError::InvalidPosition {
            position: i64::try_from(position).unwrap_or(i64::MAX),
            len: self.count(),
        }
    }
}

/// Front-to-back iterator over a [`FlightSequence`].
pub struct Iter<'a> {
    links: &'a LinkStore,
    front: NodeKey,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Flight;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let flight = self.links.get(self.front)?;
        self.front = self.links.next(self.front);
        self.remaining -= 1;
        Some(flight)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> IntoIterator for &'a FlightSequence {
    type Item = &'a Flight;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Flight> for FlightSequence {
    fn extend<I: IntoIterator<Item = Flight>>(&mut self, flights: I) {
        for flight in flights {
            self.push_back(flight);
        }
    }
}

impl FromIterator<Flight> for FlightSequence {
    fn from_iter<I: IntoIterator<Item = Flight>>(flights: I) -> Self {
        let mut sequence = Self::new();
        sequence.extend(flights);
        sequence
    }
}
