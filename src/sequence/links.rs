//! Slab-backed node storage for [`FlightSequence`](super::FlightSequence).
//!
//! Nodes are addressed by stable [`NodeKey`]s instead of pointers. Two
//! sentinel nodes bound the chain and are never removed, so splicing never
//! has to special-case the ends.

use slab::Slab;
use thiserror::Error;

use crate::models::Flight;

/// Stable handle to a node in a [`LinkStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Sentinel nodes cannot be removed")]
    Sentinel,

    #[error("Node {0} is not part of the chain")]
    Dangling(usize),
}

#[derive(Debug)]
enum Slot {
    Sentinel,
    Occupied(Flight),
}

#[derive(Debug)]
struct Node {
    slot: Slot,
    prev: NodeKey,
    next: NodeKey,
}

#[derive(Debug)]
pub struct LinkStore {
    nodes: Slab<Node>,
    head: NodeKey,
    tail: NodeKey,
    len: usize,
}

impl LinkStore {
    pub fn new() -> Self {
        let mut nodes = Slab::with_capacity(2);
        let placeholder = NodeKey(0);
        let head = NodeKey(nodes.insert(Node {
            slot: Slot::Sentinel,
            prev: placeholder,
            next: placeholder,
        }));
        let tail = NodeKey(nodes.insert(Node {
            slot: Slot::Sentinel,
            prev: head,
            next: placeholder,
        }));

        // Sentinels point at each other on the inside and at themselves outside.
        nodes[head.0].prev = head;
        nodes[head.0].next = tail;
        nodes[tail.0].next = tail;

        Self {
            nodes,
            head,
            tail,
            len: 0,
        }
    }

    pub fn head(&self) -> NodeKey {
        self.head
    }

    pub fn tail(&self) -> NodeKey {
        self.tail
    }

    /// Number of occupied nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_sentinel(&self, key: NodeKey) -> bool {
        key == self.head || key == self.tail
    }

    pub fn next(&self, key: NodeKey) -> NodeKey {
        self.nodes[key.0].next
    }

    pub fn prev(&self, key: NodeKey) -> NodeKey {
        self.nodes[key.0].prev
    }

    /// The record held by `key`, or `None` for sentinels and vacant keys.
    pub fn get(&self, key: NodeKey) -> Option<&Flight> {
        match self.nodes.get(key.0) {
            Some(Node {
                slot: Slot::Occupied(flight),
                ..
            }) => Some(flight),
            _ => None,
        }
    }

    /// Create a node for `flight` and splice it between two adjacent nodes.
    ///
    /// Does not check whether another node already holds the same id.
    pub fn insert_between(&mut self, flight: Flight, prev: NodeKey, next: NodeKey) -> NodeKey {
        debug_assert_eq!(self.nodes[prev.0].next, next, "nodes must be adjacent");

        let key = NodeKey(self.nodes.insert(Node {
            slot: Slot::Occupied(flight),
            prev,
            next,
        }));
        self.nodes[prev.0].next = key;
        self.nodes[next.0].prev = key;
        self.len += 1;
        key
    }

    /// Splice a node out of the chain and return its record.
    pub fn delete_node(&mut self, key: NodeKey) -> Result<Flight, LinkError> {
        if self.is_sentinel(key) {
            return Err(LinkError::Sentinel);
        }
        let node = self
            .nodes
            .try_remove(key.0)
            .ok_or(LinkError::Dangling(key.0))?;

        self.nodes[node.prev.0].next = node.next;
        self.nodes[node.next.0].prev = node.prev;
        self.len -= 1;

        match node.slot {
            Slot::Occupied(flight) => Ok(flight),
            Slot::Sentinel => Err(LinkError::Sentinel),
        }
    }
}

impl Default for LinkStore {
    fn default() -> Self {
        Self::new()
    }
}
