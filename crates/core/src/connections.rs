//! Directed connections between block instances.
//!
//! Every instance has at most one predecessor and one successor, so the graph
//! is always a set of disjoint simple chains. Both directions are kept as maps,
//! which makes the degree check constant time and the cycle check linear in
//! the length of one chain.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::debug;

use crate::error::{Error, Result};
use crate::instance::InstanceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: InstanceId,
    pub to: InstanceId,
}

#[derive(Debug, Default, Clone)]
pub struct ConnectionSet {
    members: IndexSet<InstanceId>,
    successors: HashMap<InstanceId, InstanceId>,
    predecessors: HashMap<InstanceId, InstanceId>,
}

impl ConnectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instance. Returns `false` if it was already present.
    pub fn insert_instance(&mut self, id: InstanceId) -> bool {
        self.members.insert(id)
    }

    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.members.contains(&id)
    }

    #[must_use]
    pub fn successor(&self, id: InstanceId) -> Option<InstanceId> {
        self.successors.get(&id).copied()
    }

    #[must_use]
    pub fn predecessor(&self, id: InstanceId) -> Option<InstanceId> {
        self.predecessors.get(&id).copied()
    }

    /// All connections, ordered by their source's insertion order.
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.members
            .iter()
            .filter_map(|from| self.successor(*from).map(|to| Connection { from: *from, to }))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Connects `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`Error::SelfLoop`] if both ends are the same instance.
    /// - [`Error::UnknownInstance`] if either end is not registered.
    /// - [`Error::DegreeViolation`] if `from` already has a successor or `to`
    ///   already has a predecessor. This covers repeated links too.
    /// - [`Error::CycleViolation`] if `to` already precedes `from`.
    pub fn link(&mut self, from: InstanceId, to: InstanceId) -> Result<()> {
        if from == to {
            return Err(Error::SelfLoop(from));
        }

        for id in [from, to] {
            if !self.contains(id) {
                return Err(Error::UnknownInstance(id));
            }
        }

        if self.successors.contains_key(&from) || self.predecessors.contains_key(&to) {
            return Err(Error::DegreeViolation { from, to });
        }

        if self.head_of(from) == to {
            return Err(Error::CycleViolation { from, to });
        }

        self.successors.insert(from, to);
        self.predecessors.insert(to, from);
        debug!("Linked {from} -> {to}");

        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no connection from `from` to `to`.
    pub fn unlink(&mut self, from: InstanceId, to: InstanceId) -> Result<()> {
        if self.successor(from) != Some(to) {
            return Err(Error::NotFound { from, to });
        }

        self.successors.remove(&from);
        self.predecessors.remove(&to);
        debug!("Unlinked {from} -> {to}");

        Ok(())
    }

    /// Drops an instance and every connection touching it.
    ///
    /// Returns the removed connections.
    pub fn remove_instance(&mut self, id: InstanceId) -> Vec<Connection> {
        let mut removed = Vec::new();

        if let Some(from) = self.predecessors.remove(&id) {
            self.successors.remove(&from);
            removed.push(Connection { from, to: id });
        }

        if let Some(to) = self.successors.remove(&id) {
            self.predecessors.remove(&to);
            removed.push(Connection { from: id, to });
        }

        self.members.shift_remove(&id);
        removed
    }

    /// First instance of the chain containing `id`.
    ///
    /// With an acyclic predecessor map the walk ends after at most one step
    /// per chain member.
    #[must_use]
    pub fn head_of(&self, id: InstanceId) -> InstanceId {
        let mut current = id;
        while let Some(previous) = self.predecessor(current) {
            current = previous;
        }
        current
    }

    fn walk_from(&self, head: InstanceId) -> Vec<InstanceId> {
        let mut chain = vec![head];
        let mut current = head;
        while let Some(next) = self.successor(current) {
            chain.push(next);
            current = next;
        }
        chain
    }

    /// The whole chain containing `id`, head first.
    ///
    /// Returns `None` for an unregistered id.
    #[must_use]
    pub fn chain_containing(&self, id: InstanceId) -> Option<Vec<InstanceId>> {
        if !self.contains(id) {
            return None;
        }

        Some(self.walk_from(self.head_of(id)))
    }

    /// Splits every registered instance into maximal chains.
    ///
    /// Chains are ordered by their head's insertion order and every instance
    /// appears in exactly one of them.
    #[must_use]
    pub fn chains(&self) -> Vec<Vec<InstanceId>> {
        self.members
            .iter()
            .filter(|id| !self.predecessors.contains_key(*id))
            .map(|head| self.walk_from(*head))
            .collect()
    }
}
