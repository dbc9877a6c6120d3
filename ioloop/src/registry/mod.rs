//! The live-connection registry.
//!
//! The registry owns every registered [`Connection`]. Identities
//! ([`ConnId`]) are generational: once a connection is removed its id never
//! resolves again, even after the storage slot is reused.
//!
//! While the event loop runs one of a connection's callbacks, the
//! connection is *checked out*: the loop holds it and its slot keeps a
//! placeholder. Removing a checked-out connection drops the placeholder, so
//! the loop discards the connection instead of putting it back.

use crate::connection::Connection;
use crate::utils::{Key, Slab};

use std::collections::VecDeque;
use std::fmt;
use std::os::fd::RawFd;

/// Identity of a registered connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(Key);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}.{}", self.0.index, self.0.generation)
    }
}

/// A registry slot.
enum Entry {
    /// Stored and available.
    Idle(Box<dyn Connection>),

    /// Held by the event loop while one of its callbacks runs.
    CheckedOut,
}

/// The collection of live connections.
///
/// Insertion prepends and is O(1); removal scans the traversal order and is
/// O(n). Traversal order is newest first but carries no other meaning.
pub struct Registry {
    /// Connection storage.
    entries: Slab<Entry>,

    /// Traversal order, newest first.
    order: VecDeque<ConnId>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Slab::with_capacity(16),
            order: VecDeque::new(),
        }
    }

    /// Number of registered connections, including a checked-out one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Returns `true` if `id` is still registered.
    pub fn contains(&self, id: ConnId) -> bool {
        self.entries.contains(id.0)
    }

    /// Registers a connection.
    pub fn insert<C>(&mut self, connection: C) -> ConnId
    where
        C: Connection + 'static,
    {
        self.insert_boxed(Box::new(connection))
    }

    /// Registers an already boxed connection.
    pub fn insert_boxed(&mut self, connection: Box<dyn Connection>) -> ConnId {
        let id = ConnId(self.entries.insert(Entry::Idle(connection)));
        self.order.push_front(id);
        id
    }

    /// Unregisters a connection and hands it back.
    ///
    /// Returns `None` if `id` is unknown, or if the connection is currently
    /// checked out by the event loop; in that case it is still unregistered
    /// and the loop drops it as soon as its callback returns.
    pub fn remove(&mut self, id: ConnId) -> Option<Box<dyn Connection>> {
        let entry = self.entries.remove(id.0)?;

        if let Some(position) = self.order.iter().position(|&other| other == id) {
            self.order.remove(position);
        }

        match entry {
            Entry::Idle(connection) => Some(connection),
            Entry::CheckedOut => None,
        }
    }

    /// Returns a registered connection.
    pub fn get(&self, id: ConnId) -> Option<&dyn Connection> {
        match self.entries.get(id.0)? {
            Entry::Idle(connection) => Some(connection.as_ref()),
            Entry::CheckedOut => None,
        }
    }

    /// Returns a registered connection mutably.
    pub fn get_mut(&mut self, id: ConnId) -> Option<&mut (dyn Connection + 'static)> {
        match self.entries.get_mut(id.0)? {
            Entry::Idle(connection) => Some(connection.as_mut()),
            Entry::CheckedOut => None,
        }
    }

    /// Iterates over connection ids in traversal order.
    pub fn ids(&self) -> impl Iterator<Item = ConnId> + '_ {
        self.order.iter().copied()
    }

    /// Disables `fd` in every stored connection that holds it.
    ///
    /// Returns how many connections were affected. A checked-out connection
    /// is not visited.
    pub fn disable_fd(&mut self, fd: RawFd) -> usize {
        self.entries
            .values_mut()
            .filter_map(|entry| match entry {
                Entry::Idle(connection) => Some(connection),
                Entry::CheckedOut => None,
            })
            .map(|connection| connection.descriptors_mut().disable(fd))
            .filter(|&hit| hit)
            .count()
    }

    /// Replaces the contents of `buffer` with the current traversal order.
    pub(crate) fn snapshot(&self, buffer: &mut Vec<ConnId>) {
        buffer.clear();
        buffer.extend(self.order.iter().copied());
    }

    /// Takes a connection out of its slot for the duration of a callback.
    pub(crate) fn check_out(&mut self, id: ConnId) -> Option<Box<dyn Connection>> {
        let entry = self.entries.get_mut(id.0)?;

        match std::mem::replace(entry, Entry::CheckedOut) {
            Entry::Idle(connection) => Some(connection),
            Entry::CheckedOut => None,
        }
    }

    /// Puts a checked-out connection back.
    ///
    /// If it was unregistered in the meantime, the connection is dropped.
    pub(crate) fn check_in(&mut self, id: ConnId, connection: Box<dyn Connection>) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            *entry = Entry::Idle(connection);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.len())
            .field("order", &self.order)
            .finish()
    }
}
