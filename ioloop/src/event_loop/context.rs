use crate::connection::{Connection, Descriptors};
use crate::poller::platform::sys_close;
use crate::registry::{ConnId, Registry};
use crate::time::Interval;

use std::os::fd::RawFd;
use tracing::trace;

/// Loop access handed to every connection callback.
///
/// Through the context a callback can register and unregister connections,
/// close a descriptor shared by several connections, and request the
/// interval of the next wait.
///
/// The connection whose callback is running is checked out of the
/// registry for the duration of the call, so it is not visible through
/// [`registry`](Self::registry).
pub struct Context<'a> {
    /// The connection whose callback is running.
    id: ConnId,

    registry: &'a mut Registry,

    /// The loop's "requested interval for the next wait".
    next_wait: &'a mut Interval,

    /// Set when the running connection unregisters itself.
    removed: bool,

    /// Descriptors closed through [`close_fd_everywhere`](Self::close_fd_everywhere),
    /// still to be disabled on the running connection.
    closed: Vec<RawFd>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(id: ConnId, registry: &'a mut Registry, next_wait: &'a mut Interval) -> Self {
        Self {
            id,
            registry,
            next_wait,
            removed: false,
            closed: Vec::new(),
        }
    }

    /// Identity of the connection whose callback is running.
    pub fn id(&self) -> ConnId {
        self.id
    }

    /// The registry, minus the running connection.
    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Registers a new connection.
    ///
    /// It takes part in the loop from the next pass on.
    pub fn register<C>(&mut self, connection: C) -> ConnId
    where
        C: Connection + 'static,
    {
        self.register_boxed(Box::new(connection))
    }

    /// Registers an already boxed connection.
    pub fn register_boxed(&mut self, connection: Box<dyn Connection>) -> ConnId {
        let id = self.registry.insert_boxed(connection);
        trace!(%id, by = %self.id, "registered connection");
        id
    }

    /// Unregisters a connection.
    ///
    /// Passing [`id`](Self::id) unregisters the running connection: the loop
    /// drops it when the callback returns, whatever the callback reports, and
    /// calls nothing else on it. Returns the connection when it was not the
    /// running one.
    pub fn unregister(&mut self, id: ConnId) -> Option<Box<dyn Connection>> {
        if id == self.id {
            self.removed = true;
        }

        trace!(%id, by = %self.id, "unregistered connection");
        self.registry.remove(id)
    }

    /// The interval the next wait will use, as requested so far.
    pub fn next_wait(&self) -> Interval {
        *self.next_wait
    }

    /// Sets the interval of the next wait.
    ///
    /// The request lasts for one wait only; the last one made before that
    /// wait wins.
    pub fn set_next_wait(&mut self, interval: impl Into<Interval>) {
        *self.next_wait = interval.into();
    }

    /// Closes `fd` and disables it in every connection holding it,
    /// including the running one.
    pub fn close_fd_everywhere(&mut self, fd: RawFd) {
        sys_close(fd);

        let affected = self.registry.disable_fd(fd);
        self.closed.push(fd);

        trace!(fd, affected, by = %self.id, "closed shared descriptor");
    }

    /// Applies pending descriptor changes to the running connection.
    ///
    /// Returns `false` if the connection unregistered itself.
    pub(crate) fn settle(&mut self, descriptors: &mut Descriptors) -> bool {
        for fd in self.closed.drain(..) {
            descriptors.disable(fd);
        }

        !self.removed
    }
}
