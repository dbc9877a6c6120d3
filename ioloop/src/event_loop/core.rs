use super::context::Context;
use crate::connection::{Connection, Readiness};
use crate::poller::{FdSets, Poller};
use crate::registry::{ConnId, Registry};
use crate::time::Interval;

use std::mem;
use std::os::fd::RawFd;
use tracing::{debug, trace, warn};

/// Why [`EventLoop::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Exit {
    /// The registry is empty.
    NoConnections,

    /// A wait expired with nothing ready and exit-on-timeout is set.
    Timeout,
}

/// The connection loop.
///
/// `EventLoop` owns the [`Registry`] and a [`Poller`] and drives every
/// registered connection until none is left or, when configured, until a
/// wait times out.
///
/// Each pass:
/// 1. probes every connection (`probe_write`, then `probe_read`) and builds
///    the read and write sets,
/// 2. blocks once in the poller,
/// 3. dispatches `write`, then `read`, to connections whose descriptors
///    came back ready and are still enabled.
///
/// Both traversals walk a snapshot of connection ids taken before any
/// callback runs, so callbacks may register or unregister connections at
/// will: connections removed earlier in the pass are skipped and new ones
/// join the next pass.
pub struct EventLoop<P> {
    /// Live connections.
    registry: Registry,

    /// The wait primitive.
    poller: P,

    /// Working read/write sets for the current pass.
    sets: FdSets,

    /// Reusable traversal snapshot.
    order: Vec<ConnId>,

    /// Longest wait when no callback asks for a shorter one.
    max_idle: Interval,

    /// Return [`Exit::Timeout`] from a wait that reports nothing ready.
    exit_on_timeout: bool,

    /// Interval requested for the next wait; reset after every wait.
    next_wait: Interval,

    /// Interval used by the most recent wait.
    last_wait: Option<Interval>,
}

impl<P: Poller> EventLoop<P> {
    pub(crate) fn new(poller: P, max_idle: Interval, exit_on_timeout: bool) -> Self {
        Self {
            registry: Registry::new(),
            poller,
            sets: FdSets::new(),
            order: Vec::new(),
            max_idle,
            exit_on_timeout,
            next_wait: max_idle,
            last_wait: None,
        }
    }

    /// Registers a connection.
    pub fn register<C>(&mut self, connection: C) -> ConnId
    where
        C: Connection + 'static,
    {
        self.registry.insert(connection)
    }

    /// Registers an already boxed connection.
    pub fn register_boxed(&mut self, connection: Box<dyn Connection>) -> ConnId {
        self.registry.insert_boxed(connection)
    }

    /// Unregisters a connection and hands it back.
    pub fn unregister(&mut self, id: ConnId) -> Option<Box<dyn Connection>> {
        self.registry.remove(id)
    }

    /// The live connections.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The live connections, mutably.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The poller.
    pub fn poller(&self) -> &P {
        &self.poller
    }

    /// Longest wait when no callback asks for a shorter one.
    pub fn max_idle(&self) -> Interval {
        self.max_idle
    }

    /// Whether a wait with nothing ready ends [`run`](Self::run).
    pub fn exit_on_timeout(&self) -> bool {
        self.exit_on_timeout
    }

    /// Interval used by the most recent wait, `None` before the first one.
    pub fn last_wait(&self) -> Option<Interval> {
        self.last_wait
    }

    /// Drives connections until none is left or a wait times out.
    ///
    /// Blocks the calling thread for the whole time.
    ///
    /// # Panics
    ///
    /// Panics if a connection reports [`Readiness::Ready`] on a side whose
    /// descriptor is disabled.
    pub fn run(&mut self) -> Exit {
        self.next_wait = self.max_idle;

        loop {
            if let Some(exit) = self.turn() {
                debug!(?exit, "event loop finished");
                return exit;
            }
        }
    }

    /// Runs one pass. Returns `Some` when the loop must stop.
    fn turn(&mut self) -> Option<Exit> {
        self.sets.clear();

        if self.registry.is_empty() {
            return Some(Exit::NoConnections);
        }

        self.probe();

        // Every connection may have terminated during probing.
        if self.registry.is_empty() {
            return Some(Exit::NoConnections);
        }

        let timeout = self.next_wait;
        self.last_wait = Some(timeout);
        // Callbacks from here on shape the following wait, not this one.
        self.next_wait = self.max_idle;

        trace!(
            %timeout,
            max_fd = self.sets.max_fd().unwrap_or(-1),
            readers = self.sets.read.len(),
            writers = self.sets.write.len(),
            "waiting"
        );

        match self.poller.wait(&mut self.sets, timeout) {
            Ok(0) => {
                trace!("wait timed out");
                self.exit_on_timeout.then_some(Exit::Timeout)
            }
            Ok(ready) => {
                trace!(ready, "wait returned");
                self.dispatch();
                None
            }
            Err(err) if err.is_interrupted() => {
                trace!("wait interrupted");
                None
            }
            Err(err) => {
                warn!(error = %err, "wait failed, retrying");
                None
            }
        }
    }

    /// Asks every connection what to wait for and fills the working sets.
    fn probe(&mut self) {
        let mut order = mem::take(&mut self.order);
        self.registry.snapshot(&mut order);

        for &id in &order {
            let Some(mut connection) = self.registry.check_out(id) else {
                continue;
            };

            let probed = {
                let mut cx = Context::new(id, &mut self.registry, &mut self.next_wait);
                probe_connection(id, connection.as_mut(), &mut cx)
            };

            match probed {
                Some((write_fd, read_fd)) => {
                    self.registry.check_in(id, connection);

                    if let Some(fd) = write_fd {
                        self.sets.write.insert(fd);
                    }
                    if let Some(fd) = read_fd {
                        self.sets.read.insert(fd);
                    }
                }
                None => self.retire(id, connection),
            }
        }

        self.order = order;
    }

    /// Calls `write`/`read` on connections whose descriptors are ready.
    fn dispatch(&mut self) {
        let mut order = mem::take(&mut self.order);
        self.registry.snapshot(&mut order);

        for &id in &order {
            let Some(mut connection) = self.registry.check_out(id) else {
                continue;
            };

            let alive = {
                let mut cx = Context::new(id, &mut self.registry, &mut self.next_wait);
                dispatch_connection(id, connection.as_mut(), &mut cx, &self.sets)
            };

            if alive {
                self.registry.check_in(id, connection);
            } else {
                self.retire(id, connection);
            }
        }

        self.order = order;
    }

    /// Unregisters and drops a connection that is done.
    fn retire(&mut self, id: ConnId, connection: Box<dyn Connection>) {
        self.registry.remove(id);
        drop(connection);

        trace!(%id, remaining = self.registry.len(), "connection terminated");
    }
}

/// Runs both probes. Returns the descriptors to wait on, or `None` when the
/// connection is done.
fn probe_connection(
    id: ConnId,
    connection: &mut dyn Connection,
    cx: &mut Context<'_>,
) -> Option<(Option<RawFd>, Option<RawFd>)> {
    let write = connection.probe_write(cx);
    if !cx.settle(connection.descriptors_mut()) || write.is_terminate() {
        return None;
    }
    let write_fd = claimed_fd(id, write, connection.descriptors().write, "write");

    // The reader may still abort, so nothing is added to the sets yet.
    let read = connection.probe_read(cx);
    if !cx.settle(connection.descriptors_mut()) || read.is_terminate() {
        return None;
    }
    let read_fd = claimed_fd(id, read, connection.descriptors().read, "read");

    trace!(%id, ?write, ?read, "probed");

    Some((write_fd, read_fd))
}

/// The descriptor to wait on for a probe result.
///
/// # Panics
///
/// Panics when `Ready` is claimed on a disabled side.
fn claimed_fd(id: ConnId, readiness: Readiness, fd: Option<RawFd>, side: &str) -> Option<RawFd> {
    if !readiness.is_ready() {
        return None;
    }

    match fd {
        Some(fd) => Some(fd),
        None => panic!("{id} reported {side} readiness without a {side} descriptor"),
    }
}

/// Dispatches one connection. Returns `false` when it is done.
fn dispatch_connection(
    id: ConnId,
    connection: &mut dyn Connection,
    cx: &mut Context<'_>,
    ready: &FdSets,
) -> bool {
    // Descriptors are re-checked right before each call: an earlier
    // callback may have disabled them since probing.
    if let Some(fd) = connection.descriptors().write.filter(|&fd| ready.write.contains(fd)) {
        trace!(%id, fd, "write ready");

        let outcome = connection.write(cx);
        if !cx.settle(connection.descriptors_mut()) || outcome.is_terminate() {
            return false;
        }
    }

    if let Some(fd) = connection.descriptors().read.filter(|&fd| ready.read.contains(fd)) {
        trace!(%id, fd, "read ready");

        let outcome = connection.read(cx);
        if !cx.settle(connection.descriptors_mut()) || outcome.is_terminate() {
            return false;
        }
    }

    true
}
