//! `poll(2)`-based backend.
//!
//! Builds one `pollfd` per descriptor of interest, merging the read and
//! write interest of a duplex descriptor into a single entry. Hang-up and
//! error conditions count as readiness on every requested side, the same
//! way `select(2)` reports them, so the owning connection gets to see the
//! failure from its own `read`/`write`.

use super::Poller;
use super::common::FdSets;
use super::platform::sys_poll;
use crate::error::Result;
use crate::time::Interval;

use libc::{POLLERR, POLLHUP, POLLIN, POLLNVAL, POLLOUT, pollfd};

/// Conditions reported as readable.
const READABLE: i16 = POLLIN | POLLHUP | POLLERR | POLLNVAL;

/// Conditions reported as writable.
const WRITABLE: i16 = POLLOUT | POLLHUP | POLLERR | POLLNVAL;

/// `poll(2)` poller.
///
/// Keeps its `pollfd` buffer between waits.
#[derive(Default)]
pub struct PollPoller {
    fds: Vec<pollfd>,
}

impl PollPoller {
    /// Creates a new `PollPoller`.
    pub fn new() -> Self {
        Self {
            fds: Vec::with_capacity(64),
        }
    }

    /// Fills the `pollfd` buffer from `sets`, ordered by descriptor.
    fn build(&mut self, sets: &FdSets) {
        self.fds.clear();

        let mut reads = sets.read.iter().peekable();
        let mut writes = sets.write.iter().peekable();

        loop {
            let fd = match (reads.peek(), writes.peek()) {
                (Some(&r), Some(&w)) => r.min(w),
                (Some(&r), None) => r,
                (None, Some(&w)) => w,
                (None, None) => break,
            };

            let mut events = 0;
            if reads.next_if_eq(&fd).is_some() {
                events |= POLLIN;
            }
            if writes.next_if_eq(&fd).is_some() {
                events |= POLLOUT;
            }

            self.fds.push(pollfd {
                fd,
                events,
                revents: 0,
            });
        }
    }
}

impl Poller for PollPoller {
    fn wait(&mut self, sets: &mut FdSets, timeout: Interval) -> Result<usize> {
        self.build(sets);

        let n = sys_poll(&mut self.fds, timeout)?;
        if n == 0 {
            return Ok(0);
        }

        sets.clear();
        for entry in self.fds.iter().filter(|entry| entry.revents != 0) {
            if entry.events & POLLIN != 0 && entry.revents & READABLE != 0 {
                sets.read.insert(entry.fd);
            }
            if entry.events & POLLOUT != 0 && entry.revents & WRITABLE != 0 {
                sets.write.insert(entry.fd);
            }
        }

        Ok(sets.len())
    }
}
