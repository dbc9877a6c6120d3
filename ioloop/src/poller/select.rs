//! `select(2)`-based backend.
//!
//! The reference model for the loop: two bit-vector descriptor sets and a
//! microsecond `timeval`. Descriptors at or above `FD_SETSIZE` cannot be
//! represented and are rejected before the call.

use super::Poller;
use super::common::{FdSet, FdSets};
use super::platform::{FD_SETSIZE, fd_set_contains, fd_set_empty, fd_set_insert, sys_select};
use crate::error::{Error, Result};
use crate::time::Interval;

use libc::fd_set;

/// `select(2)` poller.
#[derive(Debug, Default)]
pub struct SelectPoller {
    _private: (),
}

impl SelectPoller {
    /// Creates a new `SelectPoller`.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Copies `set` into a kernel `fd_set`.
fn to_fd_set(set: &FdSet) -> fd_set {
    let mut raw = fd_set_empty();
    for fd in set.iter() {
        fd_set_insert(&mut raw, fd);
    }
    raw
}

/// Keeps only the descriptors of `set` that `raw` marks as ready.
fn retain_ready(set: &mut FdSet, raw: &fd_set) {
    let stale: Vec<_> = set.iter().filter(|&fd| !fd_set_contains(raw, fd)).collect();
    for fd in stale {
        set.remove(fd);
    }
}

impl Poller for SelectPoller {
    fn wait(&mut self, sets: &mut FdSets, timeout: Interval) -> Result<usize> {
        let max_fd = sets.max_fd();

        if let Some(fd) = max_fd.filter(|&fd| fd as usize >= FD_SETSIZE) {
            return Err(Error::DescriptorLimit {
                fd,
                limit: FD_SETSIZE,
            });
        }

        let nfds = max_fd.map_or(0, |fd| fd + 1);
        let mut read_set = to_fd_set(&sets.read);
        let mut write_set = to_fd_set(&sets.write);

        let n = sys_select(nfds, &mut read_set, &mut write_set, timeout)?;
        if n == 0 {
            return Ok(0);
        }

        retain_ready(&mut sets.read, &read_set);
        retain_ready(&mut sets.write, &write_set);

        Ok(n)
    }
}
