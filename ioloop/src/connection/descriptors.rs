use crate::poller::platform::sys_close;

use std::os::fd::RawFd;

/// The read and write descriptors of a connection.
///
/// Either side may be disabled (`None`), which removes it from the wait
/// sets and stops the loop from dispatching it. Both sides may hold the
/// same descriptor for a duplex stream such as a socket.
///
/// `Descriptors` does not close anything on drop; owners call
/// [`close`](Self::close) themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Descriptors {
    /// Descriptor polled for reading.
    pub read: Option<RawFd>,

    /// Descriptor polled for writing.
    pub write: Option<RawFd>,
}

impl Descriptors {
    /// Creates a pair of descriptors. Negative values are treated as disabled.
    pub fn new(read: RawFd, write: RawFd) -> Self {
        Self {
            read: (read >= 0).then_some(read),
            write: (write >= 0).then_some(write),
        }
    }

    /// One descriptor used for both directions.
    pub fn duplex(fd: RawFd) -> Self {
        Self::new(fd, fd)
    }

    /// A read-only descriptor, such as a listening socket.
    pub fn read_only(fd: RawFd) -> Self {
        Self::new(fd, -1)
    }

    /// Both sides disabled.
    pub const fn disabled() -> Self {
        Self {
            read: None,
            write: None,
        }
    }

    /// Returns `true` when both sides are enabled and share one descriptor.
    pub fn is_duplex(&self) -> bool {
        self.read.is_some() && self.read == self.write
    }

    /// Returns `true` when both sides are disabled.
    pub fn is_disabled(&self) -> bool {
        self.read.is_none() && self.write.is_none()
    }

    /// Disables the read side and returns the descriptor it held.
    pub fn disable_read(&mut self) -> Option<RawFd> {
        self.read.take()
    }

    /// Disables the write side and returns the descriptor it held.
    pub fn disable_write(&mut self) -> Option<RawFd> {
        self.write.take()
    }

    /// Disables every side holding `fd`. Returns `true` if any did.
    pub fn disable(&mut self, fd: RawFd) -> bool {
        let mut hit = false;

        if self.read == Some(fd) {
            self.read = None;
            hit = true;
        }
        if self.write == Some(fd) {
            self.write = None;
            hit = true;
        }

        hit
    }

    /// Closes both descriptors and disables both sides.
    ///
    /// A descriptor shared by both sides is closed once. Calling this again
    /// is a no-op.
    pub fn close(&mut self) {
        let read = self.read.take();
        let write = self.write.take();

        if let Some(fd) = read {
            sys_close(fd);
        }
        if let Some(fd) = write.filter(|&fd| Some(fd) != read) {
            sys_close(fd);
        }
    }
}
