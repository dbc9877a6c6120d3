use crate::connection::{Connection, Descriptors, Outcome, Readiness};
use crate::error::Result;
use crate::event_loop::Context;
use crate::poller::platform::{sys_close, sys_read, sys_set_nonblocking, sys_shutdown, sys_write};

use std::io::ErrorKind;
use std::net::Shutdown;
use std::os::fd::{IntoRawFd, RawFd};
use tracing::{debug, trace};

/// A buffered byte relay.
///
/// `Relay` reads from its read descriptor into a bounded buffer and writes
/// the buffer out to its write descriptor. Over a single socket it echoes
/// everything back to the peer; over two pipes it bridges them.
///
/// It follows the half-close convention: on end of input it stops reading,
/// keeps flushing, then shuts its write side down and terminates.
pub struct Relay {
    fds: Descriptors,

    /// Bytes read but not written yet.
    buffer: Vec<u8>,

    /// Upper bound on `buffer`.
    capacity: usize,
}

impl Relay {
    /// Default buffer capacity in bytes.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a relay from `read_fd` to `write_fd` and takes ownership of
    /// both. They are switched to non-blocking mode.
    pub fn new(read_fd: RawFd, write_fd: RawFd) -> Result<Self> {
        sys_set_nonblocking(read_fd)?;
        if write_fd != read_fd {
            sys_set_nonblocking(write_fd)?;
        }

        Ok(Self {
            fds: Descriptors::new(read_fd, write_fd),
            buffer: Vec::with_capacity(Self::DEFAULT_CAPACITY),
            capacity: Self::DEFAULT_CAPACITY,
        })
    }

    /// Creates an echo relay over a duplex stream such as a socket.
    pub fn duplex<S: IntoRawFd>(stream: S) -> Result<Self> {
        let fd = stream.into_raw_fd();
        Self::new(fd, fd).inspect_err(|_| sys_close(fd))
    }

    /// Sets the buffer capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "relay capacity must be > 0");

        self.capacity = capacity;
        self
    }

    /// Number of buffered bytes waiting to be written.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Stops reading after end of input.
    fn end_of_input(&mut self) {
        if self.fds.is_duplex() {
            if let Some(fd) = self.fds.disable_read() {
                let _ = sys_shutdown(fd, Shutdown::Read);
            }
        } else if let Some(fd) = self.fds.disable_read() {
            sys_close(fd);
        }
    }

    /// Signals end of output to the peer.
    fn end_of_output(&mut self) {
        if let Some(fd) = self.fds.write {
            // Not a socket for pipes; closing on drop delivers EOF there.
            let _ = sys_shutdown(fd, Shutdown::Write);
        }
    }
}

impl Connection for Relay {
    fn descriptors(&self) -> &Descriptors {
        &self.fds
    }

    fn descriptors_mut(&mut self) -> &mut Descriptors {
        &mut self.fds
    }

    fn probe_write(&mut self, _cx: &mut Context<'_>) -> Readiness {
        if !self.buffer.is_empty() {
            return match self.fds.write {
                Some(_) => Readiness::Ready,
                None => Readiness::Terminate,
            };
        }

        if self.fds.read.is_none() {
            // Input is over and everything has been flushed.
            self.end_of_output();
            return Readiness::Terminate;
        }

        Readiness::Idle
    }

    fn probe_read(&mut self, _cx: &mut Context<'_>) -> Readiness {
        if self.fds.read.is_some() && self.buffer.len() < self.capacity {
            Readiness::Ready
        } else {
            Readiness::Idle
        }
    }

    fn write(&mut self, _cx: &mut Context<'_>) -> Outcome {
        let Some(fd) = self.fds.write else {
            return Outcome::Continue;
        };

        match sys_write(fd, &self.buffer) {
            Ok(n) => {
                self.buffer.drain(..n);
                trace!(fd, written = n, pending = self.buffer.len(), "relay wrote");
                Outcome::Continue
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Outcome::Continue
            }
            Err(err) => {
                debug!(fd, error = %err, "relay write failed");
                Outcome::Terminate
            }
        }
    }

    fn read(&mut self, _cx: &mut Context<'_>) -> Outcome {
        let Some(fd) = self.fds.read else {
            return Outcome::Continue;
        };

        let start = self.buffer.len();
        self.buffer.resize(self.capacity, 0);

        let result = sys_read(fd, &mut self.buffer[start..]);
        let read = *result.as_ref().unwrap_or(&0);
        self.buffer.truncate(start + read);

        match result {
            Ok(0) => {
                trace!(fd, "relay reached end of input");
                self.end_of_input();
                Outcome::Continue
            }
            Ok(n) => {
                trace!(fd, read = n, pending = self.buffer.len(), "relay read");
                Outcome::Continue
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Outcome::Continue
            }
            Err(err) => {
                debug!(fd, error = %err, "relay read failed");
                Outcome::Terminate
            }
        }
    }
}

impl Drop for Relay {
    /// Closes the descriptors.
    fn drop(&mut self) {
        self.fds.close();
    }
}
