//! The connection contract.
//!
//! A [`Connection`] is one peer's byte stream as seen by the event loop:
//! a pair of [`Descriptors`] plus four callbacks. Two of them are probes
//! that perform no I/O and tell the loop which descriptors to wait on; the
//! other two perform the I/O once the wait reports readiness.
//!
//! # Ordering
//!
//! Within a pass the loop always calls `probe_write` before `probe_read`,
//! and `write` before `read`. A `Terminate` from any callback ends the
//! connection for good: the remaining callbacks of that pass are skipped
//! and the connection is dropped.
//!
//! # Half-close
//!
//! The loop gives EOF no meaning. The usual idiom for a connection that
//! must keep flushing output after its peer stopped sending:
//!
//! 1. `read` sees EOF, disables the read descriptor and returns `Continue`;
//!    from then on `probe_read` reports [`Readiness::Idle`].
//! 2. `write` keeps draining the buffered output.
//! 3. Once flushed, the write side is shut down (`shutdown(SHUT_WR)` for
//!    sockets, `close` for pipes) and `probe_write` reports
//!    [`Readiness::Terminate`], or [`Readiness::Idle`] if the descriptor has
//!    to stay open.
//!
//! A `write` that waits for "more input" must keep in mind that more input
//! may never come once the read side is gone.

mod descriptors;

pub use descriptors::Descriptors;

use crate::event_loop::Context;

/// Result of a readiness probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// Poll the matching descriptor.
    ///
    /// The descriptor must be enabled when this is returned; reporting
    /// `Ready` on a disabled side is a bug and panics the loop.
    Ready,

    /// Nothing to do on this side right now.
    Idle,

    /// The connection is finished and must be dropped.
    Terminate,
}

impl Readiness {
    /// Returns `true` for [`Readiness::Ready`].
    pub const fn is_ready(self) -> bool {
        matches!(self, Readiness::Ready)
    }

    /// Returns `true` for [`Readiness::Terminate`].
    pub const fn is_terminate(self) -> bool {
        matches!(self, Readiness::Terminate)
    }
}

/// Result of a `read` or `write` callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Keep the connection. A read of zero bytes is still `Continue`.
    Continue,

    /// The connection is finished and must be dropped.
    Terminate,
}

impl Outcome {
    /// Returns `true` for [`Outcome::Terminate`].
    pub const fn is_terminate(self) -> bool {
        matches!(self, Outcome::Terminate)
    }
}

/// A peer driven by the event loop.
///
/// Implementations own their descriptors and are responsible for closing
/// them, usually from `Drop` via [`Descriptors::close`]. The loop only
/// reads them to build its wait sets and to re-check, right before each
/// `write`/`read`, that the side is still enabled.
///
/// Every callback receives a [`Context`] through which it can register new
/// connections, unregister existing ones (including itself), close a shared
/// descriptor everywhere, or shorten the next wait.
pub trait Connection {
    /// The descriptors the loop may wait on.
    fn descriptors(&self) -> &Descriptors;

    /// Mutable access, used by the loop to disable descriptors closed
    /// through [`Context::close_fd_everywhere`].
    fn descriptors_mut(&mut self) -> &mut Descriptors;

    /// Does the connection have output to produce?
    ///
    /// May return [`Readiness::Terminate`] when the write side is known to
    /// be gone, even if output is pending.
    fn probe_write(&mut self, cx: &mut Context<'_>) -> Readiness;

    /// Is there buffer space to read into?
    ///
    /// Return [`Readiness::Idle`] when the buffer is full or the read side
    /// hit EOF but output still has to drain.
    fn probe_read(&mut self, cx: &mut Context<'_>) -> Readiness;

    /// Write buffered output. Called only when the wait flagged the write
    /// descriptor and it is still enabled.
    fn write(&mut self, cx: &mut Context<'_>) -> Outcome;

    /// Read into the buffer. Called only when the wait flagged the read
    /// descriptor, it is still enabled and `write` did not terminate.
    fn read(&mut self, cx: &mut Context<'_>) -> Outcome;
}
