//! The multiplexed wait primitive.
//!
//! The event loop blocks in exactly one place: [`Poller::wait`]. A poller
//! receives the read and write interest built by the probes, blocks for at
//! most the given [`Interval`], and narrows the sets down to the descriptors
//! that are ready. Readiness is level-triggered: a descriptor that stays
//! readable is reported again on the next wait.
//!
//! Two backends are provided:
//! - [`PollPoller`] uses `poll(2)` and has no descriptor ceiling. It is the
//!   [`DefaultPoller`].
//! - [`SelectPoller`] uses `select(2)` and rejects descriptors at or above
//!   `FD_SETSIZE`.

mod common;
mod poll;
mod select;

pub(crate) mod unix;

pub(crate) use unix as platform;

pub use common::{FdSet, FdSets};
pub use poll::PollPoller;
pub use select::SelectPoller;

use crate::error::Result;
use crate::time::Interval;

/// Backend used by [`EventLoopBuilder::build`](crate::EventLoopBuilder::build).
pub type DefaultPoller = PollPoller;

/// A blocking, level-triggered readiness wait.
pub trait Poller {
    /// Waits until a descriptor in `sets` is ready or `timeout` expires.
    ///
    /// On entry `sets` holds the descriptors of interest. When the call
    /// returns `Ok(n)` with `n > 0`, `sets` holds only the ready ones.
    /// After `Ok(0)` (timeout) or an error the contents are unspecified.
    ///
    /// Empty sets are valid and turn the call into a plain sleep.
    fn wait(&mut self, sets: &mut FdSets, timeout: Interval) -> Result<usize>;
}

impl<P: Poller + ?Sized> Poller for Box<P> {
    fn wait(&mut self, sets: &mut FdSets, timeout: Interval) -> Result<usize> {
        (**self).wait(sets, timeout)
    }
}
