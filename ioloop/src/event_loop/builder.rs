use super::core::EventLoop;
use crate::poller::{DefaultPoller, Poller};
use crate::time::Interval;

use std::time::Duration;

/// Builder for configuring and creating an event loop.
///
/// # Examples
///
/// ```rust,ignore
/// let event_loop = EventLoopBuilder::new()
///     .max_idle(Duration::from_secs(30))
///     .exit_on_timeout(true)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct EventLoopBuilder {
    /// Longest wait when no callback asks for a shorter one.
    max_idle: Interval,

    /// Stop at the first wait that reports nothing ready.
    exit_on_timeout: bool,
}

impl EventLoopBuilder {
    /// Creates a new `EventLoopBuilder`.
    ///
    /// By default waits are unbounded and timeouts never stop the loop.
    pub fn new() -> Self {
        Self {
            max_idle: Interval::Infinite,
            exit_on_timeout: false,
        }
    }

    /// Sets the longest time a single wait may block.
    ///
    /// A zero duration means no limit.
    pub fn max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = if max_idle.is_zero() {
            Interval::Infinite
        } else {
            Interval::from_duration(max_idle)
        };
        self
    }

    /// Makes [`EventLoop::run`] return [`Exit::Timeout`](super::Exit::Timeout)
    /// when a wait expires with nothing ready.
    pub fn exit_on_timeout(mut self, exit: bool) -> Self {
        self.exit_on_timeout = exit;
        self
    }

    /// Builds the loop on the [`DefaultPoller`].
    pub fn build(self) -> EventLoop<DefaultPoller> {
        self.build_with(DefaultPoller::new())
    }

    /// Builds the loop on the given poller.
    pub fn build_with<P: Poller>(self, poller: P) -> EventLoop<P> {
        EventLoop::new(poller, self.max_idle, self.exit_on_timeout)
    }
}

impl Default for EventLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
