//! The event loop.
//!
//! This module drives every registered connection through repeated passes:
//! probe, wait, dispatch. It is single-threaded and cooperative; the only
//! point where the thread blocks is the poller's wait.

mod builder;
mod context;
mod core;

pub use builder::EventLoopBuilder;
pub use context::Context;
pub use self::core::{EventLoop, Exit};
