//! # ioloop
//!
//! **ioloop** is a single-threaded connection loop for small network daemons
//! (telnet-style servers, pipe bridges, line-oriented services) that need to
//! drive many byte-stream peers through one blocking, level-triggered wait.
//!
//! It is not an async runtime. There are no tasks, no wakers and no threads:
//! every peer is a [`Connection`] owned by a [`Registry`], and the
//! [`EventLoop`] repeatedly
//!
//! - asks each connection whether it wants to write and whether it has room
//!   to read,
//! - blocks once in the [`Poller`](poller::Poller) on the resulting
//!   descriptor sets,
//! - calls `write` and then `read` on every connection whose descriptors came
//!   back ready.
//!
//! Any callback may end its own connection by returning `Terminate`; the loop
//! drops it and never touches it again in that pass.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ioloop::net::{Listener, Relay};
//! use ioloop::{EventLoopBuilder, Exit};
//! use std::time::Duration;
//!
//! let mut event_loop = EventLoopBuilder::new()
//!     .max_idle(Duration::from_secs(30))
//!     .exit_on_timeout(true)
//!     .build();
//!
//! let listener = Listener::bind("127.0.0.1:9000", |stream, _peer| {
//!     Ok(Box::new(Relay::duplex(stream)?))
//! })?;
//! event_loop.register(listener);
//!
//! match event_loop.run() {
//!     Exit::Timeout => println!("idle for too long"),
//!     Exit::NoConnections => println!("nothing left to serve"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`net`]: Ready-made connections (TCP listener, byte relay)
//! - [`poller`]: The multiplexed wait primitive and its `poll(2)`/`select(2)` backends

mod connection;
mod error;
mod event_loop;
mod registry;
mod time;
mod utils;

pub mod net;
pub mod poller;

pub use connection::{Connection, Descriptors, Outcome, Readiness};
pub use error::{Error, Result};
pub use event_loop::{Context, EventLoop, EventLoopBuilder, Exit};
pub use registry::{ConnId, Registry};
pub use time::Interval;
