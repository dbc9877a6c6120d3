//! Ready-made connections.
//!
//! - [`Listener`] accepts TCP clients and registers a connection for each.
//! - [`Relay`] copies bytes from its read descriptor to its write
//!   descriptor: an echo session over a socket, or a bridge between two
//!   pipes.

mod listener;
mod relay;

pub use listener::Listener;
pub use relay::Relay;
