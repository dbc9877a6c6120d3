//! Example: TCP echo server driven by the ioloop event loop.
//!
//! Run with `RUST_LOG=ioloop=trace` to watch every pass.

use ioloop::net::{Listener, Relay};
use ioloop::{EventLoopBuilder, Exit};

use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> ioloop::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Give up after a minute without any activity.
    let mut event_loop = EventLoopBuilder::new()
        .max_idle(Duration::from_secs(60))
        .exit_on_timeout(true)
        .build();

    let listener = Listener::bind("127.0.0.1:9000", |stream, _peer| {
        Ok(Box::new(Relay::duplex(stream)?))
    })?;
    println!("Echo server listening on {}", listener.local_addr()?);

    event_loop.register(listener);

    match event_loop.run() {
        Exit::Timeout => println!("Idle for {}, shutting down", event_loop.max_idle()),
        Exit::NoConnections => println!("Listener closed"),
    }

    Ok(())
}
