//! Example: copy stdin to stdout through a single relay connection.

use ioloop::net::Relay;
use ioloop::{EventLoopBuilder, Exit};

use tracing_subscriber::EnvFilter;

fn main() -> ioloop::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut event_loop = EventLoopBuilder::new().build();
    event_loop.register(Relay::new(0, 1)?);

    let exit = event_loop.run();
    assert_eq!(exit, Exit::NoConnections);

    Ok(())
}
