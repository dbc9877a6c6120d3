mod common;

use common::{MockConn, log};
use ioloop::net::{Listener, Relay};
use ioloop::{Connection, EventLoopBuilder, Exit};

use std::cell::Cell;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::fd::IntoRawFd;
use std::os::unix::net::UnixStream;
use std::thread;
use std::time::Duration;

fn event_loop() -> ioloop::EventLoop<ioloop::poller::PollPoller> {
    EventLoopBuilder::new()
        .max_idle(Duration::from_secs(2))
        .exit_on_timeout(true)
        .build()
}

#[test]
fn test_relay_echoes_and_half_closes() {
    let (mut client, server) = UnixStream::pair().expect("Failed to create socket pair");
    client.write_all(b"hello").expect("Failed to write to socket");
    client
        .shutdown(Shutdown::Write)
        .expect("Failed to shut down client");

    let mut event_loop = event_loop();
    event_loop.register(Relay::duplex(server).expect("Failed to create relay"));

    assert_eq!(event_loop.run(), Exit::NoConnections);

    let mut echoed = Vec::new();
    client
        .read_to_end(&mut echoed)
        .expect("Failed to read from socket");
    assert_eq!(echoed, b"hello");
}

#[test]
fn test_relay_with_small_buffer_echoes_everything() {
    let (mut client, server) = UnixStream::pair().expect("Failed to create socket pair");
    client
        .write_all(b"0123456789abcdef")
        .expect("Failed to write to socket");
    client
        .shutdown(Shutdown::Write)
        .expect("Failed to shut down client");

    let mut event_loop = event_loop();
    event_loop.register(
        Relay::duplex(server)
            .expect("Failed to create relay")
            .with_capacity(3),
    );

    assert_eq!(event_loop.run(), Exit::NoConnections);

    let mut echoed = Vec::new();
    client
        .read_to_end(&mut echoed)
        .expect("Failed to read from socket");
    assert_eq!(echoed, b"0123456789abcdef");
}

#[test]
fn test_relay_bridges_two_streams() {
    let (mut source, source_end) = UnixStream::pair().expect("Failed to create socket pair");
    let (mut sink, sink_end) = UnixStream::pair().expect("Failed to create socket pair");

    source.write_all(b"bridged").expect("Failed to write to socket");
    drop(source);

    let relay = Relay::new(source_end.into_raw_fd(), sink_end.into_raw_fd())
        .expect("Failed to create relay");
    assert!(!relay.descriptors().is_duplex());

    let mut event_loop = event_loop();
    event_loop.register(relay);

    assert_eq!(event_loop.run(), Exit::NoConnections);

    let mut received = Vec::new();
    sink.read_to_end(&mut received)
        .expect("Failed to read from socket");
    assert_eq!(received, b"bridged");
}

#[test]
fn test_listener_serves_tcp_clients() {
    let mut event_loop = EventLoopBuilder::new()
        .max_idle(Duration::from_millis(500))
        .exit_on_timeout(true)
        .build();

    let listener = Listener::bind("127.0.0.1:0", |stream, _peer| {
        Ok(Box::new(Relay::duplex(stream)?))
    })
    .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get local address");
    event_loop.register(listener);

    let handle = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).expect("Failed to connect to listener");
        stream.write_all(b"ping").expect("Failed to write to stream");
        stream
            .shutdown(Shutdown::Write)
            .expect("Failed to shut down stream");

        let mut reply = Vec::new();
        stream
            .read_to_end(&mut reply)
            .expect("Failed to read from stream");
        reply
    });

    // The listener stays registered, so only the idle limit ends the loop.
    assert_eq!(event_loop.run(), Exit::Timeout);
    assert_eq!(handle.join().expect("Thread panicked"), b"ping");
    assert_eq!(event_loop.registry().len(), 1);
}

#[test]
fn test_listener_rejects_invalid_address() {
    let result = Listener::bind("not an address", |stream, _peer| {
        Ok(Box::new(Relay::duplex(stream)?))
    });

    assert!(matches!(
        result,
        Err(ioloop::Error::InvalidAddress { address }) if address == "not an address"
    ));
}

#[test]
fn test_listener_terminates_once_its_descriptor_is_closed() {
    let listener = Listener::bind("127.0.0.1:0", |stream, _peer| {
        Ok(Box::new(Relay::duplex(stream)?))
    })
    .expect("Failed to bind listener");
    let fd = listener
        .descriptors()
        .read
        .expect("listener should have a read descriptor");

    let log = log();
    let mut event_loop = event_loop();
    event_loop.register(listener);

    let closed = Cell::new(false);
    event_loop.register(MockConn::new("closer", &log).passes(0).on_probe(move |_, cx| {
        if !closed.replace(true) {
            cx.close_fd_everywhere(fd);
        }
    }));

    assert_eq!(event_loop.run(), Exit::NoConnections);
    assert_eq!(event_loop.last_wait(), None);
}
