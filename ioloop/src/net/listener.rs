use crate::connection::{Connection, Descriptors, Outcome, Readiness};
use crate::error::{Error, Result};
use crate::event_loop::Context;

use std::io::ErrorKind;
use std::mem::ManuallyDrop;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::fd::AsRawFd;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A listening TCP socket.
///
/// Every accepted client is handed to the factory, and the connection it
/// returns is registered with the loop. The listener itself never writes.
///
/// It terminates once its descriptor has been disabled, for example by
/// [`Context::close_fd_everywhere`].
pub struct Listener<F> {
    /// The socket; its descriptor is owned by `fds` and closed through it.
    socket: ManuallyDrop<TcpListener>,

    fds: Descriptors,

    /// Builds the connection for an accepted client.
    factory: F,

    /// Clients accepted so far.
    accepted: u64,
}

impl<F> Listener<F>
where
    F: FnMut(TcpStream, SocketAddr) -> Result<Box<dyn Connection>>,
{
    /// Binds a listener to the given address.
    ///
    /// The address must be a valid socket address string, such as
    /// `"127.0.0.1:8080"` or `"[::1]:8080"`.
    pub fn bind(address: &str, factory: F) -> Result<Self> {
        let address = SocketAddr::from_str(address).map_err(|_| Error::InvalidAddress {
            address: address.to_owned(),
        })?;

        let socket = TcpListener::bind(address)?;
        socket.set_nonblocking(true)?;

        Ok(Self::from_std(socket, factory))
    }

    /// Wraps an already bound, non-blocking listener.
    pub fn from_std(socket: TcpListener, factory: F) -> Self {
        let fds = Descriptors::read_only(socket.as_raw_fd());

        Self {
            socket: ManuallyDrop::new(socket),
            fds,
            factory,
            accepted: 0,
        }
    }

    /// Returns the local socket address of this listener.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Number of clients accepted so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
}

impl<F> Connection for Listener<F>
where
    F: FnMut(TcpStream, SocketAddr) -> Result<Box<dyn Connection>>,
{
    fn descriptors(&self) -> &Descriptors {
        &self.fds
    }

    fn descriptors_mut(&mut self) -> &mut Descriptors {
        &mut self.fds
    }

    fn probe_write(&mut self, _cx: &mut Context<'_>) -> Readiness {
        Readiness::Idle
    }

    fn probe_read(&mut self, _cx: &mut Context<'_>) -> Readiness {
        match self.fds.read {
            Some(_) => Readiness::Ready,
            None => Readiness::Terminate,
        }
    }

    fn write(&mut self, _cx: &mut Context<'_>) -> Outcome {
        Outcome::Continue
    }

    /// Accepts every pending client.
    fn read(&mut self, cx: &mut Context<'_>) -> Outcome {
        loop {
            let (stream, peer) = match self.socket.accept() {
                Ok(accepted) => accepted,
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::Interrupted | ErrorKind::ConnectionAborted
                    ) =>
                {
                    continue;
                }
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    break;
                }
            };

            match (self.factory)(stream, peer) {
                Ok(connection) => {
                    self.accepted += 1;
                    let id = cx.register_boxed(connection);
                    info!(%peer, %id, "accepted connection");
                }
                Err(err) => debug!(%peer, error = %err, "rejected connection"),
            }
        }

        Outcome::Continue
    }
}

impl<F> Drop for Listener<F> {
    /// Closes the listening socket.
    fn drop(&mut self) {
        self.fds.close();
    }
}
