//! Error types for ioloop.
//!
//! Only setup paths and the wait primitive are fallible. Connection
//! callbacks never return an [`Error`]: they report `Terminate` and clean
//! up after themselves, and the loop retries every failed wait.
//!
//! A connection that claims readiness without the matching descriptor is a
//! bug in that connection and panics instead of producing an error.

use std::io::{Error as IoError, ErrorKind};
use std::os::fd::RawFd;
use std::result::Result as StdResult;

use thiserror::Error;

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A system call failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A descriptor cannot be represented in an `fd_set`.
    ///
    /// Returned by the `select(2)` backend, which is bounded by `FD_SETSIZE`.
    #[error("descriptor {fd} exceeds the select(2) limit of {limit}")]
    DescriptorLimit {
        /// The offending descriptor.
        fd: RawFd,
        /// Exclusive upper bound accepted by `select(2)`.
        limit: usize,
    },

    /// A listener address could not be parsed.
    #[error("invalid socket address: {address}")]
    InvalidAddress {
        /// The address as given by the caller.
        address: String,
    },
}

impl Error {
    /// Returns `true` if the error is a signal interruption (`EINTR`).
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Io(err) if err.kind() == ErrorKind::Interrupted)
    }

    /// Returns `true` if the error only means "try again later".
    pub fn is_would_block(&self) -> bool {
        matches!(self, Error::Io(err) if err.kind() == ErrorKind::WouldBlock)
    }
}
