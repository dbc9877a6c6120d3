use std::fmt;
use std::time::Duration;

/// How long a single wait may block.
///
/// `Interval` has microsecond granularity: anything finer is truncated
/// when the interval is built. [`Interval::Infinite`] blocks until a
/// descriptor becomes ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interval {
    /// Block until a descriptor is ready.
    Infinite,

    /// Block for at most the given duration.
    Finite(Duration),
}

impl Interval {
    /// Creates a finite interval of `micros` microseconds.
    pub const fn from_micros(micros: u64) -> Self {
        Interval::Finite(Duration::from_micros(micros))
    }

    /// Creates a finite interval, truncating `duration` to whole microseconds.
    pub fn from_duration(duration: Duration) -> Self {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        Self::from_micros(micros)
    }

    /// Returns `true` for [`Interval::Infinite`].
    pub const fn is_infinite(self) -> bool {
        matches!(self, Interval::Infinite)
    }

    /// Returns the finite duration, or `None` when infinite.
    pub const fn as_duration(self) -> Option<Duration> {
        match self {
            Interval::Infinite => None,
            Interval::Finite(duration) => Some(duration),
        }
    }

    /// Returns the interval in microseconds, or `None` when infinite.
    pub fn as_micros(self) -> Option<u64> {
        self.as_duration()
            .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
    }

    /// Converts to a `poll(2)` timeout in milliseconds.
    ///
    /// Partial milliseconds round up so a short wait never turns into a
    /// busy loop. Infinite maps to `-1`.
    pub(crate) fn as_poll_millis(self) -> libc::c_int {
        match self.as_micros() {
            None => -1,
            Some(micros) => {
                let millis = micros.div_ceil(1_000);
                libc::c_int::try_from(millis).unwrap_or(libc::c_int::MAX)
            }
        }
    }
}

impl From<Duration> for Interval {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}

impl From<Option<Duration>> for Interval {
    /// `None` means infinite.
    fn from(duration: Option<Duration>) -> Self {
        duration.map_or(Interval::Infinite, Self::from_duration)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Infinite => f.write_str("infinite"),
            Interval::Finite(duration) => write!(f, "{}us", duration.as_micros()),
        }
    }
}
