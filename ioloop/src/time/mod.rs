//! Wait intervals.
//!
//! The loop measures its waits in microseconds, with a distinct
//! "wait forever" value used when no idle limit is configured.

mod interval;

pub use interval::Interval;
