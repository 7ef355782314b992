//! Time source for outgoing message timestamps.

use crate::proto::UnixTimestamp;

/// Supplies the current time when messages are signed.
pub trait Clock {
    /// The current Unix time.
    fn now(&self) -> UnixTimestamp;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixTimestamp {
        UnixTimestamp::now()
    }
}

/// A clock that always reads the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub UnixTimestamp);

impl Clock for FixedClock {
    fn now(&self) -> UnixTimestamp {
        self.0
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> UnixTimestamp {
        (**self).now()
    }
}
