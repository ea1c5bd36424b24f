use std::time::{Duration, Instant};

/// Monotonic time source used to time probes.
///
/// `now` returns the time since an arbitrary fixed origin; only differences
/// between two readings are meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock implementation backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Whole milliseconds between two readings, truncated.
/// A reading that goes backwards yields 0.
pub fn elapsed_ms(start: Duration, end: Duration) -> u64 {
    end.saturating_sub(start).as_millis() as u64
}
