use std::cell::Cell;
use std::time::Instant;

/// Milliseconds since an arbitrary origin. May wrap.
pub type Millis = u32;

/// Time from `earlier` to `now`, tolerating one wrap of the counter.
pub fn elapsed_since(now: Millis, earlier: Millis) -> Millis {
    now.wrapping_sub(earlier)
}

pub trait Clock {
    fn now_ms(&self) -> Millis;
}

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
    fn now_ms(&self) -> Millis {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as Millis
    }
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}
