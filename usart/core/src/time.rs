//! Millisecond time base and the bounded wait primitive

use core::fmt;

/// Free-running millisecond counter.
///
/// The counter is allowed to wrap at `u32::MAX`; every comparison made by
/// this crate goes through wrapping subtraction.
pub trait Clock {
    /// Current counter value in milliseconds
    fn millis(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn millis(&self) -> u32 {
        (**self).millis()
    }
}

/// Start point and budget of one bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: u32,
    timeout_ms: u32,
}

impl Deadline {
    /// Start a deadline `timeout_ms` from now
    pub fn start<C: Clock + ?Sized>(clock: &C, timeout_ms: u32) -> Self {
        Self {
            start: clock.millis(),
            timeout_ms,
        }
    }

    /// Build a deadline from a recorded start time
    pub const fn from_start(start: u32, timeout_ms: u32) -> Self {
        Self { start, timeout_ms }
    }

    /// Milliseconds elapsed at `now`, wraparound-safe
    pub const fn elapsed_ms(&self, now: u32) -> u32 {
        now.wrapping_sub(self.start)
    }

    /// Whether the budget is used up at `now`
    pub const fn is_expired(&self, now: u32) -> bool {
        self.elapsed_ms(now) >= self.timeout_ms
    }

    /// The budget this deadline was started with
    pub const fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms from {}", self.timeout_ms, self.start)
    }
}

/// Poll `ready` until it holds or `timeout_ms` elapses.
///
/// Returns `true` as soon as `ready` does, `false` on timeout. The predicate
/// is always evaluated at least once, so a timeout of 0 tests once and never
/// blocks. `on_idle` runs between polls; receive waits pass the system idle
/// hook here, transmit waits pass a plain spin.
pub fn wait_until<C, P, Y>(clock: &C, timeout_ms: u32, mut ready: P, mut on_idle: Y) -> bool
where
    C: Clock + ?Sized,
    P: FnMut() -> bool,
    Y: FnMut(),
{
    let deadline = Deadline::start(clock, timeout_ms);
    loop {
        if ready() {
            return true;
        }
        if deadline.is_expired(clock.millis()) {
            return false;
        }
        on_idle();
    }
}

/// [`wait_until`] without an idle hook.
///
/// Used where the awaited condition raises no interrupt, so sleeping until
/// the next event could overshoot a short deadline.
pub fn spin_until<C, P>(clock: &C, timeout_ms: u32, ready: P) -> bool
where
    C: Clock + ?Sized,
    P: FnMut() -> bool,
{
    wait_until(clock, timeout_ms, ready, core::hint::spin_loop)
}
