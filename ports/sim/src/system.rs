use std::cell::{Cell, RefCell};

use heapless::Deque;
use usart_core::{Clock, System};

use crate::usart::SimUsart;

const MAX_ARRIVALS: usize = 16;

/// Simulated clock, idle hook and keyboard-interrupt sink.
///
/// Time only moves when the test moves it, when [`System::idle`] runs, or
/// by a fixed step on every clock read. A system wired to a [`SimUsart`]
/// can also put characters on its wire once their arrival time is reached
/// during idle.
pub struct SimSystem<'a> {
    now: Cell<u32>,
    tick_per_read: u32,
    idle_step: u32,
    idles: Cell<usize>,
    keyboard_interrupts: Cell<usize>,
    wire: Option<&'a SimUsart>,
    arrivals: RefCell<Deque<(u32, u16), MAX_ARRIVALS>>,
}

impl SimSystem<'static> {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock starting at `ms`, e.g. just below the wrap point
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now: Cell::new(ms),
            tick_per_read: 0,
            idle_step: 1,
            idles: Cell::new(0),
            keyboard_interrupts: Cell::new(0),
            wire: None,
            arrivals: RefCell::new(Deque::new()),
        }
    }
}

impl Default for SimSystem<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SimSystem<'a> {
    /// Deliver scheduled characters to `hw` while idling
    pub fn wired<'b>(self, hw: &'b SimUsart) -> SimSystem<'b> {
        SimSystem {
            now: self.now,
            tick_per_read: self.tick_per_read,
            idle_step: self.idle_step,
            idles: self.idles,
            keyboard_interrupts: self.keyboard_interrupts,
            wire: Some(hw),
            arrivals: self.arrivals,
        }
    }

    /// Advance the clock by `ms` on every read
    pub fn with_tick_per_read(mut self, ms: u32) -> Self {
        self.tick_per_read = ms;
        self
    }

    /// Advance the clock by `ms` on every idle call
    pub fn with_idle_step(mut self, ms: u32) -> Self {
        self.idle_step = ms;
        self
    }

    /// Current time without advancing it
    pub fn now(&self) -> u32 {
        self.now.get()
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    pub fn idles(&self) -> usize {
        self.idles.get()
    }

    pub fn keyboard_interrupts(&self) -> usize {
        self.keyboard_interrupts.get()
    }

    /// Put `value` on the wire `after_ms` from now, at the first idle call
    /// that sees the time reached
    pub fn schedule_rx(&self, after_ms: u32, value: u16) {
        let due = self.now.get().wrapping_add(after_ms);
        if self.arrivals.borrow_mut().push_back((due, value)).is_err() {
            panic!("more than {} scheduled arrivals", MAX_ARRIVALS);
        }
    }

    fn deliver_due(&self) {
        let Some(hw) = self.wire else {
            return;
        };
        let now = self.now.get();
        let mut arrivals = self.arrivals.borrow_mut();
        while let Some(&(due, value)) = arrivals.front() {
            if (now.wrapping_sub(due) as i32) < 0 {
                break;
            }
            arrivals.pop_front();
            hw.feed(value);
        }
    }
}

impl Clock for SimSystem<'_> {
    fn millis(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.tick_per_read));
        now
    }
}

impl System for SimSystem<'_> {
    fn idle(&self) {
        self.idles.set(self.idles.get() + 1);
        self.advance(self.idle_step);
        self.deliver_due();
    }

    fn keyboard_interrupt(&self) {
        self.keyboard_interrupts.set(self.keyboard_interrupts.get() + 1);
    }
}
