//! Millisecond time base and idle hook for Cortex-M targets

use core::sync::atomic::{AtomicU32, Ordering};

use usart_core::{Clock, System};

/// Millisecond counter advanced from the SysTick handler.
///
/// The counter is only ever written by [`tick`](Self::tick), so a plain
/// load and store is enough and no atomic read-modify-write is needed.
pub struct SysTickSystem {
    millis: AtomicU32,
    keyboard_interrupt: Option<fn()>,
}

impl SysTickSystem {
    pub const fn new() -> Self {
        Self {
            millis: AtomicU32::new(0),
            keyboard_interrupt: None,
        }
    }

    /// Call `handler` when a console receives its interrupt character
    pub const fn with_keyboard_interrupt(mut self, handler: fn()) -> Self {
        self.keyboard_interrupt = Some(handler);
        self
    }

    /// Advance by one millisecond; call from the SysTick exception only
    pub fn tick(&self) {
        let now = self.millis.load(Ordering::Relaxed);
        self.millis.store(now.wrapping_add(1), Ordering::Release);
    }

    /// Program SysTick for a 1 kHz interrupt from the core clock
    #[cfg(feature = "cortex-m")]
    pub fn start(syst: &mut cortex_m::peripheral::SYST, core_hz: u32) {
        use cortex_m::peripheral::syst::SystClkSource;

        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(systick_reload(core_hz));
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
    }
}

/// SysTick reload value for a 1 kHz tick; core clocks under 1 kHz give 0.
///
/// Any `u32` clock fits the 24-bit reload register once divided by 1000.
pub const fn systick_reload(core_hz: u32) -> u32 {
    (core_hz / 1000).saturating_sub(1)
}

impl Default for SysTickSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SysTickSystem {
    fn millis(&self) -> u32 {
        self.millis.load(Ordering::Acquire)
    }
}

impl System for SysTickSystem {
    fn idle(&self) {
        // Any interrupt, SysTick included, ends the wait
        #[cfg(feature = "cortex-m")]
        cortex_m::asm::wfi();
        #[cfg(not(feature = "cortex-m"))]
        core::hint::spin_loop();
    }

    fn keyboard_interrupt(&self) {
        if let Some(handler) = self.keyboard_interrupt {
            handler();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    static SIGNALS: AtomicUsize = AtomicUsize::new(0);

    fn on_signal() {
        SIGNALS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_tick_advances_and_wraps() {
        let sys = SysTickSystem::new();
        sys.tick();
        sys.tick();
        assert_eq!(sys.millis(), 2);

        sys.millis.store(u32::MAX, Ordering::Relaxed);
        sys.tick();
        assert_eq!(sys.millis(), 0);
    }

    #[test]
    fn test_reload_for_core_clock() {
        assert_eq!(systick_reload(16_000_000), 15_999);
        assert_eq!(systick_reload(168_000_000), 167_999);
        assert_eq!(systick_reload(1_000), 0);
        assert_eq!(systick_reload(999), 0);
        assert_eq!(systick_reload(0), 0);
        assert_eq!(systick_reload(u32::MAX), 4_294_966);
    }

    #[test]
    fn test_keyboard_interrupt_handler() {
        let sys = SysTickSystem::new().with_keyboard_interrupt(on_signal);
        sys.keyboard_interrupt();
        assert_eq!(SIGNALS.load(Ordering::SeqCst), 1);

        // No handler installed: nothing to call
        SysTickSystem::new().keyboard_interrupt();
        assert_eq!(SIGNALS.load(Ordering::SeqCst), 1);
    }
}
