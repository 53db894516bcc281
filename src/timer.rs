//! Hardware timer (TIMA/TMA/TAC at $FF05-$FF07)
//!
//! The timer never polls. Every TIMA tick and the eventual overflow are
//! events on the scheduler: enabling the timer through TAC queues them,
//! the handlers re-queue themselves while the enable bit holds, and
//! disabling deletes the whole event group.
//!
//! # References
//! - Pan Docs, "Timer and Divider Registers"

use log::info;

use crate::bits;
use crate::scheduler::{Event, EventGroup, EventKind, Scheduler};

/// CPU cycles per TIMA tick, indexed by the clock-select bits of TAC.
const TIMA_PERIODS: [u64; 4] = [1024, 256, 16, 8];

/// TAC register layout.
mod tac {
    /// Clock-select field.
    pub const CLOCK_MASK: u8 = 0x03;
    /// Enable bit index.
    pub const ENABLED: u8 = 2;
    /// Bits the CPU can actually write; the rest read back as set.
    pub const WRITE_MASK: u8 = 0x07;
}

/// Timer register state.
#[derive(Debug, Clone)]
pub struct Timer {
    /// Counter.
    pub tima: u8,
    /// Reload value copied into TIMA on overflow.
    pub tma: u8,
    /// Control: bits 0-1 select the clock, bit 2 enables.
    pub tac: u8,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            tima: 0,
            tma: 0,
            tac: 0,
        }
    }

    /// Load the post-boot register state.
    pub fn reset(&mut self) {
        self.tima = 0x00;
        self.tma = 0x00;
        self.tac = 0xF8;
    }

    /// Whether bit 2 of TAC enables the timer.
    #[inline]
    pub fn enabled(&self) -> bool {
        bits::bit_is_set(self.tac, tac::ENABLED)
    }

    /// CPU cycles per TIMA tick under the current clock select.
    #[inline]
    pub fn period(&self) -> u64 {
        TIMA_PERIODS[(self.tac & tac::CLOCK_MASK) as usize]
    }

    /// Cycles from `TIMA == value` until the counter wraps at 0x100.
    #[inline]
    fn cycles_until_overflow(&self, value: u8) -> u64 {
        (0x100 - u64::from(value)) * self.period()
    }

    // ========== Register writes ==========

    /// TIMA write. While the timer runs, an overflow event is pending;
    /// its deadline is recomputed from the new counter value.
    pub fn write_tima(&mut self, value: u8, scheduler: &mut Scheduler) {
        if self.enabled() && scheduler.remove(EventKind::TimaOverflow).is_some() {
            scheduler.insert(Event {
                timestamp: scheduler.now() + self.cycles_until_overflow(value),
                kind: EventKind::TimaOverflow,
                group: EventGroup::Timer,
            });
        }
        self.tima = value;
    }

    /// TMA write.
    pub fn write_tma(&mut self, value: u8) {
        self.tma = value;
    }

    /// TAC write. An enable edge schedules the first increment one period
    /// out and the overflow at the counter's wrap; a disable edge cancels
    /// every event the timer owns.
    pub fn write_tac(&mut self, value: u8, scheduler: &mut Scheduler) {
        let was_enabled = self.enabled();
        let now_enabled = bits::bit_is_set(value, tac::ENABLED);

        self.tac = (self.tac & !tac::WRITE_MASK) | (value & tac::WRITE_MASK);

        if !was_enabled && now_enabled {
            info!("Timer became enabled.");
            scheduler.insert(Event {
                timestamp: scheduler.now() + self.period(),
                kind: EventKind::TimaIncrement,
                group: EventGroup::Timer,
            });
            scheduler.insert(Event {
                timestamp: scheduler.now() + self.cycles_until_overflow(self.tima),
                kind: EventKind::TimaOverflow,
                group: EventGroup::Timer,
            });
        } else if was_enabled && !now_enabled {
            info!("Timer became disabled.");
            scheduler.delete_group(EventGroup::Timer);
        }
    }

    // ========== Event handlers ==========

    /// TIMA increment event: advance the counter and keep the cadence.
    /// The wrap back to TMA is left to the overflow event, which shares
    /// the same deadline as the wrapping tick and fires right after it.
    pub fn tima_increment(&mut self, deadline: u64, scheduler: &mut Scheduler) {
        self.tima = self.tima.wrapping_add(1);

        if self.enabled() {
            scheduler.insert(Event {
                timestamp: deadline + self.period(),
                kind: EventKind::TimaIncrement,
                group: EventGroup::Timer,
            });
        }
    }

    /// TIMA overflow event: reload the counter from TMA and request the
    /// timer interrupt. Returns true when the interrupt line should be
    /// raised; the bus owns the interrupt-flag register.
    pub fn tima_overflow(&mut self, deadline: u64, scheduler: &mut Scheduler) -> bool {
        self.tima = self.tma;

        if self.enabled() {
            scheduler.insert(Event {
                timestamp: deadline + self.cycles_until_overflow(self.tma),
                kind: EventKind::TimaOverflow,
                group: EventGroup::Timer,
            });
        }
        true
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
