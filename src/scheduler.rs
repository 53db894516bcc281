//! Event scheduler
//!
//! A bounded min-heap of timestamped hardware events keyed by absolute
//! deadline in CPU cycles. Time only moves when the CPU grants cycles:
//! the bus walks the heap and fires every event whose deadline has been
//! crossed, in deadline order, before letting `now` catch up to the grant.
//!
//! Events carry no callbacks; they are plain `Copy` values tagged with an
//! [`EventKind`], and whoever drains the heap dispatches on the tag. This
//! keeps the heap trivially copyable and the firing order easy to test.

use log::info;

/// The maximum number of events the heap can hold.
pub const MAX_EVENTS: usize = 10;

/// Hardware events that can be scheduled.
///
/// Declaration order doubles as the tie-break for events sharing a
/// deadline: a TIMA increment landing on the overflow deadline must run
/// first so the overflow's reload wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventKind {
    /// TIMA advances by one.
    #[default]
    TimaIncrement,
    /// TIMA wrapped: reload from TMA and request the timer interrupt.
    TimaOverflow,
}

/// Deletion groups. Disabling a device removes every event it owns in one
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventGroup {
    #[default]
    Timer,
}

/// A scheduled event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Event {
    /// Absolute deadline, in CPU cycles.
    pub timestamp: u64,
    pub kind: EventKind,
    pub group: EventGroup,
}

/// Time-ordered event queue.
///
/// Array-based binary min-heap: parent at `(i - 1) / 2`, children at
/// `2i + 1` and `2i + 2`. The heap never allocates; running out of the
/// fixed slots means a device is leaking events and is a fatal assertion.
#[derive(Debug, Clone)]
pub struct Scheduler {
    events: [Event; MAX_EVENTS],
    heap_size: usize,
    now: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            events: [Event::default(); MAX_EVENTS],
            heap_size: 0,
            now: 0,
        }
    }

    /// Clear the queue and rewind time to zero.
    pub fn reset(&mut self) {
        self.events = [Event::default(); MAX_EVENTS];
        self.heap_size = 0;
        self.now = 0;
        info!("Resetting scheduler.");
    }

    /// Current virtual time in CPU cycles. Monotonically non-decreasing.
    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of queued events.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap_size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap_size == 0
    }

    /// Queue an event.
    ///
    /// # Panics
    ///
    /// When the heap is at capacity.
    pub fn insert(&mut self, event: Event) {
        assert!(
            self.heap_size < MAX_EVENTS - 1,
            "scheduler heap overflow inserting {:?}",
            event.kind
        );

        self.events[self.heap_size] = event;
        self.sift_up(self.heap_size);
        self.heap_size += 1;
    }

    /// First queued event of the given kind, if any.
    pub fn find(&self, kind: EventKind) -> Option<&Event> {
        self.events[..self.heap_size].iter().find(|e| e.kind == kind)
    }

    /// Remove and return the first queued event of the given kind.
    pub fn remove(&mut self, kind: EventKind) -> Option<Event> {
        let index = self.events[..self.heap_size]
            .iter()
            .position(|e| e.kind == kind)?;
        Some(self.remove_at(index))
    }

    /// Remove every event belonging to `group`.
    pub fn delete_group(&mut self, group: EventGroup) {
        while let Some(index) = self.events[..self.heap_size]
            .iter()
            .position(|e| e.group == group)
        {
            self.remove_at(index);
        }
    }

    /// Pop the earliest event if its deadline is at or before `deadline`.
    ///
    /// Advances `now` to the event's timestamp, but never backwards: an
    /// event queued late (deadline already behind `now`) fires where time
    /// already stands.
    pub fn pop_due(&mut self, deadline: u64) -> Option<Event> {
        if self.heap_size == 0 || self.events[0].timestamp > deadline {
            return None;
        }

        let event = self.remove_at(0);
        self.now = self.now.max(event.timestamp);
        Some(event)
    }

    /// Move time forward to `deadline` once every due event has fired.
    pub fn advance_to(&mut self, deadline: u64) {
        self.now = self.now.max(deadline);
    }

    // ========== Heap plumbing ==========

    /// Ordering predicate for the sift loops: `(timestamp, kind)`
    /// lexicographically, so deadline ties resolve in `EventKind` order.
    #[inline]
    fn before(&self, a: usize, b: usize) -> bool {
        let (ea, eb) = (&self.events[a], &self.events[b]);
        (ea.timestamp, ea.kind as u8) < (eb.timestamp, eb.kind as u8)
    }

    /// Remove the entry at `index`: swap in the last entry, shrink, and
    /// restore the heap property in whichever direction it broke.
    fn remove_at(&mut self, index: usize) -> Event {
        debug_assert!(index < self.heap_size);

        let removed = self.events[index];
        self.heap_size -= 1;
        if index < self.heap_size {
            self.events[index] = self.events[self.heap_size];
            self.sift_down(index);
            self.sift_up(index);
        }
        removed
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.before(index, parent) {
                break;
            }
            self.events.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = index * 2 + 1;
            let right = index * 2 + 2;
            let mut smallest = index;

            if left < self.heap_size && self.before(left, smallest) {
                smallest = left;
            }
            if right < self.heap_size && self.before(right, smallest) {
                smallest = right;
            }
            if smallest == index {
                break;
            }

            self.events.swap(index, smallest);
            index = smallest;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
