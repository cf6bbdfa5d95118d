//! Flags handed from interrupt context to the main loop.
use core::sync::atomic::{AtomicU8, Ordering};

/// Things the main loop has to react to, in the order it handles them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    SwitchChanged = 1 << 0,
    SecondElapsed = 1 << 1,
    BlinkDue = 1 << 2,
    KeyEntered = 1 << 3,
}

impl Event {
    /// Every event, highest priority first.
    pub const ALL: [Event; 4] = [
        Event::SwitchChanged,
        Event::SecondElapsed,
        Event::BlinkDue,
        Event::KeyEntered,
    ];

    fn mask(self) -> u8 {
        self as u8
    }
}

/// A set of sticky event flags, one bit per [`Event`].
///
/// Raising a flag that is already up does nothing: events of one kind
/// coalesce until the consumer takes them. Both sides are lock free, so an
/// interrupt handler can raise while the main loop is anywhere.
pub struct EventFlags {
    bits: AtomicU8,
}

impl EventFlags {
    pub const fn new() -> Self {
        EventFlags {
            bits: AtomicU8::new(0),
        }
    }

    pub fn raise(&self, event: Event) {
        self.bits.fetch_or(event.mask(), Ordering::Release);
    }

    /// Clear all flags, returning those that were up.
    pub fn take(&self) -> Pending {
        Pending(self.bits.swap(0, Ordering::AcqRel))
    }

    pub fn is_pending(&self) -> bool {
        self.bits.load(Ordering::Acquire) != 0
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        EventFlags::new()
    }
}

/// Flags taken from [`EventFlags`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pending(u8);

impl Pending {
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, event: Event) -> bool {
        self.0 & event.mask() != 0
    }

    /// The pending events, highest priority first.
    pub fn iter(self) -> impl Iterator<Item = Event> {
        Event::ALL.iter().copied().filter(move |e| self.contains(*e))
    }
}
