/// Largest value the two digit display can show. Elapsed time stops here.
pub const MAX_SECONDS: u8 = 99;

/// A whole second has elapsed. Carries the new elapsed count.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SecondElapsed(pub u8);

/// Turns ticks into whole seconds while the switch is held.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimingSession {
    active: bool,
    elapsed: u8,
    accum: u32,
    ticks_per_second: u32,
}

impl TimingSession {
    pub fn new(ticks_per_second: u32) -> Self {
        TimingSession {
            active: false,
            elapsed: 0,
            accum: 0,
            ticks_per_second,
        }
    }

    /// Advance by one tick. Does nothing while no session is open.
    pub fn tick(&mut self) -> Option<SecondElapsed> {
        if !self.active {
            return None;
        }
        self.accum += 1;
        if self.accum < self.ticks_per_second {
            return None;
        }
        self.accum = 0;
        if self.elapsed < MAX_SECONDS {
            self.elapsed += 1;
        }
        Some(SecondElapsed(self.elapsed))
    }

    /// Open a new session from zero.
    pub fn start(&mut self) {
        self.active = true;
        self.elapsed = 0;
        self.accum = 0;
    }

    /// Close the session. The elapsed count is kept for display.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> u8 {
        self.elapsed
    }
}
