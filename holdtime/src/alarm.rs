use crate::entry::Threshold;

/// Change of the alarm state caused by [`AlarmScheduler::evaluate`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlarmTransition {
    Armed,
    Disarmed,
    Unchanged,
}

/// The blink phase flipped. Carries the new phase: `true` is lit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlinkDue(pub bool);

/// Compares elapsed time against the threshold, and paces the alarm blink
/// while it is over.
///
/// ```text
///              active && elapsed >= threshold
///  {Disarmed} ───────────────────────────────> {Armed, lit}
///      ^                                           │ blink period
///      │  !active || elapsed < threshold           v
///      └────────────────────────────────────── {Armed, dark} ...
/// ```
///
/// The comparison is inclusive, so a session that reaches the threshold
/// exactly alarms on that second.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlarmScheduler {
    threshold: Threshold,
    armed: bool,
    blink_phase: bool,
    blink_counter: u32,
    blink_period: u32,
}

impl AlarmScheduler {
    pub fn new(threshold: Threshold, blink_period: u32) -> Self {
        AlarmScheduler {
            threshold,
            armed: false,
            blink_phase: false,
            blink_counter: 0,
            blink_period,
        }
    }

    /// Re-evaluate after the elapsed time, the session or the threshold
    /// changed.
    pub fn evaluate(&mut self, elapsed: u8, session_active: bool) -> AlarmTransition {
        let over = session_active && elapsed >= self.threshold.get();
        match (self.armed, over) {
            (false, true) => {
                self.armed = true;
                self.blink_phase = true;
                self.blink_counter = 0;
                AlarmTransition::Armed
            }
            (true, false) => self.disarm(),
            _ => AlarmTransition::Unchanged,
        }
    }

    /// Force the alarm off, as on session start and stop.
    pub fn disarm(&mut self) -> AlarmTransition {
        let was_armed = self.armed;
        self.armed = false;
        self.blink_phase = false;
        self.blink_counter = 0;
        if was_armed {
            AlarmTransition::Disarmed
        } else {
            AlarmTransition::Unchanged
        }
    }

    /// Advance the blink by one tick.
    pub fn blink_tick(&mut self) -> Option<BlinkDue> {
        if !self.armed {
            return None;
        }
        self.blink_counter += 1;
        if self.blink_counter < self.blink_period {
            return None;
        }
        self.blink_counter = 0;
        self.blink_phase = !self.blink_phase;
        Some(BlinkDue(self.blink_phase))
    }

    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn blink_phase(&self) -> bool {
        self.blink_phase
    }
}
