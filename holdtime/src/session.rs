//! The session controller: glues the state machines together.
//!
//! Interrupt handlers feed [`Core::on_tick`] and [`Core::on_key`]. Those only
//! update bounded state and raise [`EventFlags`]. The main loop calls
//! [`Core::drain`], which handles every raised flag in priority order and
//! returns what the outputs need to show as one coalesced [`Updates`].
//!
//! ```text
//!            rising                 elapsed >= threshold
//!   {Idle} ─────────> {Timing} ─────────────────────────> {Alarmed}
//!     ^                  │                                    │
//!     │     falling      v              falling               │
//!     └──────────────────┴────────────────────────────────────┘
//! ```
//!
//! Threshold entry runs beside this, in any state.
use shared_types::{TraceKind, TraceRecord};

use crate::alarm::{AlarmScheduler, AlarmTransition, BlinkDue};
use crate::config::{Config, ConfigError};
use crate::debounce::{Debouncer, Edge};
use crate::display::{Digits, DisplaySink, Led, LedSink, Render, StatusMessage};
use crate::entry::{EntryState, EntryTransition, KeypadEntry, Threshold};
use crate::event::{Event, EventFlags};
use crate::keypad;
use crate::timing::{SecondElapsed, TimingSession};
use crate::trace::TraceLog;

/// Top level state of the timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Timing,
    /// Timing, and over the threshold
    Alarmed,
}

/// Output changes produced by one [`Core::drain`]. Each category holds only
/// the latest value requested during the drain.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Updates {
    pub seconds: Option<Digits>,
    pub status: Option<StatusMessage>,
    pub status_led: Option<bool>,
    pub alarm_led: Option<bool>,
}

impl Updates {
    pub fn is_empty(&self) -> bool {
        *self == Updates::default()
    }

    /// Push the updates to the outputs. LEDs go first since they cannot
    /// fail. A display error does not stop the other display from being
    /// updated; the first error is returned.
    pub fn apply<S: DisplaySink + LedSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        if let Some(on) = self.status_led {
            sink.set_led(Led::Status, on);
        }
        if let Some(on) = self.alarm_led {
            sink.set_led(Led::Alarm, on);
        }
        let seconds = match self.seconds {
            Some(digits) => sink.render(Render::SecondsDisplay(digits)),
            None => Ok(()),
        };
        let status = match self.status {
            Some(message) => sink.render(Render::StatusMessage(message)),
            None => Ok(()),
        };
        seconds.and(status)
    }
}

/// Debounced edges latched by the tick until the main loop handles them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
struct SwitchEdges {
    rising: bool,
    falling: bool,
}

impl SwitchEdges {
    fn latch(&mut self, edge: Edge) {
        match edge {
            Edge::Rising => self.rising = true,
            Edge::Falling => self.falling = true,
        }
    }

    fn contains(&self, edge: Edge) -> bool {
        match edge {
            Edge::Rising => self.rising,
            Edge::Falling => self.falling,
        }
    }
}

/// All of the timer's state, owned in one place.
pub struct Core {
    config: Config,
    debouncer: Debouncer,
    /// Edges seen since the last [`Core::drain`]
    edges: SwitchEdges,
    session: TimingSession,
    alarm: AlarmScheduler,
    entry: KeypadEntry,
    /// Ticks since boot
    now: u32,
    log: TraceLog,
}

impl Core {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let timebase = config.timebase()?;
        Ok(Core {
            config,
            debouncer: Debouncer::new(false, timebase.debounce_ticks),
            edges: SwitchEdges::default(),
            session: TimingSession::new(timebase.ticks_per_second),
            alarm: AlarmScheduler::new(
                Threshold::clamped(config.default_threshold.into()),
                timebase.blink_ticks,
            ),
            entry: KeypadEntry::default(),
            now: 0,
            log: TraceLog::new(),
        })
    }

    /// What the outputs show at power on.
    pub fn boot(&mut self) -> Updates {
        self.trace(TraceKind::Boot, 0);
        Updates {
            seconds: Some(Digits::new(0)),
            status: Some(StatusMessage::Splash),
            status_led: Some(false),
            alarm_led: Some(false),
        }
    }

    /// Periodic tick, with the raw level of the timing switch.
    pub fn on_tick(&mut self, raw: bool, flags: &EventFlags) {
        self.now = self.now.wrapping_add(1);
        if let Some(edge) = self.debouncer.sample(raw) {
            self.trace(TraceKind::SwitchEdge, (edge == Edge::Rising) as u8);
            self.edges.latch(edge);
            flags.raise(Event::SwitchChanged);
        }
        if let Some(SecondElapsed(elapsed)) = self.session.tick() {
            self.trace(TraceKind::Second, elapsed);
            flags.raise(Event::SecondElapsed);
        }
        if let Some(BlinkDue(_)) = self.alarm.blink_tick() {
            flags.raise(Event::BlinkDue);
        }
    }

    /// A key was pressed and the keypad latched `scan`.
    pub fn on_key(&mut self, scan: u8, flags: &EventFlags) {
        if scan == 0 {
            // strobe without a key
            return;
        }
        let digit = match keypad::decode(scan) {
            Some(digit) => digit,
            None => {
                self.trace(TraceKind::KeyRejected, scan);
                return;
            }
        };
        match self.entry.on_key(digit) {
            EntryTransition::FirstDigit(d) => {
                self.trace(TraceKind::KeyDigit, d.get());
                flags.raise(Event::KeyEntered);
            }
            EntryTransition::Committed(threshold) => {
                self.trace(TraceKind::KeyDigit, digit.get());
                self.alarm.set_threshold(threshold);
                self.trace(TraceKind::ThresholdSet, threshold.get());
                flags.raise(Event::KeyEntered);
            }
            EntryTransition::Ignored => self.trace(TraceKind::KeyIgnored, digit.get()),
        }
    }

    /// Handle every pending flag. `None` if nothing needs to change.
    pub fn drain(&mut self, flags: &EventFlags) -> Option<Updates> {
        let pending = flags.take();
        if pending.is_empty() {
            return None;
        }
        let mut updates = Updates::default();
        for event in pending.iter() {
            match event {
                Event::SwitchChanged => self.switch_changed(&mut updates),
                Event::SecondElapsed => self.second_elapsed(&mut updates),
                Event::BlinkDue => self.blink_due(&mut updates),
                Event::KeyEntered => self.key_entered(&mut updates),
            }
        }
        if updates.is_empty() {
            None
        } else {
            Some(updates)
        }
    }

    fn switch_changed(&mut self, updates: &mut Updates) {
        let edges = core::mem::take(&mut self.edges);
        if !(edges.rising || edges.falling) {
            return;
        }
        let level = self.debouncer.stable();
        updates.status_led = Some(level);
        // Both edges passed since the last drain: the current level says
        // which one came last
        let order = if level {
            [Edge::Falling, Edge::Rising]
        } else {
            [Edge::Rising, Edge::Falling]
        };
        for &edge in order.iter().filter(|&&e| edges.contains(e)) {
            match edge {
                Edge::Rising => self.start(updates),
                Edge::Falling => self.stop(updates),
            }
        }
    }

    fn start(&mut self, updates: &mut Updates) {
        if self.session.is_active() {
            return;
        }
        if self.config.require_threshold && !self.entry.is_complete() {
            self.trace(TraceKind::StartRefused, 0);
            updates.status = Some(StatusMessage::Prompt);
            return;
        }
        self.session.start();
        self.disarm(updates);
        self.trace(TraceKind::SessionStart, 0);
        updates.seconds = Some(Digits::new(0));
        updates.status = Some(StatusMessage::Timing {
            elapsed: 0,
            threshold: self.alarm.threshold(),
        });
    }

    fn stop(&mut self, updates: &mut Updates) {
        if self.session.is_active() {
            self.session.stop();
            self.disarm(updates);
            let elapsed = self.session.elapsed();
            self.trace(TraceKind::SessionStop, elapsed);
            updates.seconds = Some(Digits::new(elapsed));
            updates.status = Some(StatusMessage::Elapsed { elapsed });
            self.entry.reset();
            self.trace(TraceKind::EntryReset, 0);
        }
    }

    fn second_elapsed(&mut self, updates: &mut Updates) {
        if !self.session.is_active() {
            // the session stopped after this second was counted
            return;
        }
        let elapsed = self.session.elapsed();
        updates.seconds = Some(Digits::new(elapsed));
        self.evaluate_alarm(updates);
        updates.status = Some(self.timing_message());
    }

    fn blink_due(&mut self, updates: &mut Updates) {
        if self.alarm.is_armed() {
            updates.alarm_led = Some(self.alarm.blink_phase());
        }
    }

    fn key_entered(&mut self, updates: &mut Updates) {
        match self.entry.state() {
            EntryState::Idle => return,
            EntryState::Partial { tens } => {
                updates.status = Some(StatusMessage::FirstDigit(tens));
            }
            EntryState::Complete { .. } => {
                updates.status = Some(StatusMessage::ThresholdSet(self.alarm.threshold()));
            }
        }
        if self.session.is_active() {
            self.evaluate_alarm(updates);
        }
    }

    fn evaluate_alarm(&mut self, updates: &mut Updates) {
        let elapsed = self.session.elapsed();
        match self.alarm.evaluate(elapsed, self.session.is_active()) {
            AlarmTransition::Armed => {
                self.trace(TraceKind::Armed, elapsed);
                updates.alarm_led = Some(true);
            }
            AlarmTransition::Disarmed => {
                self.trace(TraceKind::Disarmed, elapsed);
                updates.alarm_led = Some(false);
            }
            AlarmTransition::Unchanged => {}
        }
    }

    fn disarm(&mut self, updates: &mut Updates) {
        if self.alarm.disarm() == AlarmTransition::Disarmed {
            self.trace(TraceKind::Disarmed, self.session.elapsed());
        }
        updates.alarm_led = Some(false);
    }

    fn timing_message(&self) -> StatusMessage {
        let elapsed = self.session.elapsed();
        let threshold = self.alarm.threshold();
        if self.alarm.is_armed() {
            StatusMessage::Alarmed { elapsed, threshold }
        } else {
            StatusMessage::Timing { elapsed, threshold }
        }
    }

    /// Append a record to the trace log, stamped with the current state.
    pub fn trace(&mut self, kind: TraceKind, arg: u8) {
        self.log.record(TraceRecord {
            timestamp: self.now,
            kind,
            arg,
            elapsed: self.session.elapsed(),
            threshold: self.alarm.threshold().get(),
        });
    }

    pub fn session_state(&self) -> SessionState {
        match (self.session.is_active(), self.alarm.is_armed()) {
            (false, _) => SessionState::Idle,
            (true, false) => SessionState::Timing,
            (true, true) => SessionState::Alarmed,
        }
    }

    pub fn elapsed(&self) -> u8 {
        self.session.elapsed()
    }

    pub fn threshold(&self) -> Threshold {
        self.alarm.threshold()
    }

    pub fn entry_state(&self) -> EntryState {
        self.entry.state()
    }

    pub fn now(&self) -> u32 {
        self.now
    }

    pub fn log(&self) -> &TraceLog {
        &self.log
    }
}
