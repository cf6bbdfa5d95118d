/// A decimal digit, 0 through 9.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Digit(u8);

impl Digit {
    pub fn new(value: u8) -> Option<Self> {
        if value <= 9 {
            Some(Digit(value))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Alarm threshold in seconds, always within `MIN..=MAX`.
///
/// Zero would alarm the moment a session starts, so it is raised to 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Threshold(u8);

impl Threshold {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 99;

    pub fn clamped(value: u16) -> Self {
        if value < u16::from(Self::MIN) {
            Threshold(Self::MIN)
        } else if value > u16::from(Self::MAX) {
            Threshold(Self::MAX)
        } else {
            Threshold(value as u8)
        }
    }

    pub fn from_digits(tens: Digit, ones: Digit) -> Self {
        Self::clamped(u16::from(tens.get()) * 10 + u16::from(ones.get()))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Where an entry cycle is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// No digit yet
    Idle,
    /// The tens digit was entered
    Partial { tens: Digit },
    /// Both digits were entered and the threshold committed
    Complete { tens: Digit, ones: Digit },
}

/// Result of a key press on [`KeypadEntry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryTransition {
    FirstDigit(Digit),
    Committed(Threshold),
    /// The cycle is already complete
    Ignored,
}

/// Two digit threshold entry.
///
/// ```text
///          digit            digit
///  {Idle} ───────> {Partial} ───────> {Complete} ──┐ digit
///    ^                                    ^        │ (ignored)
///    │ reset                              └────────┘
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeypadEntry {
    state: EntryState,
}

impl Default for KeypadEntry {
    fn default() -> Self {
        KeypadEntry {
            state: EntryState::Idle,
        }
    }
}

impl KeypadEntry {
    pub fn on_key(&mut self, digit: Digit) -> EntryTransition {
        match self.state {
            EntryState::Idle => {
                self.state = EntryState::Partial { tens: digit };
                EntryTransition::FirstDigit(digit)
            }
            EntryState::Partial { tens } => {
                self.state = EntryState::Complete { tens, ones: digit };
                EntryTransition::Committed(Threshold::from_digits(tens, digit))
            }
            EntryState::Complete { .. } => EntryTransition::Ignored,
        }
    }

    /// Begin a new entry cycle.
    pub fn reset(&mut self) {
        self.state = EntryState::Idle;
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn digits_entered(&self) -> u8 {
        match self.state {
            EntryState::Idle => 0,
            EntryState::Partial { .. } => 1,
            EntryState::Complete { .. } => 2,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.digits_entered() == 2
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn d(value: u8) -> Digit {
        Digit::new(value).unwrap()
    }

    #[test]
    fn digit_range() {
        assert_eq!(Digit::new(9).map(Digit::get), Some(9));
        assert_eq!(Digit::new(10), None);
    }

    #[test]
    fn threshold_clamp() {
        assert_eq!(Threshold::from_digits(d(0), d(0)).get(), 1);
        assert_eq!(Threshold::from_digits(d(0), d(1)).get(), 1);
        assert_eq!(Threshold::from_digits(d(4), d(5)).get(), 45);
        assert_eq!(Threshold::from_digits(d(9), d(9)).get(), 99);
        assert_eq!(Threshold::clamped(100).get(), 99);
        assert_eq!(Threshold::clamped(u16::MAX).get(), 99);
    }

    #[test]
    fn two_digits_commit() {
        let mut entry = KeypadEntry::default();
        assert_eq!(entry.digits_entered(), 0);
        assert_eq!(entry.on_key(d(4)), EntryTransition::FirstDigit(d(4)));
        assert_eq!(entry.state(), EntryState::Partial { tens: d(4) });
        assert_eq!(
            entry.on_key(d(2)),
            EntryTransition::Committed(Threshold::clamped(42))
        );
        assert!(entry.is_complete());
    }

    #[test]
    fn complete_ignores_keys() {
        let mut entry = KeypadEntry::default();
        entry.on_key(d(1));
        entry.on_key(d(5));
        let before = entry;
        for v in 0..=9 {
            assert_eq!(entry.on_key(d(v)), EntryTransition::Ignored);
            assert_eq!(entry, before);
        }
    }

    #[test]
    fn reset_allows_a_new_cycle() {
        let mut entry = KeypadEntry::default();
        entry.on_key(d(1));
        entry.on_key(d(5));
        entry.reset();
        assert_eq!(entry.state(), EntryState::Idle);
        entry.on_key(d(0));
        assert_eq!(
            entry.on_key(d(0)),
            EntryTransition::Committed(Threshold::clamped(1))
        );
    }
}
