//! Compile time configuration of the timer and of the front panel.
use core::fmt;

use crate::entry::Threshold;

/// Timing policy, expressed in milliseconds so it stays correct for any tick
/// rate. Convert it to tick counts with [`Config::timebase`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rate of the periodic tick, in Hz.
    pub tick_hz: u32,
    /// How long the switch must read the same level before it is accepted.
    pub debounce_ms: u32,
    /// Half period of the alarm blink.
    pub blink_ms: u32,
    /// Threshold in effect before any entry on the keypad.
    pub default_threshold: u8,
    /// Refuse to start a session until a threshold has been entered.
    pub require_threshold: bool,
}

impl Config {
    pub const DEFAULT: Config = Config {
        tick_hz: 1_000,
        debounce_ms: 20,
        blink_ms: 250,
        default_threshold: 10,
        require_threshold: false,
    };

    /// Convert the millisecond policy into tick counts.
    pub fn timebase(&self) -> Result<Timebase, ConfigError> {
        if self.tick_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        let debounce_ticks = ms_to_ticks(self.debounce_ms, self.tick_hz);
        if debounce_ticks < 2 {
            return Err(ConfigError::DebounceTooShort);
        }
        if debounce_ticks > u64::from(u16::MAX) {
            return Err(ConfigError::DebounceTooLong);
        }
        let blink_ticks = ms_to_ticks(self.blink_ms, self.tick_hz);
        if blink_ticks == 0 {
            return Err(ConfigError::ZeroBlinkPeriod);
        }
        if blink_ticks > u64::from(u32::MAX) {
            return Err(ConfigError::BlinkTooLong);
        }
        if !(Threshold::MIN..=Threshold::MAX).contains(&self.default_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.default_threshold));
        }
        Ok(Timebase {
            debounce_ticks: debounce_ticks as u16,
            ticks_per_second: self.tick_hz,
            blink_ticks: blink_ticks as u32,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULT
    }
}

/// Rounds up, so a period is never shorter than asked for.
fn ms_to_ticks(ms: u32, tick_hz: u32) -> u64 {
    (u64::from(ms) * u64::from(tick_hz) + 999) / 1000
}

/// [`Config`] converted to ticks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Timebase {
    pub debounce_ticks: u16,
    pub ticks_per_second: u32,
    pub blink_ticks: u32,
}

/// Why a [`Config`] was refused.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTickRate,
    /// The debounce window must span at least 2 ticks
    DebounceTooShort,
    /// The debounce window must fit the 16 bit counter
    DebounceTooLong,
    ZeroBlinkPeriod,
    BlinkTooLong,
    ThresholdOutOfRange(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTickRate => f.write_str("tick rate is zero"),
            ConfigError::DebounceTooShort => f.write_str("debounce window is under 2 ticks"),
            ConfigError::DebounceTooLong => f.write_str("debounce window overflows its counter"),
            ConfigError::ZeroBlinkPeriod => f.write_str("blink period is zero"),
            ConfigError::BlinkTooLong => f.write_str("blink period overflows its counter"),
            ConfigError::ThresholdOutOfRange(t) => {
                write!(f, "default threshold {} is outside 1..=99", t)
            }
        }
    }
}

/// Where the front panel peripherals live on the bus, and how they are wired.
///
/// Board revisions differ only in these values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub switches: u16,
    pub leds: u16,
    /// Ones digit of the seven segment display
    pub segment_low: u16,
    /// Tens digit of the seven segment display
    pub segment_high: u16,
    pub keypad: u16,
    /// Bit of the switch port that reads the timing switch
    pub switch_mask: u16,
    /// Bit of the LED port for the LED mirroring the switch
    pub status_led: u8,
    /// Bit of the LED port for the blinking alarm LED
    pub alarm_led: u8,
    /// LEDs light when their bit is written as 0
    pub active_low: bool,
}

impl PanelConfig {
    pub const DEFAULT: PanelConfig = PanelConfig {
        switches: 0x4000,
        leds: 0x4002,
        segment_low: 0x4004,
        segment_high: 0x4006,
        keypad: 0x4008,
        switch_mask: 0x80,
        status_led: 0x80,
        alarm_led: 0x01,
        active_low: true,
    };
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig::DEFAULT
    }
}
