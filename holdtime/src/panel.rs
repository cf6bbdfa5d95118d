//! The memory mapped front panel: switches, LEDs, the two seven segment digits
//! and the keypad latch.
use crate::config::PanelConfig;
use crate::display::{Digits, Led, LedSink, SEGMENTS};

/// Word access to the external panel bus.
pub trait Bus {
    fn read(&mut self, address: u16) -> u16;
    fn write(&mut self, address: u16, word: u16);
}

/// The front panel behind a [`Bus`].
///
/// The LED port is write only, so the lit LEDs are kept in a shadow and the
/// whole port is written on every change. The shadow is in logical terms
/// (1 is lit); wiring polarity is applied on the way out.
pub struct Panel<B> {
    bus: B,
    config: PanelConfig,
    lit: u8,
}

impl<B: Bus> Panel<B> {
    pub fn new(bus: B, config: PanelConfig) -> Self {
        Panel { bus, config, lit: 0 }
    }

    /// All LEDs off and both digits showing 0.
    pub fn reset(&mut self) {
        self.lit = 0;
        self.write_leds();
        self.show_seconds(Digits::new(0));
    }

    /// Raw, undebounced level of the timing switch. `true` is closed.
    pub fn switch_level(&mut self) -> bool {
        self.bus.read(self.config.switches) & self.config.switch_mask != 0
    }

    /// The code latched by the keypad encoder for the last key press.
    pub fn scan_code(&mut self) -> u8 {
        self.bus.read(self.config.keypad) as u8
    }

    pub fn show_seconds(&mut self, digits: Digits) {
        let low = segments(digits.ones);
        let high = segments(digits.tens);
        self.bus.write(self.config.segment_low, low);
        self.bus.write(self.config.segment_high, high);
    }

    pub fn is_lit(&self, led: Led) -> bool {
        self.lit & self.led_mask(led) != 0
    }

    pub fn release(self) -> B {
        self.bus
    }

    fn led_mask(&self, led: Led) -> u8 {
        match led {
            Led::Status => self.config.status_led,
            Led::Alarm => self.config.alarm_led,
        }
    }

    fn write_leds(&mut self) {
        let port = if self.config.active_low {
            !self.lit
        } else {
            self.lit
        };
        self.bus.write(self.config.leds, u16::from(port));
    }
}

impl<B: Bus> LedSink for Panel<B> {
    fn set_led(&mut self, led: Led, on: bool) {
        let mask = self.led_mask(led);
        if on {
            self.lit |= mask;
        } else {
            self.lit &= !mask;
        }
        self.write_leds();
    }
}

fn segments(digit: u8) -> u16 {
    // a blank digit rather than a panic if a caller ever passes garbage
    SEGMENTS.get(usize::from(digit)).copied().unwrap_or(0x7f).into()
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        switches: u16,
        keypad: u16,
        writes: Vec<(u16, u16)>,
    }

    impl Bus for &mut Recorder {
        fn read(&mut self, address: u16) -> u16 {
            match address {
                0x4000 => self.switches,
                0x4008 => self.keypad,
                _ => panic!("read of unmapped address {:#x}", address),
            }
        }

        fn write(&mut self, address: u16, word: u16) {
            self.writes.push((address, word));
        }
    }

    #[test]
    fn reads_switch_and_keypad() {
        let mut bus = Recorder::default();
        bus.switches = 0x7f;
        bus.keypad = 0x42;
        {
            let mut panel = Panel::new(&mut bus, PanelConfig::DEFAULT);
            assert!(!panel.switch_level());
            assert_eq!(panel.scan_code(), 0x42);
        }
        bus.switches = 0x80;
        let mut panel = Panel::new(&mut bus, PanelConfig::DEFAULT);
        assert!(panel.switch_level());
    }

    #[test]
    fn seconds_to_segments() {
        let mut bus = Recorder::default();
        let mut panel = Panel::new(&mut bus, PanelConfig::DEFAULT);
        panel.show_seconds(Digits::new(47));
        panel.release();
        assert_eq!(bus.writes, [(0x4004, 0x78), (0x4006, 0x19)]);
    }

    #[test]
    fn active_low_leds() {
        let mut bus = Recorder::default();
        let mut panel = Panel::new(&mut bus, PanelConfig::DEFAULT);
        panel.set_led(Led::Status, true);
        panel.set_led(Led::Alarm, true);
        panel.set_led(Led::Status, false);
        assert!(panel.is_lit(Led::Alarm));
        assert!(!panel.is_lit(Led::Status));
        panel.release();
        assert_eq!(bus.writes, [(0x4002, 0x7f), (0x4002, 0x7e), (0x4002, 0xfe)]);
    }

    #[test]
    fn active_high_leds() {
        let config = PanelConfig {
            active_low: false,
            ..PanelConfig::DEFAULT
        };
        let mut bus = Recorder::default();
        let mut panel = Panel::new(&mut bus, config);
        panel.set_led(Led::Alarm, true);
        panel.reset();
        panel.release();
        assert_eq!(
            bus.writes,
            [(0x4002, 0x01), (0x4002, 0x00), (0x4004, 0x40), (0x4006, 0x40)]
        );
    }
}
