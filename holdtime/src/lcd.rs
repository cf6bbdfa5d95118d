//! Driver for the 2x16 ST7032 character display on I2C.
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::Write;

use crate::display::{Line, StatusMessage, LINE_LEN};

/// 7 bit bus address of the display.
pub const ADDRESS: u8 = 0x3E;

/// Control byte: the rest of the transfer is commands.
const COMMANDS: u8 = 0x00;
/// Control byte: one command follows, then another control byte.
const COMMAND_CONTINUES: u8 = 0x80;
/// Control byte: the rest of the transfer is display data.
const DATA: u8 = 0x40;

/// Power on sequence: extended instruction set, internal oscillator,
/// contrast, power/icon/contrast high bits, follower, display on with no
/// cursor, clear.
const INIT: [u8; 8] = [COMMANDS, 0x39, 0x14, 0x74, 0x54, 0x6F, 0x0C, 0x01];

/// Set DDRAM address to the start of each row.
const ROW_ADDRESS: [u8; 2] = [0x80, 0xC0];

pub struct Lcd<I> {
    i2c: I,
}

impl<I: Write> Lcd<I> {
    pub fn new(i2c: I) -> Self {
        Lcd { i2c }
    }

    /// Run the power on sequence. The display needs a few ms to settle after
    /// power up and again after the clear.
    pub fn init<D: DelayMs<u8>>(&mut self, delay: &mut D) -> Result<(), I::Error> {
        delay.delay_ms(40);
        self.i2c.write(ADDRESS, &INIT)?;
        delay.delay_ms(2);
        Ok(())
    }

    /// Overwrite one row, `0` or `1`, in a single transfer.
    pub fn write_line(&mut self, row: usize, line: &Line) -> Result<(), I::Error> {
        let mut buf = [0; 3 + LINE_LEN];
        buf[0] = COMMAND_CONTINUES;
        buf[1] = ROW_ADDRESS[row & 1];
        buf[2] = DATA;
        buf[3..].copy_from_slice(line);
        self.i2c.write(ADDRESS, &buf)
    }

    pub fn show(&mut self, message: &StatusMessage) -> Result<(), I::Error> {
        let [first, second] = message.lines();
        self.write_line(0, &first)?;
        self.write_line(1, &second)
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        transfers: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    #[derive(Debug, PartialEq)]
    struct Nack;

    impl Write for Recorder {
        type Error = Nack;

        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Nack> {
            if self.fail {
                return Err(Nack);
            }
            self.transfers.push((address, bytes.to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Delay {
        total_ms: u32,
    }

    impl DelayMs<u8> for Delay {
        fn delay_ms(&mut self, ms: u8) {
            self.total_ms += u32::from(ms);
        }
    }

    #[test]
    fn init_sequence() {
        let mut lcd = Lcd::new(Recorder::default());
        let mut delay = Delay::default();
        lcd.init(&mut delay).unwrap();
        let bus = lcd.release();
        assert_eq!(
            bus.transfers,
            [(0x3E, std::vec![0x00, 0x39, 0x14, 0x74, 0x54, 0x6F, 0x0C, 0x01])]
        );
        assert!(delay.total_ms >= 40);
    }

    #[test]
    fn shows_both_lines() {
        let mut lcd = Lcd::new(Recorder::default());
        lcd.show(&StatusMessage::Splash).unwrap();
        let bus = lcd.release();
        assert_eq!(bus.transfers.len(), 2);

        let (address, first) = &bus.transfers[0];
        assert_eq!(*address, ADDRESS);
        assert_eq!(&first[..3], &[0x80, 0x80, 0x40]);
        assert_eq!(&first[3..], b"  Hold  Timer   ");

        let (_, second) = &bus.transfers[1];
        assert_eq!(&second[..3], &[0x80, 0xC0, 0x40]);
        assert_eq!(&second[3..], b"Enter threshold:");
    }

    #[test]
    fn bus_errors_are_returned() {
        let mut lcd = Lcd::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        assert_eq!(lcd.show(&StatusMessage::Prompt), Err(Nack));
    }
}
