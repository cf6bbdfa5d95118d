//! What the core asks of its displays and LEDs.
//!
//! The core decides *what* to show; the sinks decide how. The only formatting
//! done here is splitting seconds into digits and laying a message out as the
//! two 16 character lines of the status display.
use core::fmt::{self, Write};

use heapless::String;

use crate::entry::{Digit, Threshold};

/// Characters per line of the status display.
pub const LINE_LEN: usize = 16;

/// One line of the status display, padded with spaces.
pub type Line = [u8; LINE_LEN];

/// Tens and ones of a seconds count, for the two digit display.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Digits {
    pub tens: u8,
    pub ones: u8,
}

impl Digits {
    /// Values past 99 show as 99.
    pub fn new(seconds: u8) -> Self {
        let seconds = seconds.min(99);
        Digits {
            tens: seconds / 10,
            ones: seconds % 10,
        }
    }
}

/// Semantic content of the status display.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    /// Power-on banner
    Splash,
    /// Waiting for a threshold
    Prompt,
    /// The tens digit of a new threshold was typed
    FirstDigit(Digit),
    /// A new threshold was committed
    ThresholdSet(Threshold),
    Timing { elapsed: u8, threshold: Threshold },
    Alarmed { elapsed: u8, threshold: Threshold },
    /// The session ended after `elapsed` seconds
    Elapsed { elapsed: u8 },
}

/// Room for formatting a line before it is cut to [`LINE_LEN`].
type Scratch = String<32>;

/// Lay formatted text out as a [`Line`], padded with spaces and cut at
/// [`LINE_LEN`].
fn line(args: fmt::Arguments<'_>) -> Line {
    let mut text = Scratch::new();
    // a full scratch buffer keeps what fit, which is more than a line
    let _ = text.write_fmt(args);
    let mut line = [b' '; LINE_LEN];
    for (slot, b) in line.iter_mut().zip(text.as_bytes()) {
        *slot = *b;
    }
    line
}

impl StatusMessage {
    /// The message laid out on the two lines of the display.
    pub fn lines(&self) -> [Line; 2] {
        match *self {
            StatusMessage::Splash => [
                line(format_args!("  Hold  Timer")),
                line(format_args!("Enter threshold:")),
            ],
            StatusMessage::Prompt => [
                line(format_args!("  Press 0-9")),
                line(format_args!("Enter threshold:")),
            ],
            StatusMessage::FirstDigit(tens) => [
                line(format_args!("Thresh: {}_", tens.get())),
                line(format_args!("Enter 2nd digit:")),
            ],
            StatusMessage::ThresholdSet(t) => [
                line(format_args!("Threshold: {:02}s", t.get())),
                line(format_args!("Press S3 to run")),
            ],
            StatusMessage::Timing { elapsed, threshold } => [
                line(format_args!("Timing: {:02}s", elapsed)),
                line(format_args!("Limit: {:02}s", threshold.get())),
            ],
            StatusMessage::Alarmed { elapsed, threshold } => [
                line(format_args!("EXCEEDED! {:02}s", elapsed)),
                line(format_args!("Limit: {:02}s", threshold.get())),
            ],
            StatusMessage::Elapsed { elapsed } => [
                line(format_args!("Elapsed: {:02}s", elapsed)),
                line(format_args!("Enter threshold:")),
            ],
        }
    }
}

/// A request to one of the two displays.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Render {
    SecondsDisplay(Digits),
    StatusMessage(StatusMessage),
}

/// Something that can show [`Render`] requests.
pub trait DisplaySink {
    type Error;

    fn render(&mut self, request: Render) -> Result<(), Self::Error>;
}

/// The indicator LEDs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Led {
    /// Lit while the switch is held
    Status,
    /// Blinks while over the threshold
    Alarm,
}

/// Something that can light [`Led`]s. `on` means lit, whatever the wiring.
pub trait LedSink {
    fn set_led(&mut self, led: Led, on: bool);
}

/// Segment patterns for 0-9 on a common anode display, bits `gfedcba`,
/// a 0 lights the segment.
pub const SEGMENTS: [u8; 10] = [0x40, 0x79, 0x24, 0x30, 0x19, 0x12, 0x02, 0x78, 0x00, 0x18];
