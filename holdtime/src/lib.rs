#![no_std]
//! A switch hold timer with a threshold alarm.
//!
//! While the timing switch is held the elapsed seconds count up on a two digit
//! display. Once they reach the threshold entered on the keypad, the alarm LED
//! blinks until the switch is released.
//!
//! Everything here is hardware independent. A board provides a periodic tick,
//! a keypad interrupt and the outputs, and drives [`Core`] with them:
//!
//! ```text
//!  tick ISR ──> Core::on_tick ──┐
//!                               ├──> EventFlags ──> Core::drain ──> Updates ──> sinks
//!  key ISR  ──> Core::on_key  ──┘                   (main loop)
//! ```
pub mod alarm;
pub mod config;
pub mod debounce;
pub mod display;
pub mod entry;
pub mod event;
pub mod keypad;
pub mod lcd;
pub mod panel;
pub mod session;
pub mod timing;
pub mod trace;

pub use config::{Config, ConfigError, PanelConfig};
pub use display::{Digits, DisplaySink, Led, LedSink, Render, StatusMessage};
pub use event::{Event, EventFlags};
pub use session::{Core, SessionState, Updates};
