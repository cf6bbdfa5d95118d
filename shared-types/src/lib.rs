#![no_std]
//! Types shared between the firmware and the host side tools.
//!
//! The firmware keeps a ring of [`TraceRecord`]s in RAM. A debugger can read
//! that RAM while the target is running and use [`LogView`] to make sense of
//! it.
use core::fmt;
use packed_struct::prelude::*;

/// Marks the start of a trace log in target memory ("HTLG").
pub const TRACE_MAGIC: u32 = 0x474c_5448;

/// Number of records kept in the trace ring.
pub const TRACE_LEN: usize = 64;

/// Size of one packed record.
pub const RECORD_SIZE: usize = 8;

/// Size of the `magic` and `head` words in front of the records.
pub const HEADER_SIZE: usize = 8;

/// What happened.
#[derive(PrimitiveEnum_u8, Debug, Copy, Clone, PartialEq)]
pub enum TraceKind {
    Boot = 0,
    /// `arg` is 1 for a rising edge and 0 for a falling edge
    SwitchEdge = 1,
    SessionStart = 2,
    StartRefused = 3,
    SessionStop = 4,
    Second = 5,
    Armed = 6,
    Disarmed = 7,
    /// `arg` is the digit
    KeyDigit = 8,
    /// `arg` is the scan code that did not decode
    KeyRejected = 9,
    KeyIgnored = 10,
    /// `arg` is the committed threshold
    ThresholdSet = 11,
    EntryReset = 12,
    DisplayFault = 13,
}

/// A packed representation of a state machine event, used for observing the
/// timer with a debugger.
///
/// Fits in 8 bytes so the ring stays word aligned.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(endian = "lsb", bit_numbering = "msb0", size_bytes = "8")]
pub struct TraceRecord {
    /// The tick count when this happened
    #[packed_field(bytes = "0..=3")]
    pub timestamp: u32,
    #[packed_field(bytes = "4", ty = "enum")]
    pub kind: TraceKind,
    /// Kind specific argument
    #[packed_field(bytes = "5")]
    pub arg: u8,
    /// Elapsed seconds at the time
    #[packed_field(bytes = "6")]
    pub elapsed: u8,
    /// Threshold at the time
    #[packed_field(bytes = "7")]
    pub threshold: u8,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10} {:?}({}) elapsed={:02} threshold={:02}",
            self.timestamp, self.kind, self.arg, self.elapsed, self.threshold
        )
    }
}

/// A trace log found in a memory dump.
///
/// The layout in memory is `magic: u32`, `head: u32` (number of records ever
/// written) and then `TRACE_LEN` packed records, all little-endian.
pub struct LogView<'a> {
    head: u32,
    records: &'a [u8],
}

impl<'a> LogView<'a> {
    /// Look for a trace log in a dump of RAM. Only word aligned offsets are
    /// searched, as the log is a word aligned static.
    pub fn find(ram: &'a [u8]) -> Option<Self> {
        let needed = HEADER_SIZE + TRACE_LEN * RECORD_SIZE;
        let magic = TRACE_MAGIC.to_le_bytes();
        let mut offset = 0;
        while offset + needed <= ram.len() {
            if ram[offset..offset + 4] == magic {
                let mut head = [0; 4];
                head.copy_from_slice(&ram[offset + 4..offset + 8]);
                return Some(LogView {
                    head: u32::from_le_bytes(head),
                    records: &ram[offset + HEADER_SIZE..offset + needed],
                });
            }
            offset += 4;
        }
        None
    }

    /// Number of records ever written, including overwritten ones.
    pub fn total(&self) -> u32 {
        self.head
    }

    /// The records still in the ring, oldest first. Slots that do not decode
    /// are skipped.
    pub fn iter(&self) -> impl Iterator<Item = TraceRecord> + 'a {
        let len = TRACE_LEN as u32;
        let (start, count) = if self.head < len {
            (0, self.head)
        } else {
            (self.head % len, len)
        };
        let records = self.records;
        (0..count).filter_map(move |i| {
            let slot = ((start + i) % len) as usize * RECORD_SIZE;
            let mut bytes = [0; RECORD_SIZE];
            bytes.copy_from_slice(&records[slot..slot + RECORD_SIZE]);
            TraceRecord::unpack(&bytes).ok()
        })
    }
}
