//! The in-RAM trace ring read back by `state-slurp`.
use packed_struct::prelude::*;
use shared_types::{TraceRecord, RECORD_SIZE, TRACE_LEN, TRACE_MAGIC};

/// A fixed ring of packed [`TraceRecord`]s, laid out the way
/// `shared_types::LogView` expects to find it in a memory dump.
#[repr(C)]
pub struct TraceLog {
    magic: u32,
    /// Number of records ever written; the next slot is `head % TRACE_LEN`
    head: u32,
    records: [[u8; RECORD_SIZE]; TRACE_LEN],
}

impl TraceLog {
    pub const fn new() -> Self {
        TraceLog {
            magic: TRACE_MAGIC,
            head: 0,
            records: [[0; RECORD_SIZE]; TRACE_LEN],
        }
    }

    /// Store a record, overwriting the oldest one once the ring is full.
    pub fn record(&mut self, record: TraceRecord) {
        // every field of a TraceRecord fits its slot, so this only fails if
        // the layout itself is broken
        if let Ok(bytes) = record.pack() {
            let slot = self.head as usize % TRACE_LEN;
            self.records[slot] = bytes;
            self.head = self.head.wrapping_add(1);
        }
    }

    pub fn total(&self) -> u32 {
        self.head
    }

    /// The last record written.
    pub fn last(&self) -> Option<TraceRecord> {
        if self.head == 0 {
            return None;
        }
        let slot = self.head.wrapping_sub(1) as usize % TRACE_LEN;
        TraceRecord::unpack(&self.records[slot]).ok()
    }

    /// The records still in the ring, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = TraceRecord> + '_ {
        let len = TRACE_LEN as u32;
        let (start, count) = if self.head < len {
            (0, self.head)
        } else {
            (self.head % len, len)
        };
        (0..count).filter_map(move |i| {
            let slot = ((start + i) % len) as usize;
            TraceRecord::unpack(&self.records[slot]).ok()
        })
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        TraceLog::new()
    }
}
