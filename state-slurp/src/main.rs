//! Print the hold timer's trace log from a running target.
//!
//! Usage: `state-slurp [chip]`, the chip defaults to the blue pill's.
use core::mem::size_of;
use core::ops::Range;
use std::error::Error;
use std::time::Instant;

use probe_rs::config::{MemoryRegion, RamRegion};
use probe_rs::MemoryInterface;
use probe_rs::Session;

use shared_types::LogView;

const DEFAULT_CHIP: &str = "stm32f103c8";

fn get_ram(sesh: &Session) -> Option<Range<u32>> {
    for mem in sesh.memory_map() {
        match mem {
            MemoryRegion::Ram(RamRegion { range, .. }) => return Some(range.clone()),
            _ => (),
        }
    }
    None
}

// The whole 20K of RAM reads in under a second, so there is no point in
// finding the log's address from the ELF first.
fn main() -> Result<(), Box<dyn Error>> {
    let chip = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CHIP.into());
    let mut sesh = Session::auto_attach(chip.as_str())?;
    let ram = get_ram(&sesh).ok_or("target has no RAM region")?;
    let mut core = sesh.core(0)?;

    let mut words = vec![0; ram.len() / size_of::<u32>()];
    let before = Instant::now();
    core.read_32(ram.start, &mut words)?;
    eprintln!("Slurped {} bytes in {:?}", ram.len(), before.elapsed());

    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes().to_vec()).collect();
    let log = LogView::find(&bytes).ok_or("no trace log in target RAM")?;
    eprintln!("{} records written since boot", log.total());
    for record in log.iter() {
        println!("{}", record);
    }
    Ok(())
}
