//! Decoding of the 4x4 matrix keypad scan codes.
use packed_struct::prelude::*;

use crate::entry::Digit;

/// A scan code as latched by the keypad encoder.
///
/// The high nibble has one bit set for the row that was pressed, the low
/// nibble one bit set for the column. Anything else is a glitch or two keys
/// at once.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0")]
pub struct ScanCode {
    #[packed_field(bits = "0..=3")]
    pub rows: Integer<u8, packed_bits::Bits4>,
    #[packed_field(bits = "4..=7")]
    pub cols: Integer<u8, packed_bits::Bits4>,
}

/// Keys on the pad, by row and column. `None` are the letters, `*` and `#`,
/// which have no use here.
///
/// ```text
///      c0  c1  c2  c3
/// r0 |  1   2   3   A
/// r1 |  4   5   6   B
/// r2 |  7   8   9   C
/// r3 |  *   0   #   D
/// ```
#[rustfmt::skip]
const KEYMAP: [[Option<u8>; 4]; 4] = [
    [Some(1), Some(2), Some(3), None],
    [Some(4), Some(5), Some(6), None],
    [Some(7), Some(8), Some(9), None],
    [None,    Some(0), None,    None],
];

/// Index of the only set bit of a nibble.
fn one_hot(nibble: u8) -> Option<usize> {
    match nibble {
        0b0001 => Some(0),
        0b0010 => Some(1),
        0b0100 => Some(2),
        0b1000 => Some(3),
        _ => None,
    }
}

impl ScanCode {
    /// Matrix position of the key, if exactly one key is down.
    pub fn position(&self) -> Option<(usize, usize)> {
        let row = one_hot(self.rows.into())?;
        let col = one_hot(self.cols.into())?;
        Some((row, col))
    }
}

/// The digit a scan code stands for, if any.
pub fn decode(scan: u8) -> Option<Digit> {
    let code = ScanCode::unpack(&[scan]).ok()?;
    let (row, col) = code.position()?;
    KEYMAP[row][col].and_then(Digit::new)
}

#[cfg(test)]
mod test {
    use super::*;

    fn digit(scan: u8) -> Option<u8> {
        decode(scan).map(Digit::get)
    }

    #[test]
    fn digits() {
        let codes = [0x82, 0x11, 0x12, 0x14, 0x21, 0x22, 0x24, 0x41, 0x42, 0x44];
        for (d, &code) in codes.iter().enumerate() {
            assert_eq!(digit(code), Some(d as u8), "scan code {:#x}", code);
        }
    }

    #[test]
    fn other_keys_are_not_digits() {
        for &code in &[0x18, 0x28, 0x48, 0x88, 0x81, 0x84] {
            assert_eq!(digit(code), None, "scan code {:#x}", code);
        }
    }

    #[test]
    fn glitches_are_not_digits() {
        for &code in &[0x00, 0x10, 0x01, 0x33, 0x31, 0x13, 0xff, 0x03] {
            assert_eq!(digit(code), None, "scan code {:#x}", code);
        }
    }

    #[test]
    fn position_of_a_scan_code() {
        let code = ScanCode::unpack(&[0x42]).unwrap();
        assert_eq!(u8::from(code.rows), 0x4);
        assert_eq!(u8::from(code.cols), 0x2);
        assert_eq!(code.position(), Some((2, 1)));
    }
}
