//! The front panel's parallel bus, bit-banged on GPIO.
//!
//! ```text
//!  PB8..PB15  D0..D7   data, input between cycles
//!  PA0..PA2   A0..A2   word address, (address - 0x4000) / 2
//!  PA3        /RD      active low
//!  PA4        /WR      active low
//! ```
//!
//! The pins change direction and level several times per cycle, which the
//! typed HAL pins can't do cheaply, so the registers are written directly. The
//! pins are still taken from the HAL so nothing else can claim them.
use holdtime::panel::Bus;
use stm32f1::stm32f103;
use stm32f1xx_hal::gpio::{
    gpioa::{PA0, PA1, PA2, PA3, PA4},
    gpiob::{PB10, PB11, PB12, PB13, PB14, PB15, PB8, PB9},
    Floating, Input,
};

/// Base of the panel's address window.
const BASE: u16 = 0x4000;

/// Cycles to hold a strobe low. The slowest part on the bus needs ~150ns,
/// which is 11 cycles at 72MHz.
const STROBE_CYCLES: u32 = 16;

const RD: u32 = 1 << 3;
const WR: u32 = 1 << 4;
const ADDRESS_MASK: u32 = 0b111;

/// CRH value for PB8..PB15 as floating inputs.
const DATA_IN: u32 = 0x4444_4444;
/// CRH value for PB8..PB15 as 50MHz push-pull outputs.
const DATA_OUT: u32 = 0x3333_3333;

/// Pins 0-4 of CRL as 50MHz push-pull outputs, leaving 5-7 alone.
const CONTROL_MASK: u32 = 0x000F_FFFF;
const CONTROL_OUT: u32 = 0x0003_3333;

/// D0..D7
#[rustfmt::skip]
pub struct DataPins(
    pub PB8<Input<Floating>>,
    pub PB9<Input<Floating>>,
    pub PB10<Input<Floating>>,
    pub PB11<Input<Floating>>,
    pub PB12<Input<Floating>>,
    pub PB13<Input<Floating>>,
    pub PB14<Input<Floating>>,
    pub PB15<Input<Floating>>,
);

/// A0..A2, /RD and /WR
pub struct ControlPins(
    pub PA0<Input<Floating>>,
    pub PA1<Input<Floating>>,
    pub PA2<Input<Floating>>,
    pub PA3<Input<Floating>>,
    pub PA4<Input<Floating>>,
);

pub struct PortBus {
    _data: DataPins,
    _control: ControlPins,
}

fn gpioa() -> &'static stm32f103::gpioa::RegisterBlock {
    // Safety: PortBus owns PA0..PA4 and only touches their bits, with
    // atomic BSRR writes or a read-modify-write of CRL during construction
    unsafe { &*stm32f103::GPIOA::ptr() }
}

fn gpiob() -> &'static stm32f103::gpioa::RegisterBlock {
    // Safety: PortBus owns PB8..PB15, which are the whole of CRH
    unsafe { &*stm32f103::GPIOB::ptr() }
}

impl PortBus {
    /// Take over the bus pins. Both strobes are left idle (high) and the data
    /// lines as inputs.
    pub fn new(data: DataPins, control: ControlPins) -> Self {
        let a = gpioa();
        a.bsrr.write(|w| unsafe { w.bits(RD | WR) });
        a.crl
            .modify(|r, w| unsafe { w.bits((r.bits() & !CONTROL_MASK) | CONTROL_OUT) });
        gpiob().crh.write(|w| unsafe { w.bits(DATA_IN) });
        PortBus {
            _data: data,
            _control: control,
        }
    }

    fn select(&mut self, address: u16) {
        let index = u32::from(address.wrapping_sub(BASE) / 2) & ADDRESS_MASK;
        let clear = !index & ADDRESS_MASK;
        gpioa()
            .bsrr
            .write(|w| unsafe { w.bits(index | (clear << 16)) });
    }

    /// Pulse a strobe low for `STROBE_CYCLES`, running `during` while it is
    /// asserted.
    fn strobe<R>(&mut self, line: u32, during: impl FnOnce() -> R) -> R {
        let a = gpioa();
        a.bsrr.write(|w| unsafe { w.bits(line << 16) });
        cortex_m::asm::delay(STROBE_CYCLES);
        let result = during();
        a.bsrr.write(|w| unsafe { w.bits(line) });
        result
    }
}

impl Bus for PortBus {
    fn read(&mut self, address: u16) -> u16 {
        self.select(address);
        let idr = self.strobe(RD, || gpiob().idr.read().bits());
        ((idr >> 8) & 0xff) as u16
    }

    fn write(&mut self, address: u16, word: u16) {
        self.select(address);
        let byte = u32::from(word & 0xff);
        let b = gpiob();
        b.bsrr
            .write(|w| unsafe { w.bits((byte << 8) | ((!byte & 0xff) << 24)) });
        b.crh.write(|w| unsafe { w.bits(DATA_OUT) });
        self.strobe(WR, || ());
        b.crh.write(|w| unsafe { w.bits(DATA_IN) });
    }
}
