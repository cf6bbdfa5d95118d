#![no_main]
#![no_std]
use cortex_m::singleton;
use panic_halt as _;
use rtic::app;
use rtic::Mutex;
use stm32f1xx_hal::gpio::{
    gpioa::PA6,
    gpiob::{PB6, PB7},
    Alternate, Edge, ExtiPin, Floating, Input, OpenDrain,
};
use stm32f1xx_hal::i2c::{self, BlockingI2c};
use stm32f1xx_hal::pac::I2C1;
use stm32f1xx_hal::prelude::*;
use stm32f1xx_hal::timer::{CountDownTimer, Event as TimerEvent, Timer};

use holdtime::lcd::Lcd;
use holdtime::panel::Panel;
use holdtime::{
    Config, Core, DisplaySink, EventFlags, Led, LedSink, PanelConfig, Render,
};
use shared_types::TraceKind;

mod bus;
use bus::{ControlPins, DataPins, PortBus};

/// The character display on I2C1.
type Display = Lcd<I2cBus>;

/// The I2C1 bus the character display sits on.
type I2cBus = BlockingI2c<I2C1, (PB6<Alternate<OpenDrain>>, PB7<Alternate<OpenDrain>>)>;

/// What a failed transfer on [`I2cBus`] reports.
type I2cError = <I2cBus as stm32f1xx_hal::prelude::_embedded_hal_blocking_i2c_Write>::Error;

/// Trace argument for a display that did not come up at boot.
const FAULT_AT_INIT: u8 = 1;

/// Both displays and the LEDs, as seen from the idle loop.
///
/// The panel is shared with the interrupt handlers, so it is only locked for
/// the few bus cycles of each write. The LCD belongs to idle alone; its slow
/// I2C transfers never hold off the tick.
struct Front<P, L> {
    panel: P,
    lcd: L,
}

impl<P, L> DisplaySink for Front<P, L>
where
    P: Mutex<T = Panel<PortBus>>,
    L: Mutex<T = Display>,
{
    type Error = I2cError;

    fn render(&mut self, request: Render) -> Result<(), I2cError> {
        match request {
            Render::SecondsDisplay(digits) => {
                self.panel.lock(|panel| panel.show_seconds(digits));
                Ok(())
            }
            Render::StatusMessage(message) => self.lcd.lock(|lcd| lcd.show(&message)),
        }
    }
}

impl<P, L> LedSink for Front<P, L>
where
    P: Mutex<T = Panel<PortBus>>,
{
    fn set_led(&mut self, led: Led, on: bool) {
        self.panel.lock(|panel| panel.set_led(led, on));
    }
}

#[app(device = stm32f1xx_hal::pac, peripherals = true)]
mod app {
    use super::*;

    #[resources]
    struct Resources {
        core: &'static mut Core,
        panel: Panel<PortBus>,
        lcd: Display,
        timer: CountDownTimer<stm32f1xx_hal::pac::TIM2>,
        strobe: PA6<Input<Floating>>,
        #[init(EventFlags::new())]
        events: EventFlags,
    }

    #[init]
    fn init(c: init::Context) -> (init::LateResources, init::Monotonics) {
        let config = Config::DEFAULT;
        // The built in configuration is checked by the tests; if it is bad
        // there is no timer to run
        let core = match Core::new(config) {
            Ok(core) => core,
            Err(_) => panic!(),
        };
        let core = match singleton!(: Core = core) {
            Some(core) => core,
            None => panic!(),
        };

        let mut flash = c.device.FLASH.constrain();
        let mut rcc = c.device.RCC.constrain();
        let clocks = rcc
            .cfgr
            .use_hse(8_u32.mhz())
            .sysclk(72_u32.mhz())
            .pclk1(36_u32.mhz())
            .freeze(&mut flash.acr);

        let mut gpioa = c.device.GPIOA.split(&mut rcc.apb2);
        let mut gpiob = c.device.GPIOB.split(&mut rcc.apb2);
        let mut afio = c.device.AFIO.constrain(&mut rcc.apb2);

        #[rustfmt::skip]
        let data = DataPins(
            gpiob.pb8, gpiob.pb9, gpiob.pb10, gpiob.pb11,
            gpiob.pb12, gpiob.pb13, gpiob.pb14, gpiob.pb15,
        );
        let control = ControlPins(gpioa.pa0, gpioa.pa1, gpioa.pa2, gpioa.pa3, gpioa.pa4);
        let panel = Panel::new(PortBus::new(data, control), PanelConfig::DEFAULT);

        // The keypad encoder raises its strobe once the scan code is latched
        let mut strobe = gpioa.pa6.into_floating_input(&mut gpioa.crl);
        strobe.make_interrupt_source(&mut afio);
        strobe.trigger_on_edge(&c.device.EXTI, Edge::RISING);
        strobe.enable_interrupt(&c.device.EXTI);

        let scl = gpiob.pb6.into_alternate_open_drain(&mut gpiob.crl);
        let sda = gpiob.pb7.into_alternate_open_drain(&mut gpiob.crl);
        let i2c = BlockingI2c::i2c1(
            c.device.I2C1,
            (scl, sda),
            &mut afio.mapr,
            i2c::Mode::Standard {
                frequency: 100_000.hz(),
            },
            clocks,
            &mut rcc.apb1,
            1_000,
            10,
            1_000,
            1_000,
        );
        let mut lcd = Lcd::new(i2c);
        let mut delay = stm32f1xx_hal::delay::Delay::new(c.core.SYST, clocks);
        // Timing works without the display, so carry on and leave a note
        if lcd.init(&mut delay).is_err() {
            core.trace(TraceKind::DisplayFault, FAULT_AT_INIT);
        }

        let mut timer = Timer::tim2(c.device.TIM2, &clocks, &mut rcc.apb1)
            .start_count_down(config.tick_hz.hz());
        timer.listen(TimerEvent::Update);

        (
            init::LateResources {
                core,
                panel,
                lcd,
                timer,
                strobe,
            },
            init::Monotonics(),
        )
    }

    #[task(binds = TIM2, priority = 2, resources = [timer, core, panel, &events])]
    fn tick(mut c: tick::Context) {
        let tick::Resources {
            ref mut timer,
            ref mut core,
            ref mut panel,
            events,
        } = c.resources;
        timer.lock(|t| t.clear_update_interrupt_flag());
        let raw = panel.lock(|p| p.switch_level());
        core.lock(|core| core.on_tick(raw, events));
    }

    #[task(binds = EXTI9_5, priority = 2, resources = [strobe, core, panel, &events])]
    fn keypad(mut c: keypad::Context) {
        let keypad::Resources {
            ref mut strobe,
            ref mut core,
            ref mut panel,
            events,
        } = c.resources;
        strobe.lock(|s| s.clear_interrupt_pending_bit());
        let scan = panel.lock(|p| p.scan_code());
        core.lock(|core| core.on_key(scan, events));
    }

    /// The main loop: turn raised flags into output changes, then sleep.
    #[idle(resources = [core, panel, lcd, &events])]
    fn idle(mut c: idle::Context) -> ! {
        let idle::Resources {
            ref mut core,
            ref mut panel,
            ref mut lcd,
            events,
        } = c.resources;

        let mut updates = Some(core.lock(|core| core.boot()));
        loop {
            match updates {
                Some(pending) => {
                    // Rendered outside the core lock; the handlers keep
                    // running while the display is busy
                    let mut front = Front {
                        panel: &mut *panel,
                        lcd: &mut *lcd,
                    };
                    if let Err(_e) = pending.apply(&mut front) {
                        core.lock(|core| core.trace(TraceKind::DisplayFault, 0));
                    }
                }
                None => cortex_m::interrupt::free(|_| {
                    // A flag raised after the drain keeps the wfi from
                    // sleeping, since the interrupt is already pending
                    if !events.is_pending() {
                        cortex_m::asm::wfi();
                    }
                }),
            }
            updates = core.lock(|core| core.drain(events));
        }
    }
}
