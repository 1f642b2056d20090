//! Erases, programs and reads back a few sectors of the AT25DF081A on a SAM D21 Xplained Pro:
//! SERCOM5 as SPI master on PB16/PB22/PB23 (MISO/MOSI/SCK) and PA13 for chip-select. The result
//! is reported on the user LED, PB30: steady on for a match, blinking for a failure.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate cortex_m;
extern crate cortex_m_rt;
extern crate embedded_hal as hal_api;
extern crate panic_abort;
extern crate samd_oled_flash as driver;
extern crate atsamd_hal as hal;

use cortex_m::asm;
use cortex_m_rt::entry;
use hal::clock::GenericClockController;
use hal::delay::Delay;
use hal::gpio::v2::Pins;
use hal::pac::{CorePeripherals, Peripherals};
use hal::prelude::*;
use hal::sercom::v1::spi::Spi;
use driver::flash::{self, SpiFlash};

const OFFSET: u32 = 0x1_0F80;
const LEN: usize = 600;

#[entry]
fn main() -> ! {
    let mut dp = Peripherals::take().unwrap();
    let cp = CorePeripherals::take().unwrap();
    let mut clocks = GenericClockController::with_internal_32kosc(
        dp.GCLK,
        &mut dp.PM,
        &mut dp.SYSCTRL,
        &mut dp.NVMCTRL,
    );
    let delay = Delay::new(cp.SYST, &mut clocks);
    let pins = Pins::new(dp.PORT);

    let gclk0 = clocks.gclk0();
    let sercom_clock = clocks.sercom5_core(&gclk0).unwrap();
    let flash_spi = Spi::new(
        &sercom_clock,
        1.mhz(),
        hal_api::spi::MODE_0,
        dp.SERCOM5,
        &mut dp.PM,
        (pins.pb16, pins.pb22, pins.pb23),
    );
    let flash_cs = pins.pa13.into_push_pull_output();
    let mut led = pins.pb30.into_push_pull_output();

    // A sector erase takes well under 100k status reads; a chip still busy after that is wedged.
    let config = flash::Config::new().busy_wait_limit(Some(100_000));
    let mut flash = SpiFlash::with_config(flash_spi, flash_cs, delay, config);

    let mut pattern = [0u8; LEN];
    for (i, byte) in pattern.iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(31) ^ 0x5A;
    }

    let ok = flash.open().is_ok()
        && flash.erase(OFFSET, LEN as u32).is_ok()
        && flash.write(OFFSET, &pattern).is_ok()
        && {
            let mut back = [0u8; LEN];
            flash.read(OFFSET, &mut back).is_ok() && back[..] == pattern[..]
        };
    let (_, _, mut delay) = flash.release();

    loop {
        if ok {
            led.set_high().unwrap();
            asm::wfi();
        } else {
            led.toggle().unwrap();
            delay.delay_ms(200u16);
        }
    }
}
