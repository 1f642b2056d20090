//! Draws a framed greeting on the UG-2832HSWEG04 of an OLED1 Xplained Pro wing attached to EXT3
//! of a SAM D21 Xplained Pro: SERCOM5 as SPI master on PB22/PB23 (MOSI/SCK), PB17 for D/C,
//! PA17 for chip-select and PA20 for /RESET.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate cortex_m;
extern crate cortex_m_rt;
extern crate embedded_hal as hal_api;
extern crate panic_abort;
extern crate samd_oled_flash as oled;
extern crate atsamd_hal as hal;

use cortex_m_rt::entry;
use hal::clock::GenericClockController;
use hal::delay::Delay;
use hal::gpio::v2::Pins;
use hal::pac::{CorePeripherals, Peripherals};
use hal::prelude::*;
use hal::sercom::v1::spi::Spi;
use oled::display::ug2832hsweg04;
use oled::font::BASIC_6X7;
use oled::gfx::mask;
use oled::{Gfx, PixelOp};

static mut FRAMEBUFFER: [u8; ug2832hsweg04::FRAMEBUFFER_SIZE] = [0; ug2832hsweg04::FRAMEBUFFER_SIZE];

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
    let mut delay = Delay::new(cp.SYST, &mut clocks);
    let pins = Pins::new(dp.PORT);

    let gclk0 = clocks.gclk0();
    let sercom_clock = clocks.sercom5_core(&gclk0).unwrap();
    let disp_spi = Spi::new(
        &sercom_clock,
        8.mhz(),
        hal_api::spi::MODE_0,
        dp.SERCOM5,
        &mut dp.PM,
        (pins.pb22, pins.pb23),
    );

    let disp_dc = pins.pb17.into_push_pull_output();
    let disp_cs = pins.pa17.into_push_pull_output();
    let mut disp_rst = pins.pa20.into_push_pull_output();

    // The framebuffer is only ever borrowed here, once, before anything else can reach it.
    #[allow(unsafe_code)]
    let buf = unsafe { &mut FRAMEBUFFER };
    let mut disp = ug2832hsweg04::new(
        oled::SpiInterface::new(disp_spi, disp_dc, disp_cs),
        &mut disp_rst,
        &mut delay,
        buf,
    )
    .unwrap();

    {
        let mut gfx = Gfx::new(&mut disp);
        let (w, h) = BASIC_6X7.bounding_box("Hello, SAMD21!");
        let (x, y) = ((128 - w) / 2, (32 - h) / 2);
        gfx.draw_rect(x - 3, y - 3, w + 6, h + 6, PixelOp::Set).unwrap();
        gfx.draw_string("Hello, SAMD21!", x, y, &BASIC_6X7).unwrap();
        gfx.draw_circle(4, 4, 3, PixelOp::Set, mask::WHOLE).unwrap();
        gfx.draw_filled_circle(123, 27, 3, PixelOp::Set, mask::WHOLE).unwrap();
    }

    // Blink the circle in the corner by XOR-ing it over itself.
    loop {
        delay.delay_ms(500u16);
        Gfx::new(&mut disp)
            .draw_filled_circle(123, 27, 3, PixelOp::Xor, mask::WHOLE)
            .unwrap();
    }
}
