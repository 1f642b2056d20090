//! The UG-2832HSWEG04: a 128x32 SSD1306 panel, as fitted to the SAMD21 OLED demo boards.

use hal::blocking::delay::DelayUs;
use hal::digital::v2::OutputPin;

use super::framebuffer::Framebuffer;
use super::{Display, OledDisplay};
use crate::config::Config;
use crate::controller::{InitError, Ssd1306};
use crate::interface::DisplayInterface;

pub const WIDTH: u8 = 128;
pub const HEIGHT: u8 = 32;
pub const PAGES: u8 = HEIGHT / 8;
/// Size in bytes of the RAM mirror for this panel.
pub const FRAMEBUFFER_SIZE: usize = WIDTH as usize * HEIGHT as usize / 8;

/// Bring up the panel at `iface`: pulse `rst`, run the power-on sequence, attach `buf` as the
/// RAM mirror and blank the display.
pub fn new<'buf, DI, RST, D>(
    iface: DI,
    rst: &mut RST,
    delay: &mut D,
    buf: &'buf mut [u8; FRAMEBUFFER_SIZE],
) -> Result<OledDisplay<'buf, Ssd1306<DI>>, InitError<DI::Error, RST::Error>>
where
    DI: DisplayInterface,
    RST: OutputPin,
    D: DelayUs<u32>,
{
    let mut ctrl = Ssd1306::new(iface);
    ctrl.init(rst, delay, &Config::default())?;
    let mut display = OledDisplay::with_framebuffer(ctrl, Framebuffer::new(buf, WIDTH, HEIGHT));
    display.init().map_err(InitError::Interface)?;
    Ok(display)
}
