//! Display controllers: the layer which turns page/column addressing and raw display RAM bytes
//! into controller-specific command sequences.

use hal::blocking::delay::DelayUs;
use hal::digital::v2::OutputPin;

use crate::command::Command;
use crate::config::Config;
use crate::interface::DisplayInterface;

/// Width of each half of the hard reset pulse, in microseconds.
const RESET_PULSE_US: u32 = 10;

/// The operations a page-addressed monochrome display controller offers to the display layer.
pub trait DisplayController {
    type Error;

    /// Write one byte at the current page/column and advance the column.
    fn write_data(&mut self, data: u8) -> Result<(), Self::Error>;

    /// Write consecutive bytes starting at the current page/column.
    fn write_data_buf(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for byte in data {
            self.write_data(*byte)?;
        }
        Ok(())
    }

    /// Read the byte at the current page/column. Controllers behind a write-only link return 0,
    /// so callers needing read-back must keep a framebuffer mirror.
    fn read_data(&mut self) -> Result<u8, Self::Error>;

    fn set_page_address(&mut self, page: u8) -> Result<(), Self::Error>;
    fn set_column_address(&mut self, column: u8) -> Result<(), Self::Error>;

    /// Select the display RAM row shown at the top of the panel.
    fn set_start_line_address(&mut self, line: u8) -> Result<(), Self::Error>;
}

/// Failure while bringing up a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError<IfaceE, PinE> {
    /// A command could not be sent.
    Interface(IfaceE),
    /// The reset pin could not be driven.
    Reset(PinE),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Ready,
}

/// A driver for an SSD1306 behind a write-only interface.
pub struct Ssd1306<DI> {
    iface: DI,
    state: State,
}

impl<DI> Ssd1306<DI>
where
    DI: DisplayInterface,
{
    /// Wrap the interface `iface`. The controller is not touched until `init` is called.
    pub fn new(iface: DI) -> Self {
        Ssd1306 {
            iface,
            state: State::Uninitialized,
        }
    }

    /// Pulse the controller's active-low reset line.
    pub fn hard_reset<RST, D>(&mut self, rst: &mut RST, delay: &mut D) -> Result<(), RST::Error>
    where
        RST: OutputPin,
        D: DelayUs<u32>,
    {
        rst.set_low()?;
        delay.delay_us(RESET_PULSE_US);
        rst.set_high()?;
        delay.delay_us(RESET_PULSE_US);
        Ok(())
    }

    /// Reset the controller and run the power-on sequence described by `config`. When this
    /// returns `Ok` the panel is on and ready to receive display RAM data.
    pub fn init<RST, D>(
        &mut self,
        rst: &mut RST,
        delay: &mut D,
        config: &Config,
    ) -> Result<(), InitError<DI::Error, RST::Error>>
    where
        RST: OutputPin,
        D: DelayUs<u32>,
    {
        self.hard_reset(rst, delay).map_err(InitError::Reset)?;
        config
            .send(&mut self.iface)
            .map_err(InitError::Interface)?;
        self.state = State::Ready;
        info!("ssd1306: powered on, contrast {=u8}", config.contrast_value());
        Ok(())
    }

    /// Whether `init` has completed.
    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    pub fn write_command(&mut self, cmd: u8) -> Result<(), DI::Error> {
        self.iface.send_command(cmd)
    }

    pub fn on(&mut self) -> Result<(), DI::Error> {
        Command::DisplayOn(true).send(&mut self.iface)
    }

    pub fn off(&mut self) -> Result<(), DI::Error> {
        Command::DisplayOn(false).send(&mut self.iface)
    }

    /// Control sleep mode. A sleeping panel is dark but keeps its display RAM.
    pub fn sleep(&mut self, enabled: bool) -> Result<(), DI::Error> {
        Command::DisplayOn(!enabled).send(&mut self.iface)
    }

    /// Set the contrast, returning the value written.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<u8, DI::Error> {
        Command::Contrast(contrast).send(&mut self.iface)?;
        Ok(contrast)
    }

    /// Invert all pixels on the panel, or go back to normal.
    pub fn invert(&mut self, inverse: bool) -> Result<(), DI::Error> {
        Command::Invert(inverse).send(&mut self.iface)
    }

    /// Write zeros to `pages` pages of `width` columns of display RAM.
    pub fn clear(&mut self, pages: u8, width: u8) -> Result<(), DI::Error> {
        let zeros = [0u8; 32];
        for page in 0..pages {
            self.set_page_address(page)?;
            self.set_column_address(0)?;
            let mut left = width as usize;
            while left > 0 {
                let chunk_len = left.min(zeros.len());
                self.iface.send_data(&zeros[..chunk_len])?;
                left -= chunk_len;
            }
        }
        Ok(())
    }

    /// Give back the interface.
    pub fn release(self) -> DI {
        self.iface
    }
}

impl<DI> DisplayController for Ssd1306<DI>
where
    DI: DisplayInterface,
{
    type Error = DI::Error;

    fn write_data(&mut self, data: u8) -> Result<(), DI::Error> {
        self.iface.send_data(&[data])
    }

    fn write_data_buf(&mut self, data: &[u8]) -> Result<(), DI::Error> {
        self.iface.send_data(data)
    }

    fn read_data(&mut self) -> Result<u8, DI::Error> {
        Ok(0)
    }

    fn set_page_address(&mut self, page: u8) -> Result<(), DI::Error> {
        Command::PageStart(page & 0x0F).send(&mut self.iface)
    }

    fn set_column_address(&mut self, column: u8) -> Result<(), DI::Error> {
        let column = column & 0x7F;
        Command::HighColumn(column >> 4).send(&mut self.iface)?;
        Command::LowColumn(column & 0x0F).send(&mut self.iface)
    }

    fn set_start_line_address(&mut self, line: u8) -> Result<(), DI::Error> {
        Command::StartLine(line & 0x3F).send(&mut self.iface)
    }
}
