//! The page-addressed display abstraction the rasterizer draws through, and the display which
//! binds it to a controller.
//!
//! Display RAM is a grid of bytes, `pages` rows by `width` columns. Each byte holds 8 vertically
//! stacked pixels, so pixel `(x, y)` is bit `y % 8` of the byte at page `y / 8`, column `x`.

// This has to be here in order to be usable by mods declared afterwards.
#[cfg(test)]
#[macro_use]
pub mod testing {
    macro_rules! send {
        ([$($d:tt),*]) => {Sent::Data(vec![$($d,)*])};
        ($c:tt) => {Sent::Cmd($c)};
    }
    macro_rules! sends {
        ($($e:tt),*) => {&[$(send!($e),)*]};
    }
}

pub mod framebuffer;
pub mod ug2832hsweg04;

use itertools::iproduct;

use crate::controller::DisplayController;
use crate::display::framebuffer::Framebuffer;

/// How a pixel mask is combined with the byte already in display RAM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelOp {
    /// Light the masked pixels.
    Set,
    /// Darken the masked pixels.
    Clear,
    /// Toggle the masked pixels.
    Xor,
}

impl PixelOp {
    /// Apply this operation to the pixels of `byte` selected by `mask`.
    pub fn apply(self, byte: u8, mask: u8) -> u8 {
        match self {
            PixelOp::Set => byte | mask,
            PixelOp::Clear => byte & !mask,
            PixelOp::Xor => byte ^ mask,
        }
    }
}

/// A monochrome display whose memory is addressed by page and column.
///
/// Implementors provide byte access; pixel access and read-modify-write masking are derived from
/// it. Pixel coordinates outside the display are silently ignored, never errors.
pub trait Display {
    type Error;

    /// Width in pixels, which is also the number of columns.
    fn width(&self) -> u8;
    /// Height in pixels.
    fn height(&self) -> u8;

    /// Number of 8-pixel pages.
    fn pages(&self) -> u8 {
        self.height() / 8
    }

    fn get_byte(&mut self, page: u8, column: u8) -> Result<u8, Self::Error>;
    fn put_byte(&mut self, page: u8, column: u8, data: u8) -> Result<(), Self::Error>;

    /// Read `buf.len()` consecutive bytes of `page`, starting at column `offset`.
    fn get_page(&mut self, page: u8, offset: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        for (column, byte) in (offset..=u8::MAX).zip(buf.iter_mut()) {
            *byte = self.get_byte(page, column)?;
        }
        Ok(())
    }

    /// Write `data` to consecutive bytes of `page`, starting at column `offset`.
    fn put_page(&mut self, page: u8, offset: u8, data: &[u8]) -> Result<(), Self::Error> {
        for (column, byte) in (offset..=u8::MAX).zip(data) {
            self.put_byte(page, column, *byte)?;
        }
        Ok(())
    }

    /// Read-modify-write the byte at `page`, `column`, combining `mask` into it with `op`.
    fn mask_byte(&mut self, page: u8, column: u8, mask: u8, op: PixelOp) -> Result<(), Self::Error> {
        let current = self.get_byte(page, column)?;
        self.put_byte(page, column, op.apply(current, mask))
    }

    fn draw_pixel(&mut self, x: i16, y: i16, op: PixelOp) -> Result<(), Self::Error> {
        match pixel_address(x, y, self.width(), self.height()) {
            Some((page, column, mask)) => self.mask_byte(page, column, mask, op),
            None => Ok(()),
        }
    }

    /// Whether the pixel at `x`, `y` is lit. Pixels outside the display read as dark.
    fn get_pixel(&mut self, x: i16, y: i16) -> Result<bool, Self::Error> {
        match pixel_address(x, y, self.width(), self.height()) {
            Some((page, column, mask)) => Ok(self.get_byte(page, column)? & mask != 0),
            None => Ok(false),
        }
    }

    /// Write zero to every byte of display memory.
    fn clear(&mut self) -> Result<(), Self::Error> {
        for (page, column) in iproduct!(0..self.pages(), 0..self.width()) {
            self.put_byte(page, column, 0x00)?;
        }
        Ok(())
    }

    /// Bring display memory to a known blank state.
    fn init(&mut self) -> Result<(), Self::Error> {
        self.clear()
    }
}

/// The page, column and bit mask of pixel `x`, `y`, or `None` if it lies outside a `width` by
/// `height` display.
pub(crate) fn pixel_address(x: i16, y: i16, width: u8, height: u8) -> Option<(u8, u8, u8)> {
    if x < 0 || y < 0 || x >= i16::from(width) || y >= i16::from(height) {
        return None;
    }
    let (x, y) = (x as u8, y as u8);
    Some((y / 8, x, 1 << (y % 8)))
}

/// A display driven through a controller, optionally mirrored in a RAM framebuffer.
///
/// Controllers on a write-only link cannot be read back, so without a mirror every read returns
/// whatever the controller's read stub does (zero for the SSD1306), and read-modify-write drawing
/// will clobber neighbouring pixels. With a mirror attached, every write lands in both the mirror
/// and the controller, and reads come from the mirror alone.
pub struct OledDisplay<'buf, C> {
    ctrl: C,
    mirror: Option<Framebuffer<'buf>>,
    width: u8,
    height: u8,
}

impl<'buf, C> OledDisplay<'buf, C>
where
    C: DisplayController,
{
    /// A display of `width` by `height` pixels without a RAM mirror.
    pub fn new(ctrl: C, width: u8, height: u8) -> Self {
        OledDisplay {
            ctrl,
            mirror: None,
            width,
            height,
        }
    }

    /// A display mirrored by `framebuffer`, taking its dimensions from the framebuffer.
    pub fn with_framebuffer(ctrl: C, framebuffer: Framebuffer<'buf>) -> Self {
        OledDisplay {
            ctrl,
            width: framebuffer.width(),
            height: framebuffer.height(),
            mirror: Some(framebuffer),
        }
    }

    pub fn framebuffer(&self) -> Option<&Framebuffer<'buf>> {
        self.mirror.as_ref()
    }

    /// Access the controller, e.g. for contrast or sleep control. Display RAM written this way
    /// bypasses the mirror.
    pub fn controller(&mut self) -> &mut C {
        &mut self.ctrl
    }

    /// Push the whole mirror to the controller, one page per transfer. Does nothing without a
    /// mirror.
    pub fn put_framebuffer(&mut self) -> Result<(), C::Error> {
        let mirror = match self.mirror.as_ref() {
            Some(mirror) => mirror,
            None => return Ok(()),
        };
        for page in 0..mirror.pages() {
            self.ctrl.set_page_address(page)?;
            self.ctrl.set_column_address(0)?;
            self.ctrl.write_data_buf(mirror.page(page))?;
        }
        trace!("display: flushed {=u8} pages", mirror.pages());
        Ok(())
    }

    /// Same as `put_framebuffer`.
    pub fn flush(&mut self) -> Result<(), C::Error> {
        self.put_framebuffer()
    }

    /// Give back the controller and the mirror.
    pub fn release(self) -> (C, Option<Framebuffer<'buf>>) {
        (self.ctrl, self.mirror)
    }

    fn address(&mut self, page: u8, column: u8) -> Result<(), C::Error> {
        self.ctrl.set_page_address(page)?;
        self.ctrl.set_column_address(column)
    }
}

impl<'buf, C> Display for OledDisplay<'buf, C>
where
    C: DisplayController,
{
    type Error = C::Error;

    fn width(&self) -> u8 {
        self.width
    }

    fn height(&self) -> u8 {
        self.height
    }

    fn get_byte(&mut self, page: u8, column: u8) -> Result<u8, C::Error> {
        if let Some(mirror) = self.mirror.as_ref() {
            return Ok(mirror.read(page, column));
        }
        self.address(page, column)?;
        self.ctrl.read_data()
    }

    fn put_byte(&mut self, page: u8, column: u8, data: u8) -> Result<(), C::Error> {
        // The controller masks addresses, so an unclipped write would land on a visible column.
        if page >= self.pages() || column >= self.width {
            return Ok(());
        }
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.write(page, column, data);
        }
        self.address(page, column)?;
        self.ctrl.write_data(data)
    }

    fn get_page(&mut self, page: u8, offset: u8, buf: &mut [u8]) -> Result<(), C::Error> {
        if let Some(mirror) = self.mirror.as_ref() {
            mirror.read_page(page, offset, buf);
            return Ok(());
        }
        self.address(page, offset)?;
        for byte in buf.iter_mut() {
            *byte = self.ctrl.read_data()?;
        }
        Ok(())
    }

    fn put_page(&mut self, page: u8, offset: u8, data: &[u8]) -> Result<(), C::Error> {
        if page >= self.pages() || offset >= self.width {
            return Ok(());
        }
        let data = &data[..data.len().min(usize::from(self.width - offset))];
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.write_page(page, offset, data);
        }
        if data.is_empty() {
            return Ok(());
        }
        self.address(page, offset)?;
        self.ctrl.write_data_buf(data)
    }

    /// Resets the controller's scan start line to 0, then zero-fills display memory.
    fn init(&mut self) -> Result<(), C::Error> {
        self.ctrl.set_start_line_address(0)?;
        self.clear()?;
        debug!("display: {=u8}x{=u8} cleared", self.width, self.height);
        Ok(())
    }
}
