//! A display held entirely in RAM.
//!
//! On its own a `Framebuffer` is a display with no hardware behind it, for off-screen composition
//! and tests. Attached to an `OledDisplay` it mirrors the controller's display RAM so that reads,
//! which a write-only link cannot serve, return what was last written.

use core::convert::Infallible;

use super::Display;

/// A `width` by `height` pixel buffer of `width * height / 8` bytes, addressed
/// `page * width + column`.
///
/// Reads outside the buffer return zero and writes outside it are dropped.
pub struct Framebuffer<'buf> {
    buf: &'buf mut [u8],
    width: u8,
    height: u8,
}

/// A display with no controller, drawing only into RAM.
pub type NullDisplay<'buf> = Framebuffer<'buf>;

impl<'buf> Framebuffer<'buf> {
    /// Wrap `buf` as a `width` by `height` pixel framebuffer.
    ///
    /// Panics if `height` is not a whole number of pages or `buf` is too short to hold them.
    pub fn new(buf: &'buf mut [u8], width: u8, height: u8) -> Self {
        if height % 8 != 0 || buf.len() < usize::from(width) * usize::from(height) / 8 {
            panic!("Framebuffer too small for the requested display size.");
        }
        Framebuffer { buf, width, height }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn pages(&self) -> u8 {
        self.height / 8
    }

    /// The display memory, page after page.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// The `width` bytes of one page. Empty if `page` is out of range.
    pub fn page(&self, page: u8) -> &[u8] {
        match self.index(page, 0) {
            Some(start) => &self.buf[start..start + usize::from(self.width)],
            None => &[],
        }
    }

    pub fn read(&self, page: u8, column: u8) -> u8 {
        self.index(page, column).map_or(0, |i| self.buf[i])
    }

    pub fn write(&mut self, page: u8, column: u8, data: u8) {
        if let Some(i) = self.index(page, column) {
            self.buf[i] = data;
        }
    }

    /// Copy from `page`, starting at column `offset`, into `buf`. Bytes past the right edge
    /// read as zero.
    pub fn read_page(&self, page: u8, offset: u8, buf: &mut [u8]) {
        let row = self.span(page, offset, buf.len());
        buf[..row.len()].copy_from_slice(&self.buf[row.clone()]);
        for byte in buf[row.len()..].iter_mut() {
            *byte = 0;
        }
    }

    /// Copy `data` into `page` starting at column `offset`, dropping whatever runs past the
    /// right edge.
    pub fn write_page(&mut self, page: u8, offset: u8, data: &[u8]) {
        let row = self.span(page, offset, data.len());
        let len = row.len();
        self.buf[row].copy_from_slice(&data[..len]);
    }

    fn len(&self) -> usize {
        usize::from(self.width) * usize::from(self.pages())
    }

    fn index(&self, page: u8, column: u8) -> Option<usize> {
        if page >= self.pages() || column >= self.width {
            return None;
        }
        Some(usize::from(page) * usize::from(self.width) + usize::from(column))
    }

    /// The buffer range covering at most `len` bytes of `page` from column `offset`.
    fn span(&self, page: u8, offset: u8, len: usize) -> core::ops::Range<usize> {
        match self.index(page, offset) {
            Some(start) => {
                let len = len.min(usize::from(self.width - offset));
                start..start + len
            }
            None => 0..0,
        }
    }
}

impl<'buf> Display for Framebuffer<'buf> {
    type Error = Infallible;

    fn width(&self) -> u8 {
        self.width
    }

    fn height(&self) -> u8 {
        self.height
    }

    fn get_byte(&mut self, page: u8, column: u8) -> Result<u8, Infallible> {
        Ok(self.read(page, column))
    }

    fn put_byte(&mut self, page: u8, column: u8, data: u8) -> Result<(), Infallible> {
        self.write(page, column, data);
        Ok(())
    }

    fn get_page(&mut self, page: u8, offset: u8, buf: &mut [u8]) -> Result<(), Infallible> {
        self.read_page(page, offset, buf);
        Ok(())
    }

    fn put_page(&mut self, page: u8, offset: u8, data: &[u8]) -> Result<(), Infallible> {
        self.write_page(page, offset, data);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Infallible> {
        let len = self.len();
        for byte in self.buf[..len].iter_mut() {
            *byte = 0;
        }
        Ok(())
    }
}
