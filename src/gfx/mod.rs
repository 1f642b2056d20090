//! Rasterization of lines, rectangles, circles and bitmaps onto any `Display`.
//!
//! Coordinates are signed so shapes may hang off any edge of the display; whatever falls outside
//! is clipped away, never reported as an error.

pub mod text;

use crate::display::{Display, PixelOp};

pub mod mask {
    //! Circle section masks for `Gfx::draw_circle` and `Gfx::draw_filled_circle`.
    //!
    //! Octants are numbered counter-clockwise starting just above the positive x axis. Quadrant
    //! 0 is the upper right one, also numbered counter-clockwise. Masks combine with `|`.

    pub const OCTANT0: u8 = 1 << 0;
    pub const OCTANT1: u8 = 1 << 1;
    pub const OCTANT2: u8 = 1 << 2;
    pub const OCTANT3: u8 = 1 << 3;
    pub const OCTANT4: u8 = 1 << 4;
    pub const OCTANT5: u8 = 1 << 5;
    pub const OCTANT6: u8 = 1 << 6;
    pub const OCTANT7: u8 = 1 << 7;

    pub const QUADRANT0: u8 = OCTANT0 | OCTANT1;
    pub const QUADRANT1: u8 = OCTANT2 | OCTANT3;
    pub const QUADRANT2: u8 = OCTANT4 | OCTANT5;
    pub const QUADRANT3: u8 = OCTANT6 | OCTANT7;

    pub const TOP_HALF: u8 = QUADRANT0 | QUADRANT1;
    pub const LEFT_HALF: u8 = QUADRANT1 | QUADRANT2;
    pub const BOTTOM_HALF: u8 = QUADRANT2 | QUADRANT3;
    pub const RIGHT_HALF: u8 = QUADRANT3 | QUADRANT0;

    pub const WHOLE: u8 = 0xFF;
}

use self::mask::*;

/// Where the bytes of a bitmap live, which decides how they are copied to the display.
#[derive(Clone, Copy, Debug)]
pub enum BitmapData<'a> {
    /// Constant data in program memory, copied one byte at a time.
    Progmem(&'static [u8]),
    /// A caller-owned buffer, copied a page row at a time.
    Ram(&'a [u8]),
}

/// A page-formatted image: `height / 8` rows of `width` bytes, each byte a column of 8 pixels,
/// least significant bit on top.
#[derive(Clone, Copy, Debug)]
pub struct Bitmap<'a> {
    pub width: u8,
    pub height: u8,
    pub data: BitmapData<'a>,
}

impl<'a> Bitmap<'a> {
    fn bytes(&self) -> &[u8] {
        match self.data {
            BitmapData::Progmem(data) => data,
            BitmapData::Ram(data) => data,
        }
    }
}

/// A drawing handle onto a display. It mutably borrows the display for as long as it lives, so
/// it is meant to be short-lived.
pub struct Gfx<'d, D> {
    display: &'d mut D,
}

impl<'d, D> Gfx<'d, D>
where
    D: Display,
{
    pub fn new(display: &'d mut D) -> Self {
        Gfx { display }
    }

    /// The display being drawn on.
    pub fn display(&mut self) -> &mut D {
        self.display
    }

    pub fn draw_pixel(&mut self, x: i16, y: i16, op: PixelOp) -> Result<(), D::Error> {
        self.display.draw_pixel(x, y, op)
    }

    /// Points computed in wider arithmetic which fall outside `i16` are off any display.
    fn plot(&mut self, x: i32, y: i32, op: PixelOp) -> Result<(), D::Error> {
        match (to_coord(x), to_coord(y)) {
            (Some(x), Some(y)) => self.display.draw_pixel(x, y, op),
            _ => Ok(()),
        }
    }

    /// Draw `length` pixels rightwards from `x`, `y`.
    pub fn draw_horizontal_line(
        &mut self,
        x: i16,
        y: i16,
        length: i16,
        op: PixelOp,
    ) -> Result<(), D::Error> {
        if length <= 0 || y < 0 || y >= i16::from(self.display.height()) {
            return Ok(());
        }
        let start = x.max(0);
        let end = (i32::from(x) + i32::from(length)).min(i32::from(self.display.width())) as i16;
        if start >= end {
            return Ok(());
        }
        let page = (y / 8) as u8;
        let pixel_mask = 1u8 << (y % 8);
        for column in (start..end).rev() {
            self.display.mask_byte(page, column as u8, pixel_mask, op)?;
        }
        Ok(())
    }

    /// Draw `length` pixels downwards from `x`, `y`, one masked byte per page spanned.
    pub fn draw_vertical_line(
        &mut self,
        x: i16,
        y: i16,
        length: i16,
        op: PixelOp,
    ) -> Result<(), D::Error> {
        self.vline(i32::from(x), i32::from(y), i32::from(length), op)
    }

    fn vline(&mut self, x: i32, y1: i32, length: i32, op: PixelOp) -> Result<(), D::Error> {
        if length <= 0 {
            return Ok(());
        }
        let y2 = y1 + length - 1;
        if y1 == y2 {
            return self.plot(x, y1, op);
        }
        if x < 0 || x >= i32::from(self.display.width()) {
            return Ok(());
        }
        let y1 = y1.max(0);
        let y2 = y2.min(i32::from(self.display.height()) - 1);
        if y1 > y2 {
            return Ok(());
        }

        let column = x as u8;
        let (y1page, y2page) = ((y1 / 8) as u8, (y2 / 8) as u8);
        let y1mask = 0xFFu8 << (y1 & 0x07);
        let y2mask = 0xFFu8 >> (7 - (y2 & 0x07));

        if y1page == y2page {
            return self.display.mask_byte(y1page, column, y1mask & y2mask, op);
        }
        self.display.mask_byte(y1page, column, y1mask, op)?;
        for page in y1page + 1..y2page {
            self.display.mask_byte(page, column, 0xFF, op)?;
        }
        self.display.mask_byte(y2page, column, y2mask, op)
    }

    /// Draw a line between two points with Bresenham's algorithm. Both endpoints are drawn.
    pub fn draw_line(
        &mut self,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        op: PixelOp,
    ) -> Result<(), D::Error> {
        let ((x1, y1), (x2, y2)) = if x1 > x2 {
            ((x2, y2), (x1, y1))
        } else {
            ((x1, y1), (x2, y2))
        };
        let (mut x, mut y) = (i32::from(x1), i32::from(y1));
        let dx = i32::from(x2) - x;
        let dy = i32::from(y2) - y;
        let yinc = if dy < 0 { -1 } else { 1 };
        let dy = dy.abs();

        if dx > dy {
            let mut e = dy - dx;
            for _ in 0..=dx {
                self.plot(x, y, op)?;
                if e >= 0 {
                    e -= dx;
                    y += yinc;
                }
                e += dy;
                x += 1;
            }
        } else {
            let mut e = dx - dy;
            for _ in 0..=dy {
                self.plot(x, y, op)?;
                if e >= 0 {
                    e -= dy;
                    x += 1;
                }
                e += dx;
                y += yinc;
            }
        }
        Ok(())
    }

    /// Draw the outline of a `width` by `height` rectangle with its upper left corner at `x`,
    /// `y`.
    ///
    /// Each corner pixel belongs to both a horizontal and a vertical edge and is drawn twice, so
    /// with `PixelOp::Xor` the corners toggle back to their original state.
    pub fn draw_rect(
        &mut self,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        op: PixelOp,
    ) -> Result<(), D::Error> {
        let right = i32::from(x) + i32::from(width) - 1;
        let bottom = i32::from(y) + i32::from(height) - 1;
        self.draw_horizontal_line(x, y, width, op)?;
        if let Some(bottom) = to_coord(bottom) {
            self.draw_horizontal_line(x, bottom, width, op)?;
        }
        self.vline(i32::from(x), i32::from(y), i32::from(height), op)?;
        self.vline(right, i32::from(y), i32::from(height), op)
    }

    pub fn draw_filled_rect(
        &mut self,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        op: PixelOp,
    ) -> Result<(), D::Error> {
        for row in (0..height.max(0)).rev() {
            if let Some(y) = y.checked_add(row) {
                self.draw_horizontal_line(x, y, width, op)?;
            }
        }
        Ok(())
    }

    /// Draw the octants of a circle outline selected by `octant_mask` (see `mask`). A zero
    /// radius draws the center pixel.
    pub fn draw_circle(
        &mut self,
        x: i16,
        y: i16,
        radius: i16,
        op: PixelOp,
        octant_mask: u8,
    ) -> Result<(), D::Error> {
        if radius < 0 {
            return Ok(());
        }
        if radius == 0 {
            return self.draw_pixel(x, y, op);
        }
        let (x, y) = (i32::from(x), i32::from(y));
        let mut ox = 0i32;
        let mut oy = i32::from(radius);
        let mut error = 3 - 2 * oy;

        while ox <= oy {
            let points = [
                (OCTANT0, x + oy, y - ox),
                (OCTANT1, x + ox, y - oy),
                (OCTANT2, x - ox, y - oy),
                (OCTANT3, x - oy, y - ox),
                (OCTANT4, x - oy, y + ox),
                (OCTANT5, x - ox, y + oy),
                (OCTANT6, x + ox, y + oy),
                (OCTANT7, x + oy, y + ox),
            ];
            for &(octant, px, py) in points.iter() {
                if octant_mask & octant != 0 {
                    self.plot(px, py, op)?;
                }
            }

            if error < 0 {
                error += 4 * ox + 6;
            } else {
                error += 4 * (ox - oy) + 10;
                oy -= 1;
            }
            ox += 1;
        }
        Ok(())
    }

    /// Fill the quadrants of a circle selected by `quadrant_mask` (see `mask`), as vertical
    /// spans running from the horizontal diameter out to the edge. A zero radius draws the
    /// center pixel.
    pub fn draw_filled_circle(
        &mut self,
        x: i16,
        y: i16,
        radius: i16,
        op: PixelOp,
        quadrant_mask: u8,
    ) -> Result<(), D::Error> {
        if radius < 0 {
            return Ok(());
        }
        if radius == 0 {
            return self.draw_pixel(x, y, op);
        }
        let (x, y) = (i32::from(x), i32::from(y));
        let mut ox = 0i32;
        let mut oy = i32::from(radius);
        let mut error = 3 - 2 * oy;

        while ox <= oy {
            if quadrant_mask & QUADRANT0 != 0 {
                self.vline(x + oy, y - ox, ox + 1, op)?;
                self.vline(x + ox, y - oy, oy + 1, op)?;
            }
            if quadrant_mask & QUADRANT1 != 0 {
                self.vline(x - oy, y - ox, ox + 1, op)?;
                self.vline(x - ox, y - oy, oy + 1, op)?;
            }
            if quadrant_mask & QUADRANT2 != 0 {
                self.vline(x - oy, y, ox + 1, op)?;
                self.vline(x - ox, y, oy + 1, op)?;
            }
            if quadrant_mask & QUADRANT3 != 0 {
                self.vline(x + oy, y, ox + 1, op)?;
                self.vline(x + ox, y, oy + 1, op)?;
            }

            if error < 0 {
                error += 4 * ox + 6;
            } else {
                error += 4 * (ox - oy) + 10;
                oy -= 1;
            }
            ox += 1;
        }
        Ok(())
    }

    /// Copy `bitmap` to the display with its upper left corner at `x`, `y`, where `y` is
    /// rounded down to the page containing it.
    pub fn put_bitmap(&mut self, bitmap: &Bitmap, x: i16, y: i16) -> Result<(), D::Error> {
        let width = usize::from(bitmap.width);
        if width == 0 {
            return Ok(());
        }
        let first_page = i32::from(y).div_euclid(8);
        let display_width = i32::from(self.display.width());
        let display_pages = i32::from(self.display.pages());
        let rows = bitmap.bytes().chunks(width).take(usize::from(bitmap.height / 8));

        for (i, row) in rows.enumerate() {
            let page = first_page + i as i32;
            if page < 0 || page >= display_pages {
                continue;
            }
            // Drop the columns hanging off either side.
            let skip = (-i32::from(x)).max(0) as usize;
            let start = i32::from(x).max(0);
            if skip >= row.len() || start >= display_width {
                continue;
            }
            let visible = (row.len() - skip).min((display_width - start) as usize);
            let row = &row[skip..skip + visible];
            let (page, start) = (page as u8, start as u8);

            match bitmap.data {
                BitmapData::Progmem(_) => {
                    for (column, byte) in (start..).zip(row) {
                        self.display.put_byte(page, column, *byte)?;
                    }
                }
                BitmapData::Ram(_) => self.display.put_page(page, start, row)?,
            }
        }
        Ok(())
    }
}

fn to_coord(v: i32) -> Option<i16> {
    if v < i32::from(i16::MIN) || v > i32::from(i16::MAX) {
        None
    } else {
        Some(v as i16)
    }
}
