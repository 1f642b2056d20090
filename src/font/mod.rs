//! Fixed-width bitmap fonts.

mod basic_6x7;

pub use self::basic_6x7::BASIC_6X7;

/// A fixed-width font covering the contiguous character range `first_char..=last_char`.
///
/// Each glyph is `height` rows of `row_stride()` bytes, the leftmost pixel of a row in the most
/// significant bit of its first byte. Glyphs are stored back to back in character order.
#[derive(Clone, Copy, Debug)]
pub struct Font {
    pub data: &'static [u8],
    /// Glyph width in pixels, including any spacing column.
    pub width: u8,
    /// Glyph height in pixels.
    pub height: u8,
    pub first_char: u8,
    pub last_char: u8,
    pub line_spacing: u8,
}

impl Font {
    /// Bytes per glyph row.
    pub fn row_stride(&self) -> usize {
        (usize::from(self.width) + 7) / 8
    }

    /// The rows of the glyph for `c`, or `None` if the font has no such glyph.
    pub fn glyph(&self, c: u8) -> Option<&'static [u8]> {
        if c < self.first_char || c > self.last_char {
            return None;
        }
        let size = self.row_stride() * usize::from(self.height);
        let start = usize::from(c - self.first_char) * size;
        self.data.get(start..start + size)
    }

    /// The size in pixels of the box `draw_string` covers when drawing `s`, as
    /// `(width, height)`.
    ///
    /// The width is that of the longest line, at least 1 even when `s` is empty. The height
    /// counts one glyph height per line. Carriage returns take no space.
    pub fn bounding_box<S>(&self, s: S) -> (i16, i16)
    where
        S: AsRef<[u8]>,
    {
        let (font_width, font_height) = (i16::from(self.width), i16::from(self.height));
        let mut max_width = 1i16;
        let mut height = font_height;
        let mut x = 0i16;
        for &c in s.as_ref() {
            match c {
                b'\n' => {
                    x = 0;
                    height = height.saturating_add(font_height);
                }
                b'\r' => {}
                _ => {
                    x = x.saturating_add(font_width);
                    max_width = max_width.max(x);
                }
            }
        }
        (max_width, height)
    }
}
