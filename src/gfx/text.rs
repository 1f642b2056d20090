//! Text drawing with fixed-width bitmap fonts.

use super::Gfx;
use crate::display::{Display, PixelOp};
use crate::font::Font;

impl<'d, D> Gfx<'d, D>
where
    D: Display,
{
    /// Draw character `c` with its upper left corner at `x`, `y`.
    ///
    /// The character cell is cleared first, then the glyph's set pixels are drawn over it.
    /// Characters the font has no glyph for leave the cell blank.
    pub fn draw_char(&mut self, c: u8, x: i16, y: i16, font: &Font) -> Result<(), D::Error> {
        let (width, height) = (i16::from(font.width), i16::from(font.height));
        self.draw_filled_rect(x, y, width, height, PixelOp::Clear)?;

        let glyph = match font.glyph(c) {
            Some(glyph) if font.width > 0 => glyph,
            _ => return Ok(()),
        };
        for (row, bits) in glyph.chunks(font.row_stride()).enumerate() {
            let py = i32::from(y) + row as i32;
            for column in 0..usize::from(font.width) {
                if bits[column / 8] & (0x80 >> (column % 8)) != 0 {
                    self.plot(i32::from(x) + column as i32, py, PixelOp::Set)?;
                }
            }
        }
        Ok(())
    }

    /// Draw `s` with its upper left corner at `x`, `y`.
    ///
    /// `'\n'` starts a new line one pixel below the previous one, back at `x`. `'\r'` is
    /// skipped.
    pub fn draw_string<S>(&mut self, s: S, x: i16, y: i16, font: &Font) -> Result<(), D::Error>
    where
        S: AsRef<[u8]>,
    {
        let (mut cx, mut cy) = (x, y);
        for &c in s.as_ref() {
            match c {
                b'\n' => {
                    cx = x;
                    cy = cy.saturating_add(i16::from(font.height) + 1);
                }
                b'\r' => {}
                _ => {
                    self.draw_char(c, cx, cy, font)?;
                    cx = cx.saturating_add(i16::from(font.width));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::Framebuffer;
    use crate::font::BASIC_6X7;
    use crate::gfx::test_helpers::{lit, points};
    use std::collections::BTreeSet;

    fn lit_in_cell(fb: &mut Framebuffer, x0: i16, y0: i16) -> BTreeSet<(i16, i16)> {
        lit(fb)
            .into_iter()
            .filter(|&(x, y)| x >= x0 && x < x0 + 6 && y >= y0 && y < y0 + 7)
            .map(|(x, y)| (x - x0, y - y0))
            .collect()
    }

    #[test]
    fn glyph_rows_are_msb_first() {
        let mut buf = [0u8; 64];
        let mut fb = Framebuffer::new(&mut buf, 32, 16);
        Gfx::new(&mut fb).draw_char(b'L', 0, 0, &BASIC_6X7).unwrap();
        // 'L' is a vertical bar in the leftmost column with a foot along the bottom row.
        assert_eq!(
            lit(&mut fb),
            points(&[
                (0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6),
                (1, 6), (2, 6), (3, 6), (4, 6),
            ])
        );
    }

    #[test]
    fn char_clears_its_cell_first() {
        let mut buf = [0xFFu8; 64];
        let mut fb = Framebuffer::new(&mut buf, 32, 16);
        Gfx::new(&mut fb).draw_char(b' ', 2, 1, &BASIC_6X7).unwrap();
        let all = lit(&mut fb);
        for x in 2..8 {
            for y in 1..8 {
                assert!(!all.contains(&(x, y)));
            }
        }
        assert!(all.contains(&(1, 1)));
        assert!(all.contains(&(8, 1)));
        assert!(all.contains(&(2, 0)));
        assert!(all.contains(&(2, 8)));
    }

    #[test]
    fn unknown_char_leaves_a_blank_cell() {
        let mut buf = [0xFFu8; 64];
        let mut fb = Framebuffer::new(&mut buf, 32, 16);
        Gfx::new(&mut fb).draw_char(b'~', 0, 0, &BASIC_6X7).unwrap();
        assert!(lit_in_cell(&mut fb, 0, 0).is_empty());
    }

    #[test]
    fn string_advances_by_glyph_width() {
        let mut a_buf = [0u8; 64];
        let mut a = Framebuffer::new(&mut a_buf, 32, 16);
        Gfx::new(&mut a).draw_string("AB", 1, 2, &BASIC_6X7).unwrap();

        let mut b_buf = [0u8; 64];
        let mut b = Framebuffer::new(&mut b_buf, 32, 16);
        let mut gfx = Gfx::new(&mut b);
        gfx.draw_char(b'A', 1, 2, &BASIC_6X7).unwrap();
        gfx.draw_char(b'B', 7, 2, &BASIC_6X7).unwrap();

        assert_eq!(lit(&mut a), lit(&mut b));
    }

    #[test]
    fn newline_returns_to_start_column() {
        let mut buf = [0u8; 96];
        let mut fb = Framebuffer::new(&mut buf, 32, 24);
        Gfx::new(&mut fb)
            .draw_string("I\r\nI", 3, 0, &BASIC_6X7)
            .unwrap();
        let first = lit_in_cell(&mut fb, 3, 0);
        assert!(!first.is_empty());
        // Next line starts one pixel below the glyph height.
        assert_eq!(lit_in_cell(&mut fb, 3, 8), first);
        assert_eq!(lit(&mut fb).len(), 2 * first.len());
    }

    #[test]
    fn byte_and_str_sources_draw_the_same() {
        static TITLE: &[u8] = b"Hi\n:)";
        let mut a_buf = [0u8; 64];
        let mut a = Framebuffer::new(&mut a_buf, 32, 16);
        Gfx::new(&mut a).draw_string(TITLE, 0, 0, &BASIC_6X7).unwrap();

        let mut b_buf = [0u8; 64];
        let mut b = Framebuffer::new(&mut b_buf, 32, 16);
        let ram = String::from("Hi\n:)");
        Gfx::new(&mut b).draw_string(&ram, 0, 0, &BASIC_6X7).unwrap();

        assert_eq!(lit(&mut a), lit(&mut b));
    }

    #[test]
    fn empty_string_draws_nothing() {
        let mut buf = [0xFFu8; 64];
        let mut fb = Framebuffer::new(&mut buf, 32, 16);
        Gfx::new(&mut fb).draw_string("", 0, 0, &BASIC_6X7).unwrap();
        assert_eq!(lit(&mut fb).len(), 32 * 16);
    }

    #[test]
    fn zero_width_font_draws_nothing() {
        static DATA: [u8; 0] = [];
        let font = Font {
            data: &DATA,
            width: 0,
            height: 7,
            first_char: b'A',
            last_char: b'A',
            line_spacing: 8,
        };
        let mut buf = [0u8; 64];
        let mut fb = Framebuffer::new(&mut buf, 32, 16);
        Gfx::new(&mut fb).draw_string("AA", 0, 0, &font).unwrap();
        assert!(lit(&mut fb).is_empty());
    }

    #[test]
    fn text_clips_at_the_edge() {
        let mut buf = [0u8; 16];
        let mut fb = Framebuffer::new(&mut buf, 8, 16);
        Gfx::new(&mut fb)
            .draw_string("LL", -3, 10, &BASIC_6X7)
            .unwrap();
        // The first 'L' is off the left edge, and both feet fall below the bottom row.
        assert_eq!(
            lit(&mut fb),
            points(&[(3, 10), (3, 11), (3, 12), (3, 13), (3, 14), (3, 15)])
        );
    }
}
