//! Built-in 5x7 bitmap font and glyph cell rendering.
//!
//! The table covers printable ASCII (0x20..=0x7E). Each glyph is seven row
//! bitmasks, top to bottom, with bit 4 as the leftmost pixel so the binary
//! literals below read like the glyph itself. Character grids also emit
//! Unicode shade blocks, quadrant blocks, and braille patterns; those are
//! synthesized geometrically rather than stored as bitmaps.

use crate::glyph::{BRAILLE_BASE, DOT_BITS, QUADRANT_GLYPHS};
use crate::pixel::Rgba;
use crate::raster::Raster;

/// Glyph bitmap width in pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph bitmap height in pixels.
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character cell (glyph plus 1px gap).
pub const CELL_WIDTH: u32 = 6;
/// Vertical advance per character cell (glyph plus 1px gap).
pub const CELL_HEIGHT: u32 = 8;

/// Row bitmaps for ASCII 0x20..=0x7E, indexed by `code - 0x20`.
#[rustfmt::skip]
const GLYPHS_5X7: [[u8; 7]; 95] = [
    // ' '
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    // '!'
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
    // '"'
    [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000],
    // '#'
    [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
    // '$'
    [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100],
    // '%'
    [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
    // '&'
    [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
    // '\''
    [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    // '('
    [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
    // ')'
    [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
    // '*'
    [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
    // '+'
    [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
    // ','
    [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
    // '-'
    [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
    // '.'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
    // '/'
    [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
    // '0'
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    // '1'
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    // '2'
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    // '3'
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    // '4'
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    // '5'
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    // '6'
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    // '7'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    // '8'
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    // '9'
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
    // ':'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
    // ';'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000],
    // '<'
    [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
    // '='
    [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
    // '>'
    [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
    // '?'
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
    // '@'
    [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
    // 'A'
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    // 'B'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
    // 'C'
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
    // 'D'
    [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
    // 'E'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
    // 'F'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
    // 'G'
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
    // 'H'
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    // 'I'
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    // 'J'
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
    // 'K'
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
    // 'L'
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
    // 'M'
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
    // 'N'
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
    // 'O'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    // 'P'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
    // 'Q'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
    // 'R'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
    // 'S'
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
    // 'T'
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
    // 'U'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    // 'V'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
    // 'W'
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
    // 'X'
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
    // 'Y'
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
    // 'Z'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
    // '['
    [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110],
    // '\\'
    [0b00000, 0b10000, 0b01000, 0b00100, 0b00010, 0b00001, 0b00000],
    // ']'
    [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110],
    // '^'
    [0b00100, 0b01010, 0b10001, 0b00000, 0b00000, 0b00000, 0b00000],
    // '_'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
    // '`'
    [0b01000, 0b00100, 0b00010, 0b00000, 0b00000, 0b00000, 0b00000],
    // 'a'
    [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
    // 'b'
    [0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
    // 'c'
    [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
    // 'd'
    [0b00001, 0b00001, 0b01111, 0b10001, 0b10001, 0b10001, 0b01111],
    // 'e'
    [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
    // 'f'
    [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
    // 'g'
    [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
    // 'h'
    [0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b10001, 0b10001],
    // 'i'
    [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
    // 'j'
    [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100],
    // 'k'
    [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
    // 'l'
    [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    // 'm'
    [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10101, 0b10101],
    // 'n'
    [0b00000, 0b00000, 0b11110, 0b10001, 0b10001, 0b10001, 0b10001],
    // 'o'
    [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
    // 'p'
    [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
    // 'q'
    [0b00000, 0b00000, 0b01111, 0b10001, 0b01111, 0b00001, 0b00001],
    // 'r'
    [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
    // 's'
    [0b00000, 0b00000, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
    // 't'
    [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
    // 'u'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
    // 'v'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
    // 'w'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010],
    // 'x'
    [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
    // 'y'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
    // 'z'
    [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
    // '{'
    [0b00010, 0b00100, 0b00100, 0b01000, 0b00100, 0b00100, 0b00010],
    // '|'
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
    // '}'
    [0b01000, 0b00100, 0b00100, 0b00010, 0b00100, 0b00100, 0b01000],
    // '~'
    [0b00000, 0b00000, 0b01000, 0b10101, 0b00010, 0b00000, 0b00000],
];

/// Look up the bitmap rows for a printable ASCII character.
pub fn glyph(c: char) -> Option<&'static [u8; 7]> {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        Some(&GLYPHS_5X7[(code - 0x20) as usize])
    } else {
        None
    }
}

/// Whether the glyph bitmap pixel at `(x, y)` is set.
#[inline]
pub fn pixel_set(rows: &[u8; 7], x: u32, y: u32) -> bool {
    x < GLYPH_WIDTH && y < GLYPH_HEIGHT && rows[y as usize] & (1 << (GLYPH_WIDTH - 1 - x)) != 0
}

/// Draw one ASCII glyph with its top-left corner at `(x, y)` and an integer
/// scale factor. Unknown characters draw nothing.
pub fn draw_char_scaled(raster: &mut Raster, c: char, x: i32, y: i32, scale: u32, color: Rgba) {
    let Some(rows) = glyph(c) else {
        return;
    };
    let scale = scale.max(1) as i32;
    for gy in 0..GLYPH_HEIGHT {
        for gx in 0..GLYPH_WIDTH {
            if !pixel_set(rows, gx, gy) {
                continue;
            }
            let px = x + gx as i32 * scale;
            let py = y + gy as i32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    raster.blend_pixel(px + dx, py + dy, color);
                }
            }
        }
    }
}

/// Draw one ASCII glyph at 1:1 scale.
pub fn draw_char(raster: &mut Raster, c: char, x: i32, y: i32, color: Rgba) {
    draw_char_scaled(raster, c, x, y, 1, color);
}

/// Draw a text run left to right, advancing [`CELL_WIDTH`] per character.
pub fn draw_text(raster: &mut Raster, text: &str, x: i32, y: i32, color: Rgba) {
    for (i, c) in text.chars().enumerate() {
        draw_char(raster, c, x + (i as i32) * CELL_WIDTH as i32, y, color);
    }
}

/// Paint one character-grid cell into a [`CELL_WIDTH`]x[`CELL_HEIGHT`] box.
///
/// ASCII goes through the bitmap table; shade blocks, quadrant blocks, and
/// braille patterns are synthesized so every charset the encoders emit has
/// a raster rendition.
pub fn draw_cell(raster: &mut Raster, c: char, x: i32, y: i32, color: Rgba) {
    match c {
        '░' => draw_shade(raster, x, y, 1, color),
        '▒' => draw_shade(raster, x, y, 2, color),
        '▓' => draw_shade(raster, x, y, 3, color),
        _ if (BRAILLE_BASE..='\u{28FF}').contains(&c) => {
            draw_braille_cell(raster, c, x, y, color);
        }
        _ => {
            if let Some(bits) = quadrant_bits(c) {
                draw_quadrant_cell(raster, bits, x, y, color);
            } else {
                draw_char(raster, c, x, y, color);
            }
        }
    }
}

/// Reverse lookup from a quadrant block character to its 4-bit pattern.
fn quadrant_bits(c: char) -> Option<u8> {
    // Index 0 is the space character, which ASCII drawing already handles
    QUADRANT_GLYPHS
        .iter()
        .position(|&g| g == c && c != ' ')
        .map(|i| i as u8)
}

/// Stipple fill for the Unicode shade blocks at density 1..=3 out of 4.
fn draw_shade(raster: &mut Raster, x: i32, y: i32, density: u32, color: Rgba) {
    for dy in 0..CELL_HEIGHT {
        for dx in 0..CELL_WIDTH {
            let phase = (dx + 2 * dy) % 4;
            let lit = match density {
                1 => phase == 0,
                2 => phase % 2 == 0,
                _ => phase != 3,
            };
            if lit {
                raster.blend_pixel(x + dx as i32, y + dy as i32, color);
            }
        }
    }
}

/// Fill cell halves for a quadrant block pattern (TL=1, TR=2, BL=4, BR=8).
fn draw_quadrant_cell(raster: &mut Raster, bits: u8, x: i32, y: i32, color: Rgba) {
    let half_w = (CELL_WIDTH / 2) as i32;
    let half_h = (CELL_HEIGHT / 2) as i32;
    for (bit, (qx, qy)) in [(0, 0), (1, 0), (0, 1), (1, 1)].into_iter().enumerate() {
        if bits & (1 << bit) == 0 {
            continue;
        }
        let x0 = x + qx * half_w;
        let y0 = y + qy * half_h;
        for dy in 0..half_h {
            for dx in 0..half_w {
                raster.blend_pixel(x0 + dx, y0 + dy, color);
            }
        }
    }
}

/// Draw a braille pattern as a 2x4 grid of dots.
fn draw_braille_cell(raster: &mut Raster, c: char, x: i32, y: i32, color: Rgba) {
    let pattern = (c as u32 - BRAILLE_BASE as u32) as u8;
    for (col, col_bits) in DOT_BITS.iter().enumerate() {
        for (row, &bit) in col_bits.iter().enumerate() {
            if pattern & bit == 0 {
                continue;
            }
            let dx = x + 1 + col as i32 * 3;
            let dy = y + row as i32 * 2;
            raster.blend_pixel(dx, dy, color);
            raster.blend_pixel(dx + 1, dy, color);
            raster.blend_pixel(dx, dy + 1, color);
            raster.blend_pixel(dx + 1, dy + 1, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_printable_ascii() {
        assert_eq!(GLYPHS_5X7.len(), 95);
        assert!(glyph(' ').is_some());
        assert!(glyph('~').is_some());
        assert!(glyph('\u{7F}').is_none());
        assert!(glyph('█').is_none());
    }

    #[test]
    fn test_space_is_blank() {
        let rows = glyph(' ').unwrap();
        for y in 0..GLYPH_HEIGHT {
            for x in 0..GLYPH_WIDTH {
                assert!(!pixel_set(rows, x, y));
            }
        }
    }

    #[test]
    fn test_pixel_set_reads_msb_as_leftmost() {
        // 'T' row 0 is a full bar; rows below only light the center column
        let rows = glyph('T').unwrap();
        for x in 0..GLYPH_WIDTH {
            assert!(pixel_set(rows, x, 0));
        }
        assert!(pixel_set(rows, 2, 3));
        assert!(!pixel_set(rows, 0, 3));
        assert!(!pixel_set(rows, 4, 3));
    }

    #[test]
    fn test_draw_char_marks_surface() {
        let mut raster = Raster::new(8, 10);
        draw_char(&mut raster, '@', 0, 0, Rgba::WHITE);
        let lit = (0..8)
            .flat_map(|x| (0..10).map(move |y| (x, y)))
            .filter(|&(x, y)| raster.pixel_at(x, y) != Rgba::TRANSPARENT)
            .count();
        assert!(lit > 10, "'@' should light a dense pixel set, got {lit}");
    }

    #[test]
    fn test_draw_char_scaled_doubles_extent() {
        let mut raster = Raster::new(16, 16);
        draw_char_scaled(&mut raster, '|', 0, 0, 2, Rgba::WHITE);
        // Center column of '|' is x=2; at scale 2 it covers x=4..6
        assert_ne!(raster.pixel_at(4, 0), Rgba::TRANSPARENT);
        assert_ne!(raster.pixel_at(5, 13), Rgba::TRANSPARENT);
        assert_eq!(raster.pixel_at(0, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_unknown_char_draws_nothing() {
        let mut raster = Raster::new(8, 10);
        draw_char(&mut raster, 'é', 0, 0, Rgba::WHITE);
        for y in 0..10 {
            for x in 0..8 {
                assert_eq!(raster.pixel_at(x, y), Rgba::TRANSPARENT);
            }
        }
    }

    #[test]
    fn test_quadrant_cell_fills_half() {
        let mut raster = Raster::new(6, 8);
        // Upper half block: TL | TR = bits 1|2
        draw_cell(&mut raster, '▀', 0, 0, Rgba::WHITE);
        assert_eq!(raster.pixel_at(0, 0), Rgba::WHITE);
        assert_eq!(raster.pixel_at(5, 3), Rgba::WHITE);
        assert_eq!(raster.pixel_at(0, 4), Rgba::TRANSPARENT);
        assert_eq!(raster.pixel_at(5, 7), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_full_block_cell_fills_everything() {
        let mut raster = Raster::new(6, 8);
        draw_cell(&mut raster, '█', 0, 0, Rgba::WHITE);
        for y in 0..8 {
            for x in 0..6 {
                assert_eq!(raster.pixel_at(x, y), Rgba::WHITE);
            }
        }
    }

    #[test]
    fn test_shade_density_orders_coverage() {
        let count = |c: char| -> usize {
            let mut raster = Raster::new(6, 8);
            draw_cell(&mut raster, c, 0, 0, Rgba::WHITE);
            (0..6)
                .flat_map(|x| (0..8).map(move |y| (x, y)))
                .filter(|&(x, y)| raster.pixel_at(x, y) != Rgba::TRANSPARENT)
                .count()
        };
        let light = count('░');
        let medium = count('▒');
        let dark = count('▓');
        assert!(light < medium, "{light} < {medium}");
        assert!(medium < dark, "{medium} < {dark}");
        assert_eq!(count('█'), 48);
    }

    #[test]
    fn test_braille_cell_draws_dots() {
        let mut raster = Raster::new(6, 8);
        // Dot 1 only: top-left position
        draw_cell(&mut raster, '\u{2801}', 0, 0, Rgba::WHITE);
        assert_eq!(raster.pixel_at(1, 0), Rgba::WHITE);
        assert_eq!(raster.pixel_at(4, 0), Rgba::TRANSPARENT);
        // Empty pattern draws nothing
        let mut blank = Raster::new(6, 8);
        draw_cell(&mut blank, BRAILLE_BASE, 0, 0, Rgba::WHITE);
        assert_eq!(blank.pixel_at(1, 0), Rgba::TRANSPARENT);
    }
}
