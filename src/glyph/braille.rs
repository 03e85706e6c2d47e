//! Braille pattern rendering: 2x4 sub-pixels per character cell.
//!
//! Each braille character encodes a 2x4 dot matrix, giving eight sub-pixels
//! per cell - the highest spatial resolution mode.

use crate::glyph::grid::CharGrid;
use crate::pixel::PixelBuffer;

/// Braille base character (U+2800, empty pattern).
pub const BRAILLE_BASE: char = '\u{2800}';

/// Unicode bit for the dot at `DOT_BITS[column][row]`.
pub const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

/// Convert a 2x4 boolean dot grid to a braille character.
///
/// Unicode assigns the dot bits non-linearly:
/// ```text
/// [0,0]=0x01  [1,0]=0x08
/// [0,1]=0x02  [1,1]=0x10
/// [0,2]=0x04  [1,2]=0x20
/// [0,3]=0x40  [1,3]=0x80
/// ```
///
/// # Arguments
/// * `dots` - `dots[x][y]` indicates whether the dot at column x, row y is on
///
/// # Returns
/// The corresponding character in U+2800..=U+28FF.
pub fn dots_to_char(dots: [[bool; 4]; 2]) -> char {
    let mut pattern = 0u8;
    for x in 0..2 {
        for y in 0..4 {
            if dots[x][y] {
                pattern |= DOT_BITS[x][y];
            }
        }
    }
    char::from_u32(BRAILLE_BASE as u32 + pattern as u32).unwrap_or(BRAILLE_BASE)
}

/// Encode a frame as braille patterns, one per 2x4 pixel block.
///
/// Blocks are laid out with ceiling division; sub-pixels past the frame
/// edge count as unlit. A dot turns on when its luminance strictly
/// exceeds `threshold`.
pub fn encode_braille(src: &PixelBuffer, threshold: u8, invert: bool) -> CharGrid {
    if src.width == 0 || src.height == 0 {
        return CharGrid::new(0, 0);
    }

    let cols = src.width.div_ceil(2) as usize;
    let rows = src.height.div_ceil(4) as usize;
    let mut cells = Vec::with_capacity(cols * rows);

    for cy in 0..rows {
        for cx in 0..cols {
            let mut dots = [[false; 4]; 2];
            for (dx, column) in dots.iter_mut().enumerate() {
                for (dy, dot) in column.iter_mut().enumerate() {
                    let x = cx as u32 * 2 + dx as u32;
                    let y = cy as u32 * 4 + dy as u32;
                    // Out-of-bounds sub-pixels stay unlit
                    if x >= src.width || y >= src.height {
                        continue;
                    }
                    let lum = src.luminance_at(x as i64, y as i64);
                    let lum = if invert { 255 - lum } else { lum };
                    *dot = lum > threshold;
                }
            }
            cells.push(dots_to_char(dots));
        }
    }

    CharGrid::from_cells(cols, rows, cells)
}
