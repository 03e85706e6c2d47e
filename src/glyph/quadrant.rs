//! Quadrant block rendering: 2x2 sub-pixels per character cell.
//!
//! Each output glyph encodes which quadrants of a 2x2 pixel block are lit,
//! using the Unicode block elements. This doubles the effective spatial
//! resolution in both axes compared to one-pixel-per-cell ramps.

use crate::glyph::grid::CharGrid;
use crate::pixel::PixelBuffer;

/// The sixteen quadrant glyphs indexed by bit pattern
/// (TL = 1, TR = 2, BL = 4, BR = 8).
pub const QUADRANT_GLYPHS: [char; 16] = [
    ' ', '▘', '▝', '▀', '▖', '▌', '▞', '▛', '▗', '▚', '▐', '▜', '▄', '▙', '▟', '█',
];

/// Convert a quadrant bit pattern (0-15) to its glyph.
pub fn pattern_to_glyph(bits: u8) -> char {
    QUADRANT_GLYPHS[(bits & 0x0F) as usize]
}

/// Encode a frame as quadrant glyphs, one per 2x2 pixel block.
///
/// Blocks are laid out with ceiling division, so frames whose dimensions
/// are not multiples of two still encode fully; sub-pixels past the edge
/// count as unlit. A sub-pixel sets its bit when its luminance strictly
/// exceeds `threshold`.
pub fn encode_quadrant(src: &PixelBuffer, threshold: u8, invert: bool) -> CharGrid {
    if src.width == 0 || src.height == 0 {
        return CharGrid::new(0, 0);
    }

    let cols = src.width.div_ceil(2) as usize;
    let rows = src.height.div_ceil(2) as usize;
    let mut cells = Vec::with_capacity(cols * rows);

    for cy in 0..rows {
        for cx in 0..cols {
            let mut bits = 0u8;
            for dy in 0..2u32 {
                for dx in 0..2u32 {
                    let x = cx as u32 * 2 + dx;
                    let y = cy as u32 * 2 + dy;
                    // Out-of-bounds sub-pixels stay unlit
                    if x >= src.width || y >= src.height {
                        continue;
                    }
                    let lum = src.luminance_at(x as i64, y as i64);
                    let lum = if invert { 255 - lum } else { lum };
                    if lum > threshold {
                        bits |= 1 << (dy * 2 + dx);
                    }
                }
            }
            cells.push(pattern_to_glyph(bits));
        }
    }

    CharGrid::from_cells(cols, rows, cells)
}
