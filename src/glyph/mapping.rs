//! Brightness-to-ramp mapping for luminance-mode character sets.

use std::sync::OnceLock;

use crate::glyph::grid::CharGrid;
use crate::pixel::PixelBuffer;

/// Gamma exponent for the optional shadow-lifting correction.
pub const GAMMA: f64 = 2.2;

/// Lazily built gamma LUT: `round(255 * (v/255)^(1/GAMMA))`.
///
/// Endpoints are fixed (0 -> 0, 255 -> 255) and the curve is monotonic,
/// so correction never reorders brightness levels.
fn gamma_lut() -> &'static [u8; 256] {
    static LUT: OnceLock<[u8; 256]> = OnceLock::new();
    LUT.get_or_init(|| {
        let mut lut = [0u8; 256];
        for (v, out) in lut.iter_mut().enumerate() {
            *out = ((v as f64 / 255.0).powf(1.0 / GAMMA) * 255.0).round() as u8;
        }
        lut
    })
}

/// Apply gamma correction to a single luminance value.
pub fn gamma_correct(value: u8) -> u8 {
    gamma_lut()[value as usize]
}

/// Map a luminance value onto a ramp index.
///
/// The mapping is `floor(lum / 255 * len)` clamped to the last index, so
/// only a full 255 reaches the brightest glyph and the distribution over
/// the remaining levels stays uniform. `invert` mirrors the index.
pub fn ramp_index(lum: u8, len: usize, invert: bool) -> usize {
    debug_assert!(len > 0);
    let idx = ((lum as usize * len) / 255).min(len - 1);
    if invert {
        len - 1 - idx
    } else {
        idx
    }
}

/// Encode a frame through a brightness ramp, one pixel per cell.
pub fn encode_luminance(
    src: &PixelBuffer,
    ramp: &[char],
    invert: bool,
    gamma: bool,
) -> CharGrid {
    if ramp.is_empty() || src.width == 0 || src.height == 0 {
        return CharGrid::new(0, 0);
    }

    let mut cells = Vec::with_capacity(src.pixel_count());
    for y in 0..src.height {
        for x in 0..src.width {
            let mut lum = src.luminance_at(x as i64, y as i64);
            if gamma {
                lum = gamma_correct(lum);
            }
            cells.push(ramp[ramp_index(lum, ramp.len(), invert)]);
        }
    }
    CharGrid::from_cells(src.width as usize, src.height as usize, cells)
}
