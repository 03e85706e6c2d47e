//! Glyph encoding: pixel frames to character grids.
//!
//! This module converts a sampled [`PixelBuffer`] into a [`CharGrid`]
//! through one of three encode modes:
//!
//! 1. **Luminance** - one pixel per cell mapped onto a brightness ramp
//! 2. **Quadrant** - 2x2 sub-pixel blocks mapped onto block glyphs
//! 3. **Braille** - 2x4 sub-pixel blocks mapped onto braille patterns
//!
//! The mode is a property of the chosen [`Charset`]; callers only pick a
//! set and pass [`EncodeOptions`].

mod braille;
mod charset;
mod grid;
mod mapping;
mod quadrant;

pub use braille::{dots_to_char, encode_braille, BRAILLE_BASE, DOT_BITS};
pub use charset::{
    Charset, EncodeMode, BLOCKS_RAMP, DETAILED_RAMP, MINIMAL_RAMP, SIMPLE_RAMP,
};
pub use grid::CharGrid;
pub use mapping::{encode_luminance, gamma_correct, ramp_index, GAMMA};
pub use quadrant::{encode_quadrant, pattern_to_glyph, QUADRANT_GLYPHS};

use crate::pixel::PixelBuffer;

/// Tuning knobs shared by all encode modes.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// Sub-pixel activation threshold for quadrant/braille modes (0-255).
    pub threshold: u8,
    /// Reverse the brightness mapping (dark terminals vs light pages).
    pub invert: bool,
    /// Apply gamma correction before ramp mapping.
    pub gamma: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            threshold: 128,
            invert: false,
            gamma: false,
        }
    }
}

/// Encode a frame with the given character set.
///
/// The number of pixels consumed per cell follows the set's mode: 1x1 for
/// ramps, 2x2 for quadrant glyphs, 2x4 for braille.
pub fn encode(src: &PixelBuffer, charset: Charset, opts: &EncodeOptions) -> CharGrid {
    match charset.mode() {
        EncodeMode::Luminance => encode_luminance(src, charset.ramp(), opts.invert, opts.gamma),
        EncodeMode::Quadrant => encode_quadrant(src, opts.threshold, opts.invert),
        EncodeMode::Braille => encode_braille(src, opts.threshold, opts.invert),
    }
}

/// Pixels per cell for a mode: (width, height).
pub fn block_size(mode: EncodeMode) -> (u32, u32) {
    match mode {
        EncodeMode::Luminance => (1, 1),
        EncodeMode::Quadrant => (2, 2),
        EncodeMode::Braille => (2, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgba;

    #[test]
    fn test_encode_dispatches_on_mode() {
        let buf = PixelBuffer::from_fn(4, 4, |_, _| Rgba::WHITE);
        let opts = EncodeOptions::default();

        let simple = encode(&buf, Charset::Simple, &opts);
        assert_eq!((simple.cols(), simple.rows()), (4, 4));

        let quad = encode(&buf, Charset::Quadrant, &opts);
        assert_eq!((quad.cols(), quad.rows()), (2, 2));

        let braille = encode(&buf, Charset::Braille, &opts);
        assert_eq!((braille.cols(), braille.rows()), (2, 1));
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(block_size(EncodeMode::Luminance), (1, 1));
        assert_eq!(block_size(EncodeMode::Quadrant), (2, 2));
        assert_eq!(block_size(EncodeMode::Braille), (2, 4));
    }
}
