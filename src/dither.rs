//! Binary dithering passes over RGBA frames.
//!
//! Every mode reduces each RGB channel to 0 or 255 while preserving the
//! alpha channel byte-for-byte, trading gray levels for spatial patterns:
//!
//! - **Floyd-Steinberg** - classic error diffusion, 7/16 3/16 5/16 1/16
//! - **Atkinson** - lighter diffusion that discards a quarter of the error
//! - **Bayer** - ordered 4x4 threshold matrix, no error state
//! - **None** - identity pass-through (the default)
//!
//! Error diffusion is sequential by nature (each pixel depends on the ones
//! already processed), so the passes copy the source into a work buffer and
//! never mutate the input.

use std::fmt;

use crate::pixel::{luminance, PixelBuffer};

/// Quantization cutoff for error diffusion: below is black, at or above white.
const THRESHOLD: i16 = 128;

/// 4x4 Bayer threshold matrix (values 0-15, scaled by 255/16 at lookup).
const BAYER_4X4: [[u16; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Floyd-Steinberg neighbor weights: (dx, dy, numerator) over 16.
const FLOYD_STEINBERG_KERNEL: [(i32, i32, i32); 4] =
    [(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)];

/// Atkinson neighbor offsets; each receives 1/8 of the error, the remaining
/// quarter is intentionally dropped.
const ATKINSON_KERNEL: [(i32, i32); 6] = [(1, 0), (2, 0), (-1, 1), (0, 1), (1, 1), (0, 2)];

/// Available dithering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dither {
    /// No dithering; frames pass through untouched.
    #[default]
    None,
    /// Floyd-Steinberg error diffusion.
    FloydSteinberg,
    /// Atkinson error diffusion (lighter, detail-preserving).
    Atkinson,
    /// Ordered dithering with a 4x4 Bayer matrix.
    Bayer,
}

impl Dither {
    /// Parse a mode from its config-file name.
    ///
    /// # Returns
    /// `None` if the name is not recognized.
    pub fn from_str(s: &str) -> Option<Dither> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Some(Dither::None),
            "floyd-steinberg" | "floydsteinberg" | "fs" => Some(Dither::FloydSteinberg),
            "atkinson" => Some(Dither::Atkinson),
            "bayer" | "ordered" => Some(Dither::Bayer),
            _ => None,
        }
    }

    /// Parse a mode name, falling back to no dithering when unknown.
    pub fn resolve(s: &str) -> Dither {
        match Dither::from_str(s) {
            Some(mode) => mode,
            None => {
                log::warn!("unknown dither mode '{}', falling back to '{}'", s, Dither::default());
                Dither::default()
            }
        }
    }

    /// Canonical name for display and config files.
    pub fn name(&self) -> &'static str {
        match self {
            Dither::None => "none",
            Dither::FloydSteinberg => "floyd-steinberg",
            Dither::Atkinson => "atkinson",
            Dither::Bayer => "bayer",
        }
    }

    /// All modes, in listing order.
    pub fn all() -> &'static [Dither] {
        &[
            Dither::None,
            Dither::FloydSteinberg,
            Dither::Atkinson,
            Dither::Bayer,
        ]
    }

    /// Apply this mode to a frame, producing a new buffer of the same size.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        match self {
            Dither::None => src.clone(),
            Dither::FloydSteinberg => floyd_steinberg(src),
            Dither::Atkinson => atkinson(src),
            Dither::Bayer => bayer(src),
        }
    }
}

impl fmt::Display for Dither {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Copy the RGB channels of a frame into a clamped i16 work buffer.
///
/// i16 gives headroom for diffusion arithmetic while every write clamps
/// back to 0-255, matching the saturating store the effect relies on.
fn rgb_work_buffer(src: &PixelBuffer) -> Vec<[i16; 3]> {
    src.data
        .chunks_exact(4)
        .map(|px| [px[0] as i16, px[1] as i16, px[2] as i16])
        .collect()
}

/// Write a quantized pixel, carrying the source alpha through.
fn store(out: &mut PixelBuffer, src: &PixelBuffer, idx: usize, value: u8) {
    let base = idx * 4;
    out.data[base] = value;
    out.data[base + 1] = value;
    out.data[base + 2] = value;
    out.data[base + 3] = src.data[base + 3];
}

fn floyd_steinberg(src: &PixelBuffer) -> PixelBuffer {
    let (width, height) = (src.width as i32, src.height as i32);
    let mut work = rgb_work_buffer(src);
    let mut out = PixelBuffer::new(src.width, src.height);

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let old = work[idx];
            let lum = luminance(old[0] as u8, old[1] as u8, old[2] as u8) as i16;
            let new: i16 = if lum < THRESHOLD { 0 } else { 255 };
            store(&mut out, src, idx, new as u8);

            // Per-channel quantization error
            let err = [old[0] - new, old[1] - new, old[2] - new];
            for &(dx, dy, weight) in &FLOYD_STEINBERG_KERNEL {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || nx >= width || ny >= height {
                    continue;
                }
                let nidx = (ny * width + nx) as usize;
                for c in 0..3 {
                    let spread = (err[c] as i32 * weight / 16) as i16;
                    work[nidx][c] = (work[nidx][c] + spread).clamp(0, 255);
                }
            }
        }
    }

    out
}

fn atkinson(src: &PixelBuffer) -> PixelBuffer {
    let (width, height) = (src.width as i32, src.height as i32);
    let mut work = rgb_work_buffer(src);
    let mut out = PixelBuffer::new(src.width, src.height);

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let old = work[idx];
            let lum = luminance(old[0] as u8, old[1] as u8, old[2] as u8) as i16;
            let new: i16 = if lum < THRESHOLD { 0 } else { 255 };
            store(&mut out, src, idx, new as u8);

            // Single error from the channel mean, spread equally
            let err = (old[0] + old[1] + old[2]) / 3 - new;
            let spread = err / 8;
            for &(dx, dy) in &ATKINSON_KERNEL {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || nx >= width || ny >= height {
                    continue;
                }
                let nidx = (ny * width + nx) as usize;
                for c in 0..3 {
                    work[nidx][c] = (work[nidx][c] + spread).clamp(0, 255);
                }
            }
        }
    }

    out
}

fn bayer(src: &PixelBuffer) -> PixelBuffer {
    let mut out = PixelBuffer::new(src.width, src.height);

    for y in 0..src.height {
        for x in 0..src.width {
            let idx = (y * src.width + x) as usize;
            let base = idx * 4;
            let lum = luminance(src.data[base], src.data[base + 1], src.data[base + 2]);
            let threshold = (BAYER_4X4[(y % 4) as usize][(x % 4) as usize] * 255 / 16) as u8;
            let value = if lum > threshold { 255 } else { 0 };
            store(&mut out, src, idx, value);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgba;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            let v = ((x + y * width) * 255 / (width * height)) as u8;
            Rgba::new(v, v / 2, v, 200)
        })
    }

    fn assert_binary_rgb(buf: &PixelBuffer) {
        for px in buf.data.chunks_exact(4) {
            assert!(px[0] == 0 || px[0] == 255, "r = {}", px[0]);
            assert!(px[1] == 0 || px[1] == 255, "g = {}", px[1]);
            assert!(px[2] == 0 || px[2] == 255, "b = {}", px[2]);
        }
    }

    #[test]
    fn test_none_is_identity() {
        let src = gradient(8, 8);
        assert_eq!(Dither::None.apply(&src), src);
    }

    #[test]
    fn test_floyd_steinberg_is_binary() {
        let out = Dither::FloydSteinberg.apply(&gradient(16, 16));
        assert_binary_rgb(&out);
    }

    #[test]
    fn test_atkinson_is_binary() {
        let out = Dither::Atkinson.apply(&gradient(16, 16));
        assert_binary_rgb(&out);
    }

    #[test]
    fn test_bayer_is_binary() {
        let out = Dither::Bayer.apply(&gradient(16, 16));
        assert_binary_rgb(&out);
    }

    #[test]
    fn test_dims_and_alpha_preserved() {
        let src = gradient(10, 6);
        for mode in Dither::all() {
            let out = mode.apply(&src);
            assert_eq!(out.width, src.width);
            assert_eq!(out.height, src.height);
            for (a, b) in out.data.chunks_exact(4).zip(src.data.chunks_exact(4)) {
                assert_eq!(a[3], b[3], "alpha changed under {}", mode);
            }
        }
    }

    #[test]
    fn test_bayer_extremes_are_stable() {
        let white = PixelBuffer::from_fn(8, 8, |_, _| Rgba::WHITE);
        let out = Dither::Bayer.apply(&white);
        assert!(out.data.chunks_exact(4).all(|px| px[0] == 255));

        let black = PixelBuffer::from_fn(8, 8, |_, _| Rgba::BLACK);
        let out = Dither::Bayer.apply(&black);
        assert!(out.data.chunks_exact(4).all(|px| px[0] == 0));
    }

    #[test]
    fn test_bayer_mid_gray_mixes() {
        let gray = PixelBuffer::from_fn(4, 4, |_, _| Rgba::rgb(128, 128, 128));
        let out = Dither::Bayer.apply(&gray);
        let whites = out.data.chunks_exact(4).filter(|px| px[0] == 255).count();
        assert!(whites > 0 && whites < 16, "expected a mix, got {} whites", whites);
    }

    #[test]
    fn test_floyd_steinberg_conserves_brightness_roughly() {
        let gray = PixelBuffer::from_fn(16, 16, |_, _| Rgba::rgb(128, 128, 128));
        let out = Dither::FloydSteinberg.apply(&gray);
        let whites = out.data.chunks_exact(4).filter(|px| px[0] == 255).count();
        // 128/255 of 256 pixels is ~128; diffusion should land near it
        assert!((100..=156).contains(&whites), "{} whites", whites);
    }

    #[test]
    fn test_from_str_known_names() {
        assert_eq!(Dither::from_str("none"), Some(Dither::None));
        assert_eq!(Dither::from_str("floyd-steinberg"), Some(Dither::FloydSteinberg));
        assert_eq!(Dither::from_str("FS"), Some(Dither::FloydSteinberg));
        assert_eq!(Dither::from_str("Atkinson"), Some(Dither::Atkinson));
        assert_eq!(Dither::from_str("ordered"), Some(Dither::Bayer));
        assert_eq!(Dither::from_str("nope"), None);
    }

    #[test]
    fn test_display_matches_name() {
        for mode in Dither::all() {
            assert_eq!(format!("{}", mode), mode.name());
            assert_eq!(Dither::from_str(mode.name()), Some(*mode));
        }
    }
}
