//! Video maskers: reveal a media frame through a dynamic mask.
//!
//! Two variants share one contract. The media frame is scaled to cover or
//! contain the target surface at device-pixel-ratio-correct resolution,
//! then only the pixels inside a per-frame mask stay visible; everything
//! else is left transparent for the host to composite.
//!
//! - [`RadialMask`] reveals a soft-edged circle around the pointer.
//! - [`LetterformMask`] reveals text glyphs whose brightness tracks
//!   pointer proximity.

pub mod letterform;
pub mod pointer;
pub mod radial;

pub use letterform::{LetterformMask, LetterformOptions};
pub use pointer::{PointerSource, PointerState, SmoothedPointer};
pub use radial::{RadialMask, RadialOptions};

use crate::media::{MediaSource, Readiness};
use crate::pixel::PixelBuffer;

/// Device-pixel-ratio ceiling. Sharper than 2x is not worth the fill cost.
pub const MAX_DPR: f32 = 2.0;

/// How the media frame is scaled onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Fill the surface, cropping media overflow.
    #[default]
    Cover,
    /// Fit the media inside the surface, letterboxing the rest.
    Contain,
}

/// Placement of the scaled media frame on the surface.
///
/// `x`/`y` can be negative under [`FitMode::Cover`], where the frame
/// overflows the surface and is cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Scale a surface size by a device pixel ratio, capped at [`MAX_DPR`].
///
/// Ratios below 1 and non-finite ratios render at 1:1.
pub fn scale_dpr(width: u32, height: u32, dpr: f32) -> (u32, u32) {
    let dpr = if dpr.is_finite() {
        dpr.clamp(1.0, MAX_DPR)
    } else {
        1.0
    };
    (
        (width as f32 * dpr).round() as u32,
        (height as f32 * dpr).round() as u32,
    )
}

/// Compute where a media frame lands on a surface under `mode`.
///
/// # Returns
/// `None` when either size has a zero dimension; the caller renders
/// nothing that frame.
pub fn fit_rect(
    media_w: u32,
    media_h: u32,
    surface_w: u32,
    surface_h: u32,
    mode: FitMode,
) -> Option<FitRect> {
    if media_w == 0 || media_h == 0 || surface_w == 0 || surface_h == 0 {
        return None;
    }
    let sx = surface_w as f32 / media_w as f32;
    let sy = surface_h as f32 / media_h as f32;
    let scale = match mode {
        FitMode::Cover => sx.max(sy),
        FitMode::Contain => sx.min(sy),
    };
    let width = ((media_w as f32 * scale).round() as u32).max(1);
    let height = ((media_h as f32 * scale).round() as u32).max(1);
    Some(FitRect {
        x: (surface_w as i32 - width as i32) / 2,
        y: (surface_h as i32 - height as i32) / 2,
        width,
        height,
    })
}

/// Sample the current media frame scaled for a surface.
///
/// Rolls up the per-frame gates both maskers share: the media must be
/// decodable, report nonzero dimensions, and produce a frame.
pub(crate) fn sample_fitted(
    media: &dyn MediaSource,
    surface_w: u32,
    surface_h: u32,
    mode: FitMode,
) -> Option<(FitRect, PixelBuffer)> {
    if media.readiness() < Readiness::CurrentData {
        return None;
    }
    let (media_w, media_h) = media.dimensions();
    let fit = fit_rect(media_w, media_h, surface_w, surface_h, mode)?;
    let frame = media.sample(fit.width, fit.height)?;
    Some((fit, frame))
}
