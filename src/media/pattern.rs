//! Procedural plasma pattern, the built-in endless demo source.

use crate::media::{MediaError, MediaSource, Readiness};
use crate::pixel::{PixelBuffer, Rgba};

/// An infinite, deterministic wave-interference pattern.
///
/// Serves as demo media when no real video is wired up: it never ends,
/// is always decodable, and renders the same frame for the same clock,
/// which keeps demo output reproducible.
pub struct TestPattern {
    width: u32,
    height: u32,
    time_ms: f64,
    playing: bool,
}

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        TestPattern {
            width,
            height,
            time_ms: 0.0,
            playing: false,
        }
    }

    /// Wave intensity at normalized coordinates, in `[0, 1]`.
    ///
    /// Four interfering components: horizontal, vertical, diagonal, and a
    /// radial wave from the center.
    fn wave(nx: f64, ny: f64, t: f64) -> f64 {
        let x = nx * 6.0;
        let y = ny * 6.0;
        let v1 = (x * 1.5 + t).sin();
        let v2 = (y * 1.8 + t * 0.8).sin();
        let v3 = ((x + y) * 1.2 + t * 0.6).sin();
        let v4 = ((x * x + y * y).sqrt() * 2.0 - t * 1.2).sin();
        let value = (v1 + v2 + v3 + v4) / 4.0;
        (value + 1.0) / 2.0
    }

    /// Map a wave value to the pattern's deep-blue-to-seafoam gradient.
    fn color_at(t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        if t < 0.5 {
            lerp_rgb((10, 30, 100), (30, 180, 220), t / 0.5)
        } else {
            lerp_rgb((30, 180, 220), (150, 255, 200), (t - 0.5) / 0.5)
        }
    }
}

/// Fixed-point RGB lerp using u32 arithmetic.
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> Rgba {
    let t256 = (t.clamp(0.0, 1.0) * 256.0) as u32;
    let inv = 256 - t256;
    Rgba::rgb(
        ((a.0 as u32 * inv + b.0 as u32 * t256) >> 8) as u8,
        ((a.1 as u32 * inv + b.1 as u32 * t256) >> 8) as u8,
        ((a.2 as u32 * inv + b.2 as u32 * t256) >> 8) as u8,
    )
}

impl MediaSource for TestPattern {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn readiness(&self) -> Readiness {
        Readiness::CurrentData
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn ended(&self) -> bool {
        false
    }

    fn set_looping(&mut self, _looping: bool) {
        // Endless by construction
    }

    fn advance(&mut self, dt_ms: f64) {
        if self.playing && dt_ms > 0.0 {
            self.time_ms += dt_ms;
        }
    }

    fn sample(&self, width: u32, height: u32) -> Option<PixelBuffer> {
        if self.width == 0 || self.height == 0 || width == 0 || height == 0 {
            return None;
        }
        let t = self.time_ms / 1000.0;
        Some(PixelBuffer::from_fn(width, height, |x, y| {
            let nx = x as f64 / width as f64;
            let ny = y as f64 / height as f64;
            Self::color_at(Self::wave(nx, ny, t))
        }))
    }
}
