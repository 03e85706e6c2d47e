//! Text-shaped video reveal with proximity-driven brightness.
//!
//! The media frame shows only through the glyph shapes of a fixed string.
//! Each glyph's brightness eases toward a target derived from the
//! pointer's distance to that glyph's center, so letters near the pointer
//! light up and distant ones dim, with a faint outline reinforcing the
//! cue. Compositing happens entirely on the owned offscreen surface; the
//! host blits the finished result.

use crate::mask::{sample_fitted, scale_dpr, FitMode, PointerSource};
use crate::media::{MediaError, MediaSource};
use crate::pixel::Rgba;
use crate::raster::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::raster::Raster;

/// Options for [`LetterformMask`], with defaults for every field.
#[derive(Debug, Clone)]
pub struct LetterformOptions {
    /// Text whose glyph shapes form the mask. Default "LUMA".
    pub text: String,
    /// Integer scale applied to the 5x7 font. Default 8 (40x56 px glyphs).
    pub glyph_scale: u32,
    /// How the media frame is scaled onto the surface. Default cover.
    pub fit: FitMode,
    /// Brightness of a glyph far from the pointer, 0.0..=1.0. Default 0.25.
    pub min_brightness: f32,
    /// Brightness of a glyph under the pointer, 0.0..=1.0. Default 1.0.
    pub max_brightness: f32,
    /// Pointer distance at which brightness bottoms out, in surface
    /// pixels. Default 240.
    pub falloff_radius: f32,
    /// Fraction of the remaining brightness gap closed per frame,
    /// 0.0..=1.0. Default 0.12.
    pub blend: f32,
    /// Peak opacity of the glyph outline, 0.0..=1.0. Default 0.35.
    pub outline_alpha: f32,
}

impl Default for LetterformOptions {
    fn default() -> Self {
        LetterformOptions {
            text: "LUMA".to_string(),
            glyph_scale: 8,
            fit: FitMode::Cover,
            min_brightness: 0.25,
            max_brightness: 1.0,
            falloff_radius: 240.0,
            blend: 0.12,
            outline_alpha: 0.35,
        }
    }
}

impl LetterformOptions {
    fn normalize(mut self) -> Self {
        let defaults = LetterformOptions::default();
        self.glyph_scale = self.glyph_scale.max(1);
        self.min_brightness = clamp_unit(self.min_brightness, defaults.min_brightness);
        self.max_brightness = clamp_unit(self.max_brightness, defaults.max_brightness)
            .max(self.min_brightness);
        if !(self.falloff_radius.is_finite() && self.falloff_radius > 0.0) {
            self.falloff_radius = defaults.falloff_radius;
        }
        self.blend = clamp_unit(self.blend, defaults.blend);
        self.outline_alpha = clamp_unit(self.outline_alpha, defaults.outline_alpha);
        self
    }
}

fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Scaled glyph placement, derived once from surface size and options.
struct LetterLayout {
    origin_x: i32,
    origin_y: i32,
    advance: i32,
    glyph_w: i32,
    glyph_h: i32,
    scale: i32,
}

impl LetterLayout {
    fn new(surface_w: u32, surface_h: u32, glyph_count: usize, scale: u32) -> Self {
        let scale = scale as i32;
        let glyph_w = GLYPH_WIDTH as i32 * scale;
        let glyph_h = GLYPH_HEIGHT as i32 * scale;
        let advance = font::CELL_WIDTH as i32 * scale;
        let total_w = match glyph_count {
            0 => 0,
            n => (n as i32 - 1) * advance + glyph_w,
        };
        LetterLayout {
            origin_x: (surface_w as i32 - total_w) / 2,
            origin_y: (surface_h as i32 - glyph_h) / 2,
            advance,
            glyph_w,
            glyph_h,
            scale,
        }
    }

    /// Center of glyph slot `i` in surface coordinates.
    fn center(&self, i: usize) -> (f32, f32) {
        (
            (self.origin_x + i as i32 * self.advance + self.glyph_w / 2) as f32,
            (self.origin_y + self.glyph_h / 2) as f32,
        )
    }
}

/// Reveals the attached media through the glyphs of a fixed string,
/// brightening each glyph as the pointer approaches it.
pub struct LetterformMask {
    options: LetterformOptions,
    layout: LetterLayout,
    glyphs: Vec<char>,
    brightness: Vec<f32>,
    surface: Raster,
    media: Option<Box<dyn MediaSource>>,
    running: bool,
    last_tick_ms: Option<f64>,
}

impl LetterformMask {
    /// # Arguments
    /// * `width`, `height` - Surface size in layout pixels.
    /// * `dpr` - Device pixel ratio; capped at [`crate::mask::MAX_DPR`].
    pub fn new(width: u32, height: u32, dpr: f32, options: LetterformOptions) -> Self {
        let options = options.normalize();
        let (w, h) = scale_dpr(width, height, dpr);
        let glyphs: Vec<char> = options.text.chars().collect();
        let layout = LetterLayout::new(w, h, glyphs.len(), options.glyph_scale);
        let brightness = vec![options.min_brightness; glyphs.len()];
        LetterformMask {
            options,
            layout,
            glyphs,
            brightness,
            surface: Raster::new(w, h),
            media: None,
            running: false,
            last_tick_ms: None,
        }
    }

    /// Attach the media source. Sources loop; use a
    /// [`crate::media::Playlist`] for cyclic multi-clip playback.
    pub fn attach_media(&mut self, mut media: Box<dyn MediaSource>) {
        media.set_looping(true);
        self.media = Some(media);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The composited output surface.
    pub fn surface(&self) -> &Raster {
        &self.surface
    }

    /// Current per-glyph brightness values.
    pub fn brightness(&self) -> &[f32] {
        &self.brightness
    }

    /// Start the reveal loop; failure handling mirrors
    /// [`RadialMask::play`](crate::mask::RadialMask::play).
    pub fn play(&mut self) {
        let Some(media) = self.media.as_mut() else {
            log::warn!("letterform mask has no media attached; staying stopped");
            return;
        };
        match media.play() {
            Ok(()) => {
                self.running = true;
                self.last_tick_ms = None;
            }
            Err(MediaError::PlaybackRejected) => {
                log::debug!("letterform mask playback rejected; will retry on next play");
            }
            Err(err) => {
                log::warn!("letterform mask media failed to start: {err}");
            }
        }
    }

    /// Stop and clear. Idempotent.
    pub fn stop(&mut self) {
        if let Some(media) = self.media.as_mut() {
            media.pause();
        }
        self.surface.clear();
        self.running = false;
        self.last_tick_ms = None;
    }

    /// Render one frame at clock time `now_ms`.
    ///
    /// Brightness easing advances every frame, even when the media has no
    /// frame to show yet.
    ///
    /// # Returns
    /// `true` when a media frame was composited.
    pub fn frame(&mut self, now_ms: f64, pointer: &mut dyn PointerSource) -> bool {
        if !self.running {
            return false;
        }
        let dt = match self.last_tick_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);
        if let Some(media) = self.media.as_mut() {
            media.advance(dt);
        }

        pointer.update();
        let state = pointer.state();
        self.ease_brightness(state.x, state.y, state.active);

        self.surface.clear();
        let Some(media) = self.media.as_deref() else {
            return false;
        };
        let Some((fit, frame)) =
            sample_fitted(media, self.surface.width(), self.surface.height(), self.options.fit)
        else {
            return false;
        };

        for (i, &c) in self.glyphs.iter().enumerate() {
            let Some(rows) = font::glyph(c) else {
                continue;
            };
            let bx = self.layout.origin_x + i as i32 * self.layout.advance;
            let by = self.layout.origin_y;
            let level = self.brightness[i];
            let outline = (255.0 * self.options.outline_alpha * level).round() as u8;

            let set = |gx: i32, gy: i32| {
                gx >= 0
                    && gy >= 0
                    && gx < GLYPH_WIDTH as i32
                    && gy < GLYPH_HEIGHT as i32
                    && font::pixel_set(rows, gx as u32, gy as u32)
            };

            for gy in 0..GLYPH_HEIGHT as i32 {
                for gx in 0..GLYPH_WIDTH as i32 {
                    if !set(gx, gy) {
                        continue;
                    }
                    // Which block faces border an unset neighbor; outline
                    // pixels live on those faces
                    let open_left = !set(gx - 1, gy);
                    let open_right = !set(gx + 1, gy);
                    let open_top = !set(gx, gy - 1);
                    let open_bottom = !set(gx, gy + 1);

                    let scale = self.layout.scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let x = bx + gx * scale + dx;
                            let y = by + gy * scale + dy;
                            let src = frame.pixel_at((x - fit.x) as i64, (y - fit.y) as i64);
                            self.surface.put(
                                x,
                                y,
                                Rgba::new(
                                    (src.r as f32 * level).round() as u8,
                                    (src.g as f32 * level).round() as u8,
                                    (src.b as f32 * level).round() as u8,
                                    src.a,
                                ),
                            );
                            let edge = (dx == 0 && open_left)
                                || (dx == scale - 1 && open_right)
                                || (dy == 0 && open_top)
                                || (dy == scale - 1 && open_bottom);
                            if edge && outline > 0 {
                                self.surface.blend_pixel(
                                    x,
                                    y,
                                    Rgba::new(255, 255, 255, outline),
                                );
                            }
                        }
                    }
                }
            }
        }
        true
    }

    /// Move each glyph's brightness a blend step toward its target.
    ///
    /// The target falls off quadratically (ease-out) with pointer
    /// distance: maximum at distance zero, minimum at the falloff radius
    /// and beyond, and everywhere while the pointer is inactive.
    fn ease_brightness(&mut self, px: f32, py: f32, active: bool) {
        let min = self.options.min_brightness;
        let max = self.options.max_brightness;
        let radius = self.options.falloff_radius;
        for (i, level) in self.brightness.iter_mut().enumerate() {
            let target = if active {
                let (cx, cy) = self.layout.center(i);
                let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                let t = (dist / radius).clamp(0.0, 1.0);
                min + (max - min) * (1.0 - t * t)
            } else {
                min
            };
            *level += (target - *level) * self.options.blend;
        }
    }
}
