//! Soft-edged circular video reveal following the pointer.

use crate::mask::{sample_fitted, scale_dpr, FitMode, PointerSource};
use crate::media::{MediaError, MediaSource};
use crate::pixel::Rgba;
use crate::raster::Raster;

/// Options for [`RadialMask`], with defaults for every field.
#[derive(Debug, Clone)]
pub struct RadialOptions {
    /// Radius of the fully opaque core, in surface pixels. Default 80.
    pub inner_radius: f32,
    /// Radius at which the reveal fades to fully transparent. Default 160.
    pub outer_radius: f32,
    /// How the media frame is scaled onto the surface. Default cover.
    pub fit: FitMode,
    /// Peak reveal opacity, 0.0..=1.0. Default 1.0.
    pub opacity: f32,
}

impl Default for RadialOptions {
    fn default() -> Self {
        RadialOptions {
            inner_radius: 80.0,
            outer_radius: 160.0,
            fit: FitMode::Cover,
            opacity: 1.0,
        }
    }
}

impl RadialOptions {
    fn normalize(mut self) -> Self {
        if !self.inner_radius.is_finite() || self.inner_radius < 0.0 {
            self.inner_radius = 0.0;
        }
        if !self.outer_radius.is_finite() {
            self.outer_radius = self.inner_radius;
        }
        self.outer_radius = self.outer_radius.max(self.inner_radius);
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }
}

/// Reveals the attached media through a soft-edged circle centered on the
/// smoothed pointer.
///
/// The circle is solid out to `inner_radius` and fades linearly to
/// transparent at `outer_radius`. While the pointer is outside the tracked
/// region, or the media is not yet decodable, nothing is rendered and the
/// surface stays fully transparent.
pub struct RadialMask {
    options: RadialOptions,
    surface: Raster,
    media: Option<Box<dyn MediaSource>>,
    running: bool,
    last_tick_ms: Option<f64>,
}

impl RadialMask {
    /// # Arguments
    /// * `width`, `height` - Surface size in layout pixels.
    /// * `dpr` - Device pixel ratio; capped at [`crate::mask::MAX_DPR`].
    pub fn new(width: u32, height: u32, dpr: f32, options: RadialOptions) -> Self {
        let (w, h) = scale_dpr(width, height, dpr);
        RadialMask {
            options: options.normalize(),
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

    /// Start the reveal loop.
    ///
    /// A rejected playback start is caught and leaves the masker stopped;
    /// calling again later retries. A failed source logs and the masker
    /// stays a no-op.
    pub fn play(&mut self) {
        let Some(media) = self.media.as_mut() else {
            log::warn!("radial mask has no media attached; staying stopped");
            return;
        };
        match media.play() {
            Ok(()) => {
                self.running = true;
                self.last_tick_ms = None;
            }
            Err(MediaError::PlaybackRejected) => {
                log::debug!("radial mask playback rejected; will retry on next play");
            }
            Err(err) => {
                log::warn!("radial mask media failed to start: {err}");
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
    /// # Returns
    /// `true` when the reveal was drawn; `false` when stopped, the pointer
    /// is inactive, or the media produced no frame (the surface is then
    /// fully transparent).
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

        self.surface.clear();
        if !state.active {
            return false;
        }
        let Some(media) = self.media.as_deref() else {
            return false;
        };
        let Some((fit, frame)) =
            sample_fitted(media, self.surface.width(), self.surface.height(), self.options.fit)
        else {
            return false;
        };

        let inner = self.options.inner_radius;
        let outer = self.options.outer_radius;
        let opacity = self.options.opacity;

        let x0 = ((state.x - outer).floor() as i32).max(0);
        let y0 = ((state.y - outer).floor() as i32).max(0);
        let x1 = ((state.x + outer).ceil() as i32).min(self.surface.width() as i32 - 1);
        let y1 = ((state.y + outer).ceil() as i32).min(self.surface.height() as i32 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - state.x;
                let dy = y as f32 + 0.5 - state.y;
                let dist = (dx * dx + dy * dy).sqrt();
                let coverage = if dist <= inner {
                    1.0
                } else if dist < outer {
                    (outer - dist) / (outer - inner)
                } else {
                    continue;
                };
                let src = frame.pixel_at((x - fit.x) as i64, (y - fit.y) as i64);
                let alpha = (src.a as f32 * coverage * opacity).round() as u8;
                if alpha == 0 {
                    continue;
                }
                self.surface.put(x, y, Rgba::new(src.r, src.g, src.b, alpha));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::SmoothedPointer;
    use crate::media::{FrameClip, Playlist};
    use crate::pixel::PixelBuffer;

    fn solid_clip(color: Rgba) -> Box<dyn MediaSource> {
        let frame = PixelBuffer::from_fn(8, 8, |_, _| color);
        Box::new(FrameClip::new(vec![frame], 10.0))
    }

    fn small_mask() -> RadialMask {
        RadialMask::new(
            40,
            40,
            1.0,
            RadialOptions {
                inner_radius: 5.0,
                outer_radius: 15.0,
                ..RadialOptions::default()
            },
        )
    }

    fn centered_pointer() -> SmoothedPointer {
        let mut pointer = SmoothedPointer::default();
        pointer.set_target(20.0, 20.0);
        pointer
    }

    #[test]
    fn test_not_running_until_play() {
        let mut mask = small_mask();
        mask.attach_media(solid_clip(Rgba::rgb(200, 0, 0)));
        let mut pointer = centered_pointer();
        assert!(!mask.frame(0.0, &mut pointer));

        mask.play();
        assert!(mask.is_running());
        assert!(mask.frame(0.0, &mut pointer));
    }

    #[test]
    fn test_inactive_pointer_renders_nothing() {
        let mut mask = small_mask();
        mask.attach_media(solid_clip(Rgba::rgb(200, 0, 0)));
        mask.play();

        let mut pointer = SmoothedPointer::default();
        assert!(!mask.frame(0.0, &mut pointer));
        assert_eq!(mask.surface().pixel_at(20, 20), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_reveal_core_band_and_outside() {
        let mut mask = small_mask();
        mask.attach_media(solid_clip(Rgba::rgb(200, 0, 0)));
        mask.play();
        let mut pointer = centered_pointer();
        assert!(mask.frame(0.0, &mut pointer));

        // Pointer center: fully opaque media pixel
        let core = mask.surface().pixel_at(20, 20);
        assert_eq!((core.r, core.a), (200, 255));

        // Distance 10 from center: inside the fade band
        let band = mask.surface().pixel_at(30, 20);
        assert!(band.a > 0 && band.a < 255, "band alpha {}", band.a);

        // Past the outer radius: untouched
        assert_eq!(mask.surface().pixel_at(38, 20), Rgba::TRANSPARENT);
        assert_eq!(mask.surface().pixel_at(0, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_undecodable_media_renders_nothing() {
        let mut mask = small_mask();
        // An empty clip plays but never becomes decodable
        mask.attach_media(Box::new(FrameClip::new(Vec::new(), 10.0)));
        mask.play();
        assert!(mask.is_running());

        let mut pointer = centered_pointer();
        assert!(!mask.frame(0.0, &mut pointer));
    }

    #[test]
    fn test_zero_dimension_media_renders_nothing() {
        let mut mask = small_mask();
        mask.attach_media(Box::new(FrameClip::new(vec![PixelBuffer::new(0, 0)], 10.0)));
        mask.play();

        let mut pointer = centered_pointer();
        assert!(!mask.frame(0.0, &mut pointer));
    }

    #[test]
    fn test_playback_rejection_leaves_masker_retryable() {
        let frame = PixelBuffer::from_fn(8, 8, |_, _| Rgba::WHITE);
        let mut mask = small_mask();
        mask.attach_media(Box::new(FrameClip::blocked(vec![frame], 10.0)));

        mask.play();
        assert!(!mask.is_running());

        // The double only unblocks through its own handle, so swap in an
        // unblocked source to model the later user gesture
        mask.attach_media(solid_clip(Rgba::WHITE));
        mask.play();
        assert!(mask.is_running());
    }

    #[test]
    fn test_stop_clears_and_is_idempotent() {
        let mut mask = small_mask();
        mask.attach_media(solid_clip(Rgba::rgb(200, 0, 0)));
        mask.play();
        let mut pointer = centered_pointer();
        mask.frame(0.0, &mut pointer);
        assert_ne!(mask.surface().pixel_at(20, 20), Rgba::TRANSPARENT);

        mask.stop();
        assert!(!mask.is_running());
        assert_eq!(mask.surface().pixel_at(20, 20), Rgba::TRANSPARENT);
        mask.stop();
        assert!(!mask.is_running());
    }

    #[test]
    fn test_playlist_advances_between_clips() {
        let mut mask = small_mask();
        // Two one-frame clips, 100 ms each
        mask.attach_media(Box::new(Playlist::new(vec![
            solid_clip(Rgba::rgb(200, 0, 0)),
            solid_clip(Rgba::rgb(0, 200, 0)),
        ])));
        mask.play();
        let mut pointer = centered_pointer();

        mask.frame(0.0, &mut pointer);
        assert_eq!(mask.surface().pixel_at(20, 20).r, 200);

        // Past the first clip's end: the playlist cycles to the green clip
        mask.frame(150.0, &mut pointer);
        let px = mask.surface().pixel_at(20, 20);
        assert_eq!((px.r, px.g), (0, 200));
    }

    #[test]
    fn test_dpr_scales_surface() {
        let mask = RadialMask::new(100, 50, 2.0, RadialOptions::default());
        assert_eq!((mask.surface().width(), mask.surface().height()), (200, 100));

        let capped = RadialMask::new(100, 50, 4.0, RadialOptions::default());
        assert_eq!((capped.surface().width(), capped.surface().height()), (200, 100));
    }

    #[test]
    fn test_options_clamped() {
        let mask = RadialMask::new(
            10,
            10,
            1.0,
            RadialOptions {
                inner_radius: -4.0,
                outer_radius: f32::NAN,
                opacity: 3.0,
                ..RadialOptions::default()
            },
        );
        assert_eq!(mask.options.inner_radius, 0.0);
        assert_eq!(mask.options.outer_radius, 0.0);
        assert_eq!(mask.options.opacity, 1.0);
    }
}
