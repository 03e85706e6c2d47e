//! Frame pipeline orchestration: media sampling, dithering, character
//! encoding, pacing, and output composition.
//!
//! [`AsciiEngine`] owns one media source (optionally with a fallback) and is
//! driven by the host calling [`AsciiEngine::frame`] once per display
//! refresh. Internally it throttles to the configured frame rate, advances
//! the media clock, resamples the current frame to grid resolution, runs
//! the dither and encode stages, and keeps the latest character grid plus
//! per-cell colors available for text, markup, or raster output.
//!
//! Failures degrade instead of propagating: a missing source logs and the
//! engine stays idle, a rejected playback start leaves state unchanged for
//! a later retry, and a broken source is swapped for the fallback at most
//! once.

pub mod dimensions;
pub mod stats;
pub mod throttle;

use std::time::Instant;

use crate::dither::Dither;
use crate::glyph::{self, block_size, CharGrid, Charset, EncodeOptions};
use crate::media::{MediaError, MediaSource, Readiness};
use crate::pixel::Rgba;
use crate::raster::font::{self, CELL_HEIGHT, CELL_WIDTH};
use crate::raster::Raster;

use self::dimensions::{grid_geometry_with_aspect, DEFAULT_CHAR_ASPECT_RATIO};
use self::stats::{RenderStats, StatsTracker};
use self::throttle::FrameThrottle;

/// Upper bound on the configured column count.
pub const MAX_COLUMNS: u32 = 512;

/// Construction-time options for [`AsciiEngine`].
///
/// Every field has a stated default and out-of-range numeric values are
/// clamped at construction, never rejected.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Output width in character cells. Default 80, clamped to 1..=512.
    pub columns: u32,
    /// Character set used by the encoder. Default `simple`.
    pub charset: Charset,
    /// Dithering algorithm applied before encoding. Default off.
    pub dither: Dither,
    /// Swap dark and bright glyphs.
    pub invert: bool,
    /// Apply gamma correction before ramp mapping.
    pub gamma: bool,
    /// Sub-pixel on/off threshold for quadrant and braille modes.
    pub threshold: u8,
    /// Processing rate ceiling in frames per second. Default 30.
    pub target_fps: f64,
    /// Glyph cell aspect ratio (height/width). Default 2.0.
    pub char_aspect: f32,
    /// Sample a color per cell from the source frame.
    pub color: bool,
    /// Overlay opacity for raster composition, 0.0..=1.0. Default 1.0.
    pub opacity: f32,
    /// Background fill for raster composition; `None` keeps transparency.
    pub background: Option<Rgba>,
    /// Honor a motion-reduction preference: render a single still frame
    /// on play instead of continuous animation.
    pub reduced_motion: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            columns: 80,
            charset: Charset::default(),
            dither: Dither::default(),
            invert: false,
            gamma: false,
            threshold: 128,
            target_fps: 30.0,
            char_aspect: DEFAULT_CHAR_ASPECT_RATIO,
            color: false,
            opacity: 1.0,
            background: None,
            reduced_motion: false,
        }
    }
}

impl EngineOptions {
    /// Clamp every numeric field into its documented range.
    fn normalize(mut self) -> Self {
        self.columns = self.columns.clamp(1, MAX_COLUMNS);
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if !(self.char_aspect.is_finite() && self.char_aspect > 0.0) {
            self.char_aspect = DEFAULT_CHAR_ASPECT_RATIO;
        }
        self
    }
}

/// Observer invoked with the grid after every rendered frame.
pub type FrameObserver = Box<dyn FnMut(&CharGrid)>;

/// Observer invoked with each completed one-second stats window.
pub type StatsObserver = Box<dyn FnMut(RenderStats)>;

/// Lifecycle state of an [`AsciiEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No playback underway; frames are not processed.
    Idle,
    /// Media is advancing and frames are processed at the target rate.
    Playing,
    /// Playback suspended; the last rendered grid remains readable.
    Paused,
    /// Torn down. Every operation is a no-op from here on.
    Destroyed,
}

/// Character-art conversion engine driving one media source.
pub struct AsciiEngine {
    options: EngineOptions,
    media: Option<Box<dyn MediaSource>>,
    fallback: Option<Box<dyn MediaSource>>,
    fallback_used: bool,
    state: EngineState,
    throttle: FrameThrottle,
    stats: StatsTracker,
    grid: CharGrid,
    colors: Vec<Rgba>,
    on_frame: Option<FrameObserver>,
    on_stats: Option<StatsObserver>,
}

impl AsciiEngine {
    /// Create an engine with no media attached. It stays idle until a
    /// source is attached and playback is started.
    pub fn new(options: EngineOptions) -> Self {
        let options = options.normalize();
        let throttle = FrameThrottle::new(options.target_fps);
        AsciiEngine {
            options,
            media: None,
            fallback: None,
            fallback_used: false,
            state: EngineState::Idle,
            throttle,
            stats: StatsTracker::new(),
            grid: CharGrid::new(0, 0),
            colors: Vec::new(),
            on_frame: None,
            on_stats: None,
        }
    }

    /// Attach the primary media source. Directly attached sources loop
    /// natively; play-list cycling lives in [`crate::media::Playlist`].
    pub fn attach_media(&mut self, mut media: Box<dyn MediaSource>) {
        media.set_looping(true);
        self.media = Some(media);
        self.fallback_used = false;
    }

    /// Configure an alternate source to swap in if the primary fails to
    /// load. The swap happens at most once.
    pub fn set_fallback(&mut self, fallback: Box<dyn MediaSource>) {
        self.fallback = Some(fallback);
    }

    /// Register an observer called with the grid after each rendered frame.
    ///
    /// Throttled refreshes do not notify; one rendered frame means one call.
    pub fn set_on_frame<F>(&mut self, observer: F)
    where
        F: FnMut(&CharGrid) + 'static,
    {
        self.on_frame = Some(Box::new(observer));
    }

    /// Register an observer called whenever a one-second stats window
    /// completes.
    pub fn set_on_stats<F>(&mut self, observer: F)
    where
        F: FnMut(RenderStats) + 'static,
    {
        self.on_stats = Some(Box::new(observer));
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The most recently rendered character grid.
    pub fn grid(&self) -> &CharGrid {
        &self.grid
    }

    /// Per-cell colors matching the grid, when color sampling is enabled.
    pub fn cell_colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Stats for the last completed one-second window, if any.
    pub fn stats(&self) -> Option<RenderStats> {
        self.stats.latest()
    }

    /// Begin playback.
    ///
    /// Playback-start rejection is caught and leaves state unchanged so a
    /// later call may retry. A source that failed to load is replaced by
    /// the fallback (once); with no fallback left the engine goes idle.
    /// With the motion-reduction preference set, one frame is rendered and
    /// the engine holds paused.
    pub fn play(&mut self) -> EngineState {
        if self.state == EngineState::Destroyed {
            return self.state;
        }
        if self.media.is_none() {
            log::warn!("no media source attached; engine stays idle");
            self.state = EngineState::Idle;
            return self.state;
        }
        match self.try_play() {
            Ok(()) => {
                self.throttle.reset();
                if self.options.reduced_motion {
                    if self.render_once() {
                        self.notify_frame();
                    }
                    if let Some(media) = self.media.as_mut() {
                        media.pause();
                    }
                    self.state = EngineState::Paused;
                } else {
                    self.state = EngineState::Playing;
                }
            }
            Err(MediaError::PlaybackRejected) => {
                // Host policy blocked the start; not a failure, retry later
                log::debug!("playback start rejected; state unchanged");
            }
            Err(err) => {
                log::warn!("media failed to start: {err}");
                self.state = EngineState::Idle;
            }
        }
        self.state
    }

    /// Attempt to start the current source, swapping to the fallback once
    /// on load failure.
    fn try_play(&mut self) -> Result<(), MediaError> {
        let media = self.media.as_mut().ok_or(MediaError::EmptyPlaylist)?;
        match media.play() {
            Err(MediaError::LoadFailed(reason)) if self.swap_to_fallback(&reason) => {
                // One retry on the alternate source
                self.media
                    .as_mut()
                    .ok_or(MediaError::EmptyPlaylist)?
                    .play()
            }
            other => other,
        }
    }

    /// Replace the primary source with the fallback, at most once.
    fn swap_to_fallback(&mut self, reason: &str) -> bool {
        if self.fallback_used {
            return false;
        }
        let Some(mut fallback) = self.fallback.take() else {
            return false;
        };
        log::warn!("media source failed ({reason}); switching to fallback");
        fallback.set_looping(true);
        self.media = Some(fallback);
        self.fallback_used = true;
        true
    }

    /// Suspend playback, keeping the last grid readable.
    pub fn pause(&mut self) {
        if self.state != EngineState::Playing {
            return;
        }
        if let Some(media) = self.media.as_mut() {
            media.pause();
        }
        self.state = EngineState::Paused;
    }

    /// Tear down: stop the media, clear output, refuse further work.
    /// Idempotent.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        if let Some(media) = self.media.as_mut() {
            media.pause();
        }
        self.grid = CharGrid::new(0, 0);
        self.colors.clear();
        self.stats.reset();
        self.on_frame = None;
        self.on_stats = None;
        self.state = EngineState::Destroyed;
    }

    /// Offer one display refresh at clock time `now_ms`.
    ///
    /// # Returns
    /// `true` when a new frame was rendered into the grid.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.state != EngineState::Playing {
            return false;
        }
        let Some(dt) = self.throttle.tick(now_ms) else {
            return false;
        };
        let started = Instant::now();

        if let Some(media) = self.media.as_mut() {
            media.advance(dt);
        }
        if self.media.as_ref().is_some_and(|m| m.failed()) {
            if self.swap_to_fallback("playback failure") {
                if let Some(media) = self.media.as_mut() {
                    if let Err(err) = media.play() {
                        log::warn!("fallback failed to start: {err}");
                        self.state = EngineState::Idle;
                        return false;
                    }
                }
            } else {
                log::warn!("media failed with no fallback left; engine idle");
                self.state = EngineState::Idle;
                return false;
            }
        }

        let rendered = self.render_once();
        if rendered {
            let frame_ms = started.elapsed().as_secs_f64() * 1000.0;
            let window = self.stats.record(now_ms, frame_ms);
            self.notify_frame();
            if let Some(stats) = window {
                if let Some(observer) = self.on_stats.as_mut() {
                    observer(stats);
                }
            }
        }
        rendered
    }

    fn notify_frame(&mut self) {
        if let Some(observer) = self.on_frame.as_mut() {
            observer(&self.grid);
        }
    }

    /// Sample, dither, and encode the current media frame into the grid.
    fn render_once(&mut self) -> bool {
        let Some(media) = self.media.as_ref() else {
            return false;
        };
        if media.readiness() < Readiness::CurrentData {
            return false;
        }
        let (media_w, media_h) = media.dimensions();
        if media_w == 0 || media_h == 0 {
            return false;
        }

        let block = block_size(self.options.charset.mode());
        let geo = grid_geometry_with_aspect(
            media_w,
            media_h,
            self.options.columns,
            block,
            self.options.char_aspect,
        );
        let Some(frame) = media.sample(geo.sample_width, geo.sample_height) else {
            return false;
        };

        // Cell colors come from the pre-dither frame; dithering collapses
        // everything to monochrome
        if self.options.color {
            self.colors.clear();
            self.colors.reserve(geo.cols as usize * geo.rows as usize);
            for row in 0..geo.rows {
                for col in 0..geo.cols {
                    self.colors.push(frame.average_rgb(
                        col * block.0,
                        row * block.1,
                        block.0,
                        block.1,
                    ));
                }
            }
        } else {
            self.colors.clear();
        }

        let dithered = self.options.dither.apply(&frame);
        let encode_opts = EncodeOptions {
            threshold: self.options.threshold,
            invert: self.options.invert,
            gamma: self.options.gamma,
        };
        self.grid = glyph::encode(&dithered, self.options.charset, &encode_opts);
        true
    }

    /// Plain-text rendition of the current grid.
    pub fn to_text(&self) -> String {
        self.grid.to_text()
    }

    /// Markup rendition with inline per-cell colors when enabled.
    pub fn to_html(&self) -> String {
        let colors = self.options.color.then_some(self.colors.as_slice());
        self.grid.to_html(colors)
    }

    /// Paint the current grid into a pixel surface, one glyph per cell.
    pub fn compose_raster(&self) -> Raster {
        let width = self.grid.cols() as u32 * CELL_WIDTH;
        let height = self.grid.rows() as u32 * CELL_HEIGHT;
        let mut raster = Raster::new(width, height);
        if let Some(bg) = self.options.background {
            raster.fill(bg);
        }
        let alpha = (self.options.opacity * 255.0).round() as u8;
        if alpha == 0 {
            return raster;
        }
        for (row, cells) in self.grid.iter_rows().enumerate() {
            for (col, &c) in cells.iter().enumerate() {
                if c == ' ' {
                    continue;
                }
                let color = if self.options.color {
                    self.colors
                        .get(row * self.grid.cols() + col)
                        .copied()
                        .unwrap_or(Rgba::WHITE)
                } else {
                    Rgba::WHITE
                };
                font::draw_cell(
                    &mut raster,
                    c,
                    (col as u32 * CELL_WIDTH) as i32,
                    (row as u32 * CELL_HEIGHT) as i32,
                    Rgba::new(color.r, color.g, color.b, alpha),
                );
            }
        }
        raster
    }

    /// Change the column count mid-run; takes effect on the next frame.
    pub fn set_columns(&mut self, columns: u32) {
        self.options.columns = columns.clamp(1, MAX_COLUMNS);
    }

    /// Switch character sets mid-run.
    pub fn set_charset(&mut self, charset: Charset) {
        self.options.charset = charset;
    }

    /// Switch dither algorithms mid-run.
    pub fn set_dither(&mut self, dither: Dither) {
        self.options.dither = dither;
    }

    /// Toggle dark/bright inversion.
    pub fn set_invert(&mut self, invert: bool) {
        self.options.invert = invert;
    }

    /// Retarget the processing rate; clamped like at construction.
    pub fn set_target_fps(&mut self, fps: f64) {
        self.throttle.set_target_fps(fps);
        self.options.target_fps = self.throttle.target_fps();
    }

    /// Adjust overlay opacity; clamped to 0.0..=1.0.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.options.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            self.options.opacity
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FrameClip, TestPattern};
    use crate::pixel::PixelBuffer;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn white_clip() -> Box<dyn MediaSource> {
        let frame = PixelBuffer::from_fn(8, 8, |_, _| Rgba::WHITE);
        Box::new(FrameClip::new(vec![frame], 30.0))
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = AsciiEngine::new(EngineOptions::default());
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.grid().cols(), 0);
    }

    #[test]
    fn test_play_without_media_stays_idle() {
        let mut engine = AsciiEngine::new(EngineOptions::default());
        assert_eq!(engine.play(), EngineState::Idle);
    }

    #[test]
    fn test_play_pause_destroy_transitions() {
        let mut engine = AsciiEngine::new(EngineOptions::default());
        engine.attach_media(white_clip());
        assert_eq!(engine.play(), EngineState::Playing);
        engine.pause();
        assert_eq!(engine.state(), EngineState::Paused);
        assert_eq!(engine.play(), EngineState::Playing);
        engine.destroy();
        assert_eq!(engine.state(), EngineState::Destroyed);
        // Everything is a no-op after destroy
        assert_eq!(engine.play(), EngineState::Destroyed);
        engine.destroy();
        assert_eq!(engine.state(), EngineState::Destroyed);
    }

    #[test]
    fn test_blocked_autoplay_leaves_state_unchanged() {
        let frame = PixelBuffer::from_fn(4, 4, |_, _| Rgba::WHITE);
        let mut engine = AsciiEngine::new(EngineOptions::default());
        engine.attach_media(Box::new(FrameClip::blocked(vec![frame], 30.0)));
        assert_eq!(engine.play(), EngineState::Idle);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_load_failure_swaps_to_fallback_once() {
        let mut engine = AsciiEngine::new(EngineOptions::default());
        engine.attach_media(Box::new(FrameClip::broken("404")));
        engine.set_fallback(white_clip());
        assert_eq!(engine.play(), EngineState::Playing);
        assert!(engine.frame(0.0));
        assert!(engine.grid().cols() > 0);
    }

    #[test]
    fn test_load_failure_without_fallback_goes_idle() {
        let mut engine = AsciiEngine::new(EngineOptions::default());
        engine.attach_media(Box::new(FrameClip::broken("404")));
        assert_eq!(engine.play(), EngineState::Idle);
    }

    #[test]
    fn test_frame_renders_all_white_grid() {
        let mut engine = AsciiEngine::new(EngineOptions {
            columns: 8,
            ..EngineOptions::default()
        });
        engine.attach_media(white_clip());
        engine.play();
        assert!(engine.frame(0.0));
        let grid = engine.grid();
        assert_eq!(grid.cols(), 8);
        assert!(grid.rows() >= 1);
        // All-white frame maps every cell to the densest simple-ramp glyph
        assert!(grid.cells().iter().all(|&c| c == '@'));
    }

    #[test]
    fn test_frame_respects_throttle() {
        let mut engine = AsciiEngine::new(EngineOptions {
            target_fps: 10.0,
            ..EngineOptions::default()
        });
        engine.attach_media(Box::new(TestPattern::new(32, 18)));
        engine.play();
        assert!(engine.frame(0.0));
        assert!(!engine.frame(10.0));
        assert!(!engine.frame(99.0));
        assert!(engine.frame(100.0));
    }

    #[test]
    fn test_frame_noop_unless_playing() {
        let mut engine = AsciiEngine::new(EngineOptions::default());
        engine.attach_media(white_clip());
        assert!(!engine.frame(0.0));
        engine.play();
        engine.pause();
        assert!(!engine.frame(1000.0));
    }

    #[test]
    fn test_reduced_motion_renders_one_still() {
        let mut engine = AsciiEngine::new(EngineOptions {
            reduced_motion: true,
            columns: 4,
            ..EngineOptions::default()
        });
        engine.attach_media(white_clip());
        assert_eq!(engine.play(), EngineState::Paused);
        assert_eq!(engine.grid().cols(), 4);
        // No continuous processing afterwards
        assert!(!engine.frame(0.0));
    }

    #[test]
    fn test_color_sampling_fills_cell_colors() {
        let mut engine = AsciiEngine::new(EngineOptions {
            columns: 4,
            color: true,
            ..EngineOptions::default()
        });
        engine.attach_media(white_clip());
        engine.play();
        engine.frame(0.0);
        let grid_cells = engine.grid().cols() * engine.grid().rows();
        assert_eq!(engine.cell_colors().len(), grid_cells);
        assert!(engine
            .cell_colors()
            .iter()
            .all(|c| *c == Rgba::rgb(255, 255, 255)));
    }

    #[test]
    fn test_compose_raster_dimensions_follow_grid() {
        let mut engine = AsciiEngine::new(EngineOptions {
            columns: 4,
            ..EngineOptions::default()
        });
        engine.attach_media(white_clip());
        engine.play();
        engine.frame(0.0);
        let raster = engine.compose_raster();
        assert_eq!(raster.width(), engine.grid().cols() as u32 * CELL_WIDTH);
        assert_eq!(raster.height(), engine.grid().rows() as u32 * CELL_HEIGHT);
        // '@' cells actually paint pixels
        let lit = (0..raster.width() as i32)
            .flat_map(|x| (0..raster.height() as i32).map(move |y| (x, y)))
            .filter(|&(x, y)| raster.pixel_at(x, y) != Rgba::TRANSPARENT)
            .count();
        assert!(lit > 0);
    }

    #[test]
    fn test_frame_observer_sees_each_rendered_grid() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut engine = AsciiEngine::new(EngineOptions {
            columns: 4,
            ..EngineOptions::default()
        });
        engine.attach_media(white_clip());
        engine.set_on_frame(move |grid: &CharGrid| {
            sink.borrow_mut().push(grid.to_text());
        });
        engine.play();
        assert!(engine.frame(0.0));
        // 10ms is inside the 33ms interval at 30 fps; no render, no call
        assert!(!engine.frame(10.0));
        assert!(engine.frame(40.0));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains('@'));
    }

    #[test]
    fn test_frame_observer_fires_for_reduced_motion_still() {
        let calls = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&calls);
        let mut engine = AsciiEngine::new(EngineOptions {
            reduced_motion: true,
            ..EngineOptions::default()
        });
        engine.attach_media(white_clip());
        engine.set_on_frame(move |_: &CharGrid| sink.set(sink.get() + 1));
        assert_eq!(engine.play(), EngineState::Paused);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_stats_observer_fires_when_window_closes() {
        let windows = Rc::new(Cell::new(0u32));
        let last_fps = Rc::new(Cell::new(0u32));
        let window_sink = Rc::clone(&windows);
        let fps_sink = Rc::clone(&last_fps);
        let mut engine = AsciiEngine::new(EngineOptions::default());
        engine.attach_media(white_clip());
        engine.set_on_stats(move |stats: RenderStats| {
            window_sink.set(window_sink.get() + 1);
            fps_sink.set(stats.fps);
        });
        engine.play();
        // Frames every 100ms; the 1000ms tick closes the first window
        for i in 0..=10 {
            engine.frame(i as f64 * 100.0);
        }
        assert_eq!(windows.get(), 1);
        assert_eq!(last_fps.get(), 10);
    }

    #[test]
    fn test_options_clamped_not_rejected() {
        let engine = AsciiEngine::new(EngineOptions {
            columns: 0,
            opacity: 7.5,
            char_aspect: -1.0,
            ..EngineOptions::default()
        });
        assert_eq!(engine.options().columns, 1);
        assert_eq!(engine.options().opacity, 1.0);
        assert_eq!(engine.options().char_aspect, DEFAULT_CHAR_ASPECT_RATIO);

        let engine = AsciiEngine::new(EngineOptions {
            columns: 100_000,
            ..EngineOptions::default()
        });
        assert_eq!(engine.options().columns, MAX_COLUMNS);
    }

    #[test]
    fn test_setters_clamp_mid_run() {
        let mut engine = AsciiEngine::new(EngineOptions::default());
        engine.set_columns(0);
        assert_eq!(engine.options().columns, 1);
        engine.set_opacity(-3.0);
        assert_eq!(engine.options().opacity, 0.0);
        engine.set_target_fps(100_000.0);
        assert_eq!(engine.options().target_fps, throttle::MAX_FPS);
    }
}
