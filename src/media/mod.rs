//! Media sources: the frame suppliers behind every effect.
//!
//! Effects never talk to a decoder or capture device directly; they pull
//! frames through the [`MediaSource`] trait. Two implementations ship with
//! the crate:
//!
//! - [`FrameClip`] - a finite, pre-decoded frame sequence (also the test
//!   double for playback edge cases such as rejected autoplay)
//! - [`TestPattern`] - an endless procedural plasma generator for demos
//!
//! [`Playlist`] combines several sources into one, advancing cyclically
//! when the current entry ends.

mod clip;
mod pattern;

pub use clip::FrameClip;
pub use pattern::TestPattern;

use crate::pixel::PixelBuffer;

/// How much of a source is available for sampling.
///
/// Mirrors the readiness ladder of typical media decoders: nothing known,
/// metadata (dimensions) known, or current-frame data decodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Readiness {
    /// Nothing is known about the media yet.
    Nothing,
    /// Dimensions are known but no frame can be sampled.
    Metadata,
    /// The current frame can be sampled.
    CurrentData,
}

/// Errors surfaced by media playback.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("playback start was rejected by the environment")]
    PlaybackRejected,

    #[error("media failed to load: {0}")]
    LoadFailed(String),

    #[error("playlist has no sources")]
    EmptyPlaylist,
}

/// A time-based supplier of video frames.
///
/// Sources are driven externally: the effect calls [`advance`] with the
/// elapsed wall-clock milliseconds each frame, then [`sample`]s at its
/// preferred resolution. Sampling is side-effect free.
///
/// [`advance`]: MediaSource::advance
/// [`sample`]: MediaSource::sample
pub trait MediaSource {
    /// Natural (width, height) in pixels; (0, 0) until metadata is known.
    fn dimensions(&self) -> (u32, u32);

    /// Current readiness state, polled every frame.
    fn readiness(&self) -> Readiness;

    /// Begin or resume playback.
    ///
    /// # Errors
    /// [`MediaError::PlaybackRejected`] when the environment refuses to
    /// start playback (the autoplay case); callers catch this locally and
    /// stay idle rather than propagate it.
    fn play(&mut self) -> Result<(), MediaError>;

    /// Halt playback, keeping the current position.
    fn pause(&mut self);

    /// Whether playback reached the end of the media.
    fn ended(&self) -> bool;

    /// Restart from the beginning when the end is reached.
    fn set_looping(&mut self, looping: bool);

    /// Advance the playback clock by `dt_ms` milliseconds.
    fn advance(&mut self, dt_ms: f64);

    /// Whether the source failed to load; failed sources never recover.
    fn failed(&self) -> bool {
        false
    }

    /// Sample the current frame at the requested resolution.
    ///
    /// # Returns
    /// `None` while the source is not decodable or has zero dimensions.
    fn sample(&self, width: u32, height: u32) -> Option<PixelBuffer>;
}

/// A cyclic sequence of media sources presented as a single source.
///
/// With one entry the playlist simply loops that entry. With several, the
/// current entry plays to its end, then the next is started; after the
/// last, the first plays again. A playback rejection while advancing is
/// logged and retried on the following end-of-media check.
pub struct Playlist {
    sources: Vec<Box<dyn MediaSource>>,
    current: usize,
}

impl Playlist {
    pub fn new(mut sources: Vec<Box<dyn MediaSource>>) -> Self {
        // A lone entry loops natively instead of cycling
        if sources.len() == 1 {
            sources[0].set_looping(true);
        } else {
            for source in &mut sources {
                source.set_looping(false);
            }
        }
        Playlist {
            sources,
            current: 0,
        }
    }

    /// Wrap a single source.
    pub fn single(source: Box<dyn MediaSource>) -> Self {
        Playlist::new(vec![source])
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Index of the entry currently playing.
    pub fn current_index(&self) -> usize {
        self.current
    }

    fn current(&self) -> Option<&dyn MediaSource> {
        self.sources.get(self.current).map(|s| s.as_ref())
    }

    fn current_mut(&mut self) -> Option<&mut (dyn MediaSource + 'static)> {
        self.sources.get_mut(self.current).map(|s| s.as_mut())
    }
}

impl MediaSource for Playlist {
    fn dimensions(&self) -> (u32, u32) {
        self.current().map_or((0, 0), |s| s.dimensions())
    }

    fn readiness(&self) -> Readiness {
        self.current().map_or(Readiness::Nothing, |s| s.readiness())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.current_mut().ok_or(MediaError::EmptyPlaylist)?.play()
    }

    fn pause(&mut self) {
        if let Some(source) = self.current_mut() {
            source.pause();
        }
    }

    fn ended(&self) -> bool {
        // The playlist as a whole never ends; it cycles
        false
    }

    fn set_looping(&mut self, looping: bool) {
        if self.sources.len() == 1 {
            if let Some(source) = self.current_mut() {
                source.set_looping(looping);
            }
        }
    }

    fn advance(&mut self, dt_ms: f64) {
        let len = self.sources.len();
        let Some(source) = self.current_mut() else {
            return;
        };
        source.advance(dt_ms);

        if len > 1 && source.ended() {
            source.pause();
            self.current = (self.current + 1) % len;
            let next = self.current;
            if let Some(source) = self.current_mut() {
                if let Err(err) = source.play() {
                    log::warn!("playlist advance to entry {} failed: {}", next, err);
                }
            }
        }
    }

    fn failed(&self) -> bool {
        self.current().is_some_and(|s| s.failed())
    }

    fn sample(&self, width: u32, height: u32) -> Option<PixelBuffer> {
        self.current()?.sample(width, height)
    }
}
