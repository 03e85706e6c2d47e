//! A finite, pre-decoded frame sequence.

use crate::media::{MediaError, MediaSource, Readiness};
use crate::pixel::PixelBuffer;

/// Fallback frame rate when a caller passes a non-positive one.
const DEFAULT_FPS: f64 = 30.0;

/// A media source backed by an in-memory frame list.
///
/// The clip plays its frames at a fixed rate, optionally looping. Besides
/// feeding demos, it models the awkward corners of real media playback:
/// construction with [`blocked`] simulates an environment that rejects the
/// first play attempt, and [`broken`] a source that failed to load.
///
/// [`blocked`]: FrameClip::blocked
/// [`broken`]: FrameClip::broken
pub struct FrameClip {
    frames: Vec<PixelBuffer>,
    fps: f64,
    position_ms: f64,
    playing: bool,
    looping: bool,
    autoplay_blocked: bool,
    load_error: Option<String>,
}

impl FrameClip {
    pub fn new(frames: Vec<PixelBuffer>, fps: f64) -> Self {
        let fps = if fps > 0.0 { fps } else { DEFAULT_FPS };
        FrameClip {
            frames,
            fps,
            position_ms: 0.0,
            playing: false,
            looping: false,
            autoplay_blocked: false,
            load_error: None,
        }
    }

    /// A clip whose playback is rejected until [`allow_playback`] is called.
    ///
    /// [`allow_playback`]: FrameClip::allow_playback
    pub fn blocked(frames: Vec<PixelBuffer>, fps: f64) -> Self {
        FrameClip {
            autoplay_blocked: true,
            ..FrameClip::new(frames, fps)
        }
    }

    /// A clip that failed to load; every play attempt errors.
    pub fn broken(reason: &str) -> Self {
        FrameClip {
            load_error: Some(reason.to_string()),
            ..FrameClip::new(Vec::new(), DEFAULT_FPS)
        }
    }

    /// Lift the playback block, as a user gesture would.
    pub fn allow_playback(&mut self) {
        self.autoplay_blocked = false;
    }

    /// Total clip length in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.frames.len() as f64 / self.fps * 1000.0
    }

    /// Current playback position in milliseconds.
    pub fn position_ms(&self) -> f64 {
        self.position_ms
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Index of the frame at the current position.
    fn frame_index(&self) -> usize {
        if self.frames.is_empty() {
            return 0;
        }
        let idx = (self.position_ms / 1000.0 * self.fps) as usize;
        idx.min(self.frames.len() - 1)
    }
}

impl MediaSource for FrameClip {
    fn dimensions(&self) -> (u32, u32) {
        self.frames.first().map_or((0, 0), |f| (f.width, f.height))
    }

    fn readiness(&self) -> Readiness {
        if self.load_error.is_some() || self.frames.is_empty() {
            Readiness::Nothing
        } else {
            Readiness::CurrentData
        }
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if let Some(reason) = &self.load_error {
            return Err(MediaError::LoadFailed(reason.clone()));
        }
        if self.autoplay_blocked {
            return Err(MediaError::PlaybackRejected);
        }
        // Playing again after the end restarts from the top
        if self.ended() {
            self.position_ms = 0.0;
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn ended(&self) -> bool {
        !self.looping && !self.frames.is_empty() && self.position_ms >= self.duration_ms()
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn advance(&mut self, dt_ms: f64) {
        if !self.playing || self.frames.is_empty() || dt_ms <= 0.0 {
            return;
        }
        self.position_ms += dt_ms;
        let duration = self.duration_ms();
        if self.position_ms >= duration {
            if self.looping {
                self.position_ms %= duration;
            } else {
                self.position_ms = duration;
                self.playing = false;
            }
        }
    }

    fn failed(&self) -> bool {
        self.load_error.is_some()
    }

    fn sample(&self, width: u32, height: u32) -> Option<PixelBuffer> {
        if self.readiness() < Readiness::CurrentData {
            return None;
        }
        Some(self.frames[self.frame_index()].resample(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgba;

    fn numbered_frames(n: usize) -> Vec<PixelBuffer> {
        (0..n)
            .map(|i| PixelBuffer::from_fn(2, 2, move |_, _| Rgba::rgb(i as u8, 0, 0)))
            .collect()
    }

    #[test]
    fn test_plays_frames_in_order() {
        let mut clip = FrameClip::new(numbered_frames(3), 10.0);
        clip.play().unwrap();
        assert_eq!(clip.sample(2, 2).unwrap().pixel_at(0, 0).r, 0);

        clip.advance(100.0);
        assert_eq!(clip.sample(2, 2).unwrap().pixel_at(0, 0).r, 1);

        clip.advance(100.0);
        assert_eq!(clip.sample(2, 2).unwrap().pixel_at(0, 0).r, 2);
    }

    #[test]
    fn test_ends_without_looping() {
        let mut clip = FrameClip::new(numbered_frames(2), 10.0);
        clip.play().unwrap();
        clip.advance(500.0);
        assert!(clip.ended());
        assert!(!clip.is_playing());
        // Still samples the last frame
        assert_eq!(clip.sample(2, 2).unwrap().pixel_at(0, 0).r, 1);
    }

    #[test]
    fn test_looping_wraps_position() {
        let mut clip = FrameClip::new(numbered_frames(2), 10.0);
        clip.set_looping(true);
        clip.play().unwrap();
        clip.advance(250.0); // 200 ms duration; wraps to 50 ms
        assert!(!clip.ended());
        assert_eq!(clip.position_ms(), 50.0);
    }

    #[test]
    fn test_play_after_end_rewinds() {
        let mut clip = FrameClip::new(numbered_frames(2), 10.0);
        clip.play().unwrap();
        clip.advance(500.0);
        assert!(clip.ended());
        clip.play().unwrap();
        assert_eq!(clip.position_ms(), 0.0);
        assert!(clip.is_playing());
    }

    #[test]
    fn test_blocked_clip_rejects_until_allowed() {
        let mut clip = FrameClip::blocked(numbered_frames(1), 10.0);
        assert!(matches!(clip.play(), Err(MediaError::PlaybackRejected)));
        assert!(!clip.is_playing());

        clip.allow_playback();
        assert!(clip.play().is_ok());
        assert!(clip.is_playing());
    }

    #[test]
    fn test_broken_clip_fails_load() {
        let mut clip = FrameClip::broken("decode error");
        assert!(clip.failed());
        assert_eq!(clip.readiness(), Readiness::Nothing);
        assert!(matches!(clip.play(), Err(MediaError::LoadFailed(_))));
        assert!(clip.sample(4, 4).is_none());
    }

    #[test]
    fn test_paused_clip_ignores_advance() {
        let mut clip = FrameClip::new(numbered_frames(3), 10.0);
        clip.advance(100.0);
        assert_eq!(clip.position_ms(), 0.0);
    }

    #[test]
    fn test_sample_resamples_to_request() {
        let mut clip = FrameClip::new(numbered_frames(1), 10.0);
        clip.play().unwrap();
        let frame = clip.sample(8, 4).unwrap();
        assert_eq!((frame.width, frame.height), (8, 4));
    }
}
