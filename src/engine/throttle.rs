//! Frame-rate throttling against a high-resolution clock.

/// Lowest accepted frame-rate target.
pub const MIN_FPS: f64 = 1.0;
/// Highest accepted frame-rate target.
pub const MAX_FPS: f64 = 240.0;

/// Decides, per refresh signal, whether a frame should be processed.
///
/// The host may invoke [`FrameThrottle::tick`] as often as it likes (e.g.
/// on every display refresh); processing fires at most `target_fps` times
/// per second of clock time. Leftover time below one interval is carried
/// so the average rate converges on the target, but multiple missed
/// intervals never burst into multiple fires.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    target_fps: f64,
    last_fire_ms: Option<f64>,
}

impl FrameThrottle {
    /// Create a throttle. Out-of-range targets are clamped to
    /// [`MIN_FPS`]..=[`MAX_FPS`], never rejected.
    pub fn new(target_fps: f64) -> Self {
        FrameThrottle {
            target_fps: clamp_fps(target_fps),
            last_fire_ms: None,
        }
    }

    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    /// Change the target rate; takes effect on the next tick.
    pub fn set_target_fps(&mut self, target_fps: f64) {
        self.target_fps = clamp_fps(target_fps);
    }

    /// Nominal milliseconds between fires.
    pub fn interval_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }

    /// Offer the current clock reading; returns the elapsed time to advance
    /// by when a frame should fire, or `None` to skip this refresh.
    ///
    /// The first tick after construction or [`FrameThrottle::reset`] always
    /// fires, reporting one nominal interval. A clock that moves backwards
    /// re-anchors silently and skips.
    pub fn tick(&mut self, now_ms: f64) -> Option<f64> {
        let interval = self.interval_ms();
        let Some(last) = self.last_fire_ms else {
            self.last_fire_ms = Some(now_ms);
            return Some(interval);
        };
        let elapsed = now_ms - last;
        if elapsed < 0.0 {
            self.last_fire_ms = Some(now_ms);
            return None;
        }
        if elapsed < interval {
            return None;
        }
        // Carry the sub-interval remainder, but never bank whole intervals:
        // a long stall yields one fire, not a burst
        self.last_fire_ms = Some(now_ms - (elapsed % interval));
        Some(elapsed)
    }

    /// Forget the last fire time; the next tick fires immediately.
    pub fn reset(&mut self) {
        self.last_fire_ms = None;
    }
}

fn clamp_fps(fps: f64) -> f64 {
    if fps.is_finite() {
        fps.clamp(MIN_FPS, MAX_FPS)
    } else {
        MAX_FPS
    }
}
