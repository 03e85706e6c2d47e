//! Live render statistics over one-second windows.

/// Snapshot of the last completed measurement window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    /// Frames processed during the window.
    pub fps: u32,
    /// Mean processing cost per frame in milliseconds.
    pub avg_frame_ms: f64,
}

/// Accumulates per-frame timings and emits a [`RenderStats`] snapshot
/// whenever a full second of clock time has been covered.
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    window_start_ms: Option<f64>,
    frames: u32,
    busy_ms: f64,
    latest: Option<RenderStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        StatsTracker::default()
    }

    /// Record one processed frame.
    ///
    /// # Arguments
    /// * `now_ms` - clock reading when the frame finished
    /// * `frame_ms` - time spent processing the frame
    ///
    /// # Returns
    /// The completed window's snapshot when this call closes a window,
    /// otherwise `None`.
    pub fn record(&mut self, now_ms: f64, frame_ms: f64) -> Option<RenderStats> {
        let mut emitted = None;
        match self.window_start_ms {
            None => self.window_start_ms = Some(now_ms),
            Some(start) => {
                if now_ms - start >= 1000.0 {
                    let frames = self.frames.max(1);
                    let stats = RenderStats {
                        fps: self.frames,
                        avg_frame_ms: self.busy_ms / frames as f64,
                    };
                    self.latest = Some(stats);
                    emitted = Some(stats);
                    self.window_start_ms = Some(now_ms);
                    self.frames = 0;
                    self.busy_ms = 0.0;
                }
            }
        }
        self.frames += 1;
        self.busy_ms += frame_ms.max(0.0);
        emitted
    }

    /// The most recently completed window, if any.
    pub fn latest(&self) -> Option<RenderStats> {
        self.latest
    }

    /// Drop all accumulated state, including the latest snapshot.
    pub fn reset(&mut self) {
        *self = StatsTracker::default();
    }
}
