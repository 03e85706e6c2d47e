//! Pointer input seam for the maskers.
//!
//! Maskers never read raw host input. They consume a [`PointerSource`],
//! which hands out one smoothed [`PointerState`] per frame in surface
//! coordinates. [`SmoothedPointer`] is the provided implementation: it
//! eases toward the most recent raw position so the mask trails the
//! pointer instead of snapping to it.

/// Smoothing factor applied when none is given.
pub const DEFAULT_SMOOTHING: f32 = 0.2;

/// Pointer position in surface coordinates, plus whether the pointer is
/// currently inside the tracked region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

impl PointerState {
    /// The state reported before any input arrives.
    pub const INACTIVE: PointerState = PointerState {
        x: 0.0,
        y: 0.0,
        active: false,
    };
}

/// Per-frame pointer feed.
pub trait PointerSource {
    /// Advance smoothing by one frame. Called once per rendered frame.
    fn update(&mut self);

    /// The current (smoothed) pointer state.
    fn state(&self) -> PointerState;
}

/// Linear-interpolating pointer smoother.
///
/// Each [`update`] moves the reported position a fixed fraction of the
/// way toward the last raw input. The first raw position after the
/// pointer (re)enters the tracked region is taken as-is, so the mask
/// never sweeps in from a stale location.
///
/// [`update`]: PointerSource::update
pub struct SmoothedPointer {
    current: (f32, f32),
    target: (f32, f32),
    active: bool,
    factor: f32,
}

impl SmoothedPointer {
    /// # Arguments
    /// * `factor` - Fraction of the remaining distance covered per frame,
    ///   clamped to 0.0..=1.0. A non-finite value falls back to
    ///   [`DEFAULT_SMOOTHING`].
    pub fn new(factor: f32) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            DEFAULT_SMOOTHING
        };
        SmoothedPointer {
            current: (0.0, 0.0),
            target: (0.0, 0.0),
            active: false,
            factor,
        }
    }

    /// Feed a raw pointer position in surface coordinates.
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target = (x, y);
        if !self.active {
            // Re-entry snaps rather than lerping from the stale position
            self.current = (x, y);
            self.active = true;
        }
    }

    /// Mark the pointer as having left the tracked region.
    pub fn clear(&mut self) {
        self.active = false;
    }
}

impl Default for SmoothedPointer {
    fn default() -> Self {
        SmoothedPointer::new(DEFAULT_SMOOTHING)
    }
}

impl PointerSource for SmoothedPointer {
    fn update(&mut self) {
        if !self.active {
            return;
        }
        self.current.0 += (self.target.0 - self.current.0) * self.factor;
        self.current.1 += (self.target.1 - self.current.1) * self.factor;
    }

    fn state(&self) -> PointerState {
        PointerState {
            x: self.current.0,
            y: self.current.1,
            active: self.active,
        }
    }
}
