//! The eight-phase sequence and its scheduler.

use std::fmt;

use crate::animator::ease::Ease;

/// One stage of the animation sequence.
///
/// Transitions run strictly forward through [`Phase::SEQUENCE`]; the only
/// way back to [`Phase::Start`] is a full stop and restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The center dot grows in with an overshoot.
    Start,
    /// Particles scatter from the center to seeded random points.
    Chaos,
    /// Particles settle onto the grid, rippling out from the middle.
    Order,
    /// Particles collapse back to the center, edges first.
    Converge,
    /// The composite wave expands symmetrically to full width.
    Wave,
    /// Harmonics fade out, leaving the base sinusoid.
    Filter,
    /// The wave contracts to a point, which splits into three dots.
    Split,
    /// The dots stretch into three lines that flow until stopped.
    Flow,
}

impl Phase {
    pub const SEQUENCE: [Phase; 8] = [
        Phase::Start,
        Phase::Chaos,
        Phase::Order,
        Phase::Converge,
        Phase::Wave,
        Phase::Filter,
        Phase::Split,
        Phase::Flow,
    ];

    /// Nominal duration. For [`Phase::Flow`] this covers the stretch
    /// only; the dash loop afterwards runs until stopped.
    pub fn duration_ms(self) -> f64 {
        match self {
            Self::Start => 600.0,
            Self::Chaos => 900.0,
            Self::Order => 1100.0,
            Self::Converge => 1000.0,
            Self::Wave => 1200.0,
            Self::Filter => 900.0,
            Self::Split => 1000.0,
            Self::Flow => 1200.0,
        }
    }

    /// Primary easing curve of the phase. Split eases its two halves
    /// separately in the renderer and reports linear here.
    pub fn ease(self) -> Ease {
        match self {
            Self::Start => Ease::OutBack,
            Self::Chaos => Ease::OutQuad,
            Self::Order => Ease::InOutQuad,
            Self::Converge => Ease::InOutQuad,
            Self::Wave => Ease::OutCubic,
            Self::Filter => Ease::Linear,
            Self::Split => Ease::Linear,
            Self::Flow => Ease::InOutCubic,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Chaos => "chaos",
            Self::Order => "order",
            Self::Converge => "converge",
            Self::Wave => "wave",
            Self::Filter => "filter",
            Self::Split => "split",
            Self::Flow => "flow",
        };
        write!(f, "{name}")
    }
}

/// Scheduler owning the current phase and its elapsed time.
///
/// Feeding [`advance`] synthetic time steps drives the whole sequence
/// without any external interpolation machinery. Overflow past a phase
/// boundary carries into the next phase, so irregular frame pacing never
/// loses time. The final phase never completes; its surplus time is the
/// clock for the endless flow loop.
///
/// [`advance`]: Timeline::advance
#[derive(Debug)]
pub struct Timeline {
    index: usize,
    elapsed_ms: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            index: 0,
            elapsed_ms: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::SEQUENCE[self.index]
    }

    /// Progress through the current phase, 0.0..=1.0.
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / self.phase().duration_ms()).clamp(0.0, 1.0) as f32
    }

    /// Milliseconds spent past the final phase's nominal duration.
    ///
    /// Zero until the flow stretch finishes; afterwards it grows without
    /// bound and drives the dash-offset loop.
    pub fn overflow_ms(&self) -> f64 {
        if self.index == Phase::SEQUENCE.len() - 1 {
            (self.elapsed_ms - self.phase().duration_ms()).max(0.0)
        } else {
            0.0
        }
    }

    /// Step the clock forward by `dt_ms`.
    ///
    /// Non-positive and non-finite steps are ignored.
    ///
    /// # Returns
    /// The phases completed during this step, in order. Each completed
    /// phase should be finalized at full progress before the current one
    /// is applied.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<Phase> {
        let mut completed = Vec::new();
        if !(dt_ms > 0.0) || !dt_ms.is_finite() {
            return completed;
        }
        self.elapsed_ms += dt_ms;
        while self.index < Phase::SEQUENCE.len() - 1 {
            let duration = self.phase().duration_ms();
            if self.elapsed_ms < duration {
                break;
            }
            completed.push(self.phase());
            self.elapsed_ms -= duration;
            self.index += 1;
        }
        completed
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed_ms = 0.0;
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Timeline::new()
    }
}
