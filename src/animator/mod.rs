//! Procedural intro animation: particles, waves, and flowing lines.
//!
//! [`PhaseAnimator`] drives a fixed eight-phase sequence on its own
//! [`Raster`] surface: a dot pops in, bursts into scattered particles,
//! the particles settle onto a grid, collapse back to the center, unroll
//! into a composite wave, filter down to the pure base sine, split into
//! three dots, and finally stretch into three dashed lines that flow
//! indefinitely. Every random draw comes from a [`Mulberry32`] generator
//! seeded from the options, so a given seed replays the same animation.
//!
//! The animator owns its surface, particle array, and generator; the
//! host owns the clock and calls [`PhaseAnimator::advance`] per frame.

pub mod ease;
pub mod particle;
pub mod phase;
pub mod rng;
pub mod wave;

pub use ease::Ease;
pub use particle::{Particle, STAGGER_BUDGET};
pub use phase::{Phase, Timeline};
pub use rng::Mulberry32;
pub use wave::{Harmonic, Waveform, HARMONIC_COUNT};

use crate::animator::particle::{lerp, seed_particles, staggered_progress};
use crate::animator::wave::generate_harmonics;
use crate::mask::scale_dpr;
use crate::pixel::Rgba;
use crate::raster::Raster;

/// Lit run length, in pixels, of the flow-phase dash pattern.
const DASH_LENGTH: f32 = 10.0;

/// Dark run length, in pixels, of the flow-phase dash pattern.
const DASH_GAP: f32 = 8.0;

/// Pattern travel speed in pixels per millisecond once the flow loops.
const DASH_TRAVEL_PER_MS: f64 = 0.06;

/// Tuning knobs for the animation. All fields have usable defaults.
#[derive(Debug, Clone)]
pub struct AnimatorOptions {
    /// Seed for the deterministic random generator.
    pub seed: u32,
    /// Particle grid width, in dots.
    pub grid_cols: u32,
    /// Particle grid height, in dots.
    pub grid_rows: u32,
    /// Dot radius in surface pixels.
    pub dot_radius: f32,
    /// Peak displacement of the base wave, in pixels.
    pub wave_amplitude: f32,
    /// Base wavelength in pixels.
    pub wavelength: f32,
    /// Stroke width for wave and flow lines.
    pub line_width: f32,
    /// Vertical distance between the three split lanes, in pixels.
    pub split_spacing: f32,
    /// Draw color for dots and lines.
    pub color: Rgba,
    /// Opaque backdrop; `None` leaves the surface transparent.
    pub background: Option<Rgba>,
    /// Render the settled end state once instead of animating.
    pub reduced_motion: bool,
}

impl Default for AnimatorOptions {
    fn default() -> Self {
        AnimatorOptions {
            seed: 1,
            grid_cols: 8,
            grid_rows: 5,
            dot_radius: 3.0,
            wave_amplitude: 24.0,
            wavelength: 140.0,
            line_width: 2.0,
            split_spacing: 26.0,
            color: Rgba::WHITE,
            background: None,
            reduced_motion: false,
        }
    }
}

impl AnimatorOptions {
    /// Clamp every field into its working range.
    fn normalize(mut self) -> Self {
        let defaults = AnimatorOptions::default();
        self.grid_cols = self.grid_cols.max(1);
        self.grid_rows = self.grid_rows.max(1);
        self.dot_radius = positive_or(self.dot_radius, defaults.dot_radius).max(0.5);
        self.wave_amplitude = if self.wave_amplitude.is_finite() {
            self.wave_amplitude.max(0.0)
        } else {
            defaults.wave_amplitude
        };
        self.wavelength = positive_or(self.wavelength, defaults.wavelength);
        self.line_width = positive_or(self.line_width, defaults.line_width).max(1.0);
        self.split_spacing = if self.split_spacing.is_finite() {
            self.split_spacing.max(0.0)
        } else {
            defaults.split_spacing
        };
        self
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Flat scalar record describing what the current frame shows.
///
/// Only the phase scheduler writes these; the draw routines read them.
/// Every field stays inside a small fixed range (eases with overshoot may
/// briefly exceed `1.0`), so a stopped or restarted run always begins
/// from the same zeroed record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationState {
    /// Center dot radius multiplier during pop-in.
    pub dot_scale: f32,
    /// Center dot alpha multiplier during pop-in and wave takeover.
    pub dot_opacity: f32,
    /// Fraction of the half-width the wave line currently spans.
    pub wave_extent: f32,
    /// Harmonic damping amount; `1.0` leaves the pure base sine.
    pub filter_amount: f32,
    /// Vertical spread of the three split lanes, as a spacing multiplier.
    pub split_progress: f32,
    /// Fraction of the half-width the flow lines currently span.
    pub flow_stretch: f32,
    /// Current offset into the dash pattern, wrapped to one period.
    pub dash_offset: f32,
}

/// Instance object running the eight-phase intro on a private surface.
pub struct PhaseAnimator {
    options: AnimatorOptions,
    /// Logical width, height, and device pixel ratio for the next start.
    layout: (u32, u32, f32),
    surface: Raster,
    particles: Vec<Particle>,
    rng: Mulberry32,
    waveform: Waveform,
    timeline: Timeline,
    state: AnimationState,
    running: bool,
}

impl PhaseAnimator {
    /// Create a stopped animator for a logical surface size.
    ///
    /// # Arguments
    /// * `width` / `height` - logical surface size in CSS-style pixels
    /// * `dpr` - device pixel ratio; the backing surface is scaled by it
    pub fn new(width: u32, height: u32, dpr: f32, options: AnimatorOptions) -> Self {
        let options = options.normalize();
        let (surface_w, surface_h) = scale_dpr(width, height, dpr);
        PhaseAnimator {
            layout: (width, height, dpr),
            surface: Raster::new(surface_w, surface_h),
            particles: Vec::new(),
            rng: Mulberry32::new(options.seed),
            waveform: Waveform::new(options.wave_amplitude, options.wavelength, Vec::new()),
            timeline: Timeline::new(),
            state: AnimationState::default(),
            running: false,
            options,
        }
    }

    /// Record a new logical size, applied on the next start or restart.
    pub fn set_layout(&mut self, width: u32, height: u32, dpr: f32) {
        self.layout = (width, height, dpr);
    }

    /// Replace the seed used by future starts.
    pub fn set_seed(&mut self, seed: u32) {
        self.options.seed = seed;
    }

    /// Begin a run from the first phase.
    ///
    /// Ignored while a run is already in flight; stop first to begin
    /// anew. Reallocates the surface from the latest layout, re-seeds the
    /// generator, and draws particles and harmonics from it in a fixed
    /// order, so equal seeds replay identical runs.
    ///
    /// With reduced motion requested this renders the settled flow state
    /// once and stays stopped.
    pub fn start(&mut self) {
        if self.running {
            log::debug!("animation already running, start ignored");
            return;
        }
        let (width, height) = scale_dpr(self.layout.0, self.layout.1, self.layout.2);
        self.surface = Raster::new(width, height);
        self.rng = Mulberry32::new(self.options.seed);
        self.particles = seed_particles(
            self.options.grid_cols,
            self.options.grid_rows,
            width as f32,
            height as f32,
            &mut self.rng,
        );
        self.waveform = Waveform::new(
            self.options.wave_amplitude,
            self.options.wavelength,
            generate_harmonics(&mut self.rng),
        );
        self.timeline.reset();
        self.state = AnimationState::default();

        if self.options.reduced_motion {
            let total: f64 = Phase::SEQUENCE.iter().map(|p| p.duration_ms()).sum();
            for completed in self.timeline.advance(total) {
                self.apply_phase(completed, 1.0);
            }
            self.apply_phase(Phase::Flow, 1.0);
            self.draw();
            return;
        }

        self.running = true;
        self.apply_phase(Phase::Start, 0.0);
        self.draw();
    }

    /// Cancel the run and clear the surface. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.surface.clear();
        self.particles.clear();
        self.timeline.reset();
        self.state = AnimationState::default();
        self.running = false;
    }

    /// Stop, then start a fresh run with the latest layout and seed.
    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    /// Step the animation by `dt_ms` and redraw the surface.
    ///
    /// Phases that `dt_ms` skips over entirely are still settled at their
    /// end state before the current phase applies, so large steps cannot
    /// leave particles mid-flight from an earlier phase.
    ///
    /// # Returns
    /// `true` when a frame was drawn; `false` while stopped.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        for completed in self.timeline.advance(dt_ms) {
            self.apply_phase(completed, 1.0);
        }
        let phase = self.timeline.phase();
        self.apply_phase(phase, self.timeline.progress());
        if phase == Phase::Flow {
            let period = (DASH_LENGTH + DASH_GAP) as f64;
            self.state.dash_offset =
                (self.timeline.overflow_ms() * DASH_TRAVEL_PER_MS).rem_euclid(period) as f32;
        }
        self.draw();
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> Phase {
        self.timeline.phase()
    }

    pub fn progress(&self) -> f32 {
        self.timeline.progress()
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Borrow the composited surface.
    pub fn surface(&self) -> &Raster {
        &self.surface
    }

    /// Write the scalar and particle updates for one phase at progress `t`.
    fn apply_phase(&mut self, phase: Phase, t: f32) {
        let eased = phase.ease().apply(t);
        match phase {
            Phase::Start => {
                self.state.dot_scale = eased;
                self.state.dot_opacity = t.clamp(0.0, 1.0);
            }
            Phase::Chaos => {
                self.state.dot_scale = 1.0;
                self.state.dot_opacity = 1.0;
                let center = self.surface_center();
                for p in &mut self.particles {
                    let (x, y) = lerp(center, p.scatter, eased);
                    p.x = x;
                    p.y = y;
                }
            }
            Phase::Order => {
                let ease = phase.ease();
                for p in &mut self.particles {
                    let k = ease.apply(staggered_progress(t, p.delay_from_center));
                    let (x, y) = lerp(p.scatter, p.slot, k);
                    p.x = x;
                    p.y = y;
                }
            }
            Phase::Converge => {
                let center = self.surface_center();
                let ease = phase.ease();
                for p in &mut self.particles {
                    let k = ease.apply(staggered_progress(t, p.delay_from_edges));
                    let (x, y) = lerp(p.slot, center, k);
                    p.x = x;
                    p.y = y;
                }
            }
            Phase::Wave => {
                // Dots hand off to the wave early in the phase.
                self.state.dot_opacity = (1.0 - t * 4.0).max(0.0);
                self.state.wave_extent = eased;
            }
            Phase::Filter => {
                self.state.wave_extent = 1.0;
                self.state.filter_amount = eased;
            }
            Phase::Split => {
                self.state.filter_amount = 1.0;
                if t < 0.5 {
                    self.state.wave_extent = 1.0 - Ease::InQuad.apply(t * 2.0);
                    self.state.split_progress = 0.0;
                } else {
                    self.state.wave_extent = 0.0;
                    self.state.split_progress = Ease::OutBack.apply(t * 2.0 - 1.0);
                }
            }
            Phase::Flow => {
                self.state.split_progress = 1.0;
                self.state.flow_stretch = eased;
            }
        }
    }

    /// Composite the current state onto the surface.
    fn draw(&mut self) {
        match self.options.background {
            Some(bg) => self.surface.fill(bg),
            None => self.surface.clear(),
        }
        let (cx, cy) = self.surface_center();
        match self.timeline.phase() {
            Phase::Start => self.draw_center_dot(cx, cy),
            Phase::Chaos | Phase::Order | Phase::Converge => self.draw_particles(),
            Phase::Wave | Phase::Filter => {
                self.draw_center_dot(cx, cy);
                self.draw_wave_line(cx, cy);
            }
            Phase::Split => {
                if self.state.wave_extent > 0.0 {
                    self.draw_wave_line(cx, cy);
                } else {
                    self.draw_split_dots(cx, cy);
                }
            }
            Phase::Flow => self.draw_flow_lines(cx, cy),
        }
    }

    fn draw_center_dot(&mut self, cx: f32, cy: f32) {
        let radius = self.options.dot_radius * self.state.dot_scale;
        let alpha = (self.options.color.a as f32 * self.state.dot_opacity).round() as u8;
        if alpha == 0 {
            return;
        }
        let color = with_alpha(self.options.color, alpha);
        self.soft_dot(cx, cy, radius, color);
    }

    fn draw_particles(&mut self) {
        let radius = self.options.dot_radius;
        let color = self.options.color;
        // Particles are drawn from a scratch copy of their positions so
        // the surface borrow does not alias the particle borrow.
        let positions: Vec<(f32, f32)> = self.particles.iter().map(|p| (p.x, p.y)).collect();
        for (x, y) in positions {
            self.soft_dot(x, y, radius, color);
        }
    }

    fn draw_wave_line(&mut self, cx: f32, cy: f32) {
        let half = cx * self.state.wave_extent;
        let points = self.wave_points(cx, cy, half, self.state.filter_amount);
        self.surface
            .stroke_polyline(&points, self.options.line_width, self.options.color);
    }

    fn draw_split_dots(&mut self, cx: f32, cy: f32) {
        let spread = self.options.split_spacing * self.state.split_progress;
        let radius = self.options.dot_radius;
        let color = self.options.color;
        for lane in [-1.0f32, 0.0, 1.0] {
            self.soft_dot(cx, cy + lane * spread, radius, color);
        }
    }

    fn draw_flow_lines(&mut self, cx: f32, cy: f32) {
        let half = cx * self.state.flow_stretch;
        if half < 0.5 {
            // Stretch has not opened up yet; hold the split dots.
            self.draw_split_dots(cx, cy);
            return;
        }
        for lane in [-1.0f32, 0.0, 1.0] {
            let base = cy + lane * self.options.split_spacing;
            let points = self.wave_points(cx, base, half, self.state.filter_amount);
            self.surface.stroke_dashed(
                &points,
                self.options.line_width,
                DASH_LENGTH,
                DASH_GAP,
                self.state.dash_offset,
                self.options.color,
            );
        }
    }

    /// Sample the waveform into polyline points spanning `cx +- half`.
    fn wave_points(&self, cx: f32, cy: f32, half: f32, filter: f32) -> Vec<(f32, f32)> {
        if half < 0.5 {
            return Vec::new();
        }
        // One sample roughly every three pixels keeps strokes smooth
        // without oversampling short lines.
        let count = ((half * 2.0 / 3.0).ceil() as usize).max(2);
        let mut points = Vec::with_capacity(count + 1);
        for i in 0..=count {
            let x = cx - half + half * 2.0 * i as f32 / count as f32;
            points.push((x, cy + self.waveform.sample(x - cx, filter)));
        }
        points
    }

    fn soft_dot(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        if radius < 0.25 || color.a == 0 {
            return;
        }
        self.surface
            .fill_circle_soft(x, y, (radius - 1.0).max(0.0), radius + 0.5, color);
    }

    fn surface_center(&self) -> (f32, f32) {
        (
            self.surface.width() as f32 / 2.0,
            self.surface.height() as f32 / 2.0,
        )
    }
}

fn with_alpha(color: Rgba, alpha: u8) -> Rgba {
    Rgba::new(color.r, color.g, color.b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_animator() -> PhaseAnimator {
        let options = AnimatorOptions {
            grid_cols: 4,
            grid_rows: 3,
            seed: 42,
            ..AnimatorOptions::default()
        };
        PhaseAnimator::new(200, 100, 1.0, options)
    }

    fn lit_pixels(surface: &Raster) -> usize {
        let buffer = surface.buffer();
        let mut lit = 0;
        for y in 0..buffer.height {
            for x in 0..buffer.width {
                if buffer.pixel_at(x as i64, y as i64).a > 0 {
                    lit += 1;
                }
            }
        }
        lit
    }

    #[test]
    fn test_start_seeds_particles_and_runs() {
        let mut animator = small_animator();
        assert!(!animator.is_running());
        animator.start();
        assert!(animator.is_running());
        assert_eq!(animator.particles().len(), 12);
        assert_eq!(animator.phase(), Phase::Start);
        for p in animator.particles() {
            assert_eq!((p.x, p.y), (100.0, 50.0));
        }
    }

    #[test]
    fn test_start_while_running_is_ignored() {
        let mut animator = small_animator();
        animator.start();
        animator.advance(700.0);
        let phase = animator.phase();
        assert_eq!(phase, Phase::Chaos);
        animator.start();
        assert_eq!(animator.phase(), phase);
        assert!(animator.is_running());
    }

    #[test]
    fn test_stop_clears_surface_and_is_idempotent() {
        let mut animator = small_animator();
        animator.start();
        animator.advance(300.0);
        assert!(lit_pixels(animator.surface()) > 0);
        animator.stop();
        assert!(!animator.is_running());
        assert_eq!(lit_pixels(animator.surface()), 0);
        assert!(animator.particles().is_empty());
        animator.stop();
        assert!(!animator.advance(16.0));
    }

    #[test]
    fn test_restart_replays_the_same_seeded_layout() {
        let mut animator = small_animator();
        animator.start();
        let first: Vec<(f32, f32)> = animator.particles().iter().map(|p| p.scatter).collect();
        animator.advance(900.0);
        animator.restart();
        let second: Vec<(f32, f32)> = animator.particles().iter().map(|p| p.scatter).collect();
        assert_eq!(first, second);
        assert_eq!(animator.phase(), Phase::Start);
    }

    #[test]
    fn test_restart_applies_pending_layout() {
        let mut animator = small_animator();
        animator.start();
        animator.set_layout(300, 80, 1.0);
        animator.restart();
        assert_eq!(animator.surface().width(), 300);
        assert_eq!(animator.surface().height(), 80);
        for p in animator.particles() {
            assert!(p.scatter.0 <= 300.0 && p.scatter.1 <= 80.0);
        }
    }

    #[test]
    fn test_set_seed_changes_the_next_run() {
        let mut animator = small_animator();
        animator.start();
        let first: Vec<(f32, f32)> = animator.particles().iter().map(|p| p.scatter).collect();
        animator.set_seed(7);
        animator.restart();
        let second: Vec<(f32, f32)> = animator.particles().iter().map(|p| p.scatter).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_start_phase_grows_a_center_dot() {
        let mut animator = small_animator();
        animator.start();
        animator.advance(300.0);
        assert_eq!(animator.phase(), Phase::Start);
        let buffer = animator.surface().buffer();
        assert!(buffer.pixel_at(100, 50).a > 0);
        assert_eq!(buffer.pixel_at(0, 0).a, 0);
    }

    #[test]
    fn test_order_phase_lands_particles_on_slots() {
        let mut animator = small_animator();
        animator.start();
        // Cross the start, chaos, and order boundaries in one step.
        animator.advance(2600.0);
        assert_eq!(animator.phase(), Phase::Converge);
        for p in animator.particles() {
            assert_eq!((p.x, p.y), p.slot);
        }
    }

    #[test]
    fn test_converge_returns_particles_to_center() {
        let mut animator = small_animator();
        animator.start();
        animator.advance(3600.0);
        assert_eq!(animator.phase(), Phase::Wave);
        for p in animator.particles() {
            assert!((p.x - 100.0).abs() < 1e-3);
            assert!((p.y - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_chaos_phase_scatters_particles() {
        let mut animator = small_animator();
        animator.start();
        animator.advance(1100.0);
        assert_eq!(animator.phase(), Phase::Chaos);
        let spread = animator
            .particles()
            .iter()
            .filter(|p| (p.x - 100.0).abs() > 1.0 || (p.y - 50.0).abs() > 1.0)
            .count();
        assert!(spread > animator.particles().len() / 2);
    }

    #[test]
    fn test_split_state_hands_off_from_wave_to_dots() {
        let mut animator = small_animator();
        animator.start();
        // 200ms into the split phase: the wave is still contracting.
        animator.advance(5900.0);
        assert_eq!(animator.phase(), Phase::Split);
        let early = animator.state();
        assert!(early.wave_extent > 0.0);
        assert_eq!(early.split_progress, 0.0);
        // 800ms in: the wave is gone and the lanes are spreading.
        animator.advance(600.0);
        let late = animator.state();
        assert_eq!(late.wave_extent, 0.0);
        assert!(late.split_progress > 0.5);
    }

    #[test]
    fn test_flow_is_terminal_and_loops_the_dash_offset() {
        let mut animator = small_animator();
        animator.start();
        let total: f64 = Phase::SEQUENCE.iter().map(|p| p.duration_ms()).sum();
        animator.advance(total);
        assert_eq!(animator.phase(), Phase::Flow);
        assert_eq!(animator.state().flow_stretch, 1.0);
        assert_eq!(animator.state().dash_offset, 0.0);
        animator.advance(100.0);
        assert_eq!(animator.phase(), Phase::Flow);
        let offset = animator.state().dash_offset;
        assert!(offset > 0.0 && offset < DASH_LENGTH + DASH_GAP);
        assert!(animator.is_running());
        assert!(lit_pixels(animator.surface()) > 0);
    }

    #[test]
    fn test_small_steps_visit_every_phase_in_order() {
        let mut animator = small_animator();
        animator.start();
        let mut seen = vec![animator.phase()];
        for _ in 0..500 {
            animator.advance(16.0);
            let phase = animator.phase();
            if *seen.last().unwrap() != phase {
                seen.push(phase);
            }
        }
        assert_eq!(seen, Phase::SEQUENCE.to_vec());
    }

    #[test]
    fn test_reduced_motion_renders_settled_flow_without_running() {
        let mut animator = PhaseAnimator::new(
            200,
            100,
            1.0,
            AnimatorOptions {
                reduced_motion: true,
                ..AnimatorOptions::default()
            },
        );
        animator.start();
        assert!(!animator.is_running());
        assert_eq!(animator.phase(), Phase::Flow);
        assert_eq!(animator.state().flow_stretch, 1.0);
        assert_eq!(animator.state().filter_amount, 1.0);
        assert!(lit_pixels(animator.surface()) > 0);
        assert!(!animator.advance(16.0));
    }

    #[test]
    fn test_background_fills_the_surface() {
        let mut animator = PhaseAnimator::new(
            64,
            32,
            1.0,
            AnimatorOptions {
                background: Some(Rgba::BLACK),
                ..AnimatorOptions::default()
            },
        );
        animator.start();
        let buffer = animator.surface().buffer();
        assert_eq!(buffer.pixel_at(0, 0), Rgba::BLACK);
    }

    #[test]
    fn test_options_are_normalized() {
        let animator = PhaseAnimator::new(
            100,
            50,
            1.0,
            AnimatorOptions {
                grid_cols: 0,
                grid_rows: 0,
                dot_radius: f32::NAN,
                wavelength: -5.0,
                line_width: 0.0,
                ..AnimatorOptions::default()
            },
        );
        assert_eq!(animator.options.grid_cols, 1);
        assert_eq!(animator.options.grid_rows, 1);
        assert_eq!(animator.options.dot_radius, 3.0);
        assert_eq!(animator.options.wavelength, 140.0);
        assert_eq!(animator.options.line_width, 2.0);
    }
}
