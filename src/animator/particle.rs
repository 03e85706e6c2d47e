//! Particle allocation and staggered movement.
//!
//! Particles are allocated once per animation run, one per grid slot, with
//! every target they will ever move to precomputed up front: a seeded
//! random scatter point, a grid-aligned slot, and stagger delays derived
//! from the slot's distance to the grid center. Per-frame code only
//! interpolates between these fixed points.

use crate::animator::rng::Mulberry32;

/// Fraction of a phase spent fanning out start delays. The remaining
/// fraction is every particle's movement window.
pub const STAGGER_BUDGET: f32 = 0.4;

/// One animated dot.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Current position, updated every frame.
    pub x: f32,
    pub y: f32,
    /// Pre-seeded random position for the chaos phase.
    pub scatter: (f32, f32),
    /// Grid-aligned position for the order phase.
    pub slot: (f32, f32),
    pub col: u32,
    pub row: u32,
    /// Start-delay fraction rippling outward from the grid center.
    pub delay_from_center: f32,
    /// Start-delay fraction rippling inward from the grid edges.
    pub delay_from_edges: f32,
}

/// Allocate `cols * rows` particles for a surface of the given size.
///
/// All particles start at the surface center. Scatter points are drawn
/// from `rng` in row-major particle order (x before y), so a given seed
/// always produces the same layout.
pub fn seed_particles(
    cols: u32,
    rows: u32,
    width: f32,
    height: f32,
    rng: &mut Mulberry32,
) -> Vec<Particle> {
    let center = (width / 2.0, height / 2.0);
    let mut particles = Vec::with_capacity(cols as usize * rows as usize);
    for row in 0..rows {
        for col in 0..cols {
            let slot = (
                width * (col as f32 + 0.5) / cols as f32,
                height * (row as f32 + 0.5) / rows as f32,
            );
            let scatter = (rng.range(0.0, width), rng.range(0.0, height));
            particles.push(Particle {
                x: center.0,
                y: center.1,
                scatter,
                slot,
                col,
                row,
                delay_from_center: 0.0,
                delay_from_edges: 0.0,
            });
        }
    }

    let max_dist = particles
        .iter()
        .map(|p| slot_distance(p, center))
        .fold(0.0f32, f32::max);
    if max_dist > 0.0 {
        for p in &mut particles {
            let normalized = slot_distance(p, center) / max_dist;
            p.delay_from_center = STAGGER_BUDGET * normalized;
            p.delay_from_edges = STAGGER_BUDGET * (1.0 - normalized);
        }
    }
    particles
}

fn slot_distance(p: &Particle, center: (f32, f32)) -> f32 {
    ((p.slot.0 - center.0).powi(2) + (p.slot.1 - center.1).powi(2)).sqrt()
}

/// Local progress of a movement that starts `delay` into the phase.
///
/// Every particle moves over the same window (`1 - STAGGER_BUDGET` of the
/// phase); the last starter finishes exactly at the phase end.
pub fn staggered_progress(phase_t: f32, delay: f32) -> f32 {
    let span = (1.0 - STAGGER_BUDGET).max(f32::EPSILON);
    ((phase_t - delay) / span).clamp(0.0, 1.0)
}

/// Linear interpolation between two points.
pub fn lerp(a: (f32, f32), b: (f32, f32), k: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * k, a.1 + (b.1 - a.1) * k)
}
