//! Composite waveform: a base sinusoid plus seeded harmonics.

use std::f32::consts::TAU;

use crate::animator::rng::Mulberry32;

/// Number of harmonics layered over the base sinusoid.
pub const HARMONIC_COUNT: usize = 4;

/// One sinusoidal contribution to the composite wave.
#[derive(Debug, Clone, PartialEq)]
pub struct Harmonic {
    /// Multiplier of the base spatial frequency.
    pub frequency: f32,
    /// Amplitude as a fraction of the base amplitude.
    pub amplitude: f32,
    /// Phase offset in radians.
    pub phase: f32,
    /// Exponent of this harmonic's filter decay.
    pub decay: f32,
}

/// Draw a fresh harmonic set from the run's generator.
///
/// Field draw order is fixed (frequency, amplitude, phase, decay per
/// harmonic), so a given seed always yields the same wave character.
pub fn generate_harmonics(rng: &mut Mulberry32) -> Vec<Harmonic> {
    (0..HARMONIC_COUNT)
        .map(|_| Harmonic {
            frequency: rng.range(2.0, 6.0),
            amplitude: rng.range(0.1, 0.45),
            phase: rng.range(0.0, TAU),
            decay: rng.range(1.0, 4.0),
        })
        .collect()
}

/// The composite wave sampled by the wave, filter, and flow phases.
pub struct Waveform {
    /// Peak base amplitude in surface pixels.
    pub amplitude: f32,
    /// Base wavelength in surface pixels.
    pub wavelength: f32,
    pub harmonics: Vec<Harmonic>,
}

impl Waveform {
    pub fn new(amplitude: f32, wavelength: f32, harmonics: Vec<Harmonic>) -> Self {
        Waveform {
            amplitude,
            wavelength: if wavelength > 0.0 { wavelength } else { 1.0 },
            harmonics,
        }
    }

    /// Height of the wave at `x` (relative to the wave center).
    ///
    /// `filter_progress` fades the harmonics: 0 leaves them at full
    /// strength, 1 reduces the wave to the pure base sinusoid. Each
    /// harmonic fades at its own rate, `(1 - progress) ^ decay`.
    pub fn sample(&self, x: f32, filter_progress: f32) -> f32 {
        let p = filter_progress.clamp(0.0, 1.0);
        let k = TAU / self.wavelength;
        let mut y = (k * x).sin();
        for h in &self.harmonics {
            let damping = (1.0 - p).powf(h.decay);
            y += h.amplitude * damping * (h.frequency * k * x + h.phase).sin();
        }
        self.amplitude * y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_only(amplitude: f32, wavelength: f32, x: f32) -> f32 {
        amplitude * (TAU / wavelength * x).sin()
    }

    #[test]
    fn test_harmonics_are_seeded_and_bounded() {
        let mut rng = Mulberry32::new(42);
        let set = generate_harmonics(&mut rng);
        assert_eq!(set.len(), HARMONIC_COUNT);
        for h in &set {
            assert!((2.0..6.0).contains(&h.frequency));
            assert!((0.1..0.45).contains(&h.amplitude));
            assert!((0.0..TAU).contains(&h.phase));
            assert!((1.0..4.0).contains(&h.decay));
        }

        let mut again = Mulberry32::new(42);
        assert_eq!(set, generate_harmonics(&mut again));
    }

    #[test]
    fn test_fully_filtered_wave_is_pure_base() {
        let mut rng = Mulberry32::new(7);
        let wave = Waveform::new(20.0, 120.0, generate_harmonics(&mut rng));
        for i in 0..24 {
            let x = i as f32 * 10.0 - 120.0;
            let expected = base_only(20.0, 120.0, x);
            assert!((wave.sample(x, 1.0) - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_unfiltered_wave_carries_harmonics() {
        let mut rng = Mulberry32::new(7);
        let wave = Waveform::new(20.0, 120.0, generate_harmonics(&mut rng));
        let deviates = (0..24).any(|i| {
            let x = i as f32 * 10.0 - 120.0;
            (wave.sample(x, 0.0) - base_only(20.0, 120.0, x)).abs() > 0.5
        });
        assert!(deviates);
    }

    #[test]
    fn test_harmonic_decays_with_its_exponent() {
        let harmonic = Harmonic {
            frequency: 2.0,
            amplitude: 0.5,
            phase: 0.0,
            decay: 2.0,
        };
        let wave = Waveform::new(10.0, 80.0, vec![harmonic]);
        // x where the harmonic peaks: sin(2kx) = 1 at x = wavelength/8
        let x = 10.0;
        let contribution = |p: f32| wave.sample(x, p) - base_only(10.0, 80.0, x);
        assert!((contribution(0.0) - 5.0).abs() < 1e-3);
        assert!((contribution(0.5) - 1.25).abs() < 1e-3);
        assert!(contribution(1.0).abs() < 1e-3);
    }

    #[test]
    fn test_amplitude_stays_bounded() {
        let mut rng = Mulberry32::new(99);
        let wave = Waveform::new(15.0, 100.0, generate_harmonics(&mut rng));
        let bound = 15.0 * (1.0 + wave.harmonics.iter().map(|h| h.amplitude).sum::<f32>());
        for i in 0..500 {
            let x = i as f32 - 250.0;
            assert!(wave.sample(x, 0.0).abs() <= bound + 1e-3);
        }
    }
}
