/// Chroma smoothing module.
///
/// Raw chroma frames are noisy from frame to frame. This module keeps two exponential moving
/// averages over them: a fast one that follows chord changes within a fraction of a second and a
/// slow one that integrates over several seconds for key detection.
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::util::{arg_max, total_energy, N_PITCH_CLASSES};

/// Energy per pitch class, index 0 = C ... 11 = B.
pub type ChromaVector = [f32; N_PITCH_CLASSES];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParameters {
    /// Weight of the newest frame in the fast (chord) average.
    pub fast_alpha: f32,
    /// Weight of the newest frame in the slow (key) average.
    pub slow_alpha: f32,
}

impl Default for SmoothingParameters {
    fn default() -> Self {
        Self {
            fast_alpha: 0.3,
            slow_alpha: 0.05,
        }
    }
}

/// The smoothed vectors after an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaSnapshot {
    pub fast: ChromaVector,
    pub slow: ChromaVector,
    pub fast_sample_count: u64,
    pub slow_sample_count: u64,
}

#[derive(Debug, Clone)]
struct SmoothedChroma {
    alpha: f32,
    value: ChromaVector,
    sample_count: u64,
}

impl SmoothedChroma {
    fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: [0.0; N_PITCH_CLASSES],
            sample_count: 0,
        }
    }

    fn update(&mut self, frame: &ChromaVector) {
        let alpha = self.alpha;
        self.value
            .iter_mut()
            .zip(frame.iter())
            .for_each(|(smoothed, x)| *smoothed = *smoothed * (1.0 - alpha) + x * alpha);
        self.sample_count += 1;
    }

    fn reset(&mut self) {
        self.value = [0.0; N_PITCH_CLASSES];
        self.sample_count = 0;
    }
}

/// Fast and slow exponential moving averages over the incoming chroma frames. Both start at the
/// zero vector.
#[derive(Debug, Clone)]
pub struct ChromaAccumulator {
    fast: SmoothedChroma,
    slow: SmoothedChroma,
}

impl ChromaAccumulator {
    pub fn new(params: &SmoothingParameters) -> Self {
        Self {
            fast: SmoothedChroma::new(params.fast_alpha),
            slow: SmoothedChroma::new(params.slow_alpha),
        }
    }

    /// Folds one raw frame into both averages.
    ///
    /// Negative or non-finite bins violate the input contract; they are treated as zero energy.
    pub fn update(&mut self, raw_frame: &ChromaVector) -> ChromaSnapshot {
        let mut frame = *raw_frame;
        for (i, x) in frame.iter_mut().enumerate() {
            if !x.is_finite() || *x < 0.0 {
                warn!("bad chroma value encountered in bin {i}: {x}");
                *x = 0.0;
            }
        }

        self.fast.update(&frame);
        self.slow.update(&frame);

        trace!(
            "chroma energy fast {:.3} slow {:.3}, dominant pitch class {}",
            total_energy(&self.fast.value),
            total_energy(&self.slow.value),
            arg_max(&self.fast.value)
        );

        self.snapshot()
    }

    pub fn snapshot(&self) -> ChromaSnapshot {
        ChromaSnapshot {
            fast: self.fast.value,
            slow: self.slow.value,
            fast_sample_count: self.fast.sample_count,
            slow_sample_count: self.slow.sample_count,
        }
    }

    /// Back to the zero vectors and zero counts.
    pub fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> ChromaVector {
        let mut frame = [0.0; 12];
        frame[0] = 1.0;
        frame[4] = 0.5;
        frame
    }

    #[test]
    fn test_first_update_applies_alpha_to_zero_state() {
        let mut accumulator = ChromaAccumulator::new(&SmoothingParameters::default());
        let snapshot = accumulator.update(&frame());

        assert!((snapshot.fast[0] - 0.3).abs() < 1e-6);
        assert!((snapshot.fast[4] - 0.15).abs() < 1e-6);
        assert!((snapshot.slow[0] - 0.05).abs() < 1e-6);
        assert_eq!(snapshot.fast[1], 0.0);
        assert_eq!(snapshot.fast_sample_count, 1);
        assert_eq!(snapshot.slow_sample_count, 1);
    }

    #[test]
    fn test_fast_average_converges_before_slow_average() {
        let mut accumulator = ChromaAccumulator::new(&SmoothingParameters::default());
        let mut snapshot = accumulator.snapshot();
        for _ in 0..20 {
            snapshot = accumulator.update(&frame());
        }

        assert!(snapshot.fast[0] > 0.99);
        assert!(snapshot.slow[0] < 0.7);
        assert!(snapshot.slow[0] > snapshot.slow[4]);
        assert_eq!(snapshot.fast_sample_count, 20);
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut accumulator = ChromaAccumulator::new(&SmoothingParameters::default());
        let mut bad = frame();
        bad[1] = f32::NAN;
        bad[2] = -3.0;
        bad[3] = f32::INFINITY;

        let snapshot = accumulator.update(&bad);
        assert!(snapshot.fast.iter().all(|x| x.is_finite() && *x >= 0.0));
        assert_eq!(snapshot.fast[1], 0.0);
        assert_eq!(snapshot.fast[3], 0.0);
    }

    #[test]
    fn test_reset() {
        let mut accumulator = ChromaAccumulator::new(&SmoothingParameters::default());
        accumulator.update(&frame());
        accumulator.reset();

        let snapshot = accumulator.snapshot();
        assert_eq!(snapshot.fast, [0.0; 12]);
        assert_eq!(snapshot.slow, [0.0; 12]);
        assert_eq!(snapshot.fast_sample_count, 0);
        assert_eq!(snapshot.slow_sample_count, 0);
    }
}
