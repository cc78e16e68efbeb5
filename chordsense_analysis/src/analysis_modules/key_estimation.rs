/// Key estimation module.
///
/// Correlates the slowly smoothed chroma vector with the Krumhansl-Schmuckler tonal profiles of
/// all 24 major and minor keys. Because it integrates over many seconds of audio and only looks
/// at the overall pitch distribution, it tolerates wrong notes much better than chord detection
/// does.
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

use chordsense_catalogue::{Mode, SongEntry};

use super::chroma_accumulator::ChromaVector;
use crate::chord::{Chord, ChordQuality};
use crate::util::{
    normalize_energy, parse_pitch_class, pearson_correlation, pitch_class_name, rotate,
    total_energy, N_PITCH_CLASSES,
};

/// Krumhansl-Schmuckler major key profile, tonic at index 0.
pub const MAJOR_PROFILE: [f32; N_PITCH_CLASSES] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Schmuckler minor key profile, tonic at index 0.
pub const MINOR_PROFILE: [f32; N_PITCH_CLASSES] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDetectionParameters {
    /// Minimum total energy of the slow chroma vector.
    pub silence_threshold: f32,
    /// Minimum number of accumulated frames before a key is reported.
    pub min_samples: u64,
    /// The runner-up key is only reported above this confidence.
    pub alternate_min_confidence: f32,
    /// Key detection runs every this many updates of the analysis state.
    pub detection_interval: u32,
}

impl Default for KeyDetectionParameters {
    fn default() -> Self {
        Self {
            silence_threshold: 0.1,
            min_samples: 12,
            alternate_min_confidence: 0.3,
            detection_interval: 4,
        }
    }
}

/// A musical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Tonic pitch class (0-11, where 0 = C)
    pub root: usize,
    pub mode: Mode,
}

impl Key {
    pub fn new(root: usize, mode: Mode) -> Self {
        Self {
            root: root % N_PITCH_CLASSES,
            mode,
        }
    }

    /// The key a catalogue song is written in, if its key name can be read.
    pub fn of_song(song: &SongEntry) -> Option<Key> {
        parse_pitch_class(&song.key).map(|root| Key::new(root, song.mode))
    }

    pub fn tonic_chord(&self) -> Chord {
        match self.mode {
            Mode::Major => Chord::new(self.root, ChordQuality::Major),
            Mode::Minor => Chord::new(self.root, ChordQuality::Minor),
        }
    }

    /// Chord-style short form: `"C"` for C major, `"Am"` for A minor.
    pub fn short_name(&self) -> String {
        self.tonic_chord().name()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", pitch_class_name(self.root), self.mode)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    pub root: usize,
    pub mode: Mode,
    /// Correlation mapped from [-1, 1] to [0, 1].
    pub confidence: f32,
    /// Pearson correlation with the key profile.
    pub correlation: f32,
    /// The runner-up key, if it is plausible enough.
    pub alternate: Option<Box<KeyEstimate>>,
}

impl KeyEstimate {
    pub fn key(&self) -> Key {
        Key::new(self.root, self.mode)
    }
}

#[derive(Debug, Clone, Copy)]
struct KeyCandidate {
    key: Key,
    correlation: f32,
}

impl KeyCandidate {
    fn confidence(&self) -> f32 {
        (self.correlation + 1.0) / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct KeyEstimator {
    params: KeyDetectionParameters,
    /// All 24 rotated profiles, major roots 0-11 then minor roots 0-11.
    profiles: Vec<(Key, [f32; N_PITCH_CLASSES])>,
}

impl KeyEstimator {
    pub fn new(params: KeyDetectionParameters) -> Self {
        let profiles = [(Mode::Major, MAJOR_PROFILE), (Mode::Minor, MINOR_PROFILE)]
            .iter()
            .flat_map(|(mode, profile)| {
                (0..N_PITCH_CLASSES)
                    .map(move |root| (Key::new(root, *mode), rotate(profile, root as isize)))
            })
            .collect();

        Self { params, profiles }
    }

    pub fn params(&self) -> &KeyDetectionParameters {
        &self.params
    }

    /// Estimates the key from a slowly smoothed chroma vector.
    ///
    /// Returns `None` while there is not enough signal: too little energy, fewer than
    /// `min_samples` accumulated frames, or a completely flat pitch distribution.
    pub fn estimate(&self, chroma: &ChromaVector, sample_count: u64) -> Option<KeyEstimate> {
        if sample_count < self.params.min_samples
            || total_energy(chroma) < self.params.silence_threshold
        {
            return None;
        }
        let normalized = normalize_energy(chroma)?;

        let mut best: Option<KeyCandidate> = None;
        let mut second: Option<KeyCandidate> = None;
        for (key, profile) in &self.profiles {
            let candidate = KeyCandidate {
                key: *key,
                correlation: pearson_correlation(&normalized, profile)?,
            };
            // strict comparisons: the first candidate seen wins a tie
            if best.map_or(true, |b| candidate.correlation > b.correlation) {
                second = best;
                best = Some(candidate);
            } else if second.map_or(true, |s| candidate.correlation > s.correlation) {
                second = Some(candidate);
            }
        }
        let best = best?;

        let alternate = second
            .filter(|s| s.confidence() > self.params.alternate_min_confidence)
            .map(|s| {
                Box::new(KeyEstimate {
                    root: s.key.root,
                    mode: s.key.mode,
                    confidence: s.confidence(),
                    correlation: s.correlation,
                    alternate: None,
                })
            });

        trace!(
            "key estimate {} (r = {:.3}), runner-up {:?}",
            best.key,
            best.correlation,
            second.map(|s| s.key.to_string())
        );

        Some(KeyEstimate {
            root: best.key.root,
            mode: best.key.mode,
            confidence: best.confidence(),
            correlation: best.correlation,
            alternate,
        })
    }
}

impl Default for KeyEstimator {
    fn default() -> Self {
        Self::new(KeyDetectionParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENOUGH: u64 = 100;

    #[test]
    fn test_silence_gives_no_key() {
        let estimator = KeyEstimator::default();
        assert_eq!(estimator.estimate(&[0.0; 12], ENOUGH), None);
        assert_eq!(estimator.estimate(&[0.001; 12], ENOUGH), None);
    }

    #[test]
    fn test_too_few_samples_gives_no_key() {
        let estimator = KeyEstimator::default();
        assert_eq!(estimator.estimate(&MAJOR_PROFILE, 3), None);
        assert!(estimator.estimate(&MAJOR_PROFILE, 12).is_some());
    }

    #[test]
    fn test_flat_chroma_gives_no_key() {
        let estimator = KeyEstimator::default();
        for level in [0.5, 1.0, 3.0, 40.0] {
            assert_eq!(estimator.estimate(&[level; 12], ENOUGH), None, "level {level}");
        }
    }

    #[test]
    fn test_exact_major_profile() {
        let estimator = KeyEstimator::default();
        for root in 0..12 {
            let chroma = rotate(&MAJOR_PROFILE, root as isize);
            let estimate = estimator.estimate(&chroma, ENOUGH).unwrap();
            assert_eq!(estimate.key(), Key::new(root, Mode::Major));
            assert!(estimate.confidence >= 0.9);
            if let Some(alternate) = &estimate.alternate {
                assert!(alternate.confidence > 0.3);
                assert!(alternate.confidence <= estimate.confidence);
                assert_ne!(alternate.key(), estimate.key());
                assert!(alternate.alternate.is_none());
            }
        }
    }

    #[test]
    fn test_exact_minor_profile() {
        let estimator = KeyEstimator::default();
        let chroma = rotate(&MINOR_PROFILE, 9);
        let estimate = estimator.estimate(&chroma, ENOUGH).unwrap();
        assert_eq!(estimate.key(), Key::new(9, Mode::Minor));
        assert_eq!(estimate.key().to_string(), "A minor");
        assert_eq!(estimate.key().short_name(), "Am");
        assert!(estimate.confidence >= 0.9);
    }

    #[test]
    fn test_alternate_threshold() {
        let estimator = KeyEstimator::new(KeyDetectionParameters {
            alternate_min_confidence: 0.99,
            ..Default::default()
        });
        let estimate = estimator.estimate(&MAJOR_PROFILE, ENOUGH).unwrap();
        assert_eq!(estimate.key(), Key::new(0, Mode::Major));
        assert!(estimate.alternate.is_none());

        let estimator = KeyEstimator::default();
        let estimate = estimator.estimate(&MAJOR_PROFILE, ENOUGH).unwrap();
        let alternate = estimate.alternate.expect("a close runner-up key");
        assert!(alternate.confidence > 0.3);
    }

    #[test]
    fn test_scale_invariance() {
        let estimator = KeyEstimator::default();
        let chroma = rotate(&MINOR_PROFILE, 4);
        let a = estimator.estimate(&chroma, ENOUGH).unwrap();
        let b = estimator.estimate(&chroma.map(|x| x * 17.0), ENOUGH).unwrap();
        assert_eq!(a.key(), b.key());
        assert!((a.confidence - b.confidence).abs() < 1e-4);
    }

    #[test]
    fn test_c_major_scale_notes() {
        // only the white keys, tonic triad emphasized
        let mut chroma = [0.0; 12];
        for pc in [0, 2, 4, 5, 7, 9, 11] {
            chroma[pc] = 1.0;
        }
        chroma[0] += 1.0;
        chroma[4] += 0.5;
        chroma[7] += 0.8;

        let estimate = KeyEstimator::default().estimate(&chroma, ENOUGH).unwrap();
        assert_eq!(estimate.key(), Key::new(0, Mode::Major));
    }

    #[test]
    fn test_key_of_song() {
        let catalogue = chordsense_catalogue::Catalogue::builtin();
        let song = catalogue.get("hotel-california").unwrap();
        assert_eq!(Key::of_song(song), Some(Key::new(11, Mode::Minor)));
    }
}
