/// Next-chord prediction from canonical scale-degree progressions.
use itertools::Itertools;
use log::trace;
use serde::{Deserialize, Serialize};

use chordsense_catalogue::Mode;

use super::key_estimation::Key;
use crate::chord::{Chord, ChordQuality};

/// Semitone offsets of the seven degrees of the major scale.
pub const MAJOR_SCALE: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];
/// Semitone offsets of the seven degrees of the natural minor scale.
pub const MINOR_SCALE: [usize; 7] = [0, 2, 3, 5, 7, 8, 10];

const ROMAN: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// A chord built on a degree of the key's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleDegree {
    /// Scale step, 0 = tonic ... 6 = seventh degree.
    pub step: usize,
    pub quality: ChordQuality,
}

impl ScaleDegree {
    pub const MAJ_I: ScaleDegree = ScaleDegree::new(0, ChordQuality::Major);
    pub const MAJ_II: ScaleDegree = ScaleDegree::new(1, ChordQuality::Minor);
    pub const MAJ_III: ScaleDegree = ScaleDegree::new(2, ChordQuality::Minor);
    pub const MAJ_IV: ScaleDegree = ScaleDegree::new(3, ChordQuality::Major);
    pub const MAJ_V: ScaleDegree = ScaleDegree::new(4, ChordQuality::Major);
    pub const MAJ_VI: ScaleDegree = ScaleDegree::new(5, ChordQuality::Minor);
    pub const MAJ_VII: ScaleDegree = ScaleDegree::new(6, ChordQuality::Diminished);

    pub const MIN_I: ScaleDegree = ScaleDegree::new(0, ChordQuality::Minor);
    pub const MIN_III: ScaleDegree = ScaleDegree::new(2, ChordQuality::Major);
    pub const MIN_IV: ScaleDegree = ScaleDegree::new(3, ChordQuality::Minor);
    /// The major dominant borrowed from harmonic minor.
    pub const MIN_V: ScaleDegree = ScaleDegree::new(4, ChordQuality::Major);
    pub const MIN_VI: ScaleDegree = ScaleDegree::new(5, ChordQuality::Major);
    pub const MIN_VII: ScaleDegree = ScaleDegree::new(6, ChordQuality::Major);

    pub const fn new(step: usize, quality: ChordQuality) -> Self {
        Self { step, quality }
    }

    /// Roman numeral, upper case for major and lower case for minor chords.
    pub fn numeral(&self) -> String {
        let roman = ROMAN[self.step % ROMAN.len()];
        match self.quality.triad() {
            ChordQuality::Minor => roman.to_lowercase(),
            ChordQuality::Diminished => format!("{}°", roman.to_lowercase()),
            ChordQuality::Augmented => format!("{roman}+"),
            _ => roman.to_string(),
        }
    }
}

/// The concrete chord on `degree` of `key`.
pub fn diatonic_chord(key: Key, degree: ScaleDegree) -> Chord {
    let scale = match key.mode {
        Mode::Major => &MAJOR_SCALE,
        Mode::Minor => &MINOR_SCALE,
    };
    Chord::new(key.root + scale[degree.step % scale.len()], degree.quality)
}

/// A progression of scale degrees. Progressions loop: the chord after the last degree is the
/// first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    pub degrees: &'static [ScaleDegree],
}

impl Progression {
    /// e.g. `"I-V-vi-IV"`
    pub fn name(&self) -> String {
        self.degrees.iter().map(ScaleDegree::numeral).join("-")
    }

    pub fn chords(&self, key: Key) -> Vec<Chord> {
        self.degrees
            .iter()
            .map(|degree| diatonic_chord(key, *degree))
            .collect()
    }
}

static MAJOR_PROGRESSIONS: [Progression; 5] = {
    use ScaleDegree as D;
    [
        Progression {
            degrees: &[D::MAJ_I, D::MAJ_IV, D::MAJ_V, D::MAJ_I],
        },
        Progression {
            degrees: &[D::MAJ_I, D::MAJ_V, D::MAJ_VI, D::MAJ_IV],
        },
        Progression {
            degrees: &[D::MAJ_I, D::MAJ_VI, D::MAJ_IV, D::MAJ_V],
        },
        Progression {
            degrees: &[D::MAJ_II, D::MAJ_V, D::MAJ_I],
        },
        Progression {
            degrees: &[D::MAJ_I, D::MAJ_IV, D::MAJ_I, D::MAJ_V],
        },
    ]
};

static MINOR_PROGRESSIONS: [Progression; 3] = {
    use ScaleDegree as D;
    [
        Progression {
            degrees: &[D::MIN_I, D::MIN_IV, D::MIN_V, D::MIN_I],
        },
        Progression {
            degrees: &[D::MIN_I, D::MIN_VI, D::MIN_III, D::MIN_VII],
        },
        Progression {
            degrees: &[D::MIN_I, D::MIN_IV, D::MIN_VII, D::MIN_III],
        },
    ]
};

/// The canonical progressions of a mode, most common first.
pub fn progressions(mode: Mode) -> &'static [Progression] {
    match mode {
        Mode::Major => &MAJOR_PROGRESSIONS,
        Mode::Minor => &MINOR_PROGRESSIONS,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionParameters {
    pub max_predictions: usize,
}

impl Default for PredictionParameters {
    fn default() -> Self {
        Self { max_predictions: 3 }
    }
}

/// A predicted next chord and the progression that suggested it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordPrediction {
    pub chord: Chord,
    pub label: String,
    pub progression: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressionPredictor {
    params: PredictionParameters,
}

impl ProgressionPredictor {
    pub fn new(params: PredictionParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PredictionParameters {
        &self.params
    }

    /// Likely next chords after `current` in `key`, best first.
    ///
    /// Extensions are ignored when looking the chord up (`Am7` counts as `Am`). An empty result
    /// means the chord does not occur in any known progression of that key.
    pub fn predict(&self, current: Chord, key: Key) -> Vec<ChordPrediction> {
        let current = current.triad();

        let predictions: Vec<ChordPrediction> = progressions(key.mode)
            .iter()
            .flat_map(|progression| {
                let chords = progression.chords(key);
                let len = chords.len();
                (0..len)
                    .filter(|&i| chords[i] == current)
                    .map(|i| chords[(i + 1) % len])
                    .filter(|next| *next != current)
                    .map(|next| ChordPrediction {
                        chord: next,
                        label: next.name(),
                        progression: progression.name(),
                    })
                    .collect::<Vec<_>>()
            })
            .unique_by(|p| p.chord)
            .take(self.params.max_predictions)
            .collect();

        trace!(
            "predicted after {} in {}: {:?}",
            current,
            key,
            predictions.iter().map(|p| p.label.as_str()).collect::<Vec<_>>()
        );

        predictions
    }

    /// Chord-label form of [`ProgressionPredictor::predict`]. Unreadable labels give no
    /// predictions.
    pub fn predict_next(&self, current_label: &str, key: Key) -> Vec<String> {
        match Chord::parse(current_label) {
            Some(chord) => self
                .predict(chord, key)
                .into_iter()
                .map(|p| p.label)
                .collect(),
            None => Vec::new(),
        }
    }
}
