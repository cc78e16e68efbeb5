/// Chord estimation module.
///
/// Compares the fast smoothed chroma vector with a weighted template for every chord quality at
/// every root and ranks the candidates by cosine similarity.
use log::trace;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::chroma_accumulator::ChromaVector;
use crate::chord::{Chord, ChordQuality, N_QUALITIES};
use crate::util::{cosine_similarity, normalize_energy, rotate, total_energy, N_PITCH_CLASSES};

/// Template weights with the root at index 0. Root and fifth carry the most weight, the third
/// slightly less, extensions the least. Every triad has the same norm so that a lone root note
/// ties between qualities and the table order decides.
const DEFAULT_TEMPLATE_WEIGHTS: [(ChordQuality, &[(usize, f32)]); N_QUALITIES] = [
    (ChordQuality::Major, &[(0, 1.0), (4, 0.8), (7, 0.9)]),
    (ChordQuality::Minor, &[(0, 1.0), (3, 0.8), (7, 0.9)]),
    (ChordQuality::Dominant7, &[(0, 1.0), (4, 0.8), (7, 0.9), (10, 0.6)]),
    (ChordQuality::Major7, &[(0, 1.0), (4, 0.8), (7, 0.9), (11, 0.6)]),
    (ChordQuality::Minor7, &[(0, 1.0), (3, 0.8), (7, 0.9), (10, 0.6)]),
    (ChordQuality::Diminished, &[(0, 1.0), (3, 0.8), (6, 0.9)]),
    (ChordQuality::Augmented, &[(0, 1.0), (4, 0.8), (8, 0.9)]),
    (ChordQuality::Sus2, &[(0, 1.0), (2, 0.8), (7, 0.9)]),
    (ChordQuality::Sus4, &[(0, 1.0), (5, 0.8), (7, 0.9)]),
];

/// One 12-element weight vector per chord quality, rooted at C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordTemplates {
    weights: [[f32; N_PITCH_CLASSES]; N_QUALITIES],
}

impl ChordTemplates {
    pub fn get(&self, quality: ChordQuality) -> &[f32; N_PITCH_CLASSES] {
        &self.weights[quality.index()]
    }

    pub fn set(&mut self, quality: ChordQuality, weights: [f32; N_PITCH_CLASSES]) {
        self.weights[quality.index()] = weights;
    }

    pub fn with(mut self, quality: ChordQuality, weights: [f32; N_PITCH_CLASSES]) -> Self {
        self.set(quality, weights);
        self
    }
}

impl Default for ChordTemplates {
    fn default() -> Self {
        let mut weights = [[0.0; N_PITCH_CLASSES]; N_QUALITIES];
        for (quality, intervals) in DEFAULT_TEMPLATE_WEIGHTS {
            for &(interval, weight) in intervals {
                weights[quality.index()][interval] = weight;
            }
        }
        Self { weights }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordDetectionParameters {
    /// Minimum total energy of the fast chroma vector.
    pub silence_threshold: f32,
    /// Minimum cosine similarity for a candidate to be kept.
    pub match_threshold: f32,
    /// Number of runner-up chords reported next to the best one.
    pub max_alternatives: usize,
    pub templates: ChordTemplates,
}

impl Default for ChordDetectionParameters {
    fn default() -> Self {
        Self {
            silence_threshold: 0.05,
            match_threshold: 0.45,
            max_alternatives: 3,
            templates: ChordTemplates::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChordEstimate {
    /// Root note (0-11, where 0 = C)
    pub root: usize,
    pub quality: ChordQuality,
    /// Cosine similarity between the chroma vector and the chord template.
    pub confidence: f32,
    /// Formatted chord name, e.g. `"F#m"`.
    pub label: String,
}

impl ChordEstimate {
    pub fn chord(&self) -> Chord {
        Chord::new(self.root, self.quality)
    }
}

/// Result of one chord estimation pass. Empty while there is no usable signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordDetection {
    pub best: Option<ChordEstimate>,
    /// Runner-up chords by descending confidence.
    pub alternatives: Vec<ChordEstimate>,
}

impl ChordDetection {
    pub fn is_empty(&self) -> bool {
        self.best.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ChordEstimator {
    params: ChordDetectionParameters,
    /// Templates rotated to every root, roots 0-11 in the outer and qualities in table order in
    /// the inner position.
    rotated_templates: Vec<(Chord, [f32; N_PITCH_CLASSES])>,
}

impl ChordEstimator {
    pub fn new(params: ChordDetectionParameters) -> Self {
        let rotated_templates = (0..N_PITCH_CLASSES)
            .flat_map(|root| ChordQuality::ALL.iter().map(move |quality| (root, *quality)))
            .map(|(root, quality)| {
                (
                    Chord::new(root, quality),
                    rotate(params.templates.get(quality), root as isize),
                )
            })
            .collect();

        Self {
            params,
            rotated_templates,
        }
    }

    pub fn params(&self) -> &ChordDetectionParameters {
        &self.params
    }

    /// Estimates the currently sounding chord from a fast smoothed chroma vector.
    pub fn estimate(&self, chroma: &ChromaVector) -> ChordDetection {
        if total_energy(chroma) < self.params.silence_threshold {
            return ChordDetection::default();
        }
        let Some(normalized) = normalize_energy(chroma) else {
            return ChordDetection::default();
        };

        let mut candidates: Vec<ChordEstimate> = self
            .rotated_templates
            .iter()
            .filter_map(|(chord, template)| {
                let similarity = cosine_similarity(&normalized, template);
                (similarity > self.params.match_threshold).then(|| ChordEstimate {
                    root: chord.root,
                    quality: chord.quality,
                    confidence: similarity,
                    label: chord.name(),
                })
            })
            .collect();

        // stable sort, equal scores keep root/table order
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        let mut ranked = candidates.into_iter();
        let best = ranked.next();
        let alternatives = ranked.take(self.params.max_alternatives).collect();

        if let Some(best) = &best {
            trace!("chord estimate {} ({:.3})", best.label, best.confidence);
        }

        ChordDetection { best, alternatives }
    }
}

impl Default for ChordEstimator {
    fn default() -> Self {
        Self::new(ChordDetectionParameters::default())
    }
}

/// The default template of `quality` rotated to `root`, scaled by `gain`. Handy for feeding
/// synthetic frames.
pub fn chord_template_chroma(root: usize, quality: ChordQuality, gain: f32) -> ChromaVector {
    rotate(ChordTemplates::default().get(quality), root as isize).map(|x| x * gain)
}
