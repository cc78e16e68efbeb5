/// Per-session analysis of a stream of chroma frames.
///
/// `AnalysisState` owns everything one listening session accumulates: the smoothed chroma
/// vectors, the debounced chord history and the latest key, chord, prediction and song-match
/// results. Every incoming frame runs one synchronous pass through the pipeline:
///
/// 1. smoothing (fast and slow averages)
/// 2. chord estimation on the fast average, every frame
/// 3. key estimation on the slow average, every `detection_interval` frames
/// 4. debouncing the best chord into the chord history
/// 5. next-chord prediction, when the committed chord or the key changed
/// 6. fragment matching against the catalogue, when the chord history changed
///
/// The catalogue is shared read-only between sessions. Run one `AnalysisState` per session.
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use chordsense_catalogue::Catalogue;

use crate::analysis_modules::{
    ChordDetection, ChordDetectionParameters, ChordEstimator, ChordHistory, ChordHistoryEntry,
    ChordHistoryParameters, ChromaAccumulator, ChromaSnapshot, ChromaVector,
    FragmentMatchParameters, FragmentMatchResult, FragmentMatcher, KeyDetectionParameters,
    KeyEstimate, KeyEstimator, PredictionParameters, ProgressionPredictor, SmoothingParameters,
    SongMatch,
};
use crate::chord::Chord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParameters {
    pub smoothing: SmoothingParameters,
    pub key: KeyDetectionParameters,
    pub chord: ChordDetectionParameters,
    pub history: ChordHistoryParameters,
    pub prediction: PredictionParameters,
    pub fragment: FragmentMatchParameters,
}

/// Loads a JSON catalogue and warns about every chord label the chord parser cannot read.
pub fn load_catalogue(json: &str) -> Result<Catalogue> {
    Catalogue::from_json_with(json, |label| Chord::parse(label).is_some())
}

/// The results after one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSnapshot {
    /// Session time at the end of the frame.
    pub elapsed: Duration,
    pub chroma: ChromaSnapshot,
    pub key: Option<KeyEstimate>,
    /// Chord estimate of this frame, not debounced.
    pub chord: ChordDetection,
    /// Set if this frame completed a chord change.
    pub new_history_entry: Option<ChordHistoryEntry>,
    /// The last committed chord.
    pub current_chord: Option<String>,
    pub predictions: Vec<String>,
    pub fragment: FragmentMatchResult,
}

/// Represents the state of one listening session.
///
/// # Examples
///
/// ```
/// # use chordsense_analysis::analysis::{AnalysisParameters, AnalysisState};
/// # use chordsense_analysis::Catalogue;
/// # use std::{sync::Arc, time::Duration};
/// let catalogue = Arc::new(Catalogue::builtin());
/// let mut analysis_state = AnalysisState::new(AnalysisParameters::default(), catalogue);
/// let silence = [0.0; 12]; // Replace with actual chroma frames
/// let snapshot = analysis_state.update(&silence, Duration::from_millis(40));
/// assert!(snapshot.key.is_none());
/// assert!(snapshot.chord.best.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisState {
    /// The parameters used for the analysis.
    pub params: AnalysisParameters,

    catalogue: Arc<Catalogue>,

    accumulator: ChromaAccumulator,
    key_estimator: KeyEstimator,
    chord_estimator: ChordEstimator,
    predictor: ProgressionPredictor,
    matcher: FragmentMatcher,
    history: ChordHistory,

    /// Sum of all frame times since the session started.
    elapsed: Duration,
    /// Frames left until the next key estimation.
    frames_until_key_detection: u32,

    key: Option<KeyEstimate>,
    chord: ChordDetection,
    predictions: Vec<String>,
    fragment: FragmentMatchResult,
}

impl AnalysisState {
    pub fn new(params: AnalysisParameters, catalogue: Arc<Catalogue>) -> Self {
        let matcher = FragmentMatcher::new(params.fragment.clone());
        let fragment = matcher.match_fragment::<&str>(&[], None, &catalogue);

        Self {
            accumulator: ChromaAccumulator::new(&params.smoothing),
            key_estimator: KeyEstimator::new(params.key.clone()),
            chord_estimator: ChordEstimator::new(params.chord.clone()),
            predictor: ProgressionPredictor::new(params.prediction.clone()),
            history: ChordHistory::new(params.history.clone()),
            matcher,
            params,
            catalogue,
            elapsed: Duration::ZERO,
            frames_until_key_detection: 0,
            key: None,
            chord: ChordDetection::default(),
            predictions: Vec::new(),
            fragment,
        }
    }

    /// Runs one analysis pass over a raw chroma frame that covers `frame_time` of audio.
    pub fn update(&mut self, frame: &ChromaVector, frame_time: Duration) -> AnalysisSnapshot {
        let frame_start = self.elapsed;
        self.elapsed += frame_time;

        let chroma = self.accumulator.update(frame);
        self.chord = self.chord_estimator.estimate(&chroma.fast);

        let mut key_changed = false;
        if self.frames_until_key_detection == 0 {
            let key = self
                .key_estimator
                .estimate(&chroma.slow, chroma.slow_sample_count);
            key_changed = key.as_ref().map(KeyEstimate::key)
                != self.key.as_ref().map(KeyEstimate::key);
            if key_changed {
                debug!(
                    "key changed to {:?} at {:?}",
                    key.as_ref().map(|k| k.key().to_string()),
                    self.elapsed
                );
            }
            self.key = key;
            self.frames_until_key_detection = self.params.key.detection_interval.max(1) - 1;
        } else {
            self.frames_until_key_detection -= 1;
        }

        let new_history_entry =
            self.history
                .observe(self.chord.best.as_ref(), frame_start, frame_time);

        if new_history_entry.is_some() || key_changed {
            self.update_predictions();
        }
        // the key only matters to the fallback suggestions
        if new_history_entry.is_some() || (key_changed && self.fragment.matches.is_empty()) {
            self.update_fragment();
        }

        AnalysisSnapshot {
            elapsed: self.elapsed,
            chroma,
            key: self.key.clone(),
            chord: self.chord.clone(),
            new_history_entry,
            current_chord: self.history.current_label().map(str::to_string),
            predictions: self.predictions.clone(),
            fragment: self.fragment.clone(),
        }
    }

    fn update_predictions(&mut self) {
        self.predictions = match (self.history.current(), &self.key) {
            (Some(current), Some(key)) => self.predictor.predict_next(&current.chord.label, key.key()),
            _ => Vec::new(),
        };
    }

    fn update_fragment(&mut self) {
        let window = self.history.fragment_window();
        self.fragment = self.matcher.match_fragment(
            &window,
            self.key.as_ref().map(KeyEstimate::key),
            &self.catalogue,
        );
    }

    /// Discards everything the session has accumulated. Parameters and catalogue are kept.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.history.clear();
        self.elapsed = Duration::ZERO;
        self.frames_until_key_detection = 0;
        self.key = None;
        self.chord = ChordDetection::default();
        self.predictions.clear();
        self.fragment = self.matcher.match_fragment::<&str>(&[], None, &self.catalogue);
    }

    /// Songs with a progression similar to the catalogue song `song_id`.
    pub fn similar_songs(&self, song_id: &str) -> Vec<SongMatch> {
        self.matcher.similar_to(song_id, &self.catalogue)
    }

    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }

    pub fn chroma(&self) -> ChromaSnapshot {
        self.accumulator.snapshot()
    }

    pub fn key(&self) -> Option<&KeyEstimate> {
        self.key.as_ref()
    }

    pub fn chord(&self) -> &ChordDetection {
        &self.chord
    }

    pub fn history(&self) -> &ChordHistory {
        &self.history
    }

    pub fn predictions(&self) -> &[String] {
        &self.predictions
    }

    pub fn fragment(&self) -> &FragmentMatchResult {
        &self.fragment
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new(AnalysisParameters::default(), Arc::new(Catalogue::builtin()))
    }
}
