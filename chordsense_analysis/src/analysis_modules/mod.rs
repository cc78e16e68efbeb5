/// Analysis modules - the stages of the chroma analysis pipeline, organized by function.
///
/// Each stage is usable on its own; [`crate::analysis::AnalysisState`] wires them together for
/// one listening session.

pub mod chord_estimation;
pub mod chord_history;
pub mod chroma_accumulator;
pub mod fragment_matching;
pub mod key_estimation;
pub mod progression;

// Re-export commonly used types
pub use chord_estimation::{
    chord_template_chroma, ChordDetection, ChordDetectionParameters, ChordEstimate,
    ChordEstimator, ChordTemplates,
};
pub use chord_history::{ChordHistory, ChordHistoryEntry, ChordHistoryParameters};
pub use chroma_accumulator::{ChromaAccumulator, ChromaSnapshot, ChromaVector, SmoothingParameters};
pub use fragment_matching::{
    chords_equivalent, is_key_compatible, normalize_chord_label, ConfidenceTier,
    FragmentMatchParameters, FragmentMatchResult, FragmentMatcher, SongMatch, RELATIVE_PAIRS,
};
pub use key_estimation::{
    Key, KeyDetectionParameters, KeyEstimate, KeyEstimator, MAJOR_PROFILE, MINOR_PROFILE,
};
pub use progression::{
    diatonic_chord, progressions, ChordPrediction, PredictionParameters, Progression,
    ProgressionPredictor, ScaleDegree,
};
