pub mod analysis;
pub mod analysis_modules;
pub mod chord;
pub mod util;

pub use analysis::{load_catalogue, AnalysisParameters, AnalysisSnapshot, AnalysisState};
pub use analysis_modules::{ChordEstimate, FragmentMatchResult, Key, KeyEstimate, SongMatch};
pub use chord::{Chord, ChordQuality};
pub use chordsense_catalogue::{Catalogue, CatalogueIssue, Difficulty, Mode, SongEntry};
