/// Chord vocabulary: qualities, chord names and chord-label parsing.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::{pitch_class_name, split_pitch_class, N_PITCH_CLASSES};

/// Number of chord qualities the estimator knows.
pub const N_QUALITIES: usize = 9;

/// Chord qualities, in template-table order. This order decides ties between equally good
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Major7,
    Minor7,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; N_QUALITIES] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
    ];

    /// Position in [`ChordQuality::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
        }
    }

    /// Intervals above the root in semitones, root included.
    pub fn intervals(self) -> &'static [usize] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
        }
    }

    /// Strips extensions down to the bare triad: sevenths lose the seventh, suspended chords
    /// count as major.
    pub fn triad(self) -> ChordQuality {
        match self {
            ChordQuality::Dominant7
            | ChordQuality::Major7
            | ChordQuality::Sus2
            | ChordQuality::Sus4 => ChordQuality::Major,
            ChordQuality::Minor7 => ChordQuality::Minor,
            other => other,
        }
    }

    /// Parses the part of a chord label after the root note.
    ///
    /// Extensions the estimator has no template for are mapped to the closest known quality
    /// (`C6` and `Cadd9` are major, `C9` is a dominant seventh, `Cm7b5` is diminished).
    pub fn from_suffix(suffix: &str) -> Option<ChordQuality> {
        let quality = match suffix {
            "" | "M" | "maj" | "5" | "6" | "add9" | "add2" | "69" => ChordQuality::Major,
            "m" | "min" | "-" | "m6" | "madd9" => ChordQuality::Minor,
            "7" | "9" | "11" | "13" | "dom7" => ChordQuality::Dominant7,
            "maj7" | "M7" | "maj9" | "Δ" | "Δ7" => ChordQuality::Major7,
            "m7" | "min7" | "-7" | "m9" | "m11" => ChordQuality::Minor7,
            "dim" | "°" | "dim7" | "°7" | "m7b5" | "ø" | "ø7" => ChordQuality::Diminished,
            "aug" | "+" => ChordQuality::Augmented,
            "sus2" => ChordQuality::Sus2,
            "sus4" | "sus" | "7sus4" => ChordQuality::Sus4,
            _ => return None,
        };
        Some(quality)
    }
}

/// A chord as root pitch class plus quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    /// Root note (0-11, where 0 = C)
    pub root: usize,
    pub quality: ChordQuality,
}

impl Chord {
    pub fn new(root: usize, quality: ChordQuality) -> Self {
        Self {
            root: root % N_PITCH_CLASSES,
            quality,
        }
    }

    /// Parses a chord label like `"Am"`, `"Bb7"`, `"F#m7b5"` or `"C/G"`. The bass note of a
    /// slash chord is ignored.
    pub fn parse(label: &str) -> Option<Chord> {
        let head = label.trim().split('/').next()?;
        let (root, suffix) = split_pitch_class(head)?;
        let quality = ChordQuality::from_suffix(suffix)?;
        Some(Chord::new(root, quality))
    }

    pub fn triad(self) -> Chord {
        Chord::new(self.root, self.quality.triad())
    }

    /// Chord name with sharp spelling, e.g. `"C#m7"`.
    pub fn name(&self) -> String {
        format!("{}{}", pitch_class_name(self.root), self.quality.suffix())
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", pitch_class_name(self.root), self.quality.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_names() {
        assert_eq!(Chord::new(0, ChordQuality::Major).name(), "C");
        assert_eq!(Chord::new(9, ChordQuality::Minor).name(), "Am");
        assert_eq!(Chord::new(7, ChordQuality::Dominant7).name(), "G7");
        assert_eq!(Chord::new(1, ChordQuality::Minor7).name(), "C#m7");
        assert_eq!(Chord::new(14, ChordQuality::Sus4).to_string(), "Dsus4");
    }

    #[test]
    fn test_parse_round_trips_estimator_labels() {
        for root in 0..12 {
            for quality in ChordQuality::ALL {
                let chord = Chord::new(root, quality);
                assert_eq!(Chord::parse(&chord.name()), Some(chord));
            }
        }
    }

    #[test]
    fn test_parse_flats_and_extensions() {
        assert_eq!(Chord::parse("Db"), Some(Chord::new(1, ChordQuality::Major)));
        assert_eq!(Chord::parse("Bbm7"), Some(Chord::new(10, ChordQuality::Minor7)));
        assert_eq!(Chord::parse("E♭maj7"), Some(Chord::new(3, ChordQuality::Major7)));
        assert_eq!(Chord::parse("Cadd9"), Some(Chord::new(0, ChordQuality::Major)));
        assert_eq!(Chord::parse("F5"), Some(Chord::new(5, ChordQuality::Major)));
        assert_eq!(Chord::parse("A7sus4"), Some(Chord::new(9, ChordQuality::Sus4)));
        assert_eq!(
            Chord::parse("F#m7b5"),
            Some(Chord::new(6, ChordQuality::Diminished))
        );
        assert_eq!(Chord::parse("C/G"), Some(Chord::new(0, ChordQuality::Major)));
        assert_eq!(Chord::parse(" G7 "), Some(Chord::new(7, ChordQuality::Dominant7)));
    }

    #[test]
    fn test_parse_rejects_unknown_labels() {
        assert_eq!(Chord::parse(""), None);
        assert_eq!(Chord::parse("X"), None);
        assert_eq!(Chord::parse("Cwhatever"), None);
        assert_eq!(Chord::parse("N.C."), None);
    }

    #[test]
    fn test_triad_reduction() {
        assert_eq!(ChordQuality::Major7.triad(), ChordQuality::Major);
        assert_eq!(ChordQuality::Dominant7.triad(), ChordQuality::Major);
        assert_eq!(ChordQuality::Minor7.triad(), ChordQuality::Minor);
        assert_eq!(ChordQuality::Sus2.triad(), ChordQuality::Major);
        assert_eq!(ChordQuality::Diminished.triad(), ChordQuality::Diminished);
        assert_eq!(ChordQuality::Augmented.triad(), ChordQuality::Augmented);
        assert_eq!(Chord::parse("Dm7").map(Chord::triad).map(|c| c.name()), Some("Dm".into()));
    }

    #[test]
    fn test_quality_index_matches_table_order() {
        for (i, quality) in ChordQuality::ALL.iter().enumerate() {
            assert_eq!(quality.index(), i);
            assert_eq!(quality.intervals()[0], 0);
        }
    }
}
