/// Song fragment matching.
///
/// Scores the most recently played chords against every catalogue progression. Two scores are
/// combined:
///
/// - the sequence score: the played chords are slid along the (looping) progression and the best
///   number of positional matches is divided by the number of played chords.
/// - the overlap score: the fraction of the song's distinct chords that were played at all, in
///   any order.
///
/// Before comparing, chords are reduced to plain triads with sharp spelling, and the relative
/// major/minor chords in [`RELATIVE_PAIRS`] count as the same chord.
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use chordsense_catalogue::{Catalogue, Difficulty, SongEntry};

use super::key_estimation::Key;
use crate::chord::{Chord, ChordQuality};

const fn major(root: usize) -> Chord {
    Chord {
        root,
        quality: ChordQuality::Major,
    }
}

const fn minor(root: usize) -> Chord {
    Chord {
        root,
        quality: ChordQuality::Minor,
    }
}

/// Relative major/minor chords that are interchangeable when matching: C/Am, G/Em, D/Bm, A/F#m,
/// E/C#m, F/Dm and Bb/Gm. Other relative pairs are deliberately not listed.
pub const RELATIVE_PAIRS: [(Chord, Chord); 7] = [
    (major(0), minor(9)),
    (major(7), minor(4)),
    (major(2), minor(11)),
    (major(9), minor(6)),
    (major(4), minor(1)),
    (major(5), minor(2)),
    (major(10), minor(7)),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentMatchParameters {
    /// Fewer played chords than this give no matches.
    pub min_chords: usize,
    /// Songs scoring below this are dropped.
    pub min_score: f32,
    pub max_results: usize,
    pub sequence_weight: f32,
    pub overlap_weight: f32,
    /// Lower bound of the high confidence tier.
    pub high_confidence: f32,
    /// Lower bound of the medium confidence tier.
    pub medium_confidence: f32,
    /// Added to the similarity of two songs in the same key.
    pub same_key_bonus: f32,
    /// Added to the similarity of two songs in the same mode but different keys.
    pub same_mode_bonus: f32,
}

impl Default for FragmentMatchParameters {
    fn default() -> Self {
        Self {
            min_chords: 2,
            min_score: 0.3,
            max_results: 5,
            sequence_weight: 0.7,
            overlap_weight: 0.3,
            high_confidence: 0.7,
            medium_confidence: 0.5,
            same_key_bonus: 0.1,
            same_mode_bonus: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongMatch {
    pub song: SongEntry,
    /// Combined score in [0, 1].
    pub score: f32,
    pub sequence_score: f32,
    pub overlap_score: f32,
    /// Distinct chords of the song that were heard.
    pub matched_chord_count: usize,
    /// Distinct chords of the song.
    pub total_chord_count: usize,
    pub confidence_tier: ConfidenceTier,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentMatchResult {
    /// Best matches first.
    pub matches: Vec<SongMatch>,
    /// Songs to try when nothing matched, easiest first.
    pub suggestions: Vec<SongEntry>,
    pub message: String,
}

impl FragmentMatchResult {
    pub fn top_match(&self) -> Option<&SongMatch> {
        self.matches.first()
    }
}

/// Reduces a chord label to its plain triad with sharp spelling: `"Db"` gives `"C#"`,
/// `"Cmaj7"` gives `"C"` and `"Dm7"` gives `"Dm"`. `None` for labels that cannot be read.
pub fn normalize_chord_label(label: &str) -> Option<String> {
    Chord::parse(label).map(|chord| chord.triad().name())
}

fn equivalent(a: Chord, b: Chord) -> bool {
    a == b
        || RELATIVE_PAIRS
            .iter()
            .any(|&(x, y)| (a == x && b == y) || (a == y && b == x))
}

/// Whether two chord labels count as the same chord for fragment matching.
pub fn chords_equivalent(a: &str, b: &str) -> bool {
    match (Chord::parse(a), Chord::parse(b)) {
        (Some(a), Some(b)) => equivalent(a.triad(), b.triad()),
        _ => false,
    }
}

/// Key compatibility between a song and the detected key. Always true: the detected key never
/// excludes a song from matching.
pub fn is_key_compatible(_song: &SongEntry, _key: Option<Key>) -> bool {
    true
}

/// A catalogue song with its progression reduced to triads.
struct PreparedSong<'a> {
    song: &'a SongEntry,
    /// `None` where a label could not be read. Such positions never match.
    progression: Vec<Option<Chord>>,
    distinct: Vec<Chord>,
}

impl<'a> PreparedSong<'a> {
    /// `None` if the song has nothing to match against.
    fn new(song: &'a SongEntry) -> Option<Self> {
        let progression: Vec<Option<Chord>> = song
            .chords
            .iter()
            .map(|label| Chord::parse(label).map(Chord::triad))
            .collect();

        let unreadable = progression.iter().filter(|c| c.is_none()).count();
        if unreadable > 0 {
            debug!(
                "song `{}` has {unreadable} unreadable chord label(s)",
                song.id
            );
        }

        let distinct: Vec<Chord> = progression.iter().flatten().copied().unique().collect();
        if distinct.is_empty() {
            debug!("skipping song `{}` without usable chords", song.id);
            return None;
        }

        Some(Self {
            song,
            progression,
            distinct,
        })
    }

    /// Highest number of positional matches of `window` over all offsets. The progression
    /// loops, so the window may wrap around its end.
    fn best_alignment(&self, window: &[Chord], same: impl Fn(Chord, Chord) -> bool) -> usize {
        let len = self.progression.len();
        (0..len)
            .map(|offset| {
                window
                    .iter()
                    .enumerate()
                    .filter(|(i, played)| {
                        self.progression[(offset + i) % len].is_some_and(|c| same(**played, c))
                    })
                    .count()
            })
            .max()
            .unwrap_or(0)
    }
}

struct Scores {
    sequence: f32,
    overlap: f32,
    matched: usize,
    /// Positional matches without relative equivalence. Breaks ties.
    exact: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FragmentMatcher {
    params: FragmentMatchParameters,
}

impl FragmentMatcher {
    pub fn new(params: FragmentMatchParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FragmentMatchParameters {
        &self.params
    }

    fn scores(&self, window: &[Chord], song: &PreparedSong) -> Scores {
        let best = song.best_alignment(window, equivalent);
        let exact = song.best_alignment(window, |a, b| a == b);
        let matched = song
            .distinct
            .iter()
            .filter(|c| window.iter().any(|w| equivalent(*w, **c)))
            .count();

        Scores {
            sequence: best as f32 / window.len() as f32,
            overlap: matched as f32 / song.distinct.len() as f32,
            matched,
            exact,
        }
    }

    fn combine(&self, scores: &Scores) -> f32 {
        (self.params.sequence_weight * scores.sequence + self.params.overlap_weight * scores.overlap)
            .clamp(0.0, 1.0)
    }

    pub fn confidence_tier(&self, score: f32) -> ConfidenceTier {
        if score >= self.params.high_confidence {
            ConfidenceTier::High
        } else if score >= self.params.medium_confidence {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    fn song_match(&self, song: &SongEntry, scores: &Scores, score: f32, total: usize) -> SongMatch {
        let mut reason = format!(
            "{} of {} chords match \"{}\" by {}",
            scores.matched, total, song.title, song.artist
        );
        if scores.sequence >= 1.0 {
            reason.push_str(", in the same order");
        }

        SongMatch {
            song: song.clone(),
            score,
            sequence_score: scores.sequence,
            overlap_score: scores.overlap,
            matched_chord_count: scores.matched,
            total_chord_count: total,
            confidence_tier: self.confidence_tier(score),
            reason,
        }
    }

    /// Ranks `catalogue` against the recently played chords, oldest first.
    ///
    /// Without a good match the result carries suggestions instead: the songs in the detected
    /// key if there are any, otherwise the beginner songs.
    pub fn match_fragment<S: AsRef<str>>(
        &self,
        recent_chords: &[S],
        key: Option<Key>,
        catalogue: &Catalogue,
    ) -> FragmentMatchResult {
        let window: Vec<Chord> = recent_chords
            .iter()
            .filter_map(|label| Chord::parse(label.as_ref()).map(Chord::triad))
            .collect();

        if window.len() < self.params.min_chords.max(1) {
            return FragmentMatchResult {
                message: "Keep playing! A few more chords and I can guess the song.".to_string(),
                ..Default::default()
            };
        }

        let mut ranked: Vec<(SongMatch, usize)> = catalogue
            .iter()
            .filter(|song| is_key_compatible(song, key))
            .filter_map(PreparedSong::new)
            .filter_map(|prepared| {
                let scores = self.scores(&window, &prepared);
                let score = self.combine(&scores);
                (score >= self.params.min_score).then(|| {
                    (
                        self.song_match(prepared.song, &scores, score, prepared.distinct.len()),
                        scores.exact,
                    )
                })
            })
            .collect();

        ranked.sort_by(|(a, a_exact), (b, b_exact)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(b_exact.cmp(a_exact))
        });
        let matches: Vec<SongMatch> = ranked
            .into_iter()
            .map(|(m, _)| m)
            .take(self.params.max_results)
            .collect();

        if let Some(top) = matches.first() {
            debug!(
                "fragment {:?} matches `{}` ({:.2}, {})",
                window.iter().map(Chord::name).collect::<Vec<_>>(),
                top.song.id,
                top.score,
                top.confidence_tier
            );
            let message = match top.confidence_tier {
                ConfidenceTier::High => {
                    format!("That sounds like \"{}\" by {}!", top.song.title, top.song.artist)
                }
                ConfidenceTier::Medium => "Could be one of these songs.".to_string(),
                ConfidenceTier::Low => {
                    "Not sure yet, these songs use similar chords.".to_string()
                }
            };
            return FragmentMatchResult {
                matches,
                suggestions: Vec::new(),
                message,
            };
        }

        if let Some(key) = key {
            let in_key = self.easiest_first(
                catalogue
                    .iter()
                    .filter(|song| Key::of_song(song) == Some(key)),
            );
            if !in_key.is_empty() {
                return FragmentMatchResult {
                    matches,
                    suggestions: in_key,
                    message: format!(
                        "No song matches yet. You are playing in {key}, try one of these!"
                    ),
                };
            }
        }

        FragmentMatchResult {
            matches,
            suggestions: self.easiest_first(catalogue.by_difficulty(Difficulty::Beginner)),
            message: "No song matches yet. Try one of these beginner songs!".to_string(),
        }
    }

    fn easiest_first<'a>(&self, songs: impl Iterator<Item = &'a SongEntry>) -> Vec<SongEntry> {
        songs
            .sorted_by_key(|song| song.difficulty)
            .take(self.params.max_results)
            .cloned()
            .collect()
    }

    /// Songs with a progression similar to the song `song_id`, most similar first. Songs in the
    /// same key get `same_key_bonus`, other songs in the same mode get `same_mode_bonus`. The
    /// two bonuses never add up.
    pub fn similar_to(&self, song_id: &str, catalogue: &Catalogue) -> Vec<SongMatch> {
        let Some(target) = catalogue.get(song_id) else {
            debug!("no song `{song_id}` in the catalogue");
            return Vec::new();
        };
        let window: Vec<Chord> = target
            .chords
            .iter()
            .filter_map(|label| Chord::parse(label).map(Chord::triad))
            .collect();
        if window.is_empty() {
            return Vec::new();
        }
        let target_key = Key::of_song(target);

        catalogue
            .iter()
            .filter(|song| song.id != target.id)
            .filter_map(PreparedSong::new)
            .filter_map(|prepared| {
                let scores = self.scores(&window, &prepared);
                let bonus = if target_key.is_some() && Key::of_song(prepared.song) == target_key {
                    self.params.same_key_bonus
                } else if prepared.song.mode == target.mode {
                    self.params.same_mode_bonus
                } else {
                    0.0
                };
                let score = (self.combine(&scores) + bonus).clamp(0.0, 1.0);
                (score >= self.params.min_score).then(|| {
                    self.song_match(prepared.song, &scores, score, prepared.distinct.len())
                })
            })
            .sorted_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
            .take(self.params.max_results)
            .collect()
    }
}
