//! Static catalogue of reference songs.
//!
//! A catalogue is read-only configuration data: it is loaded once when a listening session
//! starts and then shared between all sessions. The analysis core matches detected chord
//! fragments against the progressions stored here.

pub mod notes;
mod songs;

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Tonal mode of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

/// How hard a song is to play. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A single reference song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongEntry {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// The chord progression as chord labels, e.g. `["C", "G", "Am", "F"]`. The progression is
    /// understood to loop.
    #[serde(alias = "chord_progression")]
    pub chords: Vec<String>,
    /// Root of the song's key, e.g. `"C"`, `"F#"` or `"Bb"`.
    pub key: String,
    pub mode: Mode,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fun_fact: Option<String>,
}

impl SongEntry {
    /// Key in the usual short form, `"C"` for C major and `"Am"` for A minor.
    pub fn key_label(&self) -> String {
        match self.mode {
            Mode::Major => self.key.clone(),
            Mode::Minor => format!("{}m", self.key),
        }
    }
}

/// A problem found while validating a catalogue. Problems never stop a catalogue from loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueIssue {
    EmptyId { index: usize },
    DuplicateId { id: String },
    EmptyProgression { id: String },
    BlankChordLabel { id: String, position: usize },
    UnreadableChordLabel { id: String, position: usize, label: String },
    /// The key is not a bare note name, e.g. `"Am"` instead of `"A"` with mode minor.
    UnreadableKey { id: String, key: String },
}

impl fmt::Display for CatalogueIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueIssue::EmptyId { index } => write!(f, "entry #{index} has an empty id"),
            CatalogueIssue::DuplicateId { id } => write!(f, "id `{id}` is used more than once"),
            CatalogueIssue::EmptyProgression { id } => {
                write!(f, "song `{id}` has an empty chord progression")
            }
            CatalogueIssue::BlankChordLabel { id, position } => {
                write!(f, "song `{id}` has a blank chord label at position {position}")
            }
            CatalogueIssue::UnreadableChordLabel { id, position, label } => write!(
                f,
                "song `{id}` has an unreadable chord label `{label}` at position {position}"
            ),
            CatalogueIssue::UnreadableKey { id, key } => {
                write!(f, "song `{id}` has an unreadable key `{key}`")
            }
        }
    }
}

/// An ordered, read-only collection of songs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    songs: Vec<SongEntry>,
}

impl Catalogue {
    pub fn new(songs: Vec<SongEntry>) -> Self {
        Self { songs }
    }

    /// The built-in catalogue of well known, beginner friendly songs.
    pub fn builtin() -> Self {
        Self::new(songs::builtin_songs())
    }

    /// Parses a catalogue from JSON.
    ///
    /// Accepts either a bare array of songs or an object with a `songs` array. Entries with
    /// problems (see [`Catalogue::validate`]) are kept and reported through the log; the
    /// matcher skips them.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with(json, notes::has_note_root)
    }

    /// [`Catalogue::from_json`] with the chord-label check of [`Catalogue::validate_with`].
    pub fn from_json_with<F>(json: &str, chord_is_readable: F) -> Result<Self>
    where
        F: Fn(&str) -> bool,
    {
        let value: serde_json::Value =
            serde_json::from_str(json).context("catalogue is not valid JSON")?;

        let catalogue = match value {
            serde_json::Value::Array(_) => Self::new(
                serde_json::from_value(value).context("failed to parse catalogue song list")?,
            ),
            serde_json::Value::Object(_) => {
                serde_json::from_value(value).context("failed to parse catalogue object")?
            }
            _ => bail!("catalogue must be a JSON array or an object with a `songs` field"),
        };

        for issue in catalogue.validate_with(chord_is_readable) {
            warn!("catalogue: {issue}");
        }
        debug!("loaded catalogue with {} songs", catalogue.len());

        Ok(catalogue)
    }

    pub fn songs(&self) -> &[SongEntry] {
        &self.songs
    }

    pub fn iter(&self) -> impl Iterator<Item = &SongEntry> {
        self.songs.iter()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SongEntry> {
        self.songs.iter().find(|s| s.id == id)
    }

    /// All songs of the given difficulty tier, in catalogue order.
    pub fn by_difficulty(&self, difficulty: Difficulty) -> impl Iterator<Item = &SongEntry> {
        self.songs.iter().filter(move |s| s.difficulty == difficulty)
    }

    /// Checks ids, keys and chord labels. Chord labels only need a readable root note here;
    /// use [`Catalogue::validate_with`] to check them against a full chord parser.
    pub fn validate(&self) -> Vec<CatalogueIssue> {
        self.validate_with(notes::has_note_root)
    }

    pub fn validate_with<F>(&self, chord_is_readable: F) -> Vec<CatalogueIssue>
    where
        F: Fn(&str) -> bool,
    {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for (index, song) in self.songs.iter().enumerate() {
            if song.id.trim().is_empty() {
                issues.push(CatalogueIssue::EmptyId { index });
            } else if !seen.insert(song.id.as_str()) {
                issues.push(CatalogueIssue::DuplicateId {
                    id: song.id.clone(),
                });
            }

            if notes::parse_pitch_class(&song.key).is_none() {
                issues.push(CatalogueIssue::UnreadableKey {
                    id: song.id.clone(),
                    key: song.key.clone(),
                });
            }

            if song.chords.is_empty() {
                issues.push(CatalogueIssue::EmptyProgression {
                    id: song.id.clone(),
                });
            }
            for (position, chord) in song.chords.iter().enumerate() {
                if chord.trim().is_empty() {
                    issues.push(CatalogueIssue::BlankChordLabel {
                        id: song.id.clone(),
                        position,
                    });
                } else if !chord_is_readable(chord.as_str()) {
                    issues.push(CatalogueIssue::UnreadableChordLabel {
                        id: song.id.clone(),
                        position,
                        label: chord.clone(),
                    });
                }
            }
        }

        issues
    }
}
