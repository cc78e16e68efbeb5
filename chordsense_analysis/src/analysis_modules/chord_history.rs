/// Debounced chord history.
///
/// The chord estimate flickers while the smoothed chroma moves from one chord to the next. A new
/// chord is only written to the history once it has been detected for at least `min_hold`.
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use super::chord_estimation::ChordEstimate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordHistoryParameters {
    /// How long a new chord must be detected before it counts as a chord change.
    pub min_hold: Duration,
    /// Maximum number of history entries. The oldest entry is dropped first.
    pub capacity: usize,
    /// Number of most recent chords handed to fragment matching.
    pub fragment_window: usize,
}

impl Default for ChordHistoryParameters {
    fn default() -> Self {
        Self {
            min_hold: Duration::from_millis(250),
            capacity: 32,
            fragment_window: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChordHistoryEntry {
    pub chord: ChordEstimate,
    /// Session time at which the chord was first detected.
    pub observed_at: Duration,
    /// How long the chord has been sounding. Keeps growing for the newest entry.
    pub held_duration: Duration,
}

#[derive(Debug, Clone)]
struct PendingChord {
    chord: ChordEstimate,
    observed_at: Duration,
    held: Duration,
}

#[derive(Debug, Clone)]
pub struct ChordHistory {
    params: ChordHistoryParameters,
    entries: VecDeque<ChordHistoryEntry>,
    pending: Option<PendingChord>,
}

impl ChordHistory {
    pub fn new(params: ChordHistoryParameters) -> Self {
        Self {
            entries: VecDeque::with_capacity(params.capacity),
            params,
            pending: None,
        }
    }

    pub fn params(&self) -> &ChordHistoryParameters {
        &self.params
    }

    /// Feeds the best chord of one frame.
    ///
    /// `frame_start` is the session time at which the frame began and `frame_time` its length.
    /// Returns the new entry if this frame completed a chord change.
    pub fn observe(
        &mut self,
        chord: Option<&ChordEstimate>,
        frame_start: Duration,
        frame_time: Duration,
    ) -> Option<ChordHistoryEntry> {
        let Some(chord) = chord else {
            // a gap restarts the debounce
            self.pending = None;
            return None;
        };

        if self.current_label() == Some(chord.label.as_str()) {
            self.pending = None;
            if let Some(current) = self.entries.back_mut() {
                current.held_duration += frame_time;
            }
            return None;
        }

        let pending = match self.pending.take() {
            Some(mut pending) if pending.chord.label == chord.label => {
                pending.held += frame_time;
                pending.chord = chord.clone();
                pending
            }
            _ => PendingChord {
                chord: chord.clone(),
                observed_at: frame_start,
                held: frame_time,
            },
        };

        if pending.held < self.params.min_hold {
            self.pending = Some(pending);
            return None;
        }

        let entry = ChordHistoryEntry {
            chord: pending.chord,
            observed_at: pending.observed_at,
            held_duration: pending.held,
        };
        debug!(
            "chord change to {} at {:?} (held {:?})",
            entry.chord.label, entry.observed_at, entry.held_duration
        );

        self.entries.push_back(entry.clone());
        while self.entries.len() > self.params.capacity.max(1) {
            self.entries.pop_front();
        }

        Some(entry)
    }

    /// The most recently committed chord.
    pub fn current(&self) -> Option<&ChordHistoryEntry> {
        self.entries.back()
    }

    pub fn current_label(&self) -> Option<&str> {
        self.current().map(|e| e.chord.label.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChordHistoryEntry> {
        self.entries.iter()
    }

    /// Labels of the last `n` committed chords, oldest first.
    pub fn recent_labels(&self, n: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries
            .iter()
            .skip(skip)
            .map(|e| e.chord.label.clone())
            .collect()
    }

    /// Labels in the configured fragment-matching window.
    pub fn fragment_window(&self) -> Vec<String> {
        self.recent_labels(self.params.fragment_window)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending = None;
    }
}

impl Default for ChordHistory {
    fn default() -> Self {
        Self::new(ChordHistoryParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{Chord, ChordQuality};

    const FRAME: Duration = Duration::from_millis(50);

    fn estimate(label: &str) -> ChordEstimate {
        let chord = Chord::parse(label).unwrap();
        ChordEstimate {
            root: chord.root,
            quality: chord.quality,
            confidence: 0.9,
            label: label.to_string(),
        }
    }

    /// Feeds `frames` frames of `label` and returns the entries committed on the way.
    fn play(
        history: &mut ChordHistory,
        clock: &mut Duration,
        label: Option<&str>,
        frames: usize,
    ) -> Vec<ChordHistoryEntry> {
        let chord = label.map(estimate);
        let mut committed = Vec::new();
        for _ in 0..frames {
            if let Some(entry) = history.observe(chord.as_ref(), *clock, FRAME) {
                committed.push(entry);
            }
            *clock += FRAME;
        }
        committed
    }

    #[test]
    fn test_chord_is_committed_after_min_hold() {
        let mut history = ChordHistory::default();
        let mut clock = Duration::ZERO;

        assert!(play(&mut history, &mut clock, Some("C"), 4).is_empty());
        let committed = play(&mut history, &mut clock, Some("C"), 1);
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].chord.label, "C");
        assert_eq!(committed[0].observed_at, Duration::ZERO);
        assert_eq!(committed[0].held_duration, Duration::from_millis(250));

        play(&mut history, &mut clock, Some("C"), 10);
        assert_eq!(history.len(), 1);
        assert_eq!(
            history.current().unwrap().held_duration,
            Duration::from_millis(750)
        );
    }

    #[test]
    fn test_short_blip_is_not_recorded() {
        let mut history = ChordHistory::default();
        let mut clock = Duration::ZERO;

        play(&mut history, &mut clock, Some("C"), 10);
        assert!(play(&mut history, &mut clock, Some("Cmaj7"), 2).is_empty());
        assert!(play(&mut history, &mut clock, Some("C"), 10).is_empty());
        assert_eq!(history.recent_labels(8), vec!["C"]);
    }

    #[test]
    fn test_interrupted_candidate_restarts() {
        let mut history = ChordHistory::default();
        let mut clock = Duration::ZERO;

        play(&mut history, &mut clock, Some("C"), 10);
        play(&mut history, &mut clock, Some("G"), 3);
        play(&mut history, &mut clock, Some("Em"), 1);
        assert!(play(&mut history, &mut clock, Some("G"), 4).is_empty());

        let committed = play(&mut history, &mut clock, Some("G"), 1);
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].observed_at, Duration::from_millis(700));
    }

    #[test]
    fn test_silence_resets_pending_chord() {
        let mut history = ChordHistory::default();
        let mut clock = Duration::ZERO;

        play(&mut history, &mut clock, Some("Am"), 3);
        play(&mut history, &mut clock, None, 1);
        assert!(play(&mut history, &mut clock, Some("Am"), 4).is_empty());
        assert_eq!(play(&mut history, &mut clock, Some("Am"), 1).len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = ChordHistory::new(ChordHistoryParameters {
            capacity: 3,
            ..Default::default()
        });
        let mut clock = Duration::ZERO;
        for label in ["C", "G", "Am", "F", "C"] {
            play(&mut history, &mut clock, Some(label), 6);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.recent_labels(10), vec!["Am", "F", "C"]);
        assert_eq!(history.recent_labels(2), vec!["F", "C"]);
    }

    #[test]
    fn test_zero_hold_commits_immediately() {
        let mut history = ChordHistory::new(ChordHistoryParameters {
            min_hold: Duration::ZERO,
            ..Default::default()
        });
        let mut clock = Duration::ZERO;
        assert_eq!(play(&mut history, &mut clock, Some("D"), 1).len(), 1);
        assert_eq!(play(&mut history, &mut clock, Some("A"), 1).len(), 1);
        assert_eq!(history.fragment_window(), vec!["D", "A"]);
    }

    #[test]
    fn test_clear() {
        let mut history = ChordHistory::default();
        let mut clock = Duration::ZERO;
        play(&mut history, &mut clock, Some("E"), 10);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.current_label(), None);
        assert_eq!(history.current().map(|e| e.chord.quality), None::<ChordQuality>);
    }
}
