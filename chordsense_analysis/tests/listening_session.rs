use chordsense_analysis::analysis_modules::{
    chord_template_chroma, ChromaVector, ConfidenceTier, ProgressionPredictor,
};
use chordsense_analysis::{AnalysisParameters, AnalysisState, Catalogue, Chord, Key, Mode};
use std::sync::Arc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(40);
const FRAMES_PER_CHORD: usize = 15;

fn frame(label: &str) -> ChromaVector {
    let chord = Chord::parse(label).unwrap();
    chord_template_chroma(chord.root, chord.quality, 1.0)
}

fn play(state: &mut AnalysisState, labels: &[&str]) {
    for label in labels {
        let frame = frame(label);
        for _ in 0..FRAMES_PER_CHORD {
            state.update(&frame, FRAME);
        }
    }
}

fn session() -> AnalysisState {
    let _ = env_logger::builder().is_test(true).try_init();
    AnalysisState::new(
        AnalysisParameters::default(),
        Arc::new(Catalogue::builtin()),
    )
}

#[test]
fn test_four_chord_song_is_recognized() {
    let mut state = session();
    play(&mut state, &["C", "G", "Am", "F"]);

    assert_eq!(state.history().recent_labels(8), vec!["C", "G", "Am", "F"]);
    assert!(state.key().is_some());

    let fragment = state.fragment();
    let top = fragment.top_match().unwrap();
    assert_eq!(top.song.id, "let-it-be");
    assert_eq!(top.song.chords, vec!["C", "G", "Am", "F"]);
    assert_eq!(top.sequence_score, 1.0);
    assert_eq!(top.confidence_tier, ConfidenceTier::High);
    assert!(fragment.message.contains("Let It Be"));

    let predictor = ProgressionPredictor::default();
    let next = predictor.predict_next("C", Key::new(0, Mode::Major));
    assert!(next.len() <= 3);
    assert!(next.iter().any(|c| c == "F" || c == "G"));
}

#[test]
fn test_looped_progression_fills_the_window() {
    let mut state = session();
    play(&mut state, &["C", "G", "Am", "F", "C", "G", "Am", "F"]);

    assert_eq!(state.history().len(), 8);
    let top = state.fragment().top_match().unwrap();
    assert_eq!(top.song.id, "let-it-be");
    assert_eq!(top.confidence_tier, ConfidenceTier::High);
}

#[test]
fn test_blips_do_not_reach_the_history() {
    let mut state = session();
    let c = frame("C");
    let blip = frame("F#");

    for _ in 0..FRAMES_PER_CHORD {
        state.update(&c, FRAME);
    }
    // a single stray frame
    state.update(&blip, FRAME);
    for _ in 0..FRAMES_PER_CHORD {
        state.update(&c, FRAME);
    }

    assert_eq!(state.history().recent_labels(8), vec!["C"]);
    assert!(state
        .history()
        .entries()
        .all(|entry| entry.held_duration >= Duration::from_millis(250)));
}

#[test]
fn test_restart_after_reset() {
    let mut state = session();
    play(&mut state, &["Em", "D"]);
    assert!(!state.history().is_empty());

    state.reset();
    assert!(state.history().is_empty());
    assert!(state.fragment().matches.is_empty());

    play(&mut state, &["C", "G", "Am", "F"]);
    assert_eq!(state.fragment().top_match().unwrap().song.id, "let-it-be");
}
