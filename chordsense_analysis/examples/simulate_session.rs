use chordsense_analysis::analysis_modules::chord_template_chroma;
use chordsense_analysis::{AnalysisState, Chord};
use std::time::Duration;

/// Plays a looped I-V-vi-IV progression as synthetic chroma frames and prints what the
/// analysis makes of it.
fn main() {
    env_logger::init();

    let frame_time = Duration::from_millis(40);
    let mut state = AnalysisState::default();

    println!("=== Simulated session: C G Am F, twice ===\n");
    for label in ["C", "G", "Am", "F", "C", "G", "Am", "F"] {
        let Some(chord) = Chord::parse(label) else {
            continue;
        };
        let frame = chord_template_chroma(chord.root, chord.quality, 1.0);

        for _ in 0..15 {
            let snapshot = state.update(&frame, frame_time);
            if let Some(entry) = &snapshot.new_history_entry {
                println!(
                    "[{:>6.2}s] chord {:<4} key {:<8} next {:?}",
                    entry.observed_at.as_secs_f32(),
                    entry.chord.label,
                    snapshot
                        .key
                        .as_ref()
                        .map(|k| k.key().to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    snapshot.predictions,
                );
            }
        }
    }

    let fragment = state.fragment();
    println!("\n{}", fragment.message);
    for song_match in &fragment.matches {
        println!(
            "  {:.2} ({}) {}",
            song_match.score, song_match.confidence_tier, song_match.reason
        );
    }

    println!("\nIf you like \"Let It Be\", try:");
    for song_match in state.similar_songs("let-it-be") {
        println!("  {} by {}", song_match.song.title, song_match.song.artist);
    }
}
