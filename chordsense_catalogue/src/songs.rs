use crate::{Difficulty, Mode, SongEntry};

#[allow(clippy::too_many_arguments)]
fn song(
    id: &str,
    title: &str,
    artist: &str,
    chords: &[&str],
    key: &str,
    mode: Mode,
    difficulty: Difficulty,
    tags: &[&str],
    fun_fact: Option<&str>,
) -> SongEntry {
    SongEntry {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        chords: chords.iter().map(|c| c.to_string()).collect(),
        key: key.to_string(),
        mode,
        difficulty,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        fun_fact: fun_fact.map(str::to_string),
    }
}

/// Progressions are written as chord changes: a chord is never followed by itself.
pub(crate) fn builtin_songs() -> Vec<SongEntry> {
    use Difficulty::*;
    use Mode::*;

    vec![
        song(
            "let-it-be",
            "Let It Be",
            "The Beatles",
            &["C", "G", "Am", "F"],
            "C",
            Major,
            Beginner,
            &["pop", "classic", "piano"],
            Some("The I-V-vi-IV progression behind this song is one of the most used in pop music."),
        ),
        song(
            "stand-by-me",
            "Stand By Me",
            "Ben E. King",
            &["A", "F#m", "D", "E"],
            "A",
            Major,
            Beginner,
            &["soul", "classic"],
            Some("The bass line is almost as famous as the chords."),
        ),
        song(
            "knockin-on-heavens-door",
            "Knockin' on Heaven's Door",
            "Bob Dylan",
            &["G", "D", "Am", "G", "D", "C"],
            "G",
            Major,
            Beginner,
            &["folk", "rock"],
            None,
        ),
        song(
            "horse-with-no-name",
            "A Horse with No Name",
            "America",
            &["Em", "D"],
            "E",
            Minor,
            Beginner,
            &["folk", "two-chords"],
            Some("The whole song only uses two chord shapes."),
        ),
        song(
            "twinkle-twinkle",
            "Twinkle, Twinkle, Little Star",
            "Traditional",
            &["C", "F", "C", "G", "C"],
            "C",
            Major,
            Beginner,
            &["nursery", "traditional"],
            Some("The melody is the same as the alphabet song."),
        ),
        song(
            "three-little-birds",
            "Three Little Birds",
            "Bob Marley",
            &["A", "D", "A", "E"],
            "A",
            Major,
            Beginner,
            &["reggae"],
            None,
        ),
        song(
            "riptide",
            "Riptide",
            "Vance Joy",
            &["Am", "G", "C"],
            "C",
            Major,
            Beginner,
            &["pop", "ukulele"],
            Some("Usually played on ukulele."),
        ),
        song(
            "zombie",
            "Zombie",
            "The Cranberries",
            &["Em", "C", "G", "D"],
            "E",
            Minor,
            Beginner,
            &["rock", "90s"],
            None,
        ),
        song(
            "la-bamba",
            "La Bamba",
            "Ritchie Valens",
            &["C", "F", "G", "F"],
            "C",
            Major,
            Beginner,
            &["rock-and-roll", "latin"],
            Some("Based on a traditional Mexican folk song from Veracruz."),
        ),
        song(
            "sweet-home-alabama",
            "Sweet Home Alabama",
            "Lynyrd Skynyrd",
            &["D", "Cadd9", "G"],
            "D",
            Major,
            Beginner,
            &["rock", "southern"],
            None,
        ),
        song(
            "brown-eyed-girl",
            "Brown Eyed Girl",
            "Van Morrison",
            &["G", "C", "G", "D"],
            "G",
            Major,
            Beginner,
            &["pop", "60s"],
            None,
        ),
        song(
            "hit-the-road-jack",
            "Hit the Road Jack",
            "Ray Charles",
            &["Am", "G", "F", "E7"],
            "A",
            Minor,
            Beginner,
            &["soul", "descending-bass"],
            Some("The descending Am-G-F-E pattern is known as the Andalusian cadence."),
        ),
        song(
            "someone-like-you",
            "Someone Like You",
            "Adele",
            &["A", "E", "F#m", "D"],
            "A",
            Major,
            Intermediate,
            &["pop", "ballad", "piano"],
            None,
        ),
        song(
            "wonderwall",
            "Wonderwall",
            "Oasis",
            &["Em7", "G", "Dsus4", "A7sus4"],
            "E",
            Minor,
            Intermediate,
            &["britpop", "guitar"],
            Some("The ringing top strings stay the same through every chord."),
        ),
        song(
            "hallelujah",
            "Hallelujah",
            "Leonard Cohen",
            &["C", "Am", "C", "Am", "F", "G", "C", "G"],
            "C",
            Major,
            Intermediate,
            &["ballad", "folk"],
            Some("The lyrics mention the chord changes: the fourth, the fifth, the minor fall."),
        ),
        song(
            "house-of-the-rising-sun",
            "The House of the Rising Sun",
            "The Animals",
            &["Am", "C", "D", "F", "Am", "C", "E"],
            "A",
            Minor,
            Intermediate,
            &["folk", "arpeggio"],
            None,
        ),
        song(
            "smells-like-teen-spirit",
            "Smells Like Teen Spirit",
            "Nirvana",
            &["F5", "Bb5", "Ab5", "Db5"],
            "F",
            Minor,
            Intermediate,
            &["grunge", "power-chords"],
            None,
        ),
        song(
            "hotel-california",
            "Hotel California",
            "Eagles",
            &["Bm", "F#", "A", "E", "G", "D", "Em", "F#"],
            "B",
            Minor,
            Advanced,
            &["rock", "70s"],
            None,
        ),
        song(
            "autumn-leaves",
            "Autumn Leaves",
            "Joseph Kosma",
            &["Am7", "D7", "Gmaj7", "Cmaj7", "F#m7b5", "B7", "Em"],
            "E",
            Minor,
            Advanced,
            &["jazz", "standard"],
            Some("A classic study piece for ii-V-I movement in both major and minor."),
        ),
    ]
}
