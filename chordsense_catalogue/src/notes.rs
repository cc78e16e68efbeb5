//! Note names as they appear in catalogue keys and chord labels.

/// Splits a leading note name (`C`, `F#`, `Bb`, `E♭`, ...) off a label.
///
/// Returns the pitch class and the remainder of the label. Flats and sharps are folded into
/// the pitch class, so `Db` and `C#` both give 1.
pub fn split_pitch_class(label: &str) -> Option<(usize, &str)> {
    let letter = label.chars().next()?;
    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let mut rest = &label[letter.len_utf8()..];

    let mut pitch_class = base;
    if let Some(accidental) = rest.chars().next() {
        let offset = match accidental {
            '#' | '♯' => 1,
            'b' | '♭' => -1,
            _ => 0,
        };
        if offset != 0 {
            pitch_class += offset;
            rest = &rest[accidental.len_utf8()..];
        }
    }

    Some((pitch_class.rem_euclid(12) as usize, rest))
}

/// Parses a bare note name such as `"A"` or `"Bb"`.
pub fn parse_pitch_class(name: &str) -> Option<usize> {
    match split_pitch_class(name.trim()) {
        Some((pitch_class, "")) => Some(pitch_class),
        _ => None,
    }
}

/// Whether a chord label starts with a readable root note. The bass of a slash chord is not
/// looked at.
pub fn has_note_root(label: &str) -> bool {
    label
        .trim()
        .split('/')
        .next()
        .and_then(split_pitch_class)
        .is_some()
}
