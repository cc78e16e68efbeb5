pub use chordsense_catalogue::notes::{parse_pitch_class, split_pitch_class};

/// Number of equal-tempered pitch classes in an octave.
pub const N_PITCH_CLASSES: usize = 12;

/// Pitch class names with sharp spelling, index 0 = C.
pub const NOTE_NAMES: [&str; N_PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Below this total energy a vector is treated as all zeros.
pub const ENERGY_EPSILON: f32 = 1e-9;

pub fn arg_max(sl: &[f32]) -> usize {
    // we have no NaNs
    sl.iter()
        .enumerate()
        .fold(
            (0, f32::MIN),
            |cur, x| if *x.1 > cur.1 { (x.0, *x.1) } else { cur },
        )
        .0
}

/// Rotates a pitch-class vector upwards by `steps` semitones.
///
/// The value at index `i` moves to index `(i + steps) mod 12`. Negative and overflowing step
/// counts wrap around, so `rotate(v, -5)`, `rotate(v, 7)` and `rotate(v, 19)` are the same.
pub fn rotate(values: &[f32; N_PITCH_CLASSES], steps: isize) -> [f32; N_PITCH_CLASSES] {
    let mut rotated = [0.0; N_PITCH_CLASSES];
    for (i, value) in values.iter().enumerate() {
        let target = (i as isize + steps).rem_euclid(N_PITCH_CLASSES as isize) as usize;
        rotated[target] = *value;
    }
    rotated
}

pub fn total_energy(values: &[f32; N_PITCH_CLASSES]) -> f32 {
    values.iter().sum()
}

/// Scales the vector so that it sums to 1. Returns `None` for (near) silent vectors.
pub fn normalize_energy(values: &[f32; N_PITCH_CLASSES]) -> Option<[f32; N_PITCH_CLASSES]> {
    let total = total_energy(values);
    if total <= ENERGY_EPSILON {
        return None;
    }
    Some(values.map(|x| x / total))
}

/// Normalized dot product. Zero if either vector has no energy.
pub fn cosine_similarity(a: &[f32; N_PITCH_CLASSES], b: &[f32; N_PITCH_CLASSES]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= ENERGY_EPSILON || norm_b <= ENERGY_EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Below this fraction of its mean square a vector's variance counts as rounding noise.
const RELATIVE_VARIANCE_EPSILON: f64 = 1e-9;

/// Pearson correlation coefficient. `None` if either vector is constant.
///
/// Accumulates in `f64`. Each variance is compared against its own vector's scale, so a flat
/// vector stays flat after normalization no matter how loud it was.
pub fn pearson_correlation(a: &[f32; N_PITCH_CLASSES], b: &[f32; N_PITCH_CLASSES]) -> Option<f32> {
    let n = N_PITCH_CLASSES as f64;
    let mean_a = a.iter().map(|&x| x as f64).sum::<f64>() / n;
    let mean_b = b.iter().map(|&y| y as f64).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    let mut sum_sq_a = 0.0;
    let mut sum_sq_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
        sum_sq_a += x * x;
        sum_sq_b += y * y;
    }

    if variance_a <= RELATIVE_VARIANCE_EPSILON * sum_sq_a
        || variance_b <= RELATIVE_VARIANCE_EPSILON * sum_sq_b
    {
        return None;
    }
    Some((covariance / (variance_a * variance_b).sqrt()).clamp(-1.0, 1.0) as f32)
}

pub fn pitch_class_name(pitch_class: usize) -> &'static str {
    NOTE_NAMES[pitch_class % N_PITCH_CLASSES]
}
