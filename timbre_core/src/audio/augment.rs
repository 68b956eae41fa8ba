//! Training-time data augmentation: random time shift on waveforms and
//! time/frequency masking on spectrograms.

use ndarray::{Array2, s};
use rand::Rng;

use crate::audio::normalize::seconds_to_samples;
use crate::audio::{Spectrogram, Waveform};

/// Widest time mask, as a fraction of total time frames.
pub const MAX_TIME_MASK_FRACTION: f64 = 0.05;
/// Widest frequency mask, as a fraction of total mel bins.
pub const MAX_FREQ_MASK_FRACTION: f64 = 0.10;

/// Circularly rotate the waveform by a uniform random offset in
/// `[-max_shift_seconds, max_shift_seconds]`. Samples wrapped off one end
/// reappear at the other; nothing is zero-filled.
pub fn random_time_shift<R: Rng + ?Sized>(
    wave: Waveform,
    max_shift_seconds: f64,
    rng: &mut R,
) -> Waveform {
    if max_shift_seconds <= 0.0 {
        return wave;
    }
    let shift_seconds = rng.random_range(-max_shift_seconds..=max_shift_seconds);
    let shift = seconds_to_samples(shift_seconds, wave.sample_rate());
    time_shift(wave, shift)
}

/// Circular shift along the time axis. Positive `shift` moves samples toward
/// later times, wrapping the tail around to the front.
pub fn time_shift(wave: Waveform, shift: i64) -> Waveform {
    let len = wave.len();
    if len == 0 {
        return wave;
    }
    let offset = shift.rem_euclid(len as i64) as usize;
    if offset == 0 {
        return wave;
    }

    let rate = wave.sample_rate();
    let samples = wave.into_samples();
    let mut out = Array2::zeros(samples.raw_dim());
    for ((c, i), &v) in samples.indexed_iter() {
        out[[c, (i + offset) % len]] = v;
    }
    Waveform::from_raw(out, rate)
}

/// Mask one random time span and one random frequency span, both filled with
/// the spectrogram's pre-mask mean. Spans stay within bounds; the shape never
/// changes.
pub fn mask_spectrogram_segment<R: Rng + ?Sized>(mut spec: Spectrogram, rng: &mut R) -> Spectrogram {
    // One fill value for both masks, computed before anything is overwritten.
    let fill = spec.mean().unwrap_or(0.0);
    let (_, n_mels, n_frames) = spec.dim();

    let (t_start, t_width) = random_span(n_frames, MAX_TIME_MASK_FRACTION, rng);
    mask_time(&mut spec, t_start, t_width, fill);

    let (f_start, f_width) = random_span(n_mels, MAX_FREQ_MASK_FRACTION, rng);
    mask_frequency(&mut spec, f_start, f_width, fill);

    spec
}

/// Fill `width` time frames starting at `start` across every channel and bin.
pub fn mask_time(spec: &mut Spectrogram, start: usize, width: usize, fill: f32) {
    spec.slice_mut(s![.., .., start..start + width]).fill(fill);
}

/// Fill `width` mel bins starting at `start` across every channel and frame.
pub fn mask_frequency(spec: &mut Spectrogram, start: usize, width: usize, fill: f32) {
    spec.slice_mut(s![.., start..start + width, ..]).fill(fill);
}

fn random_span<R: Rng + ?Sized>(axis_len: usize, max_fraction: f64, rng: &mut R) -> (usize, usize) {
    let max_width = (max_fraction * axis_len as f64) as usize;
    let width = if max_width > 0 {
        rng.random_range(0..=max_width)
    } else {
        0
    };
    let start = if axis_len > width {
        rng.random_range(0..=axis_len - width)
    } else {
        0
    };
    (start, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn wave_from(values: Vec<f32>, rate: u32) -> Waveform {
        let len = values.len();
        Waveform::new(Array2::from_shape_vec((1, len), values).unwrap(), rate).unwrap()
    }

    #[test]
    fn shift_rotates_instead_of_zero_filling() {
        let w = wave_from(vec![0.0, 1.0, 2.0, 3.0, 4.0], 5);
        let out = time_shift(w, 2);
        let got: Vec<f32> = out.samples().row(0).to_vec();
        assert_eq!(got, vec![3.0, 4.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn negative_shift_rotates_backward() {
        let w = wave_from(vec![0.0, 1.0, 2.0, 3.0, 4.0], 5);
        let out = time_shift(w, -1);
        let got: Vec<f32> = out.samples().row(0).to_vec();
        assert_eq!(got, vec![1.0, 2.0, 3.0, 4.0, 0.0]);
    }

    #[test]
    fn full_rotation_is_identity() {
        let w = wave_from(vec![0.5, -0.5, 0.25, 0.75], 4);
        let out = time_shift(w.clone(), 4);
        assert_eq!(out, w);
    }

    #[test]
    fn random_shift_preserves_shape_and_sample_multiset() {
        let mut rng = StdRng::seed_from_u64(17);
        let w = wave_from((0..1000).map(|i| i as f32).collect(), 22050);
        let out = random_time_shift(w.clone(), 0.02, &mut rng);
        assert_eq!(out.channels(), w.channels());
        assert_eq!(out.len(), w.len());

        let mut before: Vec<f32> = w.samples().iter().cloned().collect();
        let mut after: Vec<f32> = out.samples().iter().cloned().collect();
        before.sort_by(f32::total_cmp);
        after.sort_by(f32::total_cmp);
        assert_eq!(before, after);
    }

    #[test]
    fn zero_max_shift_is_identity() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = wave_from(vec![1.0, 2.0, 3.0], 3);
        let out = random_time_shift(w.clone(), 0.0, &mut rng);
        assert_eq!(out, w);
    }

    #[test]
    fn masking_preserves_shape_and_fills_with_mean() {
        let spec = Array3::from_shape_fn((1, 90, 260), |(_, m, t)| (m * 260 + t) as f32 * 0.01);
        let mean = spec.mean().unwrap();

        let mut changed = 0usize;
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let masked = mask_spectrogram_segment(spec.clone(), &mut rng);

            assert_eq!(masked.dim(), spec.dim());
            for (a, b) in spec.iter().zip(masked.iter()) {
                if a != b {
                    assert!((b - mean).abs() < 1e-5, "masked cell is {b}, mean is {mean}");
                    changed += 1;
                }
            }
        }
        // Zero-width draws are legal, but ten seeds cannot all come up empty.
        assert!(changed > 0);
    }

    #[test]
    fn mask_spans_stay_within_bounds() {
        // Exercise many draws; an out-of-bounds span would panic the slice.
        let spec = Array3::from_elem((2, 20, 40), 1.0f32);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let masked = mask_spectrogram_segment(spec.clone(), &mut rng);
            assert_eq!(masked.dim(), spec.dim());
        }
    }

    #[test]
    fn explicit_time_mask_fills_exact_span() {
        let mut spec = Array3::from_elem((1, 4, 10), 2.0f32);
        mask_time(&mut spec, 3, 2, -1.0);
        for ((_, _, t), &v) in spec.indexed_iter() {
            if t == 3 || t == 4 {
                assert_eq!(v, -1.0);
            } else {
                assert_eq!(v, 2.0);
            }
        }
    }

    #[test]
    fn explicit_frequency_mask_fills_exact_span() {
        let mut spec = Array3::from_elem((1, 10, 4), 2.0f32);
        mask_frequency(&mut spec, 0, 3, -1.0);
        for ((_, m, _), &v) in spec.indexed_iter() {
            if m < 3 {
                assert_eq!(v, -1.0);
            } else {
                assert_eq!(v, 2.0);
            }
        }
    }
}
