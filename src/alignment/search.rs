use crate::error::AlignmentError;
use crate::types::{FrameOffset, ShiftRange};

/// Mean squared error between `reference` and `part` rotated left by `shift`.
///
/// Both signals are truncated to the shorter length `n` and compared as
/// `reference[i]` against `part[(i + shift) mod n]`. The rotation wraps
/// around instead of zero-padding, so content near one edge is compared
/// with content from the other edge. For non-looping material this can
/// produce spuriously low errors at large shifts.
pub fn measure_error(reference: &[f32], part: &[f32], shift: i32) -> f64 {
    let n = reference.len().min(part.len());
    if n == 0 {
        return 0.0;
    }
    let reference = &reference[..n];
    let part = &part[..n];
    let r = (shift as i64).rem_euclid(n as i64) as usize;

    let (head, tail) = reference.split_at(n - r);
    let sum = squared_diff(head, &part[r..]) + squared_diff(tail, &part[..r]);
    sum / n as f64
}

#[inline]
fn squared_diff(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum()
}

/// Brute-force search for the shift with the lowest error.
///
/// Candidates are ordered by `(error, shift)`, so equal errors resolve to the
/// smallest shift. When the signals are shorter than the range, shifts that
/// differ by a multiple of the length are the same rotation; each rotation is
/// evaluated once, at its smallest-magnitude shift.
pub fn find_offset(
    reference: &[f32],
    part: &[f32],
    range: ShiftRange,
) -> Result<FrameOffset, AlignmentError> {
    if reference.is_empty() || part.is_empty() {
        return Err(AlignmentError::EmptyInput {
            context: "offset search",
        });
    }
    if range.is_empty() {
        return Err(AlignmentError::invalid_input(format!(
            "shift range is inverted: {}..={}",
            range.min, range.max
        )));
    }

    let n = reference.len().min(part.len());
    let mut best = FrameOffset {
        shift: range.min,
        error: f64::INFINITY,
    };
    for shift in range.min..=range.max {
        if !is_canonical_shift(shift, n, range) {
            continue;
        }
        let error = measure_error(reference, part, shift);
        // Ascending shifts: a strict improvement is required to move.
        if error < best.error {
            best = FrameOffset { shift, error };
        }
    }

    if best.shift == range.min || best.shift == range.max {
        tracing::warn!(
            shift = best.shift,
            min = range.min,
            max = range.max,
            "best offset sits on the edge of the search range; true offset may lie outside it"
        );
    }
    tracing::debug!(
        shift = best.shift,
        error = best.error,
        frames = reference.len().min(part.len()),
        "offset search finished"
    );
    Ok(best)
}

/// False when a shift closer to zero inside `range` produces the same
/// rotation of an `n`-frame signal.
fn is_canonical_shift(shift: i32, n: usize, range: ShiftRange) -> bool {
    let n = match i32::try_from(n) {
        Ok(n) => n,
        Err(_) => return true,
    };
    let toward_zero = match shift.signum() {
        -1 => shift.checked_add(n),
        1 => shift.checked_sub(n),
        _ => None,
    };
    match toward_zero {
        Some(alias) if range.contains(alias) => {
            (shift.unsigned_abs(), shift) < (alias.unsigned_abs(), alias)
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate_right(signal: &[f32], k: usize) -> Vec<f32> {
        let mut out = signal.to_vec();
        out.rotate_right(k);
        out
    }

    #[test]
    fn identical_signals_align_at_zero_with_no_error() {
        let x = vec![0.0, 0.3, 1.0, 0.9, 0.2, 0.0, 0.0, 0.7, 1.0, 0.1, 0.0, 0.0];
        let best = find_offset(&x, &x, ShiftRange::new(-5, 5)).unwrap();
        assert_eq!(best.shift, 0);
        assert_eq!(best.error, 0.0);
    }

    #[test]
    fn recovers_spike_rotated_right_by_three() {
        let reference = vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let part = rotate_right(&reference, 3);
        let best = find_offset(&reference, &part, ShiftRange::new(-4, 4)).unwrap();
        assert_eq!(best.shift, 3);
        assert_eq!(best.error, 0.0);
    }

    #[test]
    fn recovers_negative_rotation() {
        let reference: Vec<f32> = (0..64).map(|i| ((i * 7) % 11) as f32 / 10.0).collect();
        let mut part = reference.clone();
        part.rotate_left(9);
        let best = find_offset(&reference, &part, ShiftRange::default()).unwrap();
        assert_eq!(measure_error(&reference, &part, -9), 0.0);
        assert_eq!(best.shift, -9);
        assert_eq!(best.error, 0.0);
    }

    #[test]
    fn ties_resolve_to_smallest_shift() {
        let reference = vec![1.0, 0.0, 1.0, 0.0];
        let part = vec![0.0, 1.0, 0.0, 1.0];
        assert_eq!(measure_error(&reference, &part, -1), 0.0);
        assert_eq!(measure_error(&reference, &part, 1), 0.0);
        for _ in 0..3 {
            let best = find_offset(&reference, &part, ShiftRange::new(-2, 2)).unwrap();
            assert_eq!(best.shift, -1);
            assert_eq!(best.error, 0.0);
        }
    }

    #[test]
    fn longer_signal_is_truncated_to_shorter() {
        let reference = vec![0.0, 1.0, 0.0, 0.0, 5.0, 5.0];
        let part = vec![0.0, 1.0, 0.0, 0.0];
        assert_eq!(measure_error(&reference, &part, 0), 0.0);
        let best = find_offset(&reference, &part, ShiftRange::new(-2, 2)).unwrap();
        assert_eq!(best.shift, 0);
    }

    #[test]
    fn measure_error_is_mean_of_squares() {
        let reference = vec![1.0, 0.0, 0.0, 0.0];
        let part = vec![0.0, 0.0, 0.0, 0.0];
        assert_eq!(measure_error(&reference, &part, 0), 0.25);
        assert_eq!(measure_error(&reference, &part, 7), 0.25);
    }

    #[test]
    fn shift_larger_than_length_wraps() {
        let reference = vec![0.0, 1.0, 0.0, 0.0, 0.0];
        let part = rotate_right(&reference, 2);
        assert_eq!(measure_error(&reference, &part, 2), 0.0);
        assert_eq!(measure_error(&reference, &part, 7), 0.0);
        assert_eq!(measure_error(&reference, &part, -3), 0.0);
    }

    #[test]
    fn aliased_rotations_resolve_to_smallest_magnitude() {
        let reference = vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let part = rotate_right(&reference, 3);
        // -97, -87, ..., 93 are all the same rotation as 3.
        let best = find_offset(&reference, &part, ShiftRange::default()).unwrap();
        assert_eq!(best.shift, 3);
        assert_eq!(best.error, 0.0);
    }

    #[test]
    fn half_rotation_prefers_negative_alias() {
        assert!(is_canonical_shift(-5, 10, ShiftRange::default()));
        assert!(!is_canonical_shift(5, 10, ShiftRange::default()));
        assert!(!is_canonical_shift(-13, 10, ShiftRange::default()));
        assert!(is_canonical_shift(0, 10, ShiftRange::default()));
        // The closer alias is outside the range, so the far one stands in.
        assert!(is_canonical_shift(12, 10, ShiftRange::new(8, 20)));
    }

    #[test]
    fn empty_signal_fails() {
        let err = find_offset(&[], &[1.0], ShiftRange::default()).unwrap_err();
        assert!(matches!(err, AlignmentError::EmptyInput { .. }));
        let err = find_offset(&[1.0], &[], ShiftRange::default()).unwrap_err();
        assert!(matches!(err, AlignmentError::EmptyInput { .. }));
    }

    #[test]
    fn inverted_range_fails() {
        let err = find_offset(&[1.0, 0.0], &[0.0, 1.0], ShiftRange::new(3, -3)).unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidInput { .. }));
    }
}
