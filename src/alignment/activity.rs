use crate::error::AlignmentError;

/// Population z-score of an onset curve.
///
/// A flat curve has no events to threshold and fails with
/// `DegenerateSignal`.
pub fn standardize(curve: &[f32]) -> Result<Vec<f64>, AlignmentError> {
    if curve.is_empty() {
        return Err(AlignmentError::EmptyInput {
            context: "activity standardization",
        });
    }
    let n = curve.len() as f64;
    let mean = curve.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = curve
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return Err(AlignmentError::degenerate("onset curve"));
    }
    Ok(curve.iter().map(|&x| (x as f64 - mean) / std).collect())
}

/// 1.0 where the standardized value is strictly above `sigma`, else 0.0.
pub fn threshold(z: &[f64], sigma: f32) -> Vec<f32> {
    let sigma = sigma as f64;
    z.iter()
        .map(|&v| if v > sigma { 1.0 } else { 0.0 })
        .collect()
}

/// Left-to-right pass: each frame becomes at least `decay` times its
/// already-updated predecessor.
pub fn decay_forward(signal: &mut [f32], decay: f32) {
    if signal.len() <= 2 {
        return;
    }
    for i in 1..signal.len() {
        signal[i] = signal[i].max(signal[i - 1] * decay);
    }
}

/// Right-to-left pass over `1..len-1`; the first and last frames are left
/// as they are.
pub fn decay_backward(signal: &mut [f32], decay: f32) {
    if signal.len() <= 2 {
        return;
    }
    for i in (1..signal.len() - 1).rev() {
        signal[i] = signal[i].max(signal[i + 1] * decay);
    }
}

/// Thresholded onset events spread geometrically in both directions, so two
/// recordings a few frames apart still overlap.
pub fn activity_signal(
    onset: &[f32],
    threshold_sigma: f32,
    decay: f32,
) -> Result<Vec<f32>, AlignmentError> {
    let z = standardize(onset)?;
    let mut signal = threshold(&z, threshold_sigma);
    let events = signal.iter().filter(|&&v| v > 0.0).count();
    decay_forward(&mut signal, decay);
    decay_backward(&mut signal, decay);
    tracing::debug!(frames = signal.len(), events, "shaped activity signal");
    Ok(signal)
}
