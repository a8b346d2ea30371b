use crate::error::AlignmentError;
use crate::features::mel::MelFilterbank;
use crate::features::stft::for_each_power_frame;

const AMIN: f32 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnsetParams {
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    pub top_db: f32,
}

impl Default for OnsetParams {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            top_db: 80.0,
        }
    }
}

/// Onset strength envelope: mean positive change of the log-mel spectrum
/// between consecutive frames.
///
/// Frame `t` is centred on sample `t * hop_length`, so the envelope runs at
/// `sample_rate_hz / hop_length` frames per second and has
/// `1 + samples.len() / hop_length` entries. Frame 0 has no predecessor and
/// is always 0.
pub fn onset_strength(
    samples: &[f32],
    sample_rate_hz: u32,
    params: &OnsetParams,
) -> Result<Vec<f32>, AlignmentError> {
    if samples.is_empty() {
        return Err(AlignmentError::invalid_input("sample sequence is empty"));
    }
    if sample_rate_hz == 0 {
        return Err(AlignmentError::invalid_input("sample rate must be > 0"));
    }
    if params.hop_length == 0 || params.n_fft < 2 || params.n_mels == 0 {
        return Err(AlignmentError::invalid_input(format!(
            "invalid onset parameters: n_fft={} hop_length={} n_mels={}",
            params.n_fft, params.hop_length, params.n_mels
        )));
    }
    if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
        return Err(AlignmentError::invalid_input(format!(
            "non-finite sample at index {idx}"
        )));
    }

    let filterbank = MelFilterbank::new(sample_rate_hz, params.n_fft, params.n_mels);
    let n_mels = filterbank.len();

    // Log-mel spectrogram, frame-major.
    let mut log_mel: Vec<f32> = Vec::new();
    let mut mel_frame = vec![0.0f32; n_mels];
    let frames = for_each_power_frame(samples, params.n_fft, params.hop_length, |_, power| {
        filterbank.apply(power, &mut mel_frame);
        log_mel.extend(mel_frame.iter().map(|&p| 10.0 * p.max(AMIN).log10()));
    })?;

    let peak_db = log_mel.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor_db = peak_db - params.top_db;
    for v in log_mel.iter_mut() {
        *v = v.max(floor_db);
    }

    let mut envelope = vec![0.0f32; frames];
    for t in 1..frames {
        let prev = &log_mel[(t - 1) * n_mels..t * n_mels];
        let curr = &log_mel[t * n_mels..(t + 1) * n_mels];
        let flux: f32 = curr
            .iter()
            .zip(prev.iter())
            .map(|(c, p)| (c - p).max(0.0))
            .sum();
        envelope[t] = flux / n_mels as f32;
    }

    tracing::debug!(
        samples = samples.len(),
        frames,
        hop_length = params.hop_length,
        "computed onset strength"
    );
    Ok(envelope)
}
