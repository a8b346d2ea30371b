use crate::error::AlignmentError;
use crate::pipeline::traits::{ActivityShaper, OffsetSearch, OnsetDetector};
use crate::types::{AlignmentResult, AudioChannel};

pub struct OffsetAligner {
    expected_sample_rate_hz: u32,
    onset_detector: Box<dyn OnsetDetector>,
    activity_shaper: Box<dyn ActivityShaper>,
    offset_search: Box<dyn OffsetSearch>,
}

pub(crate) struct OffsetAlignerParts {
    pub expected_sample_rate_hz: u32,
    pub onset_detector: Box<dyn OnsetDetector>,
    pub activity_shaper: Box<dyn ActivityShaper>,
    pub offset_search: Box<dyn OffsetSearch>,
}

impl OffsetAligner {
    pub(crate) fn from_parts(parts: OffsetAlignerParts) -> Self {
        Self {
            expected_sample_rate_hz: parts.expected_sample_rate_hz,
            onset_detector: parts.onset_detector,
            activity_shaper: parts.activity_shaper,
            offset_search: parts.offset_search,
        }
    }

    pub fn hop_length(&self) -> usize {
        self.onset_detector.hop_length()
    }

    /// Offset that best lines `part` up with `reference`.
    ///
    /// A positive `offset_ms` means events in the part happen later than the
    /// same events in the reference.
    pub fn align(
        &self,
        reference: &AudioChannel,
        part: &AudioChannel,
    ) -> Result<AlignmentResult, AlignmentError> {
        validate_channel(reference)?;
        validate_channel(part)?;
        if reference.sample_rate_hz != part.sample_rate_hz {
            return Err(AlignmentError::RateMismatch {
                reference_hz: reference.sample_rate_hz,
                part_hz: part.sample_rate_hz,
            });
        }
        let sample_rate_hz = reference.sample_rate_hz;
        if sample_rate_hz != self.expected_sample_rate_hz {
            tracing::warn!(
                expected_rate_hz = self.expected_sample_rate_hz,
                actual_rate_hz = sample_rate_hz,
                "aligner is tuned for a different sample rate; the shift range covers a different span"
            );
        }

        let reference_activity = self.activity(reference)?;
        let part_activity = self.activity(part)?;

        let best = self
            .offset_search
            .find_offset(&reference_activity, &part_activity)?;
        let offset_ms = frames_to_ms(best.shift, self.hop_length(), sample_rate_hz);

        tracing::info!(
            reference = %reference.id,
            part = %part.id,
            offset_frames = best.shift,
            offset_ms,
            error = best.error,
            "aligned recordings"
        );

        Ok(AlignmentResult {
            reference: reference.id.clone(),
            part: part.id.clone(),
            offset_frames: best.shift,
            offset_ms,
            error: best.error,
        })
    }

    fn activity(&self, channel: &AudioChannel) -> Result<Vec<f32>, AlignmentError> {
        let normalized = normalize_audio(&channel.samples);
        let onset = self
            .onset_detector
            .onset_strength(&normalized, channel.sample_rate_hz)?;
        self.activity_shaper
            .shape(&onset)
            .map_err(|err| match err {
                AlignmentError::DegenerateSignal { .. } => {
                    AlignmentError::degenerate(channel.id.clone())
                }
                other => other,
            })
    }
}

/// Converts a frame shift to milliseconds: `frames * hop_length / rate * 1000`.
pub fn frames_to_ms(frames: i32, hop_length: usize, sample_rate_hz: u32) -> f64 {
    (frames as f64 * hop_length as f64 / sample_rate_hz as f64) * 1000.0
}

fn validate_channel(channel: &AudioChannel) -> Result<(), AlignmentError> {
    if channel.samples.is_empty() {
        return Err(AlignmentError::invalid_input(format!(
            "{}: sample sequence is empty",
            channel.id
        )));
    }
    if channel.sample_rate_hz == 0 {
        return Err(AlignmentError::invalid_input(format!(
            "{}: sample rate must be > 0",
            channel.id
        )));
    }
    Ok(())
}

/// Zero-mean, unit-variance copy of the samples so both recordings enter
/// the onset detector at the same level.
fn normalize_audio(samples: &[f32]) -> Vec<f32> {
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = samples
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = var.sqrt().max(1e-7);
    samples
        .iter()
        .map(|&x| ((x as f64 - mean) / std) as f32)
        .collect()
}
