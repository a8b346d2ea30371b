use crate::alignment::activity::activity_signal;
use crate::alignment::search::find_offset;
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::features::onset::{onset_strength, OnsetParams};
use crate::pipeline::traits::{ActivityShaper, OffsetSearch, OnsetDetector};
use crate::types::{FrameOffset, ShiftRange};

pub struct SpectralFluxOnsetDetector {
    pub params: OnsetParams,
}

impl SpectralFluxOnsetDetector {
    pub fn from_config(config: &AlignerConfig) -> Self {
        Self {
            params: OnsetParams {
                n_fft: config.n_fft,
                hop_length: config.hop_length,
                n_mels: config.n_mels,
                top_db: config.top_db,
            },
        }
    }
}

impl Default for SpectralFluxOnsetDetector {
    fn default() -> Self {
        Self::from_config(&AlignerConfig::default())
    }
}

impl OnsetDetector for SpectralFluxOnsetDetector {
    fn onset_strength(
        &self,
        samples: &[f32],
        sample_rate_hz: u32,
    ) -> Result<Vec<f32>, AlignmentError> {
        onset_strength(samples, sample_rate_hz, &self.params)
    }

    fn hop_length(&self) -> usize {
        self.params.hop_length
    }
}

pub struct DecayingThresholdShaper {
    pub threshold_sigma: f32,
    pub decay: f32,
}

impl Default for DecayingThresholdShaper {
    fn default() -> Self {
        Self {
            threshold_sigma: 2.0,
            decay: 0.9,
        }
    }
}

impl ActivityShaper for DecayingThresholdShaper {
    fn shape(&self, onset: &[f32]) -> Result<Vec<f32>, AlignmentError> {
        activity_signal(onset, self.threshold_sigma, self.decay)
    }
}

#[derive(Default)]
pub struct CyclicMseSearch {
    pub range: ShiftRange,
}

impl OffsetSearch for CyclicMseSearch {
    fn find_offset(&self, reference: &[f32], part: &[f32]) -> Result<FrameOffset, AlignmentError> {
        find_offset(reference, part, self.range)
    }
}
