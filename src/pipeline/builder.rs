use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{CyclicMseSearch, DecayingThresholdShaper, SpectralFluxOnsetDetector};
use crate::pipeline::runtime::{OffsetAligner, OffsetAlignerParts};
use crate::pipeline::traits::{ActivityShaper, OffsetSearch, OnsetDetector};
use crate::types::ShiftRange;

pub struct OffsetAlignerBuilder {
    config: AlignerConfig,
    onset_detector: Option<Box<dyn OnsetDetector>>,
    activity_shaper: Option<Box<dyn ActivityShaper>>,
    offset_search: Option<Box<dyn OffsetSearch>>,
}

impl OffsetAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            onset_detector: None,
            activity_shaper: None,
            offset_search: None,
        }
    }

    pub fn with_onset_detector(mut self, onset_detector: Box<dyn OnsetDetector>) -> Self {
        self.onset_detector = Some(onset_detector);
        self
    }

    pub fn with_activity_shaper(mut self, activity_shaper: Box<dyn ActivityShaper>) -> Self {
        self.activity_shaper = Some(activity_shaper);
        self
    }

    pub fn with_offset_search(mut self, offset_search: Box<dyn OffsetSearch>) -> Self {
        self.offset_search = Some(offset_search);
        self
    }

    pub fn build(self) -> Result<OffsetAligner, AlignmentError> {
        self.config.validate()?;
        let config = self.config;

        tracing::debug!(
            hop_length = config.hop_length,
            min_shift = config.min_shift,
            max_shift = config.max_shift,
            max_detectable_offset_ms = config.max_detectable_offset_ms(),
            "building offset aligner"
        );

        Ok(OffsetAligner::from_parts(OffsetAlignerParts {
            expected_sample_rate_hz: config.sample_rate_hz,
            onset_detector: self
                .onset_detector
                .unwrap_or_else(|| Box::new(SpectralFluxOnsetDetector::from_config(&config))),
            activity_shaper: self.activity_shaper.unwrap_or_else(|| {
                Box::new(DecayingThresholdShaper {
                    threshold_sigma: config.threshold_sigma,
                    decay: config.decay,
                })
            }),
            offset_search: self.offset_search.unwrap_or_else(|| {
                Box::new(CyclicMseSearch {
                    range: ShiftRange::new(config.min_shift, config.max_shift),
                })
            }),
        }))
    }
}
