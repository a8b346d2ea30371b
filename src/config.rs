use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub sample_rate_hz: u32,
    /// Samples advanced between consecutive onset frames.
    pub hop_length: usize,
    pub n_fft: usize,
    pub n_mels: usize,
    pub top_db: f32,
    /// Standardized onset strength above which a frame counts as an event.
    pub threshold_sigma: f32,
    /// Per-frame decay spreading each event to its neighbours.
    pub decay: f32,
    /// Smallest candidate shift in frames (inclusive).
    pub min_shift: i32,
    /// Largest candidate shift in frames (inclusive).
    pub max_shift: i32,
    /// Leading audio skipped by the decoder before analysis.
    pub offset_seconds: f64,
    /// Analysis window handed to the decoder; `None` reads to the end.
    pub duration_seconds: Option<f64>,
}

impl AlignerConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;
    pub const DEFAULT_HOP_LENGTH: usize = 512;
    pub const DEFAULT_N_FFT: usize = 2048;
    pub const DEFAULT_N_MELS: usize = 128;
    pub const DEFAULT_MIN_SHIFT: i32 = -100;
    pub const DEFAULT_MAX_SHIFT: i32 = 99;

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse aligner config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        if self.sample_rate_hz == 0 {
            return Err(AlignmentError::invalid_input("sample_rate_hz must be > 0"));
        }
        if self.hop_length == 0 {
            return Err(AlignmentError::invalid_input("hop_length must be > 0"));
        }
        if self.n_fft < 2 {
            return Err(AlignmentError::invalid_input("n_fft must be >= 2"));
        }
        if self.n_mels == 0 {
            return Err(AlignmentError::invalid_input("n_mels must be > 0"));
        }
        if !self.top_db.is_finite() || self.top_db <= 0.0 {
            return Err(AlignmentError::invalid_input("top_db must be finite and > 0"));
        }
        if !self.threshold_sigma.is_finite() {
            return Err(AlignmentError::invalid_input("threshold_sigma must be finite"));
        }
        if !(0.0..1.0).contains(&self.decay) {
            return Err(AlignmentError::invalid_input(format!(
                "decay must be in [0, 1), got {}",
                self.decay
            )));
        }
        if self.min_shift > self.max_shift {
            return Err(AlignmentError::invalid_input(format!(
                "shift range is inverted: {}..={}",
                self.min_shift, self.max_shift
            )));
        }
        if !self.offset_seconds.is_finite() || self.offset_seconds < 0.0 {
            return Err(AlignmentError::invalid_input("offset_seconds must be >= 0"));
        }
        if let Some(duration) = self.duration_seconds {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(AlignmentError::invalid_input("duration_seconds must be > 0"));
            }
        }
        Ok(())
    }

    pub fn frame_stride_ms(&self) -> f64 {
        self.hop_length as f64 / self.sample_rate_hz as f64 * 1000.0
    }

    /// Largest misalignment the shift range can still detect.
    pub fn max_detectable_offset_ms(&self) -> f64 {
        let frames = self.min_shift.unsigned_abs().max(self.max_shift.unsigned_abs());
        frames as f64 * self.frame_stride_ms()
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
            hop_length: Self::DEFAULT_HOP_LENGTH,
            n_fft: Self::DEFAULT_N_FFT,
            n_mels: Self::DEFAULT_N_MELS,
            top_db: 80.0,
            threshold_sigma: 2.0,
            decay: 0.9,
            min_shift: Self::DEFAULT_MIN_SHIFT,
            max_shift: Self::DEFAULT_MAX_SHIFT,
            offset_seconds: 5.0,
            duration_seconds: Some(20.0),
        }
    }
}
