use serde::{Deserialize, Serialize};

/// One mono recording handed to the aligner.
#[derive(Debug, Clone)]
pub struct AudioChannel {
    pub id: String,
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

impl AudioChannel {
    pub fn new(id: impl Into<String>, sample_rate_hz: u32, samples: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            sample_rate_hz,
            samples,
        }
    }
}

/// Best candidate shift in feature frames and its mean squared error.
///
/// A positive `shift` means the part lags the reference: an event at
/// reference frame `i` shows up at part frame `i + shift`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOffset {
    pub shift: i32,
    pub error: f64,
}

/// Inclusive range of candidate shifts, in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRange {
    pub min: i32,
    pub max: i32,
}

impl ShiftRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, shift: i32) -> bool {
        (self.min..=self.max).contains(&shift)
    }
}

impl Default for ShiftRange {
    fn default() -> Self {
        Self { min: -100, max: 99 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub reference: String,
    pub part: String,
    pub offset_frames: i32,
    /// Milliseconds the part lags the reference.
    #[serde(rename = "offset")]
    pub offset_ms: f64,
    /// Mean squared error between the activity signals at the chosen shift.
    /// Lower is better; no acceptance threshold is applied here.
    #[serde(rename = "err")]
    pub error: f64,
}
