use crate::error::AlignmentError;
use crate::types::FrameOffset;

pub trait OnsetDetector: Send + Sync {
    /// Onset-strength curve at `sample_rate_hz / hop_length` frames per second.
    fn onset_strength(&self, samples: &[f32], sample_rate_hz: u32)
        -> Result<Vec<f32>, AlignmentError>;

    fn hop_length(&self) -> usize;
}

pub trait ActivityShaper: Send + Sync {
    fn shape(&self, onset: &[f32]) -> Result<Vec<f32>, AlignmentError>;
}

pub trait OffsetSearch: Send + Sync {
    fn find_offset(&self, reference: &[f32], part: &[f32])
        -> Result<FrameOffset, AlignmentError>;
}
