pub mod alignment;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod pipeline;
pub mod types;

pub use config::AlignerConfig;
pub use error::AlignmentError;
pub use io::{AlignmentJob, AudioDecoder, BlobStore, DecodeRequest, Decoder, FsBlobStore};
pub use pipeline::builder::OffsetAlignerBuilder;
pub use pipeline::runtime::{frames_to_ms, OffsetAligner};
pub use pipeline::traits::{ActivityShaper, OffsetSearch, OnsetDetector};
pub use types::{AlignmentResult, AudioChannel, FrameOffset, ShiftRange};

/// Aligns two mono recordings with the default configuration.
///
/// The result ids are `"reference"` and `"part"`.
pub fn align(
    reference_samples: &[f32],
    reference_rate: u32,
    part_samples: &[f32],
    part_rate: u32,
) -> Result<AlignmentResult, AlignmentError> {
    let aligner = OffsetAlignerBuilder::new(AlignerConfig::default()).build()?;
    let reference = AudioChannel::new("reference", reference_rate, reference_samples.to_vec());
    let part = AudioChannel::new("part", part_rate, part_samples.to_vec());
    aligner.align(&reference, &part)
}
