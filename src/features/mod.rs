pub(crate) mod mel;
pub mod onset;
pub(crate) mod stft;

pub use onset::{onset_strength, OnsetParams};
