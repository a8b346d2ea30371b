use crate::error::AlignmentError;
use crate::io::blob_store::BlobStore;
use crate::io::decoder::{DecodeRequest, Decoder};
use crate::pipeline::runtime::OffsetAligner;
use crate::types::{AlignmentResult, AudioChannel};

/// Fetch, decode and align two stored recordings.
pub struct AlignmentJob {
    store: Box<dyn BlobStore>,
    decoder: Box<dyn Decoder>,
    aligner: OffsetAligner,
    request: DecodeRequest,
}

impl AlignmentJob {
    pub fn new(
        store: Box<dyn BlobStore>,
        decoder: Box<dyn Decoder>,
        aligner: OffsetAligner,
        request: DecodeRequest,
    ) -> Self {
        Self {
            store,
            decoder,
            aligner,
            request,
        }
    }

    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }

    pub fn run(&self, reference_key: &str, part_key: &str) -> Result<AlignmentResult, AlignmentError> {
        let reference = self.load_channel(reference_key)?;
        let part = self.load_channel(part_key)?;
        self.aligner.align(&reference, &part)
    }

    /// Runs the job and writes the JSON result back under `report_key`.
    pub fn run_and_store(
        &self,
        reference_key: &str,
        part_key: &str,
        report_key: &str,
    ) -> Result<AlignmentResult, AlignmentError> {
        let result = self.run(reference_key, part_key)?;
        let body = serde_json::to_vec_pretty(&result)
            .map_err(|e| AlignmentError::json("serialize alignment result", e))?;
        self.store.store(report_key, &body)?;
        tracing::info!(report_key, "stored alignment report");
        Ok(result)
    }

    fn load_channel(&self, key: &str) -> Result<AudioChannel, AlignmentError> {
        let bytes = self.store.fetch(key)?;
        let samples = self.decoder.decode(&bytes, &self.request)?;
        Ok(AudioChannel::new(
            key,
            self.request.target_sample_rate_hz,
            samples,
        ))
    }
}
