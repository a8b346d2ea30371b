pub mod blob_store;
pub mod decoder;
pub mod job;

pub use blob_store::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use decoder::{AudioDecoder, AudioFormat, DecodeRequest, Decoder};
pub use job::AlignmentJob;
