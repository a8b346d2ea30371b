use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("sample rate mismatch: reference {reference_hz} Hz, part {part_hz} Hz")]
    RateMismatch { reference_hz: u32, part_hz: u32 },
    #[error("degenerate signal in {channel}: onset curve has zero variance")]
    DegenerateSignal { channel: String },
    #[error("empty input reached {context}")]
    EmptyInput { context: &'static str },
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{context}: {message}")]
    Decode {
        context: &'static str,
        message: String,
    },
    #[error("blob not found: {key}")]
    NotFound { key: String },
    #[error("access denied for blob: {key}")]
    AccessDenied { key: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn decode(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn degenerate(channel: impl Into<String>) -> Self {
        Self::DegenerateSignal {
            channel: channel.into(),
        }
    }

    /// Only storage I/O can succeed on a second attempt; every validation
    /// failure of the core is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
