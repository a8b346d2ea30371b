use std::io::Cursor;

use claxon::FlacReader;

use crate::config::AlignerConfig;
use crate::error::AlignmentError;

/// Target format and analysis window for one decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeRequest {
    pub target_sample_rate_hz: u32,
    /// Seconds skipped from the start of the recording.
    pub offset_seconds: f64,
    /// Seconds kept after the offset; `None` keeps the remainder.
    pub duration_seconds: Option<f64>,
}

impl DecodeRequest {
    pub fn from_config(config: &AlignerConfig) -> Self {
        Self {
            target_sample_rate_hz: config.sample_rate_hz,
            offset_seconds: config.offset_seconds,
            duration_seconds: config.duration_seconds,
        }
    }
}

impl Default for DecodeRequest {
    fn default() -> Self {
        Self::from_config(&AlignerConfig::default())
    }
}

/// Turns container bytes into mono PCM at the requested rate.
pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: &[u8], request: &DecodeRequest) -> Result<Vec<f32>, AlignmentError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Flac,
    Wav,
}

impl AudioFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"fLaC") {
            return Some(Self::Flac);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
            return Some(Self::Wav);
        }
        None
    }
}

/// FLAC and WAV decoder. Multi-channel audio is averaged to mono; a source
/// rate other than the target is rejected because resampling happens
/// upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioDecoder;

impl Decoder for AudioDecoder {
    fn decode(&self, bytes: &[u8], request: &DecodeRequest) -> Result<Vec<f32>, AlignmentError> {
        let format = AudioFormat::sniff(bytes).ok_or_else(|| {
            AlignmentError::decode("detect audio format", "expected FLAC or WAV data")
        })?;
        let (sample_rate_hz, mono) = match format {
            AudioFormat::Flac => decode_flac(bytes)?,
            AudioFormat::Wav => decode_wav(bytes)?,
        };

        if sample_rate_hz != request.target_sample_rate_hz {
            return Err(AlignmentError::decode(
                "check sample rate",
                format!(
                    "source is {sample_rate_hz} Hz but {} Hz was requested; resample before aligning",
                    request.target_sample_rate_hz
                ),
            ));
        }

        let total = mono.len();
        let windowed = apply_window(mono, sample_rate_hz, request);
        tracing::debug!(
            ?format,
            sample_rate_hz,
            decoded_samples = total,
            window_samples = windowed.len(),
            "decoded audio"
        );
        if windowed.is_empty() {
            tracing::warn!(
                offset_seconds = request.offset_seconds,
                decoded_seconds = total as f64 / sample_rate_hz as f64,
                "decode window starts past the end of the recording"
            );
        }
        Ok(windowed)
    }
}

fn apply_window(mut samples: Vec<f32>, sample_rate_hz: u32, request: &DecodeRequest) -> Vec<f32> {
    let rate = sample_rate_hz as f64;
    let start = ((request.offset_seconds.max(0.0) * rate).round() as usize).min(samples.len());
    let end = match request.duration_seconds {
        Some(duration) => start
            .saturating_add((duration.max(0.0) * rate).round() as usize)
            .min(samples.len()),
        None => samples.len(),
    };
    samples.truncate(end);
    samples.drain(..start);
    samples
}

fn int_scale(bits_per_sample: u32) -> f32 {
    if bits_per_sample > 1 {
        ((1_i64 << (bits_per_sample - 1)) - 1) as f32
    } else {
        1.0
    }
}

/// Averages interleaved frames into one channel.
fn downmix<I>(samples: I, channels: usize) -> Result<Vec<f32>, AlignmentError>
where
    I: Iterator<Item = Result<f32, AlignmentError>>,
{
    if channels == 0 {
        return Err(AlignmentError::decode("read audio header", "zero channels"));
    }
    let mut mono = Vec::new();
    let mut frame_sum = 0.0f32;
    let mut in_frame = 0usize;
    for sample in samples {
        frame_sum += sample?;
        in_frame += 1;
        if in_frame == channels {
            mono.push(frame_sum / channels as f32);
            frame_sum = 0.0;
            in_frame = 0;
        }
    }
    Ok(mono)
}

fn decode_flac(bytes: &[u8]) -> Result<(u32, Vec<f32>), AlignmentError> {
    let mut reader = FlacReader::new(Cursor::new(bytes))
        .map_err(|e| AlignmentError::decode("open FLAC stream", e))?;
    let streaminfo = reader.streaminfo();
    let channels = streaminfo.channels as usize;
    let scale = int_scale(streaminfo.bits_per_sample);
    let samples = reader.samples().map(|s| {
        s.map(|v| v as f32 / scale)
            .map_err(|e| AlignmentError::decode("read FLAC samples", e))
    });
    let mono = downmix(samples, channels)?;
    Ok((streaminfo.sample_rate, mono))
}

fn decode_wav(bytes: &[u8]) -> Result<(u32, Vec<f32>), AlignmentError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| AlignmentError::decode("open WAV stream", e))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let mono = match spec.sample_format {
        hound::SampleFormat::Float => downmix(
            reader
                .samples::<f32>()
                .map(|s| s.map_err(|e| AlignmentError::decode("read WAV samples", e))),
            channels,
        )?,
        hound::SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample as u32);
            downmix(
                reader.samples::<i32>().map(|s| {
                    s.map(|v| v as f32 / scale)
                        .map_err(|e| AlignmentError::decode("read WAV samples", e))
                }),
                channels,
            )?
        }
    };
    Ok((spec.sample_rate, mono))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(sample_rate: u32, channels: u16, frames: &[Vec<i16>]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
            for frame in frames {
                for &s in frame {
                    writer.write_sample(s).expect("write sample");
                }
            }
            writer.finalize().expect("finalize wav");
        }
        cursor.into_inner()
    }

    fn full_request(rate: u32) -> DecodeRequest {
        DecodeRequest {
            target_sample_rate_hz: rate,
            offset_seconds: 0.0,
            duration_seconds: None,
        }
    }

    #[test]
    fn sniff_detects_containers() {
        assert_eq!(AudioFormat::sniff(b"fLaC\0\0\0"), Some(AudioFormat::Flac));
        assert_eq!(
            AudioFormat::sniff(b"RIFF\x24\0\0\0WAVEfmt "),
            Some(AudioFormat::Wav)
        );
        assert_eq!(AudioFormat::sniff(b"ID3\x04"), None);
        assert_eq!(AudioFormat::sniff(b""), None);
    }

    #[test]
    fn unknown_bytes_fail_to_decode() {
        let err = AudioDecoder
            .decode(b"not audio at all", &DecodeRequest::default())
            .unwrap_err();
        assert!(matches!(err, AlignmentError::Decode { .. }));
    }

    #[test]
    fn stereo_wav_is_averaged_to_mono() {
        let bytes = wav_bytes(8_000, 2, &[vec![16_383, -16_383], vec![32_767, 32_767]]);
        let mono = AudioDecoder.decode(&bytes, &full_request(8_000)).unwrap();
        assert_eq!(mono.len(), 2);
        assert!(mono[0].abs() < 1e-6);
        assert!((mono[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wav_rate_mismatch_is_reported() {
        let bytes = wav_bytes(48_000, 1, &[vec![0], vec![1]]);
        let err = AudioDecoder.decode(&bytes, &full_request(44_100)).unwrap_err();
        match err {
            AlignmentError::Decode { message, .. } => {
                assert!(message.contains("48000"));
                assert!(message.contains("44100"));
            }
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn window_skips_offset_and_keeps_duration() {
        let frames: Vec<Vec<i16>> = (0..100).map(|i| vec![i as i16 * 100]).collect();
        let bytes = wav_bytes(10, 1, &frames);
        let request = DecodeRequest {
            target_sample_rate_hz: 10,
            offset_seconds: 5.0,
            duration_seconds: Some(2.0),
        };
        let mono = AudioDecoder.decode(&bytes, &request).unwrap();
        assert_eq!(mono.len(), 20);
        assert!((mono[0] - 5_000.0 / 32_767.0).abs() < 1e-6);
    }

    #[test]
    fn window_past_end_is_empty() {
        let bytes = wav_bytes(10, 1, &[vec![1], vec![2], vec![3]]);
        let request = DecodeRequest {
            target_sample_rate_hz: 10,
            offset_seconds: 5.0,
            duration_seconds: Some(20.0),
        };
        let mono = AudioDecoder.decode(&bytes, &request).unwrap();
        assert!(mono.is_empty());
    }

    #[test]
    fn downmix_drops_trailing_partial_frame() {
        let samples: Vec<Result<f32, AlignmentError>> = vec![Ok(1.0), Ok(3.0), Ok(5.0)];
        assert_eq!(downmix(samples.into_iter(), 2).unwrap(), vec![2.0]);
    }

    #[test]
    fn default_request_uses_reference_window() {
        let request = DecodeRequest::default();
        assert_eq!(request.target_sample_rate_hz, 44_100);
        assert_eq!(request.offset_seconds, 5.0);
        assert_eq!(request.duration_seconds, Some(20.0));
    }
}
