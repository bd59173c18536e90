//! RIFF/WAVE container encoder for uncompressed linear PCM.
//!
//! ## Layout
//!
//! ```text
//! offset  size  field
//!      0     4  "RIFF"
//!      4     4  total size − 8            (LE u32)
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  16                        (LE u32, fmt block length)
//!     20     2  1                         (LE u16, linear PCM)
//!     22     2  channels                  (LE u16)
//!     24     4  sample rate               (LE u32)
//!     28     4  byte rate                 (LE u32)
//!     32     2  block align               (LE u16)
//!     34     2  bits per sample           (LE u16)
//!     36     4  "data"
//!     40     4  payload length            (LE u32)
//!     44     …  payload
//! ```
//!
//! The encoder does not validate its input. A payload whose length is not a
//! whole number of frames is framed as-is.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use super::{PcmFormat, RawAudioBuffer};
use crate::error::{NarrateError, Result};

/// Size of the fixed RIFF + fmt + data chunk headers.
pub const WAV_HEADER_LEN: usize = 44;

/// MIME type used for data URLs and downloads.
pub const WAV_MIME: &str = "audio/wav";

/// Largest payload the 32-bit `data` length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// A complete, playable WAV byte stream.
///
/// Produced once by [`encode`] and consumed once by whoever plays or saves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioContainer {
    bytes: Vec<u8>,
    format: PcmFormat,
}

impl AudioContainer {
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Header followed by payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The PCM payload after the 44-byte header.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Playback duration of the payload in seconds.
    pub fn duration_secs(&self) -> f64 {
        let align = self.format.block_align() as usize;
        if align == 0 || self.format.sample_rate == 0 {
            return 0.0;
        }
        (self.payload().len() / align) as f64 / self.format.sample_rate as f64
    }

    /// `data:audio/wav;base64,…` suitable for an audio element or download link.
    pub fn to_data_url(&self) -> String {
        format!("data:{WAV_MIME};base64,{}", STANDARD.encode(&self.bytes))
    }

    /// Save the container to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Number of zero bytes that `secs` of trailing silence occupies in `format`.
///
/// Durations shorter than one sample period, negative, or non-finite yield 0.
/// Durations too long for `usize` saturate.
pub fn silence_byte_count(format: PcmFormat, secs: f64) -> usize {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    // `as` saturates for out-of-range floats.
    let frames = (secs * format.sample_rate as f64).floor() as usize;
    frames.saturating_mul(format.block_align() as usize)
}

/// Payload length for `sample_len` input bytes plus `silence` padding bytes.
///
/// Padding is cut back, in whole frames, so the payload never exceeds
/// [`MAX_PAYLOAD_LEN`]. The input bytes themselves are never cut.
pub fn padded_payload_len(format: PcmFormat, sample_len: usize, silence: usize) -> usize {
    let room = MAX_PAYLOAD_LEN.saturating_sub(sample_len);
    let align = (format.block_align() as usize).max(1);
    let padding = if silence > room {
        room - room % align
    } else {
        silence
    };
    sample_len + padding
}

/// Build the 44-byte header for `payload_len` bytes of `format` PCM.
pub fn wav_header(format: PcmFormat, payload_len: usize) -> [u8; WAV_HEADER_LEN] {
    let data_len = u32::try_from(payload_len).unwrap_or(u32::MAX);
    let riff_len = data_len.saturating_add((WAV_HEADER_LEN - 8) as u32);

    let mut header = [0u8; WAV_HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_len.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    header[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());
    header
}

/// Frame `samples` as a WAV container, appending `trailing_silence_secs` of
/// zero-valued samples in the same format.
pub fn encode(samples: &RawAudioBuffer, trailing_silence_secs: f64) -> AudioContainer {
    let format = samples.format;
    if !samples.is_block_aligned() {
        debug!(
            len = samples.len(),
            block_align = format.block_align(),
            "encoding PCM buffer that is not frame aligned"
        );
    }

    let requested = silence_byte_count(format, trailing_silence_secs);
    let payload_len = padded_payload_len(format, samples.len(), requested);
    let silence = payload_len - samples.len();
    if silence < requested {
        debug!(
            requested,
            kept = silence,
            "trailing silence cut to fit the 32-bit data length"
        );
    }

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + payload_len);
    bytes.extend_from_slice(&wav_header(format, payload_len));
    bytes.extend_from_slice(&samples.bytes);
    bytes.resize(WAV_HEADER_LEN + payload_len, 0);

    debug!(
        sample_bytes = samples.len(),
        silence_bytes = silence,
        total = bytes.len(),
        "encoded wav container"
    );

    AudioContainer { bytes, format }
}

/// Decode the base64 PCM text returned by the speech API.
///
/// # Errors
/// Returns `NarrateError::InvalidAudioPayload` when `text` is not valid base64.
pub fn decode_base64_pcm(text: &str, format: PcmFormat) -> Result<RawAudioBuffer> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| NarrateError::InvalidAudioPayload(e.to_string()))?;
    Ok(RawAudioBuffer::new(bytes, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use std::io::Cursor;

    fn le_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn le_u16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap())
    }

    fn ramp(frames: usize) -> RawAudioBuffer {
        let bytes = (0..frames as i16)
            .flat_map(|s| (s * 7).to_le_bytes())
            .collect();
        RawAudioBuffer::new(bytes, PcmFormat::SPEECH_API)
    }

    #[test]
    fn header_carries_fixed_tags() {
        let out = encode(&ramp(10), 0.0);
        let b = out.as_bytes();
        assert_eq!(&b[0..4], b"RIFF");
        assert_eq!(&b[8..12], b"WAVE");
        assert_eq!(&b[12..16], b"fmt ");
        assert_eq!(&b[36..40], b"data");
    }

    #[test]
    fn header_fields_describe_speech_format() {
        let out = encode(&ramp(100), 0.0);
        let b = out.as_bytes();
        assert_eq!(le_u32(b, 4), (b.len() - 8) as u32);
        assert_eq!(le_u32(b, 16), 16);
        assert_eq!(le_u16(b, 20), 1);
        assert_eq!(le_u16(b, 22), 1);
        assert_eq!(le_u32(b, 24), 24_000);
        assert_eq!(le_u32(b, 28), 48_000);
        assert_eq!(le_u16(b, 32), 2);
        assert_eq!(le_u16(b, 34), 16);
        assert_eq!(le_u32(b, 40), 200);
    }

    #[test]
    fn zero_silence_keeps_payload_byte_for_byte() {
        let input = ramp(321);
        let out = encode(&input, 0.0);
        assert_eq!(out.len(), WAV_HEADER_LEN + input.len());
        assert_eq!(out.payload(), input.bytes.as_slice());
    }

    #[test]
    fn half_second_appends_24000_zero_bytes() {
        let input = ramp(50);
        let out = encode(&input, 0.5);
        assert_eq!(out.len(), WAV_HEADER_LEN + input.len() + 24_000);
        assert_eq!(&out.payload()[..input.len()], input.bytes.as_slice());
        assert!(out.payload()[input.len()..].iter().all(|&b| b == 0));
        assert_eq!(le_u32(out.as_bytes(), 40), (input.len() + 24_000) as u32);
    }

    #[test]
    fn sub_sample_silence_appends_nothing() {
        let input = ramp(50);
        assert_eq!(encode(&input, 0.00001).payload(), input.bytes.as_slice());
        assert_eq!(silence_byte_count(PcmFormat::SPEECH_API, 0.00001), 0);
    }

    #[test]
    fn negative_and_nan_silence_append_nothing() {
        let f = PcmFormat::SPEECH_API;
        assert_eq!(silence_byte_count(f, -1.0), 0);
        assert_eq!(silence_byte_count(f, f64::NAN), 0);
        assert_eq!(silence_byte_count(f, f64::INFINITY), 0);
    }

    #[test]
    fn enormous_silence_saturates_instead_of_wrapping() {
        let f = PcmFormat::SPEECH_API;
        assert_eq!(silence_byte_count(f, 1e20), usize::MAX);
        assert_eq!(silence_byte_count(f, f64::MAX), usize::MAX);
    }

    #[test]
    fn padding_never_cuts_into_samples() {
        let f = PcmFormat::SPEECH_API;
        let requested = silence_byte_count(f, 1e20);

        let len = padded_payload_len(f, 100, requested);
        assert!(len >= 100);
        assert!(len <= MAX_PAYLOAD_LEN);
        assert_eq!((len - 100) % 2, 0);

        // Input already past the 32-bit limit: keep all of it, add nothing.
        let big = MAX_PAYLOAD_LEN.saturating_add(10);
        assert_eq!(padded_payload_len(f, big, requested), big);

        // Ordinary requests pass through untouched.
        assert_eq!(padded_payload_len(f, 100, 24_000), 24_100);
    }

    #[test]
    fn silence_scales_with_channels_and_depth() {
        let stereo_24 = PcmFormat::new(48_000, 2, 24);
        assert_eq!(silence_byte_count(stereo_24, 0.25), 12_000 * 6);
        assert_eq!(silence_byte_count(PcmFormat::new(8_000, 1, 8), 1.0), 8_000);
    }

    #[test]
    fn misaligned_buffer_is_framed_as_is() {
        let input = RawAudioBuffer::new(vec![9, 8, 7], PcmFormat::SPEECH_API);
        let out = encode(&input, 0.0);
        assert_eq!(out.len(), WAV_HEADER_LEN + 3);
        assert_eq!(out.payload(), &[9, 8, 7]);
    }

    #[test]
    fn standard_reader_decodes_output() {
        let input = ramp(2_400);
        let out = encode(&input, 0.1);
        let reader = hound::WavReader::new(Cursor::new(out.as_bytes().to_vec()))
            .expect("hound should parse container");
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.duration(), 2_400 + 2_400);

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<_, _>>()
            .expect("read samples");
        assert_eq!(samples[3], 21);
        assert_eq!(samples[2_399], 2_399 * 7);
        assert!(samples[2_400..].iter().all(|&s| s == 0));
    }

    #[test]
    fn standard_reader_decodes_stereo_output() {
        let format = PcmFormat::new(16_000, 2, 16);
        let input = RawAudioBuffer::silence(160, format);
        let out = encode(&input, 0.01);
        let reader = hound::WavReader::new(Cursor::new(out.into_bytes())).expect("parse stereo");
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), 320);
    }

    #[test]
    fn data_url_has_wav_mime_and_base64_body() {
        let out = encode(&ramp(4), 0.0);
        let url = out.to_data_url();
        let body = url
            .strip_prefix("data:audio/wav;base64,")
            .expect("data url prefix");
        assert_eq!(STANDARD.decode(body).unwrap(), out.as_bytes());
    }

    #[test]
    fn base64_pcm_decodes_to_raw_buffer() {
        let raw = STANDARD.encode([1u8, 0, 2, 0]);
        let buf = decode_base64_pcm(&format!(" {raw}\n"), PcmFormat::SPEECH_API).unwrap();
        assert_eq!(buf.bytes, vec![1, 0, 2, 0]);
        assert_eq!(buf.frame_count(), 2);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = decode_base64_pcm("not*base64", PcmFormat::SPEECH_API).unwrap_err();
        assert!(matches!(err, NarrateError::InvalidAudioPayload(_)));
    }
}
