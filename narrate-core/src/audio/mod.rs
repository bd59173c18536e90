//! Raw PCM buffers and the WAV container they are packaged into.
//!
//! The speech backend hands back headerless interleaved PCM. [`wav::encode`]
//! frames it into a RIFF/WAVE byte stream that any standard player accepts.

pub mod wav;

pub use wav::{encode, AudioContainer, WAV_HEADER_LEN};

use serde::{Deserialize, Serialize};

/// Sample layout of a raw PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PcmFormat {
    /// Samples per second per channel (Hz).
    pub sample_rate: u32,
    /// Interleaved channel count (≥ 1).
    pub channels: u16,
    /// Bits per sample; always a multiple of 8.
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// 24 kHz mono signed 16-bit little-endian — what the speech API emits.
    pub const SPEECH_API: PcmFormat = PcmFormat {
        sample_rate: 24_000,
        channels: 1,
        bits_per_sample: 16,
    };

    pub const fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    pub const fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per interleaved frame (one sample for every channel).
    pub const fn block_align(&self) -> u16 {
        self.channels * self.bytes_per_sample()
    }

    pub const fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::SPEECH_API
    }
}

/// Interleaved PCM bytes at a known format.
///
/// Length is expected to be a multiple of [`PcmFormat::block_align`] but this
/// is not enforced; the encoder frames whatever it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAudioBuffer {
    pub bytes: Vec<u8>,
    pub format: PcmFormat,
}

impl RawAudioBuffer {
    pub fn new(bytes: Vec<u8>, format: PcmFormat) -> Self {
        Self { bytes, format }
    }

    /// Buffer holding `frames` frames of digital silence.
    pub fn silence(frames: usize, format: PcmFormat) -> Self {
        Self::new(vec![0u8; frames * format.block_align() as usize], format)
    }

    /// Number of complete frames in the buffer.
    pub fn frame_count(&self) -> usize {
        match self.format.block_align() as usize {
            0 => 0,
            align => self.bytes.len() / align,
        }
    }

    /// Returns the duration of this buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.format.sample_rate as f64
    }

    /// Whether the byte length is a whole number of frames.
    pub fn is_block_aligned(&self) -> bool {
        match self.format.block_align() as usize {
            0 => self.bytes.is_empty(),
            align => self.bytes.len() % align == 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
