//! Types for speech processing
//!
//! Audio containers, the raw PCM sample layout, and the payload that travels
//! from a synthesizer to the player.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Self-describing audio containers a player can open directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format
    Mp3,
    /// WAV format (uncompressed)
    Wav,
    /// Opus codec
    Opus,
    /// OGG container
    Ogg,
    /// FLAC format (lossless)
    Flac,
    /// M4A/AAC format
    M4a,
}

impl AudioFormat {
    /// Get the MIME type for this audio format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Opus => "audio/opus",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::M4a => "audio/m4a",
        }
    }

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Opus => "opus",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            Self::M4a => "m4a",
        }
    }

    /// Parse audio format from a `Content-Type` value
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        // "audio/ogg; codecs=opus" and friends
        let base_mime = mime.split(';').next().unwrap_or(mime).trim();

        match base_mime {
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/opus" => Some(Self::Opus),
            "audio/ogg" => {
                if mime.contains("codecs=opus") {
                    Some(Self::Opus)
                } else {
                    Some(Self::Ogg)
                }
            },
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            "audio/m4a" | "audio/mp4" | "audio/aac" | "audio/x-m4a" => Some(Self::M4a),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Layout of headerless PCM samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcmSpec {
    /// Samples per second per channel
    pub sample_rate_hz: u32,
    /// Interleaved channel count
    pub channels: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl PcmSpec {
    /// Signed 16-bit mono at 24 kHz, as returned by Gemini speech generation
    pub const MONO_16BIT_24KHZ: Self = Self::new(24_000, 1, 16);

    /// Highest sample rate accepted by [`validate`](Self::validate)
    pub const MAX_SAMPLE_RATE_HZ: u32 = 768_000;

    pub const fn new(sample_rate_hz: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate_hz,
            channels,
            bits_per_sample,
        }
    }

    /// Create a spec that passes [`validate`](Self::validate)
    pub fn try_new(sample_rate_hz: u32, channels: u16, bits_per_sample: u16) -> Result<Self, String> {
        let spec = Self::new(sample_rate_hz, channels, bits_per_sample);
        spec.validate()?;
        Ok(spec)
    }

    /// Check that the layout can be described by a WAV header
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 || self.sample_rate_hz > Self::MAX_SAMPLE_RATE_HZ {
            return Err(format!(
                "sample rate {} Hz outside 1..={} Hz",
                self.sample_rate_hz,
                Self::MAX_SAMPLE_RATE_HZ
            ));
        }
        if self.channels == 0 {
            return Err("channel count must be at least 1".to_string());
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(format!(
                "bits per sample must be a non-zero multiple of 8, got {}",
                self.bits_per_sample
            ));
        }
        if self.checked_byte_rate().is_none() {
            return Err(format!(
                "{} channels of {} bit samples overflow the WAV header",
                self.channels, self.bits_per_sample
            ));
        }
        Ok(())
    }

    /// Bytes per sample frame, `None` if it does not fit a `u16`
    pub const fn checked_block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample / 8)
    }

    /// Bytes per second, `None` if it does not fit a `u32`
    pub const fn checked_byte_rate(&self) -> Option<u32> {
        match self.checked_block_align() {
            Some(align) => self.sample_rate_hz.checked_mul(align as u32),
            None => None,
        }
    }

    /// Bytes per sample frame (all channels), saturating for invalid specs
    pub const fn block_align(&self) -> u16 {
        match self.checked_block_align() {
            Some(align) => align,
            None => u16::MAX,
        }
    }

    /// Bytes per second, saturating for invalid specs
    pub const fn byte_rate(&self) -> u32 {
        match self.checked_byte_rate() {
            Some(rate) => rate,
            None => u32::MAX,
        }
    }
}

/// How the bytes of an [`AudioPayload`] are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEncoding {
    /// Already muxed into a playable container
    OpaqueContainer(AudioFormat),
    /// Bare samples that need a container before playback
    RawPcm(PcmSpec),
}

/// Audio bytes produced by a synthesizer, alive for one playback request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    bytes: Bytes,
    encoding: AudioEncoding,
}

impl AudioPayload {
    /// Create a payload
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, encoding: AudioEncoding) -> Self {
        Self {
            bytes: bytes.into(),
            encoding,
        }
    }

    /// Payload already in a playable container
    #[must_use]
    pub fn container(bytes: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self::new(bytes, AudioEncoding::OpaqueContainer(format))
    }

    /// Payload of raw PCM samples
    #[must_use]
    pub fn raw_pcm(bytes: impl Into<Bytes>, spec: PcmSpec) -> Self {
        Self::new(bytes, AudioEncoding::RawPcm(spec))
    }

    /// Get the raw bytes
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[must_use]
    pub const fn encoding(&self) -> AudioEncoding {
        self.encoding
    }

    /// Size of the payload in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod audio_format {
        use super::*;

        #[test]
        fn mime_types_are_correct() {
            assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
            assert_eq!(AudioFormat::Wav.mime_type(), "audio/wav");
            assert_eq!(AudioFormat::Opus.mime_type(), "audio/opus");
            assert_eq!(AudioFormat::Ogg.mime_type(), "audio/ogg");
            assert_eq!(AudioFormat::Flac.mime_type(), "audio/flac");
            assert_eq!(AudioFormat::M4a.mime_type(), "audio/m4a");
        }

        #[test]
        fn display_uses_extension() {
            assert_eq!(AudioFormat::Mp3.to_string(), "mp3");
            assert_eq!(AudioFormat::Wav.to_string(), "wav");
        }

        #[test]
        fn from_mime_type_simple() {
            assert_eq!(AudioFormat::from_mime_type("audio/mpeg"), Some(AudioFormat::Mp3));
            assert_eq!(AudioFormat::from_mime_type("audio/x-wav"), Some(AudioFormat::Wav));
            assert_eq!(AudioFormat::from_mime_type("audio/aac"), Some(AudioFormat::M4a));
            assert_eq!(AudioFormat::from_mime_type("audio/ogg"), Some(AudioFormat::Ogg));
        }

        #[test]
        fn from_mime_type_with_parameters() {
            assert_eq!(
                AudioFormat::from_mime_type("audio/ogg; codecs=opus"),
                Some(AudioFormat::Opus)
            );
            assert_eq!(
                AudioFormat::from_mime_type("audio/mpeg; charset=binary"),
                Some(AudioFormat::Mp3)
            );
        }

        #[test]
        fn from_mime_type_unknown() {
            assert_eq!(AudioFormat::from_mime_type("audio/L16;rate=24000"), None);
            assert_eq!(AudioFormat::from_mime_type("application/json"), None);
        }
    }

    mod pcm_spec {
        use super::*;

        #[test]
        fn derived_rates() {
            let spec = PcmSpec::MONO_16BIT_24KHZ;
            assert_eq!(spec.block_align(), 2);
            assert_eq!(spec.byte_rate(), 48_000);

            let stereo = PcmSpec::new(44_100, 2, 16);
            assert_eq!(stereo.block_align(), 4);
            assert_eq!(stereo.byte_rate(), 176_400);
        }

        #[test]
        fn validate_accepts_common_layouts() {
            assert!(PcmSpec::MONO_16BIT_24KHZ.validate().is_ok());
            assert!(PcmSpec::try_new(48_000, 2, 24).is_ok());
            assert!(PcmSpec::try_new(PcmSpec::MAX_SAMPLE_RATE_HZ, 8, 32).is_ok());
        }

        #[test]
        fn validate_rejects_unusable_layouts() {
            assert!(PcmSpec::try_new(0, 1, 16).is_err());
            assert!(PcmSpec::try_new(4_000_000_000, 1, 16).is_err());
            assert!(PcmSpec::try_new(24_000, 0, 16).is_err());
            assert!(PcmSpec::try_new(24_000, 1, 0).is_err());
            assert!(PcmSpec::try_new(24_000, 1, 12).is_err());
            assert!(PcmSpec::try_new(24_000, u16::MAX, u16::MAX - 7).is_err());
        }

        #[test]
        fn derived_fields_never_overflow() {
            let huge = PcmSpec::new(u32::MAX, u16::MAX, u16::MAX);
            assert_eq!(huge.checked_block_align(), None);
            assert_eq!(huge.block_align(), u16::MAX);
            assert_eq!(huge.byte_rate(), u32::MAX);

            let fast = PcmSpec::new(4_000_000_000, 1, 16);
            assert_eq!(fast.checked_block_align(), Some(2));
            assert_eq!(fast.checked_byte_rate(), None);
        }
    }

    mod audio_payload {
        use super::*;

        #[test]
        fn container_payload() {
            let payload = AudioPayload::container(vec![1, 2, 3], AudioFormat::Mp3);
            assert_eq!(
                payload.encoding(),
                AudioEncoding::OpaqueContainer(AudioFormat::Mp3)
            );
            assert_eq!(payload.len(), 3);
            assert!(!payload.is_empty());
        }

        #[test]
        fn raw_pcm_payload() {
            let payload = AudioPayload::raw_pcm(Vec::new(), PcmSpec::MONO_16BIT_24KHZ);
            assert!(payload.is_empty());
            assert_eq!(
                payload.encoding(),
                AudioEncoding::RawPcm(PcmSpec::MONO_16BIT_24KHZ)
            );
        }
    }
}
