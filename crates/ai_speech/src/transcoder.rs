//! PCM to WAV transcoding
//!
//! Wraps bare PCM samples in the minimal 44-byte RIFF/WAVE header so any
//! generic player can open them. Container payloads pass through untouched.
//! Everything here is pure: no I/O, no state.

use bytes::{BufMut, Bytes, BytesMut};

use crate::types::{AudioEncoding, AudioFormat, AudioPayload, PcmSpec};

/// Size of the canonical WAV header
pub const WAV_HEADER_LEN: usize = 44;

/// `WAVE_FORMAT_PCM`
const FORMAT_TAG_PCM: u16 = 1;

/// Size of the PCM `fmt ` chunk body
const FMT_CHUNK_LEN: u32 = 16;

/// Build the 44-byte little-endian WAV header for `data_len` sample bytes
#[must_use]
pub fn wav_header(spec: PcmSpec, data_len: u32) -> [u8; WAV_HEADER_LEN] {
    let mut header = [0u8; WAV_HEADER_LEN];
    let mut buf = &mut header[..];

    buf.put_slice(b"RIFF");
    buf.put_u32_le(data_len.wrapping_add(36));
    buf.put_slice(b"WAVE");
    buf.put_slice(b"fmt ");
    buf.put_u32_le(FMT_CHUNK_LEN);
    buf.put_u16_le(FORMAT_TAG_PCM);
    buf.put_u16_le(spec.channels);
    buf.put_u32_le(spec.sample_rate_hz);
    buf.put_u32_le(spec.byte_rate());
    buf.put_u16_le(spec.block_align());
    buf.put_u16_le(spec.bits_per_sample);
    buf.put_slice(b"data");
    buf.put_u32_le(data_len);

    header
}

/// Turn a payload into bytes of a self-describing audio file
///
/// The data length written into the header is the payload's byte count,
/// truncated to `u32` for payloads beyond the RIFF size limit.
#[must_use]
pub fn to_playable(payload: &AudioPayload) -> Bytes {
    match payload.encoding() {
        AudioEncoding::OpaqueContainer(_) => payload.bytes().clone(),
        AudioEncoding::RawPcm(spec) => {
            #[allow(clippy::cast_possible_truncation)]
            let data_len = payload.len() as u32;
            let mut out = BytesMut::with_capacity(WAV_HEADER_LEN + payload.len());
            out.put_slice(&wav_header(spec, data_len));
            out.put_slice(payload.bytes());
            out.freeze()
        },
    }
}

/// Container format of what [`to_playable`] returns for this payload
#[must_use]
pub const fn playable_format(payload: &AudioPayload) -> AudioFormat {
    match payload.encoding() {
        AudioEncoding::OpaqueContainer(format) => format,
        AudioEncoding::RawPcm(_) => AudioFormat::Wav,
    }
}
