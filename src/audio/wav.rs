// WAV encoding, header inspection and best-effort conversion to WAV
//
// Encoding writes the canonical 44-byte header directly; decoding of non-WAV
// containers goes through symphonia. Conversion never fails: if the input cannot be decoded the
// original clip is handed back untouched.

use anyhow::{bail, Context, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

use super::chunk::EncodedAudio;
use super::format::AudioFormat;

/// Size of the canonical RIFF/WAVE header for PCM data
pub const WAV_HEADER_LEN: usize = 44;

/// Decoded, interleaved PCM audio
#[derive(Debug, Clone)]
pub struct DecodedPcm {
    /// Interleaved samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Fields of a parsed WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Size of the `data` chunk in bytes
    pub data_size: u32,
    /// Offset of the first sample byte
    pub data_offset: usize,
}

impl WavHeader {
    /// Parse a RIFF/WAVE header, walking chunks until `data` is found
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            bail!("Not a RIFF/WAVE stream");
        }

        let mut fmt: Option<(u16, u16, u32, u32, u16, u16)> = None;
        let mut offset = 12;

        while offset + 8 <= bytes.len() {
            let id = &bytes[offset..offset + 4];
            let size = read_u32(bytes, offset + 4)? as usize;
            let body = offset + 8;

            match id {
                b"fmt " => {
                    if size < 16 || body + 16 > bytes.len() {
                        bail!("Truncated fmt chunk");
                    }
                    fmt = Some((
                        read_u16(bytes, body)?,
                        read_u16(bytes, body + 2)?,
                        read_u32(bytes, body + 4)?,
                        read_u32(bytes, body + 8)?,
                        read_u16(bytes, body + 12)?,
                        read_u16(bytes, body + 14)?,
                    ));
                }
                b"data" => {
                    let (audio_format, num_channels, sample_rate, byte_rate, block_align, bits_per_sample) =
                        fmt.context("data chunk appears before fmt chunk")?;
                    return Ok(Self {
                        audio_format,
                        num_channels,
                        sample_rate,
                        byte_rate,
                        block_align,
                        bits_per_sample,
                        data_size: size as u32,
                        data_offset: body,
                    });
                }
                _ => {}
            }

            // Chunks are word aligned
            offset = body + size + (size & 1);
        }

        bail!("WAV stream has no data chunk")
    }

    /// Duration of the data chunk in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.byte_rate == 0 {
            return 0;
        }
        self.data_size as u64 * 1000 / self.byte_rate as u64
    }
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16> {
    let raw = bytes.get(at..at + 2).context("Unexpected end of WAV header")?;
    Ok(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    let raw = bytes.get(at..at + 4).context("Unexpected end of WAV header")?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Encode interleaved 16-bit samples as a canonical PCM WAV file
///
/// The header is always the 44-byte `fmt `/`data` layout with
/// `AudioFormat=1`, whatever the channel count. hound switches to
/// WAVE_FORMAT_EXTENSIBLE above two channels, so the header is written here.
pub fn encode_pcm_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    if channels == 0 || sample_rate == 0 {
        bail!("Invalid WAV layout: {} Hz, {} channels", sample_rate, channels);
    }

    let data_size = u32::try_from(samples.len() * 2).context("Audio too long for a WAV file")?;
    let block_align = channels
        .checked_mul(2)
        .context("Too many channels for a 16-bit WAV file")?;
    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .context("Sample rate too high for a 16-bit WAV file")?;

    let mut buffer = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);
    buffer.extend_from_slice(b"RIFF");
    buffer.extend_from_slice(&(36 + data_size).to_le_bytes());
    buffer.extend_from_slice(b"WAVE");

    buffer.extend_from_slice(b"fmt ");
    buffer.extend_from_slice(&16u32.to_le_bytes());
    buffer.extend_from_slice(&1u16.to_le_bytes());
    buffer.extend_from_slice(&channels.to_le_bytes());
    buffer.extend_from_slice(&sample_rate.to_le_bytes());
    buffer.extend_from_slice(&byte_rate.to_le_bytes());
    buffer.extend_from_slice(&block_align.to_le_bytes());
    buffer.extend_from_slice(&16u16.to_le_bytes());

    buffer.extend_from_slice(b"data");
    buffer.extend_from_slice(&data_size.to_le_bytes());
    for sample in samples {
        buffer.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(buffer)
}

/// Encode interleaved float samples, clamping to the signed 16-bit range
pub fn encode_float_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let pcm: Vec<i16> = samples.iter().map(|&s| float_to_i16(s)).collect();
    encode_pcm_wav(&pcm, sample_rate, channels)
}

/// Scale a float sample to i16, clamping to [-32768, 32767]
pub fn float_to_i16(sample: f32) -> i16 {
    let scaled = if sample < 0.0 {
        sample * 32768.0
    } else {
        sample * 32767.0
    };
    scaled.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Decode any container symphonia understands into interleaved PCM
pub fn decode_to_pcm(bytes: &[u8], format: AudioFormat) -> Result<DecodedPcm> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = format.extension() {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Unrecognized audio container")?;
    let mut reader = probed.format;

    let track = reader.default_track().context("No audio track found")?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .context("Unsupported audio codec")?;

    let mut samples = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e).context("Failed to read audio packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping corrupt audio packet: {}", e);
                continue;
            }
            Err(e) => return Err(e).context("Failed to decode audio packet"),
        };

        let spec = *decoded.spec();
        if decoded.frames() == 0 {
            continue;
        }
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    if samples.is_empty() || sample_rate == 0 || channels == 0 {
        bail!("No audio samples decoded");
    }

    Ok(DecodedPcm {
        samples,
        sample_rate,
        channels,
    })
}

/// Re-encode a clip as 16-bit PCM WAV.
///
/// Clips that are already WAV are returned as-is. Any decode or encode
/// failure also returns the original clip.
pub fn convert_to_wav(audio: EncodedAudio) -> EncodedAudio {
    if audio.format.is_wav() {
        return audio;
    }

    let converted = decode_to_pcm(&audio.bytes, audio.format)
        .and_then(|pcm| encode_float_wav(&pcm.samples, pcm.sample_rate, pcm.channels));

    match converted {
        Ok(bytes) => {
            info!(
                "Converted {} clip to WAV ({} -> {} bytes)",
                audio.format,
                audio.bytes.len(),
                bytes.len()
            );
            EncodedAudio::new(bytes, AudioFormat::Wav)
        }
        Err(e) => {
            warn!("WAV conversion failed, sending {} as recorded: {:#}", audio.format, e);
            audio
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_clamping() {
        assert_eq!(float_to_i16(0.0), 0);
        assert_eq!(float_to_i16(1.0), i16::MAX);
        assert_eq!(float_to_i16(-1.0), i16::MIN);
        assert_eq!(float_to_i16(3.5), i16::MAX);
        assert_eq!(float_to_i16(-7.0), i16::MIN);
    }

    #[test]
    fn test_header_is_canonical() {
        let bytes = encode_pcm_wav(&[1, -1, 2, -2], 16000, 1).unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_LEN + 8);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..16], b"WAVEfmt ");

        let header = WavHeader::parse(&bytes).unwrap();
        assert_eq!(header.audio_format, 1);
        assert_eq!(header.data_offset, WAV_HEADER_LEN);
        assert_eq!(header.block_align, 2);
        assert_eq!(header.byte_rate, 32000);
    }

    #[test]
    fn test_samples_little_endian() {
        let bytes = encode_pcm_wav(&[0x0102, -2], 8000, 1).unwrap();
        assert_eq!(&bytes[WAV_HEADER_LEN..WAV_HEADER_LEN + 2], &[0x02, 0x01]);
        assert_eq!(&bytes[WAV_HEADER_LEN + 2..], &(-2i16).to_le_bytes());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(WavHeader::parse(b"not a wav file at all").is_err());
        assert!(WavHeader::parse(&[]).is_err());
    }

    #[test]
    fn test_multichannel_header_stays_canonical() {
        for channels in [3u16, 6] {
            let bytes = encode_float_wav(&vec![0.1; 160 * channels as usize], 16000, channels).unwrap();
            let header = WavHeader::parse(&bytes).unwrap();

            assert_eq!(header.audio_format, 1);
            assert_eq!(header.num_channels, channels);
            assert_eq!(header.data_offset, WAV_HEADER_LEN);
            assert_eq!(header.data_size, 160 * channels as u32 * 2);
            assert_eq!(header.block_align, channels * 2);
            assert_eq!(bytes.len(), WAV_HEADER_LEN + header.data_size as usize);
        }
    }

    #[test]
    fn test_rejects_empty_layout() {
        assert!(encode_pcm_wav(&[0, 0], 16000, 0).is_err());
    }

    #[test]
    fn test_duration() {
        let bytes = encode_pcm_wav(&vec![0i16; 16000], 16000, 1).unwrap();
        assert_eq!(WavHeader::parse(&bytes).unwrap().duration_ms(), 1000);
    }
}
