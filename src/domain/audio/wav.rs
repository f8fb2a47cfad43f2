//! RIFF/WAVE encoder for 16-bit mono PCM
//!
//! Layout (all multi-byte fields little-endian):
//!
//! | Offset | Size | Field         | Value                 |
//! |--------|------|---------------|-----------------------|
//! | 0      | 4    | ChunkID       | "RIFF"                |
//! | 4      | 4    | ChunkSize     | 36 + data size        |
//! | 8      | 4    | Format        | "WAVE"                |
//! | 12     | 4    | Subchunk1ID   | "fmt "                |
//! | 16     | 4    | Subchunk1Size | 16                    |
//! | 20     | 2    | AudioFormat   | 1 (PCM)               |
//! | 22     | 2    | NumChannels   | 1                     |
//! | 24     | 4    | SampleRate    | sample rate           |
//! | 28     | 4    | ByteRate      | sample rate * 2       |
//! | 32     | 2    | BlockAlign    | 2                     |
//! | 34     | 2    | BitsPerSample | 16                    |
//! | 36     | 4    | Subchunk2ID   | "data"                |
//! | 40     | 4    | Subchunk2Size | sample count * 2      |

/// Size of the canonical header
pub const WAV_HEADER_LEN: usize = 44;

/// Bytes per encoded sample (16-bit mono)
pub const BYTES_PER_SAMPLE: usize = 2;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Convert one float sample to signed 16-bit PCM.
///
/// Negative values scale by 0x8000 and the rest by 0x7FFF, so -1.0 maps to
/// `i16::MIN` and 1.0 to `i16::MAX`. The cast truncates toward zero.
pub fn sample_to_pcm16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode mono samples as a 16-bit PCM WAV container.
///
/// An empty sample slice yields a header-only container.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * BYTES_PER_SAMPLE) as u32;
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * BYTES_PER_SAMPLE as u32).to_le_bytes());
    out.extend_from_slice(&(CHANNELS * BITS_PER_SAMPLE / 8).to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for &sample in samples {
        out.extend_from_slice(&sample_to_pcm16(sample).to_le_bytes());
    }

    out
}

/// Format details read back from a WAV container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavInfo {
    /// Walk the RIFF chunks and read the `fmt ` and `data` headers.
    ///
    /// Returns `None` for anything that is not a RIFF/WAVE stream.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return None;
        }

        let mut fmt: Option<(u16, u32, u16)> = None;
        let mut pos = 12;
        while pos + 8 <= bytes.len() {
            let id = &bytes[pos..pos + 4];
            let len = read_u32(bytes, pos + 4)?;
            let body = pos + 8;

            match id {
                b"fmt " => {
                    let channels = read_u16(bytes, body + 2)?;
                    let sample_rate = read_u32(bytes, body + 4)?;
                    let bits = read_u16(bytes, body + 14)?;
                    fmt = Some((channels, sample_rate, bits));
                }
                b"data" => {
                    let (channels, sample_rate, bits_per_sample) = fmt?;
                    return Some(Self {
                        channels,
                        sample_rate,
                        bits_per_sample,
                        data_len: len,
                    });
                }
                _ => {}
            }

            // Chunks are padded to an even length
            pos = body + len as usize + (len as usize & 1);
        }

        None
    }

    /// Number of sample frames in the data chunk
    pub fn sample_count(&self) -> u64 {
        let frame_bytes = u64::from(self.channels) * u64::from(self.bits_per_sample / 8);
        if frame_bytes == 0 {
            return 0;
        }
        u64::from(self.data_len) / frame_bytes
    }

    /// Playback length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.sample_count() * 1000 / u64::from(self.sample_rate)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let raw = bytes.get(at..at + 2)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
