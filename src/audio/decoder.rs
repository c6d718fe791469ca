use crate::error::PlayerError;

/// Everything the engine converts into, fixed for the life of the process:
/// 32-bit float, stereo, 48 kHz. Conversion happens once at load time so the
/// real-time path stays a pure memory copy.
pub const TARGET_SAMPLE_RATE: u32 = 48_000;
pub const TARGET_CHANNELS: usize = 2;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;

/// A fully decoded track in its source format, interleaved f32.
#[derive(Clone, Debug)]
pub struct DecodedTrack {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

/// Decodes a RIFF/WAVE container from raw bytes (as read from a file or a
/// skin bundle entry). The declared `data` chunk length is validated against
/// the bytes actually present; a short payload is `Truncated` rather than a
/// partial decode.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedTrack, PlayerError> {
    if bytes.len() < 12 {
        return Err(PlayerError::Truncated);
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(PlayerError::UnsupportedFormat(
            "not a RIFF/WAVE container".to_string(),
        ));
    }

    let mut format: Option<(u16, u16, u32, u16)> = None;
    let mut data: Option<&[u8]> = None;

    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let chunk_id = &bytes[offset..offset + 4];
        let chunk_len = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        let body = offset + 8;

        match chunk_id {
            b"fmt " => {
                if body + 16 > bytes.len() {
                    return Err(PlayerError::Truncated);
                }
                let tag = u16::from_le_bytes([bytes[body], bytes[body + 1]]);
                let channels = u16::from_le_bytes([bytes[body + 2], bytes[body + 3]]);
                let sample_rate = u32::from_le_bytes([
                    bytes[body + 4],
                    bytes[body + 5],
                    bytes[body + 6],
                    bytes[body + 7],
                ]);
                // byte rate and block align are redundant with the fields above
                let bits = u16::from_le_bytes([bytes[body + 14], bytes[body + 15]]);
                format = Some((tag, channels, sample_rate, bits));
            }
            b"data" => {
                if body + chunk_len > bytes.len() {
                    return Err(PlayerError::Truncated);
                }
                data = Some(&bytes[body..body + chunk_len]);
            }
            _ => {}
        }

        // Chunks are word-aligned; odd lengths carry a pad byte.
        offset = body + chunk_len + (chunk_len & 1);
    }

    let (tag, channels, sample_rate, bits) =
        format.ok_or_else(|| PlayerError::UnsupportedFormat("missing fmt chunk".to_string()))?;
    let data =
        data.ok_or_else(|| PlayerError::UnsupportedFormat("missing data chunk".to_string()))?;

    if channels == 0 || sample_rate == 0 {
        return Err(PlayerError::UnsupportedFormat(format!(
            "degenerate format: {channels} channels at {sample_rate} Hz"
        )));
    }

    let samples = match (tag, bits) {
        (FORMAT_PCM, 8) => bytes_to_f32_u8(data),
        (FORMAT_PCM, 16) => bytes_to_f32_i16(data),
        (FORMAT_PCM, 32) => bytes_to_f32_i32(data),
        (FORMAT_IEEE_FLOAT, 32) => bytes_to_f32_float(data),
        _ => {
            return Err(PlayerError::UnsupportedFormat(format!(
                "format tag {tag} with {bits} bits per sample"
            )))
        }
    };

    Ok(DecodedTrack {
        sample_rate,
        channels,
        samples,
    })
}

fn bytes_to_f32_u8(data: &[u8]) -> Vec<f32> {
    data.iter().map(|&s| (f32::from(s) - 128.0) / 128.0).collect()
}

fn bytes_to_f32_i16(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(2)
        .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) / 32_768.0)
        .collect()
}

fn bytes_to_f32_i32(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2_147_483_648.0)
        .collect()
}

fn bytes_to_f32_float(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Minimal-cost linear interpolation resampler, run once per load. Quality is
/// lower than dedicated sinc-based resamplers; acceptable because it never
/// runs on the real-time path and keeps memory behavior predictable.
pub fn resample_linear(
    interleaved: &[f32],
    in_rate: u32,
    out_rate: u32,
    channels: usize,
) -> Vec<f32> {
    if in_rate == out_rate || channels == 0 || interleaved.is_empty() {
        return interleaved.to_vec();
    }

    let in_frames = interleaved.len() / channels;
    if in_frames < 2 {
        return interleaved.to_vec();
    }

    let ratio = out_rate as f64 / in_rate as f64;
    let out_frames = ((in_frames as f64) * ratio).round() as usize;
    let mut out = vec![0.0_f32; out_frames * channels];

    for out_frame in 0..out_frames {
        let src_pos = (out_frame as f64) / ratio;
        let src_base = src_pos.floor() as usize;
        let src_next = (src_base + 1).min(in_frames - 1);
        let frac = (src_pos - src_base as f64) as f32;

        for ch in 0..channels {
            let a = interleaved[src_base * channels + ch];
            let b = interleaved[src_next * channels + ch];
            out[out_frame * channels + ch] = a + (b - a) * frac;
        }
    }

    out
}

/// Simple channel copy/fold: mono is duplicated to both outputs, surplus
/// source channels are dropped.
pub fn adapt_channels(input: &[f32], in_channels: usize, out_channels: usize) -> Vec<f32> {
    if in_channels == out_channels || in_channels == 0 || out_channels == 0 {
        return input.to_vec();
    }

    let frames = input.len() / in_channels;
    let mut out = vec![0.0_f32; frames * out_channels];
    for frame in 0..frames {
        for ch in 0..out_channels {
            out[frame * out_channels + ch] = input[frame * in_channels + (ch % in_channels)];
        }
    }
    out
}
