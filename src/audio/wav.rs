// WAV decoding - container to mono f32 PCM
//
// Integer samples are scaled by the positive full-scale value of their bit
// depth, float samples are taken as-is. Interleaved channels are averaged
// into one.

use std::io::{Cursor, Read};
use std::path::Path;

use super::PcmBuffer;
use crate::error::InputError;

/// Decode a WAV file into a mono PcmBuffer at the file's own sample rate
pub fn load_wav(path: &Path) -> Result<PcmBuffer, InputError> {
    let reader = hound::WavReader::open(path).map_err(|err| match err {
        hound::Error::IoError(io) => InputError::Decode {
            reason: format!("failed to open {}: {io}", path.display()),
        },
        other => InputError::from(other),
    })?;
    decode(reader)
}

/// Decode an in-memory WAV file
pub fn decode_wav(bytes: &[u8]) -> Result<PcmBuffer, InputError> {
    decode(hound::WavReader::new(Cursor::new(bytes))?)
}

fn decode<R: Read>(mut reader: hound::WavReader<R>) -> Result<PcmBuffer, InputError> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(InputError::UnsupportedFormat {
            reason: "zero channels".to_string(),
        });
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            let max = ((1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) - 1).max(1) as f32;
            match spec.bits_per_sample {
                8 | 16 => reader
                    .samples::<i16>()
                    .map(|sample| sample.map(|v| v as f32 / max))
                    .collect::<Result<Vec<f32>, _>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f32 / max))
                    .collect::<Result<Vec<f32>, _>>()?,
                bits => {
                    return Err(InputError::UnsupportedFormat {
                        reason: format!("unsupported bits_per_sample={}", bits),
                    })
                }
            }
        }
    };

    log::debug!(
        "[Audio] Decoded {} frames, {} ch, {} Hz, {} bit",
        samples.len() / spec.channels as usize,
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample
    );

    Ok(PcmBuffer::new(
        downmix(&samples, spec.channels as usize),
        spec.sample_rate,
    ))
}

/// Average interleaved channels into mono
fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
