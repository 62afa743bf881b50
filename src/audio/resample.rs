// Resample module - sample rate conversion to the analysis rate
//
// Windowed-sinc interpolation through rubato. The sinc filter cuts off just
// below the lower of the two Nyquist frequencies, so downsampling attenuates
// content the target rate cannot represent instead of folding it back into
// the analysed band.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::InputError;

/// Input frames handed to the resampler per call
const CHUNK_SIZE: usize = 1024;

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

fn resample_error(err: impl std::fmt::Display) -> InputError {
    InputError::Resample {
        reason: err.to_string(),
    }
}

/// Resample mono audio from `source_rate` to `target_rate`
///
/// Output length is `round(len * target / source)` and the filter delay is
/// removed, so output sample `i` lines up with input time `i / target_rate`.
/// Same-rate or empty input is returned as a copy.
///
/// # Errors
/// `InputError::Resample` if either rate is zero or rubato rejects the ratio.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>, InputError> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(InputError::Resample {
            reason: format!("cannot convert {} Hz to {} Hz", source_rate, target_rate),
        });
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_SIZE, 1)
        .map_err(resample_error)?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).round() as usize;

    // Zero padding past the end of the input flushes the filter tail
    let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut chunk = vec![0.0f32; CHUNK_SIZE];
    let mut pos = 0;
    while output.len() < expected + delay {
        chunk.fill(0.0);
        if pos < samples.len() {
            let end = (pos + CHUNK_SIZE).min(samples.len());
            chunk[..end - pos].copy_from_slice(&samples[pos..end]);
        }

        let processed = resampler
            .process(std::slice::from_ref(&chunk), None)
            .map_err(resample_error)?;
        match processed.first() {
            Some(channel) if !channel.is_empty() => output.extend_from_slice(channel),
            _ => return Err(resample_error("resampler produced no output")),
        }
        pos += CHUNK_SIZE;
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amplitude: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_same_rate_returns_copy() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000).unwrap(), samples);
    }

    #[test]
    fn test_output_length_follows_ratio() {
        assert_eq!(resample(&vec![0.0; 44100], 44100, 22050).unwrap().len(), 22050);
        assert_eq!(resample(&vec![0.0; 1000], 16000, 22050).unwrap().len(), 1378);
        assert_eq!(resample(&[0.5; 3], 48000, 22050).unwrap().len(), 1);
    }

    #[test]
    fn test_tone_above_target_nyquist_is_attenuated() {
        // 15 kHz cannot exist at 22.05 kHz; it must not alias to 7.05 kHz
        let source = sine(15000.0, 0.5, 44100, 44100);
        let resampled = resample(&source, 44100, 22050).unwrap();
        assert_eq!(resampled.len(), 22050);

        let level = rms(&resampled[2048..20000]);
        assert!(level < 0.05, "rms {}", level);
    }

    #[test]
    fn test_passband_tone_keeps_level_and_frequency() {
        let source = sine(1000.0, 0.5, 44100, 44100);
        let resampled = resample(&source, 44100, 22050).unwrap();

        let middle = &resampled[2048..20000];
        let level = rms(middle);
        assert!((level - 0.5 / 2f32.sqrt()).abs() < 0.02, "rms {}", level);

        // 1 kHz crosses zero 2000 times per second
        let crossings = resampled
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count();
        assert!((1990..=2010).contains(&crossings), "crossings {}", crossings);
    }

    #[test]
    fn test_upsampled_sine_frequency_survives() {
        // 100 Hz at 16 kHz -> 22.05 kHz: zero crossings per second unchanged
        let source = sine(100.0, 1.0, 16000, 16000);
        let resampled = resample(&source, 16000, 22050).unwrap();
        assert_eq!(resampled.len(), 22050);

        let crossings = resampled
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count();
        assert!((195..=205).contains(&crossings), "crossings {}", crossings);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], 44100, 22050).unwrap().is_empty());
    }

    #[test]
    fn test_zero_rate_is_an_error() {
        assert!(matches!(
            resample(&[0.1, 0.2], 0, 22050),
            Err(InputError::Resample { .. })
        ));
    }
}
