// FFT module - framing and short-time Fourier transform
//
// Every frame-based feature reads from the same centered frame grid, so the
// spectral, cepstral, chroma, energy and pitch statistics all describe the
// same time positions. The magnitude spectrogram is computed once per
// extraction and shared by the frequency-domain extractors.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Centered, zero-padded framing of a PCM buffer
///
/// Frame `i` is centered on sample `i * hop_size`; the signal is padded with
/// `frame_size / 2` zeros on the left so the first frame is centered on the
/// first sample. The grid always holds `1 + len / hop_size` frames.
pub struct FrameGrid {
    padded: Vec<f32>,
    frame_size: usize,
    hop_size: usize,
    n_frames: usize,
}

impl FrameGrid {
    pub fn new(samples: &[f32], frame_size: usize, hop_size: usize) -> Self {
        let left = frame_size / 2;
        let right = frame_size - left;

        let mut padded = Vec::with_capacity(samples.len() + frame_size);
        padded.resize(left, 0.0);
        padded.extend_from_slice(samples);
        padded.resize(left + samples.len() + right, 0.0);

        Self {
            padded,
            frame_size,
            hop_size,
            n_frames: 1 + samples.len() / hop_size,
        }
    }

    pub fn len(&self) -> usize {
        self.n_frames
    }

    pub fn is_empty(&self) -> bool {
        self.n_frames == 0
    }

    /// Samples of frame `index` (always `frame_size` long)
    pub fn frame(&self, index: usize) -> &[f32] {
        let start = index * self.hop_size;
        &self.padded[start..start + self.frame_size]
    }

    pub fn frames(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.n_frames).map(move |i| self.frame(i))
    }
}

/// FFT processor that computes magnitude spectra from audio frames
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `fft_size` - FFT window size (equal to the analysis frame size)
    pub fn new(fft_size: usize) -> Self {
        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / fft_size as f32).cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window,
        }
    }

    /// Number of non-negative frequency bins produced per frame
    pub fn n_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Compute magnitude spectrum using FFT
    ///
    /// Applies Hann windowing, performs FFT, and returns magnitude spectrum
    /// for positive frequencies only (exploiting symmetry of real-valued FFT).
    ///
    /// # Arguments
    /// * `audio` - Audio frame (length <= fft_size, zero padded otherwise)
    pub fn compute_magnitude_spectrum(&self, audio: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = audio
            .iter()
            .take(self.fft_size)
            .zip(self.window.iter())
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.n_bins()].iter().map(|c| c.norm()).collect()
    }

    /// Compute the magnitude spectrogram of every frame in the grid
    pub fn spectrogram(&self, grid: &FrameGrid, sample_rate: u32) -> Spectrogram {
        let frames = grid
            .frames()
            .map(|frame| self.compute_magnitude_spectrum(frame))
            .collect();

        Spectrogram {
            frames,
            bin_hz: sample_rate as f32 / self.fft_size as f32,
            n_bins: self.n_bins(),
        }
    }
}

/// Magnitude spectrogram, one spectrum per grid frame
pub struct Spectrogram {
    frames: Vec<Vec<f32>>,
    bin_hz: f32,
    n_bins: usize,
}

impl Spectrogram {
    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Width of one frequency bin in Hz
    pub fn bin_hz(&self) -> f32 {
        self.bin_hz
    }

    /// Power spectrogram (squared magnitudes)
    pub fn power(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|m| m * m).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_grid_count_and_centering() {
        let samples: Vec<f32> = (1..=10).map(|v| v as f32).collect();
        let grid = FrameGrid::new(&samples, 4, 2);

        assert_eq!(grid.len(), 6);
        // First frame is centered on sample 0: two zeros then the first two samples
        assert_eq!(grid.frame(0), &[0.0, 0.0, 1.0, 2.0]);
        assert_eq!(grid.frame(1), &[1.0, 2.0, 3.0, 4.0]);
        // Last frame runs into right padding without panicking
        assert_eq!(grid.frame(5), &[9.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_frame_grid_single_sample() {
        let grid = FrameGrid::new(&[0.5], 2048, 512);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.frame(0).len(), 2048);
        assert_eq!(grid.frame(0)[1024], 0.5);
    }

    #[test]
    fn test_odd_frame_size_does_not_overrun() {
        let samples = vec![1.0; 9];
        let grid = FrameGrid::new(&samples, 5, 3);
        for frame in grid.frames() {
            assert_eq!(frame.len(), 5);
        }
    }

    #[test]
    fn test_sine_peak_lands_in_expected_bin() {
        let sample_rate = 22050;
        let fft_size = 2048;
        let processor = FftProcessor::new(fft_size);
        let freq = 1000.0;
        let signal: Vec<f32> = (0..fft_size)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();

        let spectrum = processor.compute_magnitude_spectrum(&signal);
        assert_eq!(spectrum.len(), fft_size / 2 + 1);

        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        let peak_hz = peak_bin as f32 * sample_rate as f32 / fft_size as f32;
        assert!((peak_hz - freq).abs() < 15.0, "peak at {} Hz", peak_hz);
    }

    #[test]
    fn test_silence_spectrum_is_zero() {
        let processor = FftProcessor::new(512);
        let spectrum = processor.compute_magnitude_spectrum(&[0.0; 512]);
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }
}
