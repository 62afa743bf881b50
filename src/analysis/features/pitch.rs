// Pitch module - fundamental frequency tracking with fallback strategies
//
// Pitch is estimated by an ordered chain of strategies. Each strategy either
// returns a contour of voiced f0 values or reports that it could not produce
// one; the first strategy with at least one voiced frame wins. If every
// strategy comes back empty the pitch statistics are all zero.
//
// Strategies:
// 1. YinTracker: time-domain YIN (cumulative mean normalized difference)
//    with an absolute threshold as the voiced/unvoiced decision
// 2. PeakPickingTracker: strongest spectral peak inside the pitch range
//
// References:
// - de Cheveigné, A. & Kawahara, H. (2002). YIN, a fundamental frequency
//   estimator for speech and music

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::fft::{FrameGrid, Spectrogram};
use super::types::PitchStats;
use super::{stats, FeatureError};

/// Frames quieter than this RMS are treated as unvoiced without analysis
const SILENCE_RMS: f32 = 1e-3;

/// Spectral peaks must reach this fraction of the frame maximum
const PEAK_RELATIVE_THRESHOLD: f32 = 0.1;

/// Everything a pitch strategy may read for one recording
pub struct PitchInput<'a> {
    pub grid: &'a FrameGrid,
    pub spectrogram: &'a Spectrogram,
    pub sample_rate: u32,
}

/// Voiced f0 values (Hz) in frame order, plus the number of frames analyzed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchContour {
    pub voiced: Vec<f32>,
    pub total_frames: usize,
}

impl PitchContour {
    pub fn stats(&self) -> PitchStats {
        if self.voiced.is_empty() || self.total_frames == 0 {
            return PitchStats::default();
        }

        let (min, max) = self
            .voiced
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &f| {
                (lo.min(f), hi.max(f))
            });

        PitchStats {
            mean: stats::mean(&self.voiced),
            std: stats::std_dev(&self.voiced),
            range: (max - min).max(0.0),
            voiced_ratio: self.voiced.len() as f32 / self.total_frames as f32,
        }
    }
}

/// One way of estimating a pitch contour
pub trait PitchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn track(&self, input: &PitchInput<'_>) -> Result<PitchContour, FeatureError>;
}

/// Ordered chain of pitch strategies
pub struct PitchTracker {
    strategies: Vec<Box<dyn PitchStrategy>>,
}

impl PitchTracker {
    /// YIN first, spectral peak picking as fallback
    pub fn new(frame_size: usize, sample_rate: u32, fmin: f32, fmax: f32, threshold: f32) -> Self {
        Self::with_strategies(vec![
            Box::new(YinTracker::new(frame_size, sample_rate, fmin, fmax, threshold)),
            Box::new(PeakPickingTracker::new(fmin, fmax)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn PitchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run strategies in order until one yields voiced frames
    pub fn track(&self, input: &PitchInput<'_>) -> PitchStats {
        for strategy in &self.strategies {
            match strategy.track(input) {
                Ok(contour) if !contour.voiced.is_empty() => {
                    log::debug!(
                        "[Pitch] {} voiced {}/{} frames",
                        strategy.name(),
                        contour.voiced.len(),
                        contour.total_frames
                    );
                    return contour.stats();
                }
                Ok(_) => {
                    log::debug!("[Pitch] {} found no voiced frames", strategy.name());
                }
                Err(err) => {
                    log::warn!(
                        "[Pitch] {} failed: {}. Trying next strategy.",
                        strategy.name(),
                        err
                    );
                }
            }
        }

        log::warn!("[Pitch] No strategy produced voiced frames, pitch features set to 0");
        PitchStats::default()
    }
}

/// YIN pitch tracker
///
/// The difference function is computed through FFT cross-correlation, which
/// keeps long recordings cheap: d(τ) = e(0) + e(τ) − 2·r(τ).
pub struct YinTracker {
    sample_rate: u32,
    frame_size: usize,
    fmin: f32,
    fmax: f32,
    threshold: f32,
    corr_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl YinTracker {
    pub fn new(frame_size: usize, sample_rate: u32, fmin: f32, fmax: f32, threshold: f32) -> Self {
        let corr_size = (2 * frame_size).next_power_of_two();
        let mut planner = FftPlanner::new();

        Self {
            sample_rate,
            frame_size,
            fmin,
            fmax,
            threshold,
            corr_size,
            forward: planner.plan_fft_forward(corr_size),
            inverse: planner.plan_fft_inverse(corr_size),
        }
    }

    fn lag_bounds(&self) -> (usize, usize) {
        let min_lag = ((self.sample_rate as f32 / self.fmax).floor() as usize).max(2);
        let max_lag = (self.sample_rate as f32 / self.fmin).ceil() as usize;
        (min_lag, max_lag.min(self.frame_size / 2))
    }

    /// Cumulative mean normalized difference for lags 0..=max_lag
    fn cmnd(&self, frame: &[f32], max_lag: usize) -> Vec<f32> {
        let window = frame.len() - max_lag;

        let mut a: Vec<Complex<f32>> = frame[..window]
            .iter()
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        a.resize(self.corr_size, Complex::new(0.0, 0.0));
        let mut b: Vec<Complex<f32>> = frame.iter().map(|&x| Complex::new(x, 0.0)).collect();
        b.resize(self.corr_size, Complex::new(0.0, 0.0));

        self.forward.process(&mut a);
        self.forward.process(&mut b);
        let mut cross: Vec<Complex<f32>> =
            a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).collect();
        self.inverse.process(&mut cross);
        let scale = 1.0 / self.corr_size as f32;

        let mut cumulative_sq = Vec::with_capacity(frame.len() + 1);
        cumulative_sq.push(0.0f64);
        for &x in frame {
            let last = cumulative_sq[cumulative_sq.len() - 1];
            cumulative_sq.push(last + (x as f64) * (x as f64));
        }
        let energy = |start: usize| cumulative_sq[start + window] - cumulative_sq[start];
        let e0 = energy(0);

        let mut cmnd = vec![1.0f32; max_lag + 1];
        let mut running_sum = 0.0f64;
        for tau in 1..=max_lag {
            let r = (cross[tau].re * scale) as f64;
            let d = (e0 + energy(tau) - 2.0 * r).max(0.0);
            running_sum += d;
            cmnd[tau] = if running_sum > 0.0 {
                (d * tau as f64 / running_sum) as f32
            } else {
                1.0
            };
        }
        cmnd
    }

    /// f0 of one frame, or None when the frame is unvoiced
    fn estimate(&self, frame: &[f32]) -> Result<Option<f32>, FeatureError> {
        let rms = (frame.iter().map(|x| x * x).sum::<f32>() / frame.len() as f32).sqrt();
        if rms < SILENCE_RMS {
            return Ok(None);
        }

        let (min_lag, max_lag) = self.lag_bounds();
        let cmnd = self.cmnd(frame, max_lag);
        if cmnd.iter().any(|v| !v.is_finite()) {
            return Err(FeatureError::NonFinite("yin difference function"));
        }

        let Some(mut tau) = (min_lag..=max_lag).find(|&t| cmnd[t] < self.threshold) else {
            return Ok(None);
        };
        while tau < max_lag && cmnd[tau + 1] < cmnd[tau] {
            tau += 1;
        }

        let refined = parabolic_offset(&cmnd, tau) + tau as f32;
        if refined <= 0.0 {
            return Ok(None);
        }
        let f0 = self.sample_rate as f32 / refined;
        Ok((f0 >= self.fmin && f0 <= self.fmax).then_some(f0))
    }
}

impl PitchStrategy for YinTracker {
    fn name(&self) -> &'static str {
        "yin"
    }

    fn track(&self, input: &PitchInput<'_>) -> Result<PitchContour, FeatureError> {
        if input.grid.is_empty() {
            return Err(FeatureError::Empty("yin"));
        }

        let mut voiced = Vec::new();
        for frame in input.grid.frames() {
            if let Some(f0) = self.estimate(frame)? {
                voiced.push(f0);
            }
        }

        Ok(PitchContour {
            voiced,
            total_frames: input.grid.len(),
        })
    }
}

/// Spectral peak-picking pitch tracker
///
/// Each frame's pitch is the interpolated frequency of its strongest local
/// spectral peak inside [fmin, fmax]; frames without such a peak are skipped.
pub struct PeakPickingTracker {
    fmin: f32,
    fmax: f32,
}

impl PeakPickingTracker {
    pub fn new(fmin: f32, fmax: f32) -> Self {
        Self { fmin, fmax }
    }

    fn frame_pitch(&self, spectrum: &[f32], bin_hz: f32) -> Option<f32> {
        let frame_max = spectrum.iter().copied().fold(0.0f32, f32::max);
        if frame_max <= 1e-6 {
            return None;
        }
        let threshold = PEAK_RELATIVE_THRESHOLD * frame_max;

        let low = ((self.fmin / bin_hz).ceil() as usize).max(1);
        let high = ((self.fmax / bin_hz).floor() as usize).min(spectrum.len().saturating_sub(2));
        if low > high {
            return None;
        }

        let best = (low..=high)
            .filter(|&k| {
                spectrum[k] > threshold
                    && spectrum[k] > spectrum[k - 1]
                    && spectrum[k] >= spectrum[k + 1]
            })
            .max_by(|&a, &b| spectrum[a].total_cmp(&spectrum[b]))?;

        let freq = (best as f32 + parabolic_offset(spectrum, best)) * bin_hz;
        (freq > 0.0).then_some(freq)
    }
}

impl PitchStrategy for PeakPickingTracker {
    fn name(&self) -> &'static str {
        "peak-picking"
    }

    fn track(&self, input: &PitchInput<'_>) -> Result<PitchContour, FeatureError> {
        let spectrogram = input.spectrogram;
        if spectrogram.n_frames() == 0 {
            return Err(FeatureError::Empty("peak-picking"));
        }

        let voiced = spectrogram
            .frames()
            .iter()
            .filter_map(|spectrum| self.frame_pitch(spectrum, spectrogram.bin_hz()))
            .collect();

        Ok(PitchContour {
            voiced,
            total_frames: spectrogram.n_frames(),
        })
    }
}

/// Sub-sample offset of the extremum at `index` from a parabola through its neighbours
fn parabolic_offset(values: &[f32], index: usize) -> f32 {
    if index == 0 || index + 1 >= values.len() {
        return 0.0;
    }
    let (a, b, c) = (values[index - 1], values[index], values[index + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < 1e-12 {
        return 0.0;
    }
    (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
}
