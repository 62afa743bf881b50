// Tempo module - onset strength envelope and global tempo estimate
//
// Algorithm:
// 1. Onset strength per frame: mean over mel bands of the positive log-mel
//    difference from the previous frame (spectral flux)
// 2. Autocorrelate the onset envelope over lags covering 30–300 BPM
// 3. Weight each lag by a log-normal prior centred on 120 BPM (σ = 1 octave)
// 4. The best weighted lag gives the tempo
//
// References:
// - Ellis, D. (2007). Beat tracking by dynamic programming

const MIN_BPM: f32 = 30.0;
const MAX_BPM: f32 = 300.0;
const PRIOR_CENTER_BPM: f32 = 120.0;
const PRIOR_OCTAVES: f32 = 1.0;

pub struct TempoEstimator {
    /// Onset envelope frames per second
    frame_rate: f32,
}

impl TempoEstimator {
    pub fn new(sample_rate: u32, hop_size: usize) -> Self {
        Self {
            frame_rate: sample_rate as f32 / hop_size as f32,
        }
    }

    /// Spectral flux onset envelope of a log-mel spectrogram
    ///
    /// SF(t) = mean_m max(0, S_t[m] − S_(t−1)[m]); the first frame is 0.
    pub fn onset_envelope(&self, log_mel: &[Vec<f32>]) -> Vec<f32> {
        let mut envelope = Vec::with_capacity(log_mel.len());
        if log_mel.is_empty() {
            return envelope;
        }

        envelope.push(0.0);
        for pair in log_mel.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let bands = curr.len().max(1) as f32;
            let flux: f32 = curr
                .iter()
                .zip(prev.iter())
                .map(|(c, p)| (c - p).max(0.0))
                .sum();
            envelope.push(flux / bands);
        }
        envelope
    }

    /// Tempo in BPM from an onset envelope (0 when it carries no energy)
    pub fn estimate(&self, envelope: &[f32]) -> f32 {
        if envelope.len() < 2 {
            return 0.0;
        }

        let min_lag = ((60.0 * self.frame_rate / MAX_BPM).ceil() as usize).max(1);
        let max_lag = ((60.0 * self.frame_rate / MIN_BPM).floor() as usize).min(envelope.len() - 1);
        if min_lag > max_lag {
            return 0.0;
        }

        let mut best: Option<(usize, f32)> = None;
        for lag in min_lag..=max_lag {
            let ac: f32 = envelope
                .iter()
                .zip(envelope[lag..].iter())
                .map(|(a, b)| a * b)
                .sum();
            let score = ac * self.prior(self.lag_to_bpm(lag));

            if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((lag, score));
            }
        }

        best.map_or(0.0, |(lag, _)| self.lag_to_bpm(lag))
    }

    fn lag_to_bpm(&self, lag: usize) -> f32 {
        60.0 * self.frame_rate / lag as f32
    }

    fn prior(&self, bpm: f32) -> f32 {
        let octaves = (bpm / PRIOR_CENTER_BPM).log2() / PRIOR_OCTAVES;
        (-0.5 * octaves * octaves).exp()
    }
}
