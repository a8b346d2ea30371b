fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// One triangular filter stored sparsely as a run of bin weights.
#[derive(Debug, Clone)]
struct MelBand {
    first_bin: usize,
    weights: Vec<f32>,
}

/// Triangular mel filterbank over `n_fft / 2 + 1` power bins, spanning
/// 0 Hz to Nyquist on the HTK mel scale.
#[derive(Debug, Clone)]
pub(crate) struct MelFilterbank {
    bands: Vec<MelBand>,
}

impl MelFilterbank {
    pub(crate) fn new(sample_rate_hz: u32, n_fft: usize, n_mels: usize) -> Self {
        let n_bins = n_fft / 2 + 1;
        let nyquist = sample_rate_hz as f64 / 2.0;
        let mel_max = hz_to_mel(nyquist);
        let edges: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
            .collect();
        let bin_hz = sample_rate_hz as f64 / n_fft as f64;

        let bands = edges
            .windows(3)
            .map(|edge| {
                let (lo, centre, hi) = (edge[0], edge[1], edge[2]);
                let mut first_bin = None;
                let mut weights = Vec::new();
                for k in 0..n_bins {
                    let f = k as f64 * bin_hz;
                    let rising = (f - lo) / (centre - lo);
                    let falling = (hi - f) / (hi - centre);
                    let w = rising.min(falling).max(0.0);
                    if w > 0.0 {
                        first_bin.get_or_insert(k);
                        weights.push(w as f32);
                    } else if first_bin.is_some() {
                        break;
                    }
                }
                MelBand {
                    first_bin: first_bin.unwrap_or(0),
                    weights,
                }
            })
            .collect();

        Self { bands }
    }

    pub(crate) fn len(&self) -> usize {
        self.bands.len()
    }

    /// Writes one mel power value per band into `out`.
    pub(crate) fn apply(&self, power: &[f32], out: &mut [f32]) {
        for (band, slot) in self.bands.iter().zip(out.iter_mut()) {
            let end = (band.first_bin + band.weights.len()).min(power.len());
            let bins = power.get(band.first_bin..end).unwrap_or(&[]);
            *slot = bins
                .iter()
                .zip(band.weights.iter())
                .map(|(p, w)| p * w)
                .sum();
        }
    }
}
