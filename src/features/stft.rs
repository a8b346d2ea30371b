use realfft::RealFftPlanner;

use crate::error::AlignmentError;

/// Periodic Hann window, matching `scipy.signal.get_window("hann", n)`.
pub(crate) fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = (std::f32::consts::PI * i as f32) / n as f32;
            t.sin() * t.sin()
        })
        .collect()
}

/// Number of centred frames produced for `len` samples.
pub(crate) fn centered_frame_count(len: usize, n_fft: usize, hop_length: usize) -> usize {
    let padded = len + 2 * (n_fft / 2);
    1 + padded.saturating_sub(n_fft) / hop_length
}

/// Centred short-time power spectrum.
///
/// The signal is zero-padded by `n_fft / 2` on both sides so frame `t` is
/// centred on sample `t * hop_length`. `on_frame` receives the frame index and
/// `n_fft / 2 + 1` power bins; the buffers are reused across frames.
pub(crate) fn for_each_power_frame<F>(
    samples: &[f32],
    n_fft: usize,
    hop_length: usize,
    mut on_frame: F,
) -> Result<usize, AlignmentError>
where
    F: FnMut(usize, &[f32]),
{
    let pad = n_fft / 2;
    let frames = centered_frame_count(samples.len(), n_fft, hop_length);
    let window = hann(n_fft);

    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(n_fft);
    let mut inbuf = r2c.make_input_vec();
    let mut outbuf = r2c.make_output_vec();
    let mut power = vec![0.0f32; outbuf.len()];

    for t in 0..frames {
        let start = t * hop_length;
        for (j, slot) in inbuf.iter_mut().enumerate() {
            let padded_idx = start + j;
            let sample = padded_idx
                .checked_sub(pad)
                .and_then(|idx| samples.get(idx))
                .copied()
                .unwrap_or(0.0);
            *slot = sample * window[j];
        }
        r2c.process(&mut inbuf, &mut outbuf)
            .map_err(|e| AlignmentError::decode("short-time fourier transform", e))?;
        for (p, c) in power.iter_mut().zip(outbuf.iter()) {
            *p = c.norm_sqr();
        }
        on_frame(t, &power);
    }

    Ok(frames)
}
