//! # Autocorrelation Module
//!
//! FFT accelerated autocorrelation used by the pitch detector.
//!
//! The signal is zero padded to a power of two of at least `2L - 1`
//! samples so the circular correlation computed in the frequency domain
//! equals the linear one for every lag `0..L`.

use rustfft::{FftPlanner, num_complex::Complex};

/// Computes the FFT length needed to avoid circular convolution effects
/// for a signal of `len` samples.
pub fn autocorr_fft_size(len: usize) -> usize {
    (2 * len).saturating_sub(1).max(1).next_power_of_two()
}

/// Computes the autocorrelation `r[tau] = sum_j x[j] * x[j + tau]` for
/// every lag `0..signal.len()` using a forward and an inverse FFT.
pub fn autocorrelate(signal: &[f32]) -> Vec<f32> {
    let len = signal.len();
    if len == 0 {
        return Vec::new();
    }

    let fft_size = autocorr_fft_size(len);
    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .map(|&sample| Complex { re: sample, im: 0.0 })
        .chain(std::iter::repeat(Complex { re: 0.0, im: 0.0 }))
        .take(fft_size)
        .collect();

    forward.process(&mut buffer);

    // Power spectral density
    for value in buffer.iter_mut() {
        *value = Complex {
            re: value.norm_sqr(),
            im: 0.0,
        };
    }

    inverse.process(&mut buffer);

    // rustfft does not normalize the inverse transform.
    let scale = 1.0 / fft_size as f32;
    buffer.iter().take(len).map(|c| c.re * scale).collect()
}

/// Time domain autocorrelation, O(L^2). Kept as the reference the FFT
/// version is checked against.
pub fn autocorrelate_direct(signal: &[f32]) -> Vec<f32> {
    let len = signal.len();
    (0..len)
        .map(|tau| {
            signal[..len - tau]
                .iter()
                .zip(&signal[tau..])
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}
