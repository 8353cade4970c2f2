use crate::error::{PipelineError, Result};
use log::debug;
use std::f64::consts::PI;

/// Bandpass design parameters for the QRS preprocessing filter.
///
/// Defaults match the MIT-BIH setup: 5-15 Hz passband at 360 Hz with
/// 101 taps.
#[derive(Debug, Clone, Copy)]
pub struct FilterSettings {
    pub sample_rate: f64,
    pub lowcut: f64,
    pub highcut: f64,
    pub num_taps: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            sample_rate: 360.0,
            lowcut: 5.0,
            highcut: 15.0,
            num_taps: 101,
        }
    }
}

impl FilterSettings {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate <= 0.0 {
            return Err(PipelineError::Config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.num_taps < 3 || self.num_taps % 2 == 0 {
            return Err(PipelineError::Config(format!(
                "tap count must be odd and at least 3, got {}",
                self.num_taps
            )));
        }
        let nyquist = self.sample_rate / 2.0;
        if self.lowcut <= 0.0 || self.highcut >= nyquist {
            return Err(PipelineError::Config(format!(
                "cutoffs must lie strictly inside (0, {} Hz), got {}-{} Hz",
                nyquist, self.lowcut, self.highcut
            )));
        }
        if self.lowcut >= self.highcut {
            return Err(PipelineError::Config(format!(
                "low cutoff {} Hz must be below high cutoff {} Hz",
                self.lowcut, self.highcut
            )));
        }
        Ok(())
    }

    /// Design the bandpass taps for these settings.
    pub fn design(&self) -> Result<Vec<f64>> {
        design_bandpass(self.sample_rate, self.lowcut, self.highcut, self.num_taps)
    }

    /// Group delay of the designed filter in samples.
    pub fn group_delay(&self) -> usize {
        (self.num_taps - 1) / 2
    }
}

/// Windowed-sinc low-pass kernel: ideal sinc response at cutoff `fc`,
/// shaped by a Hamming window. The k = 0 tap uses the limiting value
/// 2*fc/fs of the sinc.
fn windowed_sinc_lowpass(fc: f64, fs: f64, num_taps: usize) -> Vec<f64> {
    let center = (num_taps - 1) / 2;
    (0..num_taps)
        .map(|i| {
            let k = i as f64 - center as f64;
            let ideal = if i == center {
                2.0 * fc / fs
            } else {
                (2.0 * PI * fc * k / fs).sin() / (PI * k)
            };
            let window = 0.54 - 0.46 * (2.0 * PI * i as f64 / (num_taps - 1) as f64).cos();
            ideal * window
        })
        .collect()
}

/// Design a linear-phase FIR bandpass filter.
///
/// Two Hamming-windowed sinc low-pass kernels are combined: the `lowcut`
/// kernel is spectrally inverted (negate, +1 at the center tap) into a
/// high-pass, then summed with the `highcut` low-pass. The result is
/// normalized so the taps sum to one, giving unity passband gain.
pub fn design_bandpass(fs: f64, lowcut: f64, highcut: f64, num_taps: usize) -> Result<Vec<f64>> {
    let settings = FilterSettings {
        sample_rate: fs,
        lowcut,
        highcut,
        num_taps,
    };
    settings.validate()?;

    let center = (num_taps - 1) / 2;
    let low_pass = windowed_sinc_lowpass(highcut, fs, num_taps);
    let mut high_pass = windowed_sinc_lowpass(lowcut, fs, num_taps);
    for h in high_pass.iter_mut() {
        *h = -*h;
    }
    high_pass[center] += 1.0;

    let mut band: Vec<f64> = low_pass
        .iter()
        .zip(high_pass.iter())
        .map(|(lp, hp)| lp + hp)
        .collect();

    let sum: f64 = band.iter().sum();
    if sum != 0.0 {
        for h in band.iter_mut() {
            *h /= sum;
        }
    }

    debug!(
        "designed {}-tap bandpass, {}-{} Hz at {} Hz, center tap {:.6}",
        num_taps, lowcut, highcut, fs, band[center]
    );

    Ok(band)
}

/// Apply an FIR filter as a causal convolution.
///
/// Output has the same length as the input; samples before index 0 are
/// treated as zero. The linear-phase group delay of (M-1)/2 samples is
/// not compensated here.
pub fn fir_filter(input: &[f64], taps: &[f64]) -> Vec<f64> {
    let mut output = vec![0.0; input.len()];
    for (n, out) in output.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (j, &h) in taps.iter().enumerate().take(n + 1) {
            acc += h * input[n - j];
        }
        *out = acc;
    }
    output
}

/// Five-point derivative from the Pan-Tompkins preprocessing chain:
/// y[n] = (2x[n] + x[n-1] - x[n-3] - 2x[n-4]) / 8.
///
/// The first four outputs have insufficient history and are set to zero.
pub fn derivative(input: &[f64]) -> Vec<f64> {
    let mut output = vec![0.0; input.len()];
    for n in 4..input.len() {
        output[n] = (2.0 * input[n] + input[n - 1] - input[n - 3] - 2.0 * input[n - 4]) / 8.0;
    }
    output
}

/// Remove the mean and scale by the peak absolute value so the signal
/// spans [-1, 1]. A flat signal is returned de-meaned but unscaled.
pub fn normalize_signal(input: &[f64]) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }
    let mean = input.iter().sum::<f64>() / input.len() as f64;
    let mut output: Vec<f64> = input.iter().map(|&x| x - mean).collect();
    let peak = output.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    if peak != 0.0 {
        for x in output.iter_mut() {
            *x /= peak;
        }
    }
    output
}
