use crate::error::{PipelineError, Result};
use log::debug;
use serde::Serialize;

/// Agreement metrics between a reference-filtered and a candidate-filtered
/// signal.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ComparisonReport {
    pub mse: f64,
    pub correlation: f64,
    pub snr_db: f64,
    pub psnr_db: f64,
}

/// Acceptance thresholds for a filter implementation under test.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonThresholds {
    pub max_mse: f64,
    pub min_correlation: f64,
    pub min_snr_db: f64,
    pub min_psnr_db: f64,
}

impl Default for ComparisonThresholds {
    fn default() -> Self {
        ComparisonThresholds {
            max_mse: 0.01,
            min_correlation: 0.95,
            min_snr_db: 5.0,
            min_psnr_db: 20.0,
        }
    }
}

impl ComparisonReport {
    pub fn passes(&self, thresholds: &ComparisonThresholds) -> bool {
        self.mse <= thresholds.max_mse
            && self.correlation >= thresholds.min_correlation
            && self.snr_db >= thresholds.min_snr_db
            && self.psnr_db >= thresholds.min_psnr_db
    }
}

/// Compare two filtered renditions of the same recording.
///
/// Both signals are aligned by dropping the group-delay prefix, trimmed
/// to the common length and peak-normalized before the metrics are
/// computed, so implementations that differ only by gain or the usual
/// linear-phase shift still compare cleanly.
pub fn compare_filtered(
    reference: &[f64],
    candidate: &[f64],
    group_delay: usize,
) -> Result<ComparisonReport> {
    if reference.len() <= group_delay || candidate.len() <= group_delay {
        return Err(PipelineError::Shape(format!(
            "signals of {} and {} samples cannot absorb a {}-sample group delay",
            reference.len(),
            candidate.len(),
            group_delay
        )));
    }

    let common = (reference.len() - group_delay).min(candidate.len() - group_delay);
    let reference = peak_scaled(&reference[group_delay..group_delay + common])?;
    let candidate = peak_scaled(&candidate[group_delay..group_delay + common])?;

    let n = common as f64;
    let mse = reference
        .iter()
        .zip(candidate.iter())
        .map(|(&r, &c)| (c - r) * (c - r))
        .sum::<f64>()
        / n;

    let correlation = pearson(&reference, &candidate)?;

    let signal_power: f64 = reference.iter().map(|&r| r * r).sum();
    let error_power: f64 = reference
        .iter()
        .zip(candidate.iter())
        .map(|(&r, &c)| (c - r) * (c - r))
        .sum();
    // error_power = 0 pushes both ratios to +inf, which reads correctly
    // as a perfect match against any finite threshold.
    let snr_db = 10.0 * (signal_power / error_power).log10();
    let ref_peak = reference.iter().fold(0.0f64, |acc, &r| acc.max(r.abs()));
    let psnr_db = 20.0 * (ref_peak / mse.sqrt()).log10();

    debug!(
        "compared {} samples: mse={:.6} corr={:.4} snr={:.2} dB psnr={:.2} dB",
        common, mse, correlation, snr_db, psnr_db
    );

    Ok(ComparisonReport {
        mse,
        correlation,
        snr_db,
        psnr_db,
    })
}

/// Scale to unit peak; a flat-zero stretch carries no information to
/// compare against.
fn peak_scaled(signal: &[f64]) -> Result<Vec<f64>> {
    let peak = signal.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    if peak == 0.0 {
        return Err(PipelineError::Malformed(
            "signal is identically zero over the comparison range".to_string(),
        ));
    }
    Ok(signal.iter().map(|&x| x / peak).collect())
}

fn pearson(a: &[f64], b: &[f64]) -> Result<f64> {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a) * (x - mean_a);
        var_b += (y - mean_b) * (y - mean_b);
    }

    if var_a == 0.0 || var_b == 0.0 {
        return Err(PipelineError::Malformed(
            "correlation undefined for a constant signal".to_string(),
        ));
    }

    Ok(cov / (var_a.sqrt() * var_b.sqrt()))
}
