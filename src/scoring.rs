use crate::error::{PipelineError, Result};
use log::debug;
use serde::Serialize;

/// Confusion counts and derived ratios for one validation run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scorecard {
    pub reference_total: usize,
    pub detected_total: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub sensitivity: f64,
    pub precision: f64,
    pub f1: f64,
}

impl Scorecard {
    fn from_counts(
        reference_total: usize,
        detected_total: usize,
        tp: usize,
        fp: usize,
        fn_count: usize,
    ) -> Scorecard {
        let sensitivity = ratio(tp, tp + fn_count);
        let precision = ratio(tp, tp + fp);
        let f1 = if precision + sensitivity > 0.0 {
            2.0 * precision * sensitivity / (precision + sensitivity)
        } else {
            0.0
        };
        Scorecard {
            reference_total,
            detected_total,
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_count,
            sensitivity,
            precision,
            f1,
        }
    }
}

/// Zero-denominator ratios resolve to 0 rather than NaN, so a record with
/// no reference beats or no detections still yields a printable score.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Convert a tolerance in milliseconds to whole samples (truncating).
pub fn tolerance_samples(tolerance_ms: f64, sample_rate: f64) -> Result<i64> {
    if sample_rate <= 0.0 {
        return Err(PipelineError::Config(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    if tolerance_ms < 0.0 {
        return Err(PipelineError::Config(format!(
            "tolerance must be non-negative, got {} ms",
            tolerance_ms
        )));
    }
    Ok((tolerance_ms / 1000.0 * sample_rate) as i64)
}

/// Move each coarse candidate to the local maximum of `signal` within
/// `half_window` samples of it.
///
/// The search window is clamped to the signal bounds, so refined indices
/// always stay inside [0, N). Ties resolve to the lowest index.
pub fn refine_peaks(signal: &[f64], candidates: &[usize], half_window: usize) -> Result<Vec<usize>> {
    if signal.is_empty() {
        return Err(PipelineError::Shape(
            "cannot refine peaks against an empty signal".to_string(),
        ));
    }

    let mut refined = Vec::with_capacity(candidates.len());
    for &idx in candidates {
        let start = idx.saturating_sub(half_window);
        let end = (idx + half_window).min(signal.len());
        if start >= end {
            return Err(PipelineError::Shape(format!(
                "candidate {} lies outside the {}-sample signal",
                idx,
                signal.len()
            )));
        }

        let mut best = start;
        for i in start..end {
            if signal[i] > signal[best] {
                best = i;
            }
        }
        refined.push(best);
    }

    Ok(refined)
}

/// Score a detected peak list against reference annotations.
///
/// Detected peaks are processed in the order given. Each one claims the
/// nearest reference peak within `tolerance` samples (lowest reference
/// index on a distance tie). A detected
/// peak whose nearest in-tolerance reference was already claimed counts
/// as a false positive; it never steals the earlier match. Reference
/// peaks left unclaimed at the end are false negatives.
///
/// The input-order processing is deliberate: replacing it with a global
/// bipartite matching would change duplicate-detection outcomes relative
/// to the established scoring behavior.
pub fn match_peaks(reference: &[usize], detected: &[usize], tolerance: i64) -> Result<Scorecard> {
    if tolerance < 0 {
        return Err(PipelineError::Config(format!(
            "tolerance must be non-negative, got {} samples",
            tolerance
        )));
    }

    let mut matched = vec![false; reference.len()];
    let mut tp = 0usize;
    let mut fp = 0usize;

    for &d in detected {
        // Nearest reference within tolerance; first minimum wins.
        let mut best: Option<(usize, i64)> = None;
        for (k, &r) in reference.iter().enumerate() {
            let dist = (r as i64 - d as i64).abs();
            if dist <= tolerance {
                match best {
                    Some((_, best_dist)) if dist >= best_dist => {}
                    _ => best = Some((k, dist)),
                }
            }
        }

        match best {
            Some((k, _)) if !matched[k] => {
                matched[k] = true;
                tp += 1;
            }
            // No reference in range, or the nearest one is already taken.
            _ => fp += 1,
        }
    }

    let fn_count = matched.iter().filter(|&&m| !m).count();
    debug!(
        "matched {} detected against {} reference peaks: tp={} fp={} fn={}",
        detected.len(),
        reference.len(),
        tp,
        fp,
        fn_count
    );

    Ok(Scorecard::from_counts(
        reference.len(),
        detected.len(),
        tp,
        fp,
        fn_count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn refine_keeps_candidate_when_it_is_the_maximum() {
        let signal = vec![0.0, 1.0, 5.0, 1.0, 0.0];
        let refined = refine_peaks(&signal, &[2], 2).unwrap();
        assert_eq!(refined, vec![2]);
    }

    #[test]
    fn refine_moves_to_local_maximum() {
        let signal = vec![0.0, 0.5, 0.2, 3.0, 0.1, 0.0];
        let refined = refine_peaks(&signal, &[1], 2).unwrap();
        assert_eq!(refined, vec![3]);
    }

    #[test]
    fn refine_clamps_window_at_boundaries() {
        let signal = vec![2.0, 1.0, 0.5, 0.25, 4.0];
        let refined = refine_peaks(&signal, &[0, 4], 3).unwrap();
        assert_eq!(refined, vec![0, 4]);
        for &idx in &refined {
            assert!(idx < signal.len());
        }
    }

    #[test]
    fn refine_ties_resolve_to_first_occurrence() {
        let signal = vec![0.0, 7.0, 7.0, 0.0];
        let refined = refine_peaks(&signal, &[2], 2).unwrap();
        assert_eq!(refined, vec![1]);
    }

    #[test]
    fn refine_rejects_empty_signal() {
        assert!(refine_peaks(&[], &[3], 5).is_err());
    }

    #[test]
    fn refine_rejects_candidate_beyond_signal() {
        let signal = vec![1.0, 2.0, 3.0];
        assert!(refine_peaks(&signal, &[100], 5).is_err());
    }

    #[test]
    fn identical_lists_score_perfectly() {
        let peaks = vec![10, 50, 90, 130];
        let score = match_peaks(&peaks, &peaks, 0).unwrap();
        assert_eq!(score.true_positives, 4);
        assert_eq!(score.false_positives, 0);
        assert_eq!(score.false_negatives, 0);
        assert!((score.sensitivity - 1.0).abs() < EPS);
        assert!((score.precision - 1.0).abs() < EPS);
        assert!((score.f1 - 1.0).abs() < EPS);
    }

    #[test]
    fn disjoint_lists_at_zero_tolerance_all_miss() {
        let reference = vec![10, 20, 30];
        let detected = vec![11, 21];
        let score = match_peaks(&reference, &detected, 0).unwrap();
        assert_eq!(score.true_positives, 0);
        assert_eq!(score.false_positives, 2);
        assert_eq!(score.false_negatives, 3);
    }

    #[test]
    fn duplicate_detection_counts_as_false_positive() {
        let score = match_peaks(&[100], &[100, 101], 5).unwrap();
        assert_eq!(score.true_positives, 1);
        assert_eq!(score.false_positives, 1);
        assert_eq!(score.false_negatives, 0);
    }

    #[test]
    fn distance_ties_claim_the_lower_reference_index() {
        // 15 is equidistant from 10 and 20; the scan claims 10 first.
        let score = match_peaks(&[10, 20], &[15, 20], 5).unwrap();
        assert_eq!(score.true_positives, 2);
        assert_eq!(score.false_positives, 0);
        assert_eq!(score.false_negatives, 0);
    }

    #[test]
    fn empty_detected_list_yields_all_false_negatives() {
        let score = match_peaks(&[5, 10, 15], &[], 3).unwrap();
        assert_eq!(score.true_positives, 0);
        assert_eq!(score.false_positives, 0);
        assert_eq!(score.false_negatives, 3);
        assert_eq!(score.sensitivity, 0.0);
        assert_eq!(score.precision, 0.0);
        assert_eq!(score.f1, 0.0);
    }

    #[test]
    fn empty_reference_list_yields_all_false_positives() {
        let score = match_peaks(&[], &[5, 10], 3).unwrap();
        assert_eq!(score.true_positives, 0);
        assert_eq!(score.false_positives, 2);
        assert_eq!(score.false_negatives, 0);
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        assert!(match_peaks(&[1], &[1], -1).is_err());
        assert!(tolerance_samples(-10.0, 360.0).is_err());
    }

    #[test]
    fn tolerance_conversion_truncates_to_samples() {
        // 100 ms at 360 Hz -> 36 samples, like the MIT-BIH validation setup.
        assert_eq!(tolerance_samples(100.0, 360.0).unwrap(), 36);
        assert_eq!(tolerance_samples(0.0, 360.0).unwrap(), 0);
        assert_eq!(tolerance_samples(9.9, 100.0).unwrap(), 0);
    }
}
