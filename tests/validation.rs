use qrs_validate::filter::{design_bandpass, fir_filter, FilterSettings};
use qrs_validate::scoring::{match_peaks, refine_peaks, tolerance_samples};

#[test]
fn end_to_end_scoring_scenario() {
    // 12 matches 10, 48 matches 50, 200 matches nothing.
    let reference = vec![10, 50, 90];
    let detected = vec![12, 48, 200];
    let score = match_peaks(&reference, &detected, 5).unwrap();

    assert_eq!(score.true_positives, 2);
    assert_eq!(score.false_positives, 1);
    assert_eq!(score.false_negatives, 1);
    assert!((score.sensitivity - 2.0 / 3.0).abs() < 1e-9);
    assert!((score.precision - 2.0 / 3.0).abs() < 1e-9);
    assert!((score.f1 - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn refinement_recovers_annotated_peaks_before_matching() {
    // Two sharp beats; the detector reports them a few samples off.
    let mut signal = vec![0.0; 300];
    signal[100] = 10.0;
    signal[200] = 8.0;

    let coarse = vec![95, 205];
    let refined = refine_peaks(&signal, &coarse, 15).unwrap();
    assert_eq!(refined, vec![100, 200]);

    let score = match_peaks(&[100, 200], &refined, 0).unwrap();
    assert_eq!(score.true_positives, 2);
    assert_eq!(score.false_positives, 0);
    assert_eq!(score.false_negatives, 0);
}

#[test]
fn designed_bandpass_has_unity_gain_once_warmed_up() {
    // Normalizing the taps to sum 1 makes a constant input pass through
    // unchanged after the filter has seen a full tap window of history.
    let settings = FilterSettings::default();
    let taps = settings.design().unwrap();
    let input = vec![1.0; 500];
    let output = fir_filter(&input, &taps);

    assert_eq!(output.len(), input.len());
    for &y in &output[settings.num_taps..] {
        assert!((y - 1.0).abs() < 1e-9, "steady state output {} != 1", y);
    }
}

#[test]
fn impulse_response_peaks_at_the_group_delay() {
    let settings = FilterSettings::default();
    let taps = settings.design().unwrap();
    let mut impulse = vec![0.0; settings.num_taps + 50];
    impulse[0] = 1.0;
    let response = fir_filter(&impulse, &taps);

    let refined = refine_peaks(&response, &[settings.group_delay()], 10).unwrap();
    assert_eq!(refined, vec![settings.group_delay()]);
}

#[test]
fn mit_bih_tolerance_setup_matches_detections_within_100ms() {
    // 100 ms at 360 Hz is 36 samples; a detection 36 samples away still
    // matches, 37 samples away does not.
    let tolerance = tolerance_samples(100.0, 360.0).unwrap();
    assert_eq!(tolerance, 36);

    let on_edge = match_peaks(&[1000], &[1036], tolerance).unwrap();
    assert_eq!(on_edge.true_positives, 1);

    let past_edge = match_peaks(&[1000], &[1037], tolerance).unwrap();
    assert_eq!(past_edge.true_positives, 0);
    assert_eq!(past_edge.false_positives, 1);
    assert_eq!(past_edge.false_negatives, 1);
}

#[test]
fn narrower_bandpass_still_satisfies_design_invariants() {
    for (lowcut, highcut, num_taps) in [(0.5, 40.0, 201), (5.0, 15.0, 31), (8.0, 12.0, 101)] {
        let taps = design_bandpass(360.0, lowcut, highcut, num_taps).unwrap();
        assert_eq!(taps.len(), num_taps);
        let sum: f64 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
