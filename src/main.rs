use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, warn};
use std::path::Path;
use walkdir::WalkDir;

use qrs_validate::config::Args;
use qrs_validate::data_loading::{
    annotation_samples, load_annotation_csv, load_peak_file, load_signal_csv,
};
use qrs_validate::filter::{fir_filter, FilterSettings};
use qrs_validate::output::{print_summary, write_summary_csv, RecordScore};
use qrs_validate::scoring::{match_peaks, refine_peaks, tolerance_samples, Scorecard};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tolerance = tolerance_samples(args.tolerance_ms, args.sample_rate)
        .context("Invalid matching tolerance")?;
    debug!(
        "matching tolerance: {} ms = {} samples at {} Hz",
        args.tolerance_ms, tolerance, args.sample_rate
    );

    let filter_settings = FilterSettings {
        sample_rate: args.sample_rate,
        lowcut: args.lowcut,
        highcut: args.highcut,
        num_taps: args.num_taps,
    };
    if args.refine {
        // Reject a bad filter configuration before touching any record.
        filter_settings.validate().context("Invalid filter settings")?;
    }

    let records = if args.records.is_empty() {
        discover_records(&args.data_dir)
    } else {
        args.records.clone()
    };
    if records.is_empty() {
        bail!(
            "No detection files found in {} (expected <record>_qrs_locs.txt)",
            args.data_dir.display()
        );
    }

    let mut scores = Vec::new();
    for record in &records {
        match validate_record(record, &args, &filter_settings, tolerance) {
            Ok(score) => scores.push(RecordScore {
                record: record.clone(),
                score,
            }),
            // A broken record should not abort the batch.
            Err(err) => warn!("Skipping record {}: {:#}", record, err),
        }
    }

    print_summary(&scores);

    if let Some(csv_path) = &args.csv_output {
        write_summary_csv(csv_path, &scores)?;
    }

    Ok(())
}

/// Find every record in the data directory that has a detection file,
/// by stripping the `_qrs_locs.txt` suffix.
fn discover_records(data_dir: &Path) -> Vec<String> {
    let mut records: Vec<String> = WalkDir::new(data_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix("_qrs_locs.txt"))
                .map(|record| record.to_string())
        })
        .collect();
    records.sort();
    records
}

fn validate_record(
    record: &str,
    args: &Args,
    filter_settings: &FilterSettings,
    tolerance: i64,
) -> Result<Scorecard> {
    let annotation_path = args.data_dir.join(format!("{}.ann.csv", record));
    let detection_path = args.data_dir.join(format!("{}_qrs_locs.txt", record));

    let annotations = load_annotation_csv(&annotation_path)?;
    let reference = annotation_samples(&annotations);
    let mut detected = load_peak_file(&detection_path)?;

    if args.refine {
        let signal_path = args.data_dir.join(format!("{}.csv", record));
        let raw = load_signal_csv(&signal_path, &args.channel)?;
        let taps = filter_settings.design()?;
        let filtered = fir_filter(&raw, &taps);
        detected = refine_peaks(&filtered, &detected, args.refine_window)
            .with_context(|| format!("Failed to refine peaks for record {}", record))?;
    }

    let score = match_peaks(&reference, &detected, tolerance)?;
    Ok(score)
}
