use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use qrs_validate::compare::{compare_filtered, ComparisonThresholds};
use qrs_validate::data_loading::load_signal_csv;
use qrs_validate::filter::{derivative, fir_filter, normalize_signal, FilterSettings};

/// Run the bandpass and derivative stages over one ECG record
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Signal CSV (header row of channel names, one sample per row)
    signal_csv: PathBuf,

    /// Channel to process
    #[arg(long, default_value = "MLII")]
    channel: String,

    /// Sampling frequency in Hz
    #[arg(long, default_value = "360.0")]
    sample_rate: f64,

    /// Bandpass low cutoff in Hz
    #[arg(long, default_value = "5.0")]
    lowcut: f64,

    /// Bandpass high cutoff in Hz
    #[arg(long, default_value = "15.0")]
    highcut: f64,

    /// Bandpass filter length in taps (must be odd)
    #[arg(long, default_value = "101")]
    num_taps: usize,

    /// Where to write the stage outputs as CSV
    #[arg(long, default_value = "stages.csv")]
    output: PathBuf,

    /// Reference-filtered signal CSV to compare against (same channel name)
    #[arg(long)]
    reference: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = FilterSettings {
        sample_rate: args.sample_rate,
        lowcut: args.lowcut,
        highcut: args.highcut,
        num_taps: args.num_taps,
    };

    let raw = load_signal_csv(&args.signal_csv, &args.channel)?;
    println!(
        "Read {} samples of channel {} from {}",
        raw.len(),
        args.channel,
        args.signal_csv.display()
    );

    let taps = settings.design().context("Filter design failed")?;
    let filtered = fir_filter(&raw, &taps);
    let deriv = derivative(&filtered);
    let normalized = normalize_signal(&filtered);

    write_stages(&args.output, &raw, &filtered, &deriv, &normalized)?;
    println!("Stage outputs written to {}", args.output.display());

    if let Some(reference_path) = &args.reference {
        let reference = load_signal_csv(reference_path, &args.channel)?;
        let report = compare_filtered(&reference, &filtered, settings.group_delay())
            .context("Filtered-signal comparison failed")?;
        let thresholds = ComparisonThresholds::default();

        println!("\nBandpass filter comparison:");
        print_metric("MSE", report.mse, thresholds.max_mse, report.mse <= thresholds.max_mse);
        print_metric(
            "CORR",
            report.correlation,
            thresholds.min_correlation,
            report.correlation >= thresholds.min_correlation,
        );
        print_metric(
            "SNR",
            report.snr_db,
            thresholds.min_snr_db,
            report.snr_db >= thresholds.min_snr_db,
        );
        print_metric(
            "PSNR",
            report.psnr_db,
            thresholds.min_psnr_db,
            report.psnr_db >= thresholds.min_psnr_db,
        );
        println!(
            "\nOVERALL: {}",
            if report.passes(&thresholds) { "PASS" } else { "FAIL" }
        );
    }

    Ok(())
}

fn print_metric(name: &str, value: f64, threshold: f64, passed: bool) {
    println!(
        "{:<10}: {:.4} (threshold: {}) {}",
        name,
        value,
        threshold,
        if passed { "PASS" } else { "FAIL" }
    );
}

fn write_stages(
    path: &Path,
    raw: &[f64],
    filtered: &[f64],
    deriv: &[f64],
    normalized: &[f64],
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["index", "raw", "filtered", "derivative", "normalized"])?;
    for i in 0..raw.len() {
        writer.write_record(&[
            i.to_string(),
            raw[i].to_string(),
            filtered[i].to_string(),
            deriv[i].to_string(),
            normalized[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
