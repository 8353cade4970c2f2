use clap::Parser;
use std::path::PathBuf;

/// Validate detected QRS peaks against reference ECG annotations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing <record>.ann.csv, <record>_qrs_locs.txt and
    /// optionally <record>.csv signal files
    #[arg(help = "Directory containing annotation, detection and signal files")]
    pub data_dir: PathBuf,

    /// Records to validate (comma separated); defaults to every record
    /// with a detection file in the data directory
    #[arg(long, value_delimiter = ',')]
    pub records: Vec<String>,

    /// Matching tolerance in milliseconds
    #[arg(long, default_value = "100.0")]
    pub tolerance_ms: f64,

    /// Sampling frequency in Hz
    #[arg(long, default_value = "360.0")]
    pub sample_rate: f64,

    /// Refine detected peaks to the local maximum of the bandpass-filtered
    /// signal before matching (requires <record>.csv)
    #[arg(long)]
    pub refine: bool,

    /// Half-window for peak refinement, in samples
    #[arg(long, default_value = "15")]
    pub refine_window: usize,

    /// Signal channel used for refinement
    #[arg(long, default_value = "MLII")]
    pub channel: String,

    /// Bandpass low cutoff in Hz
    #[arg(long, default_value = "5.0")]
    pub lowcut: f64,

    /// Bandpass high cutoff in Hz
    #[arg(long, default_value = "15.0")]
    pub highcut: f64,

    /// Bandpass filter length in taps (must be odd)
    #[arg(long, default_value = "101")]
    pub num_taps: usize,

    /// CSV output path for the validation summary
    #[arg(long)]
    pub csv_output: Option<String>,
}
