use anyhow::{bail, Context, Result};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One reference annotation: the fiducial sample index plus the symbolic
/// beat label carried by the annotation file.
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    pub sample: usize,
    pub symbol: String,
}

/// Load detected QRS locations from a text file with one sample index
/// per line. Blank lines are skipped.
pub fn load_peak_file(path: &Path) -> Result<Vec<usize>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open peak file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut peaks = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let peak: usize = trimmed.parse().with_context(|| {
            format!(
                "Invalid peak index {:?} on line {} of {}",
                trimmed,
                line_num + 1,
                path.display()
            )
        })?;
        peaks.push(peak);
    }

    debug!("loaded {} detected peaks from {}", peaks.len(), path.display());
    Ok(peaks)
}

/// Load reference annotations from a CSV file with `sample,symbol`
/// columns (the layout produced by the WFDB-to-CSV conversion step).
pub fn load_annotation_csv(path: &Path) -> Result<Vec<Annotation>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open annotation file {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut annotations = Vec::new();
    for record in reader.deserialize() {
        let annotation: Annotation = record
            .with_context(|| format!("Malformed annotation row in {}", path.display()))?;
        annotations.push(annotation);
    }

    debug!(
        "loaded {} reference annotations from {}",
        annotations.len(),
        path.display()
    );
    Ok(annotations)
}

/// Extract the reference peak index list from a set of annotations.
pub fn annotation_samples(annotations: &[Annotation]) -> Vec<usize> {
    annotations.iter().map(|a| a.sample).collect()
}

/// Load one channel of a signal CSV (header row of channel names, one
/// sample per row).
pub fn load_signal_csv(path: &Path, channel: &str) -> Result<Vec<f64>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open signal file {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("Missing header row in {}", path.display()))?
        .clone();
    let Some(column) = headers.iter().position(|name| name == channel) else {
        bail!(
            "Channel {:?} not found in {} (available: {})",
            channel,
            path.display(),
            headers.iter().collect::<Vec<_>>().join(", ")
        );
    };

    let mut samples = Vec::new();
    for (row_num, record) in reader.records().enumerate() {
        let record = record?;
        let field = record.get(column).with_context(|| {
            format!("Row {} of {} is too short", row_num + 1, path.display())
        })?;
        let value: f64 = field.parse().with_context(|| {
            format!(
                "Invalid sample {:?} on row {} of {}",
                field,
                row_num + 1,
                path.display()
            )
        })?;
        samples.push(value);
    }

    debug!(
        "loaded {} samples of channel {} from {}",
        samples.len(),
        channel,
        path.display()
    );
    Ok(samples)
}
