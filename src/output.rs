use crate::scoring::Scorecard;
use anyhow::Result;
use std::path::Path;

/// Validation result for one record of a batch run.
#[derive(Debug, Clone)]
pub struct RecordScore {
    pub record: String,
    pub score: Scorecard,
}

/// Write the per-record validation summary as CSV.
pub fn write_summary_csv(base_path: &str, scores: &[RecordScore]) -> Result<()> {
    let path = Path::new(base_path);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    println!("Writing validation summary to {}", path.display());
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "record",
        "reference",
        "detected",
        "tp",
        "fp",
        "fn",
        "sensitivity",
        "ppv",
        "f1",
    ])?;

    for entry in scores {
        let s = &entry.score;
        writer.write_record(&[
            entry.record.clone(),
            s.reference_total.to_string(),
            s.detected_total.to_string(),
            s.true_positives.to_string(),
            s.false_positives.to_string(),
            s.false_negatives.to_string(),
            format!("{:.4}", s.sensitivity),
            format!("{:.4}", s.precision),
            format!("{:.4}", s.f1),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Print the per-record results as an aligned table, followed by batch
/// averages.
pub fn print_summary(scores: &[RecordScore]) {
    if scores.is_empty() {
        println!("No records were scored");
        return;
    }

    println!(
        "{:<8} {:>5} {:>5} {:>5} {:>5} {:>5} {:>8} {:>8} {:>8}",
        "Record", "Ref", "Det", "TP", "FP", "FN", "Sens", "PPV", "F1"
    );
    for entry in scores {
        let s = &entry.score;
        println!(
            "{:<8} {:>5} {:>5} {:>5} {:>5} {:>5} {:>8.4} {:>8.4} {:>8.4}",
            entry.record,
            s.reference_total,
            s.detected_total,
            s.true_positives,
            s.false_positives,
            s.false_negatives,
            s.sensitivity,
            s.precision,
            s.f1
        );
    }

    let n = scores.len() as f64;
    let avg_sens = scores.iter().map(|e| e.score.sensitivity).sum::<f64>() / n;
    let avg_ppv = scores.iter().map(|e| e.score.precision).sum::<f64>() / n;
    let avg_f1 = scores.iter().map(|e| e.score.f1).sum::<f64>() / n;

    println!("\nAverage Sensitivity: {:.4}", avg_sens);
    println!("Average PPV (Precision): {:.4}", avg_ppv);
    println!("Average F1 Score: {:.4}", avg_f1);
}
