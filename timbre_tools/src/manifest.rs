use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Columns we care about; any extra feature columns in the CSV are ignored.
#[derive(Debug, Deserialize)]
struct Row {
    filename: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct ManifestLine {
    audio: String,
    label: usize,
}

#[derive(Debug, Default)]
pub struct ConvertStats {
    pub kept: usize,
    pub skipped_missing_audio: usize,
    pub skipped_unknown_label: usize,
}

/// Convert a `filename,label` CSV into a JSONL manifest, resolving audio
/// paths against `audio_dir` and mapping genre names to class ids via their
/// position in `label_names`. Rows with a missing file or an unknown label
/// are counted and skipped.
pub fn convert(
    csv_path: &Path,
    audio_dir: &Path,
    out_path: &Path,
    label_names: &[String],
) -> Result<ConvertStats> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV: {}", csv_path.display()))?;

    let out_file = File::create(out_path)
        .with_context(|| format!("Failed to create output: {}", out_path.display()))?;
    let mut writer = BufWriter::new(out_file);

    let mut stats = ConvertStats::default();

    for result in rdr.deserialize::<Row>() {
        let row = result.context("Failed to parse a CSV row")?;

        let Some(label) = label_names.iter().position(|n| n == row.label.trim()) else {
            stats.skipped_unknown_label += 1;
            continue;
        };

        let audio_path = audio_dir.join(row.filename.trim());
        if !audio_path.exists() {
            stats.skipped_missing_audio += 1;
            continue;
        }

        let line = ManifestLine {
            audio: audio_path.to_string_lossy().to_string(),
            label,
        };

        serde_json::to_writer(&mut writer, &line)?;
        writer.write_all(b"\n")?;
        stats.kept += 1;
    }

    writer.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_labels_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let audio_dir = dir.path().join("audio");
        std::fs::create_dir_all(&audio_dir).unwrap();
        std::fs::write(audio_dir.join("a.wav"), b"x").unwrap();
        std::fs::write(audio_dir.join("b.wav"), b"x").unwrap();

        let csv_path = dir.path().join("labels.csv");
        std::fs::write(
            &csv_path,
            "filename,length,label\na.wav,3,pop\nb.wav,3,polka\nc.wav,3,metal\n",
        )
        .unwrap();

        let out_path = dir.path().join("out/train.jsonl");
        let names: Vec<String> = ["classical", "pop", "rap", "lofi", "metal"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let stats = convert(&csv_path, &audio_dir, &out_path, &names).unwrap();
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.skipped_unknown_label, 1);
        assert_eq!(stats.skipped_missing_audio, 1);

        let contents = std::fs::read_to_string(&out_path).unwrap();
        let line: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(line["label"], 1);
        assert!(line["audio"].as_str().unwrap().ends_with("a.wav"));
    }
}
