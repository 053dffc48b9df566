//! Reading sample streams from JSON Lines files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use acti_core::{DataPoint, SubjectId};
use anyhow::{Context, Result};

/// Reads one [`DataPoint`] per non-blank line.
pub fn read_samples(path: &Path) -> Result<Vec<DataPoint>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut samples = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let sample: DataPoint = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid sample", path.display(), index + 1))?;
        samples.push(sample);
    }
    tracing::debug!(path = %path.display(), samples = samples.len(), "read samples");
    Ok(samples)
}

/// Subject identifier for a sample file: the explicit one, else the file stem.
pub fn subject_id(path: &Path, explicit: Option<&str>) -> Result<SubjectId> {
    let name = match explicit {
        Some(name) => name.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    SubjectId::new(name).with_context(|| format!("no subject identifier for {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_json_lines_and_skips_blank_lines() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("1001.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"timestamp":"2024-05-01T23:55:00+02:00","sensor_angle":-12.5,"sensor_acceleration":0.02}"#,
                "\n\n",
                r#"{"timestamp":"2024-05-02T00:00:00+02:00","sensor_angle":3.0,"sensor_acceleration":0.0,"non_wear":true}"#,
                "\n",
            ),
        )
        .unwrap();

        let samples = read_samples(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(!samples[0].non_wear);
        assert!(samples[1].non_wear);
        assert_eq!(samples[1].timestamp.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn reports_the_bad_line() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bad.jsonl");
        std::fs::write(&path, "{\"timestamp\":\"not a time\"}\n").unwrap();

        let err = read_samples(&path).unwrap_err();
        assert!(format!("{err}").ends_with("bad.jsonl:1: invalid sample"));
    }

    #[test]
    fn subject_id_defaults_to_file_stem() {
        let path = Path::new("/data/output_1001.jsonl");
        assert_eq!(subject_id(path, None).unwrap().as_str(), "output_1001");
        assert_eq!(subject_id(path, Some("P7")).unwrap().as_str(), "P7");
        assert!(subject_id(path, Some(" ")).is_err());
    }
}
