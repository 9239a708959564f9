//! Prescription file loader.
//!
//! Prescriptions are written in the same shape the entry form submits, as
//! either TOML or JSON, and are fully validated on load.

use crate::{Error, PrescriptionConfig, RawPrescription, Result};
use std::path::Path;

/// Read a prescription without validating it
pub fn read_raw(path: &Path) -> Result<RawPrescription> {
    let contents = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    let raw = match extension.as_deref() {
        Some("toml") => toml::from_str(&contents)?,
        Some("json") => serde_json::from_str(&contents)?,
        _ => {
            return Err(Error::Prescription(format!(
                "Unsupported prescription file {:?}, expected .toml or .json",
                path
            )))
        }
    };

    tracing::debug!("Read prescription from {:?}", path);
    Ok(raw)
}

/// Read and validate a prescription file.
///
/// A file that parses but breaks any rule yields [`Error::Validation`] with
/// every violation listed.
pub fn load_from(path: &Path) -> Result<PrescriptionConfig> {
    let raw = read_raw(path)?;
    let config = raw.validate()?;
    tracing::info!(
        "Loaded {} prescription from {:?}",
        config.regimen.kind(),
        path
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Regimen, RegimenKind};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_toml_prescription() {
        crate::logging::init_test();
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "rx.toml",
            r#"
daysOfWeek = ["Monday", "Friday"]
regimenKind = "Reducing"
initialDailyDose = 40
changeFrequencyDays = 7
changeAmount = 2.5
"#,
        );

        let config = load_from(&path).unwrap();
        assert_eq!(config.regimen.kind(), RegimenKind::Reducing);
        assert_eq!(config.days_of_week.len(), 2);
    }

    #[test]
    fn test_load_toml_with_snake_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "rx.toml",
            r#"
days_of_week = [1, 3, 5]
regimen_kind = "Stabilisation"
dosage = 35
"#,
        );

        let config = load_from(&path).unwrap();
        assert_eq!(config.regimen, Regimen::Stabilisation { dosage: 35.0 });
        assert_eq!(config.days_of_week.len(), 3);
    }

    #[test]
    fn test_load_json_prescription() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "rx.json",
            r#"{"daysOfWeek": [0, 2], "prescriptionType": "Increasing",
                "initialDailyDose": 10, "changeFrequency": 3, "changeAmount": 5}"#,
        );

        let config = load_from(&path).unwrap();
        assert_eq!(config.regimen.kind(), RegimenKind::Increasing);
    }

    #[test]
    fn test_invalid_prescription_lists_all_violations() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "rx.json",
            r#"{"daysOfWeek": [1], "regimenKind": "Stabilisation", "initialDailyDose": 10}"#,
        );

        match load_from(&path) {
            Err(Error::Validation(err)) => {
                assert!(err.mentions("At least 2 days"));
                assert!(err.mentions("Dosage is required"));
                assert!(err.mentions("Initial daily dose should not be provided"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "rx.yaml", "dosage: 10");

        assert!(matches!(load_from(&path), Err(Error::Prescription(_))));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "rx.json", "{ not json");

        assert!(matches!(load_from(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(load_from(&path), Err(Error::Io(_))));
    }
}
