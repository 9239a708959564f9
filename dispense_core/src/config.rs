//! Configuration file support for dispense.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/dispense/config.toml`.

use crate::holidays::{CalendarKind, HolidayList, Holidays};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub holidays: HolidayConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Which dates are closed for pickup
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct HolidayConfig {
    #[serde(default)]
    pub calendar: CalendarKind,

    /// Additional closure dates, e.g. one-off bank holidays
    #[serde(default)]
    pub extra: Vec<NaiveDate>,

    /// Dates to keep open even if the calendar closes them
    #[serde(default)]
    pub open: Vec<NaiveDate>,
}

impl HolidayConfig {
    /// Build the holiday oracle, optionally replacing the configured calendar
    pub fn holidays(&self, calendar_override: Option<CalendarKind>) -> Holidays {
        Holidays::new(
            calendar_override.unwrap_or(self.calendar),
            HolidayList::new(self.extra.iter().copied()),
        )
        .with_open(HolidayList::new(self.open.iter().copied()))
    }
}

/// Rendering format for generated schedules
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => f.write_str("table"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "Unknown output format '{}', expected table, json or csv",
                other
            )),
        }
    }
}

/// Output configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME").map_err(|_| {
                    Error::Config("Neither a config directory nor HOME is available".into())
                })?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("dispense").join("config.toml"))
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holidays::HolidayCalendar;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.holidays.calendar, CalendarKind::EnglandAndWales);
        assert!(config.holidays.extra.is_empty());
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.holidays.extra = vec![NaiveDate::from_ymd_opt(2025, 5, 8).unwrap()];
        config.output.format = OutputFormat::Csv;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.holidays.extra, parsed.holidays.extra);
        assert_eq!(parsed.output.format, OutputFormat::Csv);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[holidays]
calendar = "none"
extra = ["2025-05-08"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.holidays.calendar, CalendarKind::None);
        assert_eq!(config.output.format, OutputFormat::Table); // default

        let holidays = config.holidays.holidays(None);
        assert!(holidays.is_holiday(NaiveDate::from_ymd_opt(2025, 5, 8).unwrap()));
        assert!(!holidays.is_holiday(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()));

        let overridden = config.holidays.holidays(Some(CalendarKind::EnglandAndWales));
        assert!(overridden.is_holiday(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()));
    }

    #[test]
    fn test_open_dates_reopen_calendar_holidays() {
        let toml_str = r#"
[holidays]
open = ["2025-05-05"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let holidays = config.holidays.holidays(None);

        assert!(!holidays.is_holiday(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()));
        assert!(holidays.is_holiday(NaiveDate::from_ymd_opt(2025, 5, 26).unwrap()));
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.format = OutputFormat::Json;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\nformat = \"pdf\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }
}
