//! Core domain types for the dispensing schedule.
//!
//! This module defines the fundamental types used throughout the system:
//! - Weekday sets for pickup days
//! - Regimens (constant, increasing, reducing) and the validated prescription
//! - The raw, form-shaped prescription as it arrives from files or flags
//! - Schedule days and the fixed 14-day schedule result

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of calendar days in every generated schedule
pub const SCHEDULE_DAYS: usize = 14;

/// Upper bound for any dose field, in millilitres
pub const MAX_DOSE_ML: f64 = 60.0;

/// Minimum number of distinct pickup weekdays
pub const MIN_PICKUP_DAYS: usize = 2;

// ============================================================================
// Weekdays
// ============================================================================

/// Convert a Sunday-based index (0=Sunday..6=Saturday) into a weekday
pub fn weekday_from_index(index: i64) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Set of pickup weekdays, stored as a bitmask indexed from Sunday
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Every day of the week
    pub fn all() -> Self {
        Self(0b0111_1111)
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_sunday()
    }

    /// Add a day; returns false if it was already present
    pub fn insert(&mut self, day: Weekday) -> bool {
        let present = self.contains(day);
        self.0 |= Self::bit(day);
        !present
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Days in Sunday-first order
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7)
            .filter_map(weekday_from_index)
            .filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// A weekday as written in a prescription: index (0=Sunday) or English name.
///
/// Whole-number floats such as `1.0` count as indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeekdayInput {
    Index(i64),
    Number(f64),
    Name(String),
}

impl WeekdayInput {
    pub fn to_weekday(&self) -> Option<Weekday> {
        match self {
            WeekdayInput::Index(index) => weekday_from_index(*index),
            WeekdayInput::Number(value) if value.is_finite() && value.fract() == 0.0 => {
                weekday_from_index(*value as i64)
            }
            WeekdayInput::Number(_) => None,
            WeekdayInput::Name(name) => Weekday::from_str(name.trim()).ok(),
        }
    }
}

impl From<Weekday> for WeekdayInput {
    fn from(day: Weekday) -> Self {
        WeekdayInput::Index(i64::from(day.num_days_from_sunday()))
    }
}

// ============================================================================
// Regimens
// ============================================================================

/// Tag naming the dosage-evolution rule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegimenKind {
    Stabilisation,
    Increasing,
    Reducing,
}

impl fmt::Display for RegimenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegimenKind::Stabilisation => "Stabilisation",
            RegimenKind::Increasing => "Increasing",
            RegimenKind::Reducing => "Reducing",
        };
        f.write_str(name)
    }
}

impl FromStr for RegimenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stabilisation" | "stabilization" => Ok(RegimenKind::Stabilisation),
            "increasing" => Ok(RegimenKind::Increasing),
            "reducing" => Ok(RegimenKind::Reducing),
            other => Err(format!(
                "Unknown prescription type '{}', expected Stabilisation, Increasing or Reducing",
                other
            )),
        }
    }
}

/// Parameters shared by the increasing and reducing regimens
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariableDose {
    pub initial_daily_dose: f64,
    pub change_frequency_days: u32,
    pub change_amount: f64,
}

/// Dosage-evolution rule with its regimen-specific payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Regimen {
    Stabilisation { dosage: f64 },
    Increasing(VariableDose),
    Reducing(VariableDose),
}

impl Regimen {
    pub fn kind(&self) -> RegimenKind {
        match self {
            Regimen::Stabilisation { .. } => RegimenKind::Stabilisation,
            Regimen::Increasing(_) => RegimenKind::Increasing,
            Regimen::Reducing(_) => RegimenKind::Reducing,
        }
    }
}

// ============================================================================
// Prescriptions
// ============================================================================

/// A validated prescription.
///
/// Construct one through [`RawPrescription::validate`] (or by deserialising,
/// which goes through the same validation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPrescription", into = "RawPrescription")]
pub struct PrescriptionConfig {
    pub days_of_week: WeekdaySet,
    pub regimen: Regimen,
}

/// Prescription as submitted, before any rule has been checked.
///
/// Every regimen field is optional here; which ones must be present depends
/// on `regimen_kind`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrescription {
    #[serde(default, alias = "days_of_week")]
    pub days_of_week: Vec<WeekdayInput>,

    #[serde(
        default,
        alias = "prescriptionType",
        alias = "regimen_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub regimen_kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<f64>,

    #[serde(
        default,
        alias = "initial_daily_dose",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_daily_dose: Option<f64>,

    #[serde(
        default,
        alias = "changeFrequency",
        alias = "change_frequency_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub change_frequency_days: Option<f64>,

    #[serde(default, alias = "change_amount", skip_serializing_if = "Option::is_none")]
    pub change_amount: Option<f64>,
}

impl From<PrescriptionConfig> for RawPrescription {
    fn from(config: PrescriptionConfig) -> Self {
        let mut raw = RawPrescription {
            days_of_week: config.days_of_week.iter().map(WeekdayInput::from).collect(),
            regimen_kind: Some(config.regimen.kind().to_string()),
            ..Default::default()
        };

        match config.regimen {
            Regimen::Stabilisation { dosage } => raw.dosage = Some(dosage),
            Regimen::Increasing(params) | Regimen::Reducing(params) => {
                raw.initial_daily_dose = Some(params.initial_daily_dose);
                raw.change_frequency_days = Some(f64::from(params.change_frequency_days));
                raw.change_amount = Some(params.change_amount);
            }
        }

        raw
    }
}

// ============================================================================
// Schedule Types
// ============================================================================

/// One calendar day of the generated schedule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    /// Offset from the anchor date (0..13)
    pub index: usize,
    pub date: NaiveDate,
    pub is_pickup_day: bool,
    /// Amount dispensed on this date; always 0 on non-pickup days
    pub dose: f64,
}

/// The 14 consecutive days starting at the anchor date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub anchor: NaiveDate,
    pub days: [ScheduleDay; SCHEDULE_DAYS],
}

impl ScheduleResult {
    /// Last date covered by the window (anchor + 13 days)
    pub fn end_date(&self) -> NaiveDate {
        self.anchor + Duration::days(SCHEDULE_DAYS as i64 - 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleDay> {
        self.days.iter()
    }

    pub fn pickup_days(&self) -> impl Iterator<Item = &ScheduleDay> {
        self.days.iter().filter(|day| day.is_pickup_day)
    }

    /// Sum of every dose dispensed across the window
    pub fn total_dose(&self) -> f64 {
        self.days.iter().map(|day| day.dose).sum()
    }
}

impl<'a> IntoIterator for &'a ScheduleResult {
    type Item = &'a ScheduleDay;
    type IntoIter = std::slice::Iter<'a, ScheduleDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}
