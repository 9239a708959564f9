//! Prescription validation.
//!
//! Every rule is checked independently and all violations are reported
//! together, so a caller can fix the whole prescription in one pass.
//! Nothing is simulated until a prescription passes.

use crate::error::{ValidationError, Violation};
use crate::types::{
    PrescriptionConfig, RawPrescription, Regimen, RegimenKind, VariableDose, WeekdayInput,
    WeekdaySet, MAX_DOSE_ML, MIN_PICKUP_DAYS,
};

impl RawPrescription {
    /// Check every rule and build the typed prescription.
    ///
    /// Rules:
    /// - at least 2 distinct pickup weekdays, each 0..=6 or a day name
    /// - a known regimen kind
    /// - dose fields within 0..=60 ml, change frequency a positive whole number
    /// - exactly the fields the regimen needs are present
    pub fn validate(&self) -> Result<PrescriptionConfig, ValidationError> {
        let mut violations = Vec::new();

        let days_of_week = check_days(&self.days_of_week, &mut violations);

        let kind = match self.regimen_kind.as_deref() {
            None => {
                violations.push(Violation::new(
                    "regimenKind",
                    "Prescription type is required",
                ));
                None
            }
            Some(tag) => match tag.parse::<RegimenKind>() {
                Ok(kind) => Some(kind),
                Err(message) => {
                    violations.push(Violation::new("regimenKind", message));
                    None
                }
            },
        };

        if let Some(dosage) = self.dosage {
            check_dose("dosage", "Dosage", dosage, &mut violations);
        }
        if let Some(initial) = self.initial_daily_dose {
            check_dose("initialDailyDose", "Initial daily dose", initial, &mut violations);
        }
        if let Some(amount) = self.change_amount {
            check_dose("changeAmount", "Change amount", amount, &mut violations);
        }
        let frequency = self
            .change_frequency_days
            .and_then(|frequency| check_raw_frequency(frequency, &mut violations));

        match kind {
            Some(RegimenKind::Stabilisation) => {
                require(self.dosage.is_some(), "dosage", "Dosage", &mut violations);
                forbid(
                    self.initial_daily_dose.is_some(),
                    "initialDailyDose",
                    "Initial daily dose",
                    &mut violations,
                );
                forbid(
                    self.change_frequency_days.is_some(),
                    "changeFrequencyDays",
                    "Change frequency",
                    &mut violations,
                );
                forbid(
                    self.change_amount.is_some(),
                    "changeAmount",
                    "Change amount",
                    &mut violations,
                );
            }
            Some(RegimenKind::Increasing) | Some(RegimenKind::Reducing) => {
                require(
                    self.initial_daily_dose.is_some(),
                    "initialDailyDose",
                    "Initial daily dose",
                    &mut violations,
                );
                require(
                    self.change_frequency_days.is_some(),
                    "changeFrequencyDays",
                    "Change frequency",
                    &mut violations,
                );
                require(
                    self.change_amount.is_some(),
                    "changeAmount",
                    "Change amount",
                    &mut violations,
                );
                forbid(self.dosage.is_some(), "dosage", "Dosage", &mut violations);
            }
            None => {}
        }

        let regimen = match (
            kind,
            self.dosage,
            self.initial_daily_dose,
            frequency,
            self.change_amount,
        ) {
            (Some(RegimenKind::Stabilisation), Some(dosage), None, None, None) => {
                Some(Regimen::Stabilisation { dosage })
            }
            (
                Some(kind),
                None,
                Some(initial_daily_dose),
                Some(change_frequency_days),
                Some(change_amount),
            ) => {
                let params = VariableDose {
                    initial_daily_dose,
                    change_frequency_days,
                    change_amount,
                };
                match kind {
                    RegimenKind::Increasing => Some(Regimen::Increasing(params)),
                    RegimenKind::Reducing => Some(Regimen::Reducing(params)),
                    RegimenKind::Stabilisation => None,
                }
            }
            _ => None,
        };

        match regimen {
            Some(regimen) if violations.is_empty() => Ok(PrescriptionConfig {
                days_of_week,
                regimen,
            }),
            _ => {
                if violations.is_empty() {
                    violations.push(Violation::general(
                        "Prescription fields do not match the prescription type",
                    ));
                }
                tracing::warn!(
                    "Rejected prescription with {} violation(s)",
                    violations.len()
                );
                Err(ValidationError::new(violations))
            }
        }
    }
}

impl PrescriptionConfig {
    /// Re-check the numeric ranges and weekday count of an already typed prescription.
    ///
    /// Presence rules need no runtime check here: the regimen type only
    /// carries the fields it uses.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        check_day_count(self.days_of_week.len(), &mut violations);

        match &self.regimen {
            Regimen::Stabilisation { dosage } => {
                check_dose("dosage", "Dosage", *dosage, &mut violations);
            }
            Regimen::Increasing(params) | Regimen::Reducing(params) => {
                check_dose(
                    "initialDailyDose",
                    "Initial daily dose",
                    params.initial_daily_dose,
                    &mut violations,
                );
                check_dose(
                    "changeAmount",
                    "Change amount",
                    params.change_amount,
                    &mut violations,
                );
                if params.change_frequency_days == 0 {
                    violations.push(Violation::new(
                        "changeFrequencyDays",
                        "Frequency must be a positive number",
                    ));
                }
            }
        }

        match ValidationError::from_violations(violations) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl TryFrom<RawPrescription> for PrescriptionConfig {
    type Error = ValidationError;

    fn try_from(raw: RawPrescription) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

fn check_days(days: &[WeekdayInput], violations: &mut Vec<Violation>) -> WeekdaySet {
    let mut set = WeekdaySet::EMPTY;

    for day in days {
        match day.to_weekday() {
            Some(weekday) => {
                set.insert(weekday);
            }
            None => {
                let message = match day {
                    WeekdayInput::Index(index) => format!(
                        "Day of week must be between 0 (Sunday) and 6 (Saturday), got {}",
                        index
                    ),
                    WeekdayInput::Number(value) => format!(
                        "Day of week must be a whole number between 0 (Sunday) and 6 (Saturday), got {}",
                        value
                    ),
                    WeekdayInput::Name(name) => format!("Unknown day of week '{}'", name),
                };
                violations.push(Violation::new("daysOfWeek", message));
            }
        }
    }

    check_day_count(set.len(), violations);
    set
}

fn check_day_count(count: usize, violations: &mut Vec<Violation>) {
    if count < MIN_PICKUP_DAYS {
        violations.push(Violation::new(
            "daysOfWeek",
            "At least 2 days of the week must be selected",
        ));
    }
}

fn check_dose(field: &'static str, label: &str, value: f64, violations: &mut Vec<Violation>) {
    if !value.is_finite() {
        violations.push(Violation::new(field, format!("{} must be a number", label)));
    } else if value < 0.0 {
        violations.push(Violation::new(
            field,
            format!("{} must be at least 0ml", label),
        ));
    } else if value > MAX_DOSE_ML {
        violations.push(Violation::new(
            field,
            format!("{} cannot exceed {}ml", label, MAX_DOSE_ML),
        ));
    }
}

/// Returns the frequency as whole days when it passes
fn check_raw_frequency(value: f64, violations: &mut Vec<Violation>) -> Option<u32> {
    let mut ok = true;

    if !value.is_finite() || value.fract() != 0.0 {
        violations.push(Violation::new(
            "changeFrequencyDays",
            "Frequency must be a whole number",
        ));
        ok = false;
    }
    if value.is_nan() || value <= 0.0 {
        violations.push(Violation::new(
            "changeFrequencyDays",
            "Frequency must be a positive number",
        ));
        ok = false;
    } else if value.is_finite() && value > f64::from(u32::MAX) {
        violations.push(Violation::new(
            "changeFrequencyDays",
            format!("Frequency cannot exceed {} days", u32::MAX),
        ));
        ok = false;
    }

    if ok {
        Some(value as u32)
    } else {
        None
    }
}

fn require(present: bool, field: &'static str, label: &str, violations: &mut Vec<Violation>) {
    if !present {
        violations.push(Violation::new(
            field,
            format!("{} is required for this prescription type", label),
        ));
    }
}

fn forbid(present: bool, field: &'static str, label: &str, violations: &mut Vec<Violation>) {
    if present {
        violations.push(Violation::new(
            field,
            format!("{} should not be provided for this prescription type", label),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn stabilisation(days: Vec<i64>, dosage: f64) -> RawPrescription {
        RawPrescription {
            days_of_week: days.into_iter().map(WeekdayInput::Index).collect(),
            regimen_kind: Some("Stabilisation".into()),
            dosage: Some(dosage),
            ..Default::default()
        }
    }

    fn variable(kind: &str, initial: f64, frequency: f64, amount: f64) -> RawPrescription {
        RawPrescription {
            days_of_week: vec![WeekdayInput::Index(1), WeekdayInput::Index(5)],
            regimen_kind: Some(kind.into()),
            initial_daily_dose: Some(initial),
            change_frequency_days: Some(frequency),
            change_amount: Some(amount),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_stabilisation() {
        let config = stabilisation(vec![1, 5], 30.0).validate().unwrap();

        assert_eq!(config.regimen, Regimen::Stabilisation { dosage: 30.0 });
        assert!(config.days_of_week.contains(Weekday::Mon));
        assert!(config.days_of_week.contains(Weekday::Fri));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_reducing() {
        let config = variable("Reducing", 30.0, 3.0, 5.0).validate().unwrap();

        assert_eq!(
            config.regimen,
            Regimen::Reducing(VariableDose {
                initial_daily_dose: 30.0,
                change_frequency_days: 3,
                change_amount: 5.0,
            })
        );
    }

    #[test]
    fn test_single_day_rejected() {
        let err = stabilisation(vec![1], 30.0).validate().unwrap_err();
        assert!(err.mentions("At least 2 days of the week must be selected"));
    }

    #[test]
    fn test_duplicate_days_count_once() {
        let err = stabilisation(vec![1, 1], 30.0).validate().unwrap_err();
        assert!(err.mentions("At least 2 days"));
    }

    #[test]
    fn test_out_of_range_day_rejected() {
        let err = stabilisation(vec![1, 5, 7], 30.0).validate().unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.mentions("got 7"));
    }

    #[test]
    fn test_missing_days_rejected() {
        let raw = RawPrescription {
            regimen_kind: Some("Stabilisation".into()),
            dosage: Some(30.0),
            ..Default::default()
        };
        let err = raw.validate().unwrap_err();
        assert_eq!(err.violations()[0].field, Some("daysOfWeek"));
    }

    #[test]
    fn test_unknown_and_missing_regimen_kind() {
        let mut raw = stabilisation(vec![1, 5], 30.0);
        raw.regimen_kind = Some("InvalidType".into());
        assert!(raw.validate().unwrap_err().mentions("Unknown prescription type"));

        raw.regimen_kind = None;
        assert!(raw.validate().unwrap_err().mentions("Prescription type is required"));
    }

    #[test]
    fn test_dose_range_bounds() {
        assert!(stabilisation(vec![1, 5], 0.0).validate().is_ok());
        assert!(stabilisation(vec![1, 5], 60.0).validate().is_ok());
        assert!(stabilisation(vec![1, 5], -1.0)
            .validate()
            .unwrap_err()
            .mentions("Dosage must be at least 0ml"));
        assert!(stabilisation(vec![1, 5], 61.0)
            .validate()
            .unwrap_err()
            .mentions("Dosage cannot exceed 60ml"));
        assert!(stabilisation(vec![1, 5], f64::NAN)
            .validate()
            .unwrap_err()
            .mentions("Dosage must be a number"));
    }

    #[test]
    fn test_frequency_rules() {
        assert!(variable("Increasing", 10.0, 2.5, 5.0)
            .validate()
            .unwrap_err()
            .mentions("Frequency must be a whole number"));
        assert!(variable("Increasing", 10.0, 0.0, 5.0)
            .validate()
            .unwrap_err()
            .mentions("Frequency must be a positive number"));

        let err = variable("Increasing", 10.0, -1.5, 5.0).validate().unwrap_err();
        assert!(err.mentions("whole number"));
        assert!(err.mentions("positive number"));
    }

    #[test]
    fn test_variable_fields_required() {
        let raw = RawPrescription {
            days_of_week: vec![WeekdayInput::Index(0), WeekdayInput::Index(2)],
            regimen_kind: Some("Increasing".into()),
            dosage: Some(10.0),
            ..Default::default()
        };
        let err = raw.validate().unwrap_err();

        assert!(err.mentions("Initial daily dose is required for this prescription type"));
        assert!(err.mentions("Change frequency is required for this prescription type"));
        assert!(err.mentions("Change amount is required for this prescription type"));
        assert!(err.mentions("Dosage should not be provided for this prescription type"));
        assert_eq!(err.violations().len(), 4);
    }

    #[test]
    fn test_stabilisation_reports_every_violation() {
        let raw = RawPrescription {
            days_of_week: vec![WeekdayInput::Index(1), WeekdayInput::Index(5)],
            regimen_kind: Some("Stabilisation".into()),
            initial_daily_dose: Some(10.0),
            ..Default::default()
        };
        let err = raw.validate().unwrap_err();

        assert!(err.mentions("Dosage is required for this prescription type"));
        assert!(err.mentions("Initial daily dose should not be provided for this prescription type"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_independent_rules_all_reported() {
        let raw = RawPrescription {
            days_of_week: vec![WeekdayInput::Name("Funday".into())],
            regimen_kind: Some("Stabilisation".into()),
            dosage: Some(75.0),
            change_amount: Some(-3.0),
            ..Default::default()
        };
        let err = raw.validate().unwrap_err();

        assert!(err.mentions("Unknown day of week 'Funday'"));
        assert!(err.mentions("At least 2 days"));
        assert!(err.mentions("Dosage cannot exceed 60ml"));
        assert!(err.mentions("Change amount must be at least 0ml"));
        assert!(err.mentions("Change amount should not be provided"));
    }

    #[test]
    fn test_fractional_day_is_a_days_of_week_violation() {
        let raw: RawPrescription = serde_json::from_str(
            r#"{"daysOfWeek": [1.0, 5.0, 2.5], "regimenKind": "Stabilisation", "dosage": 20}"#,
        )
        .unwrap();
        let err = raw.validate().unwrap_err();

        assert!(err.mentions("got 2.5"));
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, Some("daysOfWeek"));
    }

    #[test]
    fn test_typed_config_recheck() {
        let config = PrescriptionConfig {
            days_of_week: [Weekday::Mon].into_iter().collect(),
            regimen: Regimen::Increasing(VariableDose {
                initial_daily_dose: 80.0,
                change_frequency_days: 0,
                change_amount: 5.0,
            }),
        };
        let err = config.validate().unwrap_err();

        assert!(err.mentions("At least 2 days"));
        assert!(err.mentions("Initial daily dose cannot exceed 60ml"));
        assert!(err.mentions("Frequency must be a positive number"));
    }

    #[test]
    fn test_deserializing_config_validates() {
        let ok: PrescriptionConfig = serde_json::from_str(
            r#"{"daysOfWeek": ["Monday", "Friday"], "regimenKind": "Stabilisation", "dosage": 20}"#,
        )
        .unwrap();
        assert_eq!(ok.regimen, Regimen::Stabilisation { dosage: 20.0 });

        let err = serde_json::from_str::<PrescriptionConfig>(
            r#"{"daysOfWeek": ["Monday"], "regimenKind": "Stabilisation"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("At least 2 days"));
        assert!(err.to_string().contains("Dosage is required"));
    }

    #[test]
    fn test_typed_round_trip_through_raw() {
        let config = variable("Increasing", 10.0, 3.0, 5.0).validate().unwrap();
        let raw = RawPrescription::from(config.clone());
        assert_eq!(raw.validate().unwrap(), config);
    }
}
