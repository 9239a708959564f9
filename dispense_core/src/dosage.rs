//! Dosage strategies for each regimen.
//!
//! This module maps a regimen onto the rule that gives a single day's dose:
//! - Stabilisation: the configured dosage, every day
//! - Increasing: initial dose plus one change per elapsed change period
//! - Reducing: initial dose minus one change per elapsed period, never below zero
//!
//! Variable doses are derived from the days elapsed since the first pickup
//! day alone, so any day's dose can be recomputed in isolation.

use crate::{PrescriptionConfig, Regimen, ScheduleDay};
use chrono::NaiveDate;

/// Which way a variable regimen moves the dose
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Pure per-day dose rule selected from a prescription
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DoseStrategy {
    Constant {
        dosage: f64,
    },
    Variable {
        initial_daily_dose: f64,
        change_frequency_days: u32,
        change_amount: f64,
        direction: Direction,
    },
}

impl DoseStrategy {
    /// Pick the dose rule for a validated prescription
    pub fn select(config: &PrescriptionConfig) -> Self {
        let strategy = match config.regimen {
            Regimen::Stabilisation { dosage } => DoseStrategy::Constant { dosage },
            Regimen::Increasing(params) => DoseStrategy::Variable {
                initial_daily_dose: params.initial_daily_dose,
                change_frequency_days: params.change_frequency_days,
                change_amount: params.change_amount,
                direction: Direction::Up,
            },
            Regimen::Reducing(params) => DoseStrategy::Variable {
                initial_daily_dose: params.initial_daily_dose,
                change_frequency_days: params.change_frequency_days,
                change_amount: params.change_amount,
                direction: Direction::Down,
            },
        };

        tracing::debug!("Selected {:?} for {} regimen", strategy, config.regimen.kind());
        strategy
    }

    /// Dose for `date`, given the first pickup day seen so far (if any).
    ///
    /// Before the first pickup day the variable rule returns the initial dose.
    pub fn dose(&self, date: NaiveDate, first_pickup: Option<&ScheduleDay>) -> f64 {
        match *self {
            DoseStrategy::Constant { dosage } => dosage,
            DoseStrategy::Variable {
                initial_daily_dose,
                change_frequency_days,
                change_amount,
                direction,
            } => {
                let Some(first) = first_pickup else {
                    return initial_daily_dose;
                };

                let days_elapsed = (date - first.date).num_days();
                let changes = change_count(days_elapsed, change_frequency_days) as f64;

                match direction {
                    Direction::Up => initial_daily_dose + change_amount * changes,
                    Direction::Down => (initial_daily_dose - change_amount * changes).max(0.0),
                }
            }
        }
    }
}

/// Number of completed change periods after `days_elapsed` days
pub fn change_count(days_elapsed: i64, change_frequency_days: u32) -> i64 {
    let frequency = i64::from(change_frequency_days.max(1));
    days_elapsed.max(0) / frequency
}
