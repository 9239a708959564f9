//! Schedule simulator producing the 14-day pickup plan.
//!
//! The simulator walks the window one day at a time:
//! - A day is a pickup day when its weekday is selected and it is not a holiday
//! - Every day gets a dose from the regimen's strategy, pickup day or not
//! - A pickup day dispenses its own dose
//! - A non-pickup day's dose is added to the most recent earlier pickup day
//!
//! Days before the first pickup day have nowhere to carry their dose, so it
//! is dropped. The window is a hard cutoff: trailing non-pickup days still
//! carry onto the last pickup day inside it.

use crate::clock::Clock;
use crate::dosage::DoseStrategy;
use crate::error::{ValidationError, Violation};
use crate::holidays::HolidayCalendar;
use crate::{PrescriptionConfig, ScheduleDay, ScheduleResult, WeekdaySet, SCHEDULE_DAYS};
use chrono::{Datelike, Duration, NaiveDate};

/// Generate the schedule starting at `anchor`.
///
/// The prescription is re-validated first; on failure nothing is simulated
/// and every violation is returned.
pub fn generate_schedule(
    config: &PrescriptionConfig,
    anchor: NaiveDate,
    holidays: &dyn HolidayCalendar,
) -> Result<ScheduleResult, ValidationError> {
    config.validate()?;

    if anchor
        .checked_add_signed(Duration::days(SCHEDULE_DAYS as i64 - 1))
        .is_none()
    {
        return Err(ValidationError::new(vec![Violation::new(
            "anchorDate",
            format!("Schedule starting {} runs past the last supported date", anchor),
        )]));
    }

    let strategy = DoseStrategy::select(config);
    let schedule = simulate(&strategy, config.days_of_week, anchor, holidays);

    tracing::info!(
        "Generated {} schedule from {} to {}: {} pickup day(s), {} ml total",
        config.regimen.kind(),
        schedule.anchor,
        schedule.end_date(),
        schedule.pickup_days().count(),
        schedule.total_dose()
    );

    Ok(schedule)
}

/// Generate the schedule anchored at the clock's today.
///
/// The clock is read exactly once.
pub fn generate_schedule_from(
    config: &PrescriptionConfig,
    clock: &dyn Clock,
    holidays: &dyn HolidayCalendar,
) -> Result<ScheduleResult, ValidationError> {
    let anchor = clock.today();
    generate_schedule(config, anchor, holidays)
}

/// Whether medication can be collected on `date`
pub fn is_pickup_day(
    date: NaiveDate,
    pickup_days: WeekdaySet,
    holidays: &dyn HolidayCalendar,
) -> bool {
    pickup_days.contains(date.weekday()) && !holidays.is_holiday(date)
}

/// Run the day-by-day simulation.
///
/// The caller must ensure `anchor + 13 days` is representable.
pub fn simulate(
    strategy: &DoseStrategy,
    pickup_days: WeekdaySet,
    anchor: NaiveDate,
    holidays: &dyn HolidayCalendar,
) -> ScheduleResult {
    let mut days: [ScheduleDay; SCHEDULE_DAYS] = std::array::from_fn(|index| {
        let date = anchor + Duration::days(index as i64);
        ScheduleDay {
            index,
            date,
            is_pickup_day: is_pickup_day(date, pickup_days, holidays),
            dose: 0.0,
        }
    });

    let mut first_pickup: Option<usize> = None;
    let mut last_pickup: Option<usize> = None;

    for index in 0..SCHEDULE_DAYS {
        let date = days[index].date;
        let dose = strategy.dose(date, first_pickup.map(|first| &days[first]));

        if days[index].is_pickup_day {
            days[index].dose = dose;
            first_pickup.get_or_insert(index);
            last_pickup = Some(index);
            tracing::debug!("Day {} ({}): pickup, own dose {}", index, date, dose);
        } else if let Some(last) = last_pickup {
            days[last].dose += dose;
            tracing::debug!(
                "Day {} ({}): carried {} onto day {} (now {})",
                index,
                date,
                dose,
                last,
                days[last].dose
            );
        } else {
            tracing::debug!(
                "Day {} ({}): before first pickup, dose {} dropped",
                index,
                date,
                dose
            );
        }
    }

    ScheduleResult { anchor, days }
}
