//! Holiday calendars deciding which dates are closed for pickup.
//!
//! The scheduler only asks one question, "is this date a holiday?", through
//! [`HolidayCalendar`]. Calendars here:
//! - [`NoHolidays`]: every date is open
//! - [`EnglandAndWales`]: rule-based bank holidays, computed for the year of
//!   the date asked about, so windows crossing New Year stay correct
//! - [`HolidayList`]: an explicit set of dates
//! - [`Holidays`]: a named calendar plus extra dates, as configured

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Oracle answering whether a date is a non-pickup holiday.
///
/// Implementations must give the same answer for the same date every time.
pub trait HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl<F> HolidayCalendar for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Calendar with no holidays at all
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// A named holiday on a specific date
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: &'static str,
}

/// Bank holidays of England and Wales.
///
/// Fixed-date holidays falling on a weekend keep their own date and also
/// get the weekday substitute. Proclaimed moves and one-off holidays
/// (jubilees, coronations, VE day anniversaries) come from [`PROCLAMATIONS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EnglandAndWales;

impl EnglandAndWales {
    pub fn holidays_in_year(&self, year: i32) -> Vec<Holiday> {
        let mut holidays = Vec::new();
        let mut push = |date: Option<NaiveDate>, name: &'static str| {
            if let Some(date) = date {
                holidays.push(Holiday { date, name });
            }
        };

        if let Some(new_year) = NaiveDate::from_ymd_opt(year, 1, 1) {
            push(Some(new_year), "New Year's Day");
            if is_weekend(new_year) {
                push(next_weekday(new_year), "New Year's Day (substitute day)");
            }
        }

        if let Some(easter) = easter_sunday(year) {
            push(easter.checked_sub_signed(Duration::days(2)), "Good Friday");
            push(easter.checked_add_signed(Duration::days(1)), "Easter Monday");
        }

        push(
            NaiveDate::from_weekday_of_month_opt(year, 5, Weekday::Mon, 1),
            "Early May bank holiday",
        );
        push(last_weekday_of_month(year, 5, Weekday::Mon), "Spring bank holiday");
        push(last_weekday_of_month(year, 8, Weekday::Mon), "Summer bank holiday");

        if let (Some(christmas), Some(boxing)) = (
            NaiveDate::from_ymd_opt(year, 12, 25),
            NaiveDate::from_ymd_opt(year, 12, 26),
        ) {
            push(Some(christmas), "Christmas Day");
            push(Some(boxing), "Boxing Day");
            // Weekend substitutes fall on the 27th and 28th
            if is_weekend(christmas) {
                push(NaiveDate::from_ymd_opt(year, 12, 27), "Christmas Day (substitute day)");
            }
            if is_weekend(boxing) {
                push(NaiveDate::from_ymd_opt(year, 12, 28), "Boxing Day (substitute day)");
            }
        }

        for proclamation in PROCLAMATIONS.iter().filter(|p| p.year == year) {
            if let Some(moved) = proclamation.replaces {
                holidays.retain(|h| (h.date.month(), h.date.day()) != moved);
            }
            if let Some(date) = NaiveDate::from_ymd_opt(year, proclamation.month, proclamation.day) {
                holidays.push(Holiday {
                    date,
                    name: proclamation.name,
                });
            }
        }

        holidays.sort_by_key(|h| h.date);
        holidays
    }
}

/// A holiday set by royal proclamation rather than by the usual rules
#[derive(Clone, Copy, Debug)]
pub struct Proclamation {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub name: &'static str,
    /// Rule-based holiday (month, day) it moves, if any
    pub replaces: Option<(u32, u32)>,
}

const fn proclaimed(
    year: i32,
    month: u32,
    day: u32,
    name: &'static str,
    replaces: Option<(u32, u32)>,
) -> Proclamation {
    Proclamation {
        year,
        month,
        day,
        name,
        replaces,
    }
}

/// Moved and additional England and Wales bank holidays
pub const PROCLAMATIONS: &[Proclamation] = &[
    proclaimed(1995, 5, 8, "Early May bank holiday (VE day)", Some((5, 1))),
    proclaimed(1999, 12, 31, "Millennium celebrations", None),
    proclaimed(2002, 6, 3, "Golden Jubilee", None),
    proclaimed(2002, 6, 4, "Spring bank holiday", Some((5, 27))),
    proclaimed(2011, 4, 29, "Royal wedding", None),
    proclaimed(2012, 6, 4, "Spring bank holiday", Some((5, 28))),
    proclaimed(2012, 6, 5, "Diamond Jubilee", None),
    proclaimed(2020, 5, 8, "Early May bank holiday (VE day)", Some((5, 4))),
    proclaimed(2022, 6, 2, "Spring bank holiday", Some((5, 30))),
    proclaimed(2022, 6, 3, "Platinum Jubilee", None),
    proclaimed(2022, 9, 19, "State Funeral of Queen Elizabeth II", None),
    proclaimed(2023, 5, 8, "Coronation of King Charles III", None),
];

impl HolidayCalendar for EnglandAndWales {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays_in_year(date.year())
            .iter()
            .any(|holiday| holiday.date == date)
    }
}

/// Explicit set of holiday dates
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HolidayList {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayList {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl HolidayCalendar for HolidayList {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Named calendars that can be selected from config or the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarKind {
    #[default]
    EnglandAndWales,
    None,
}

impl CalendarKind {
    /// Rule-based holidays for a year (empty for [`CalendarKind::None`])
    pub fn holidays_in_year(&self, year: i32) -> Vec<Holiday> {
        match self {
            CalendarKind::EnglandAndWales => EnglandAndWales.holidays_in_year(year),
            CalendarKind::None => Vec::new(),
        }
    }
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarKind::EnglandAndWales => f.write_str("england-and-wales"),
            CalendarKind::None => f.write_str("none"),
        }
    }
}

impl FromStr for CalendarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "england-and-wales" | "england" | "gb" | "uk" => Ok(CalendarKind::EnglandAndWales),
            "none" => Ok(CalendarKind::None),
            other => Err(format!(
                "Unknown holiday calendar '{}', expected england-and-wales or none",
                other
            )),
        }
    }
}

/// A named calendar combined with extra closures and reopened dates
#[derive(Clone, Debug, Default)]
pub struct Holidays {
    pub calendar: CalendarKind,
    pub extra: HolidayList,
    pub open: HolidayList,
}

impl Holidays {
    pub fn new(calendar: CalendarKind, extra: HolidayList) -> Self {
        Self {
            calendar,
            extra,
            open: HolidayList::default(),
        }
    }

    /// Dates treated as open even when the named calendar closes them
    pub fn with_open(mut self, open: HolidayList) -> Self {
        self.open = open;
        self
    }
}

impl HolidayCalendar for Holidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.extra.is_holiday(date) {
            return true;
        }
        let named = match self.calendar {
            CalendarKind::EnglandAndWales => EnglandAndWales.is_holiday(date),
            CalendarKind::None => false,
        };
        named && !self.open.is_holiday(date)
    }
}

/// Easter Sunday in the Gregorian calendar (anonymous Gregorian algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn next_weekday(date: NaiveDate) -> Option<NaiveDate> {
    let mut next = date.succ_opt()?;
    while is_weekend(next) {
        next = next.succ_opt()?;
    }
    Some(next)
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    let mut day = first_of_next.pred_opt()?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}
