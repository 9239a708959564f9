//! Output formats for generated schedules.
//!
//! The schedule itself is never changed here; these functions only read
//! the fields the simulator produced.

use crate::config::OutputFormat;
use crate::{Result, ScheduleDay, ScheduleResult};
use chrono::Datelike;
use std::fmt::Write as _;
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    index: usize,
    date: String,
    weekday: String,
    dose_ml: f64,
    pickup: bool,
}

impl From<&ScheduleDay> for CsvRow {
    fn from(day: &ScheduleDay) -> Self {
        CsvRow {
            index: day.index,
            date: day.date.to_string(),
            weekday: day.date.weekday().to_string(),
            dose_ml: day.dose,
            pickup: day.is_pickup_day,
        }
    }
}

/// Format a dose without a trailing ".0" for whole millilitres
pub fn format_dose(dose: f64) -> String {
    if dose.fract() == 0.0 {
        format!("{:.0}", dose)
    } else {
        let text = format!("{:.2}", dose);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        // A nonzero dose never prints as 0
        if text == "0" || text == "-0" {
            format!("{}", dose)
        } else {
            text.to_string()
        }
    }
}

/// Human-readable table, one line per day
pub fn table(schedule: &ScheduleResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Prescription Schedule");
    let _ = writeln!(out, "{} to {}", schedule.anchor, schedule.end_date());
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<14} {:>10}  {}", "Date", "Dose (mL)", "Available For Pickup");
    let _ = writeln!(out, "{}", "─".repeat(48));

    for day in schedule {
        let _ = writeln!(
            out,
            "{:<14} {:>10}  {}",
            day.date.format("%a, %b %-d").to_string(),
            format!("{} mL", format_dose(day.dose)),
            if day.is_pickup_day { "Yes" } else { "No" }
        );
    }

    let _ = writeln!(out, "{}", "─".repeat(48));
    let _ = writeln!(
        out,
        "{:<14} {:>10}  {} pickup day(s)",
        "Total",
        format!("{} mL", format_dose(schedule.total_dose())),
        schedule.pickup_days().count()
    );

    out
}

/// Write the schedule as CSV with a header row
pub fn write_csv<W: Write>(schedule: &ScheduleResult, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    for day in schedule {
        writer.serialize(CsvRow::from(day))?;
    }

    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON of the whole schedule
pub fn to_json(schedule: &ScheduleResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(schedule)?)
}

/// Render in the requested format
pub fn render(schedule: &ScheduleResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table(schedule)),
        OutputFormat::Json => to_json(schedule),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(schedule, &mut buf)?;
            String::from_utf8(buf)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
        }
    }
}
