#![forbid(unsafe_code)]

//! Core domain model and business logic for the dispense scheduler.
//!
//! This crate provides:
//! - Domain types (weekday sets, regimens, prescriptions, schedule days)
//! - Prescription validation
//! - Dosage strategies and the 14-day schedule simulator
//! - Holiday calendars and date sources
//! - Prescription file loading, rendering and configuration

pub mod types;
pub mod error;
pub mod validation;
pub mod dosage;
pub mod holidays;
pub mod clock;
pub mod schedule;
pub mod prescription;
pub mod render;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result, ValidationError, Violation};
pub use types::*;
pub use config::{Config, OutputFormat};
pub use dosage::DoseStrategy;
pub use holidays::{CalendarKind, EnglandAndWales, HolidayCalendar, HolidayList, Holidays, NoHolidays};
pub use clock::{Clock, FixedClock, SystemClock};
pub use schedule::{generate_schedule, generate_schedule_from};
