use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use dispense_core::render::render;
use dispense_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dispense")]
#[command(about = "Medication pickup and dosage schedule planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the 14-day pickup schedule
    Schedule {
        #[command(flatten)]
        prescription: PrescriptionArgs,

        /// First day of the schedule (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Holiday calendar (england-and-wales, none)
        #[arg(long)]
        holidays: Option<CalendarKind>,

        /// Output format (table, json, csv)
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Check a prescription and report every problem
    Validate {
        #[command(flatten)]
        prescription: PrescriptionArgs,
    },

    /// List the bank holidays of a year
    Holidays {
        /// Year to list, defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// Holiday calendar (england-and-wales, none)
        #[arg(long)]
        calendar: Option<CalendarKind>,
    },

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct PrescriptionArgs {
    /// Prescription file (.toml or .json)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pickup days, comma separated (e.g. mon,fri or 1,5 with 0 = Sunday)
    #[arg(long, value_delimiter = ',', conflicts_with = "file")]
    days: Vec<String>,

    /// Regimen: stabilisation, increasing or reducing
    #[arg(long, conflicts_with = "file")]
    regimen: Option<String>,

    /// Constant daily dose in ml (stabilisation)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "file")]
    dosage: Option<f64>,

    /// Starting daily dose in ml (increasing/reducing)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "file")]
    initial_dose: Option<f64>,

    /// Days between dose changes (increasing/reducing)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "file")]
    change_frequency: Option<f64>,

    /// Dose change in ml per period (increasing/reducing)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "file")]
    change_amount: Option<f64>,
}

impl PrescriptionArgs {
    fn to_raw(&self) -> Result<RawPrescription> {
        if let Some(ref path) = self.file {
            return prescription::read_raw(path);
        }

        let days_of_week = self
            .days
            .iter()
            .map(|day| match day.trim().parse::<i64>() {
                Ok(index) => WeekdayInput::Index(index),
                Err(_) => WeekdayInput::Name(day.trim().to_string()),
            })
            .collect();

        Ok(RawPrescription {
            days_of_week,
            regimen_kind: self.regimen.clone(),
            dosage: self.dosage,
            initial_daily_dose: self.initial_dose,
            change_frequency_days: self.change_frequency,
            change_amount: self.change_amount,
        })
    }

    /// Validate, printing every violation before failing
    fn load(&self) -> Result<PrescriptionConfig> {
        let raw = self.to_raw()?;
        match raw.validate() {
            Ok(config) => Ok(config),
            Err(err) => {
                eprintln!("Prescription validation errors:");
                for violation in err.violations() {
                    eprintln!("  - {}", violation);
                }
                Err(Error::Validation(err))
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dispense_core::logging::init(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Schedule {
            prescription,
            start,
            holidays,
            format,
        } => cmd_schedule(&prescription, start, holidays, format, config_path),
        Commands::Validate { prescription } => cmd_validate(&prescription),
        Commands::Holidays { year, calendar } => cmd_holidays(year, calendar, config_path),
        Commands::InitConfig { force } => cmd_init_config(config_path, force),
    }
}

/// Only commands that depend on the config read it
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load_from(path),
        Some(path) => {
            tracing::info!("No config file at {:?}, using defaults", path);
            Ok(Config::default())
        }
        None => Config::load(),
    }
}

fn cmd_schedule(
    prescription: &PrescriptionArgs,
    start: Option<NaiveDate>,
    calendar: Option<CalendarKind>,
    format: Option<OutputFormat>,
    config_path: Option<&Path>,
) -> Result<()> {
    let prescription = prescription.load()?;
    let config = load_config(config_path)?;

    // Today is read once, here, and nowhere else
    let anchor = start.unwrap_or_else(|| SystemClock.today());
    let holidays = config.holidays.holidays(calendar);

    tracing::debug!(
        "Scheduling from {} with {} calendar, {} extra closure(s) and {} reopened date(s)",
        anchor,
        holidays.calendar,
        holidays.extra.len(),
        holidays.open.len()
    );

    let schedule = generate_schedule(&prescription, anchor, &holidays)?;
    let output = render(&schedule, format.unwrap_or(config.output.format))?;
    print!("{}", output);

    Ok(())
}

fn cmd_validate(prescription: &PrescriptionArgs) -> Result<()> {
    let prescription = prescription.load()?;

    let days: Vec<String> = prescription
        .days_of_week
        .iter()
        .map(|d| d.to_string())
        .collect();

    println!("✓ Prescription is valid");
    println!("  Regimen: {}", prescription.regimen.kind());
    println!("  Pickup days: {}", days.join(", "));
    match prescription.regimen {
        Regimen::Stabilisation { dosage } => {
            println!("  Dosage: {} ml", render::format_dose(dosage));
        }
        Regimen::Increasing(params) | Regimen::Reducing(params) => {
            println!(
                "  Initial daily dose: {} ml",
                render::format_dose(params.initial_daily_dose)
            );
            println!(
                "  Change: {} ml every {} day(s)",
                render::format_dose(params.change_amount),
                params.change_frequency_days
            );
        }
    }

    Ok(())
}

fn cmd_holidays(
    year: Option<i32>,
    calendar: Option<CalendarKind>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let year = year.unwrap_or_else(|| SystemClock.today().year());
    let calendar = calendar.unwrap_or(config.holidays.calendar);

    println!("{} bank holidays ({})", year, calendar);
    for holiday in calendar.holidays_in_year(year) {
        println!(
            "  {}  {}  {}",
            holiday.date,
            holiday.date.weekday(),
            holiday.name
        );
    }

    let extra: Vec<_> = config
        .holidays
        .extra
        .iter()
        .filter(|d| d.year() == year)
        .collect();
    if !extra.is_empty() {
        println!("Additional closures");
        for date in extra {
            println!("  {}  {}", date, date.weekday());
        }
    }

    let open: Vec<_> = config
        .holidays
        .open
        .iter()
        .filter(|d| d.year() == year)
        .collect();
    if !open.is_empty() {
        println!("Kept open");
        for date in open {
            println!("  {}  {}", date, date.weekday());
        }
    }

    Ok(())
}

fn cmd_init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };

    // Existing file is replaced without being parsed
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("  Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("✓ Wrote default config to {}", path.display());

    Ok(())
}
