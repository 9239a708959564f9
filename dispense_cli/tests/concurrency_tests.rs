//! Concurrency tests for dispense.
//!
//! Schedule generation keeps no state between calls, so these tests verify:
//! - Threads sharing one prescription and calendar get identical schedules
//! - Parallel CLI processes produce identical output

use assert_cmd::Command;
use chrono::{NaiveDate, Weekday};
use dispense_core::{
    generate_schedule, EnglandAndWales, PrescriptionConfig, Regimen, ScheduleResult, VariableDose,
};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dispense"));
    cmd.arg("--config").arg(dir.path().join("config.toml"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_threads_share_prescription_and_calendar() {
    let config = Arc::new(PrescriptionConfig {
        days_of_week: [Weekday::Mon, Weekday::Wed, Weekday::Fri].into_iter().collect(),
        regimen: Regimen::Increasing(VariableDose {
            initial_daily_dose: 5.0,
            change_frequency_days: 2,
            change_amount: 2.5,
        }),
    });
    let anchor = NaiveDate::from_ymd_opt(2025, 4, 14).unwrap();

    let expected = generate_schedule(&config, anchor, &EnglandAndWales).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let config = Arc::clone(&config);
            thread::spawn(move || -> ScheduleResult {
                generate_schedule(&config, anchor, &EnglandAndWales).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let schedule = handle.join().expect("thread panicked");
        assert_eq!(schedule, expected);
    }

    // Good Friday and Easter Monday fall in this window
    assert!(!expected.days[4].is_pickup_day);
    assert!(!expected.days[7].is_pickup_day);
}

#[test]
fn test_parallel_cli_runs_agree() {
    let temp_dir = setup_test_dir();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mut cmd = cli(&temp_dir);
            cmd.args([
                "schedule",
                "--days",
                "sun,tue",
                "--regimen",
                "reducing",
                "--initial-dose",
                "25",
                "--change-frequency",
                "3",
                "--change-amount",
                "5",
                "--start",
                "2025-04-24",
                "--holidays",
                "none",
                "--format",
                "csv",
            ]);
            thread::spawn(move || cmd.assert().success().get_output().stdout.clone())
        })
        .collect();

    let outputs: Vec<Vec<u8>> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    for output in &outputs[1..] {
        assert_eq!(output, &outputs[0]);
    }

    let text = String::from_utf8(outputs[0].clone()).unwrap();
    assert!(text.contains("3,2025-04-27,Sun,50.0,true"));
    assert!(text.contains("5,2025-04-29,Tue,100.0,true"));
}
