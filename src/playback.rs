//! Clock arithmetic for program start/end display.

use crate::error::{BraviaError, Result};
use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Trailing timezone characters on TV timestamps (`+0100`)
const TIMEZONE_SUFFIX_LEN: usize = 5;

/// Program window derived from a start timestamp and a duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayingTime {
    /// Start clock, `HH:MM`
    pub start: String,
    /// End clock, `HH:MM`
    pub end: String,
    /// Percentage of the program already played; not clamped
    pub percent: i64,
}

/// Add `HH:MM:SS` durations and return the resulting `HH:MM` clock.
///
/// Seconds are dropped from the result and hours wrap at 24.
///
/// ```
/// assert_eq!(braviarc::calc_time(&["01:50:00", "00:20:00"]).unwrap(), "02:10");
/// assert_eq!(braviarc::calc_time(&["23:00:00", "02:00:00"]).unwrap(), "01:00");
/// ```
pub fn calc_time(times: &[&str]) -> Result<String> {
    let mut total_secs: u64 = 0;
    for time in times {
        total_secs = total_secs
            .checked_add(parse_clock(time)?)
            .ok_or_else(|| BraviaError::InvalidTime(time.to_string()))?;
    }

    let total_mins = total_secs / 60;
    let hours = (total_mins / 60) % 24;
    let mins = total_mins % 60;

    Ok(format!("{:02}:{:02}", hours, mins))
}

/// Start/end clock and percentage played, relative to the local clock
pub fn playing_time(start_date_time: &str, duration_secs: u64) -> Result<PlayingTime> {
    playing_time_at(start_date_time, duration_secs, Local::now().naive_local())
}

/// Same as [`playing_time`], against an explicit `now`
pub fn playing_time_at(
    start_date_time: &str,
    duration_secs: u64,
    now: NaiveDateTime,
) -> Result<PlayingTime> {
    let start = parse_start(start_date_time)?;
    let elapsed = (now - start).num_seconds();

    let start_clock = start.format("%H:%M:%S").to_string();
    let end = calc_time(&[&start_clock, &format_duration(duration_secs)])?;

    let percent = if duration_secs == 0 {
        0
    } else {
        (elapsed as f64 / duration_secs as f64 * 100.0).round() as i64
    };

    Ok(PlayingTime {
        start: start.format("%H:%M").to_string(),
        end,
        percent,
    })
}

fn parse_start(value: &str) -> Result<NaiveDateTime> {
    let cut = value
        .char_indices()
        .rev()
        .nth(TIMEZONE_SUFFIX_LEN - 1)
        .map(|(i, _)| i)
        .ok_or_else(|| BraviaError::InvalidTime(value.to_string()))?;

    NaiveDateTime::parse_from_str(&value[..cut], TIMESTAMP_FORMAT)
        .map_err(|_| BraviaError::InvalidTime(value.to_string()))
}

fn parse_clock(value: &str) -> Result<u64> {
    let invalid = || BraviaError::InvalidTime(value.to_string());

    let parts = value
        .trim()
        .split(':')
        .map(|p| p.parse::<u64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>>>()?;

    match parts.as_slice() {
        [h, m, s] => h
            .checked_mul(60)
            .and_then(|v| v.checked_add(*m))
            .and_then(|v| v.checked_mul(60))
            .and_then(|v| v.checked_add(*s))
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Duration as `HH:MM:SS`, wrapping at one day
fn format_duration(secs: u64) -> String {
    let secs = secs % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
