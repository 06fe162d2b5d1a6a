//! Calendar arithmetic for effort units and deadlines
//!
//! Effort is consumed at a fixed rate of [`USABLE_HOURS_PER_DAY`] units per
//! calendar day. Only whole days move the clock; the remainder is reported
//! but never carried into the next task, so every task starts on the same
//! time-of-day as the simulation itself.
//!
//! All arithmetic uses UTC calendar components, so DST transitions and the
//! local timezone never shift a result.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

/// Effort units that fit into one calendar day
pub const USABLE_HOURS_PER_DAY: f64 = 3.0;

/// Returned by [`days_until_deadline`] when there is no deadline
pub const NO_DEADLINE_DAYS: i64 = i64::MAX;

/// Crunch figures are clamped to this many days either side of zero
pub const MAX_CRUNCH_DAYS: i64 = 3650;

/// Outcome of advancing the simulated clock by some effort
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockAdvance {
    /// Date after adding the whole days of effort
    pub date: DateTime<Utc>,
    /// Effort left over after the whole days (informational)
    pub hours_used: f64,
}

/// Signed number of calendar days from `as_of` to `deadline`.
///
/// Time-of-day is ignored on both sides: a deadline at any time tomorrow is
/// `1`, a deadline earlier today is `0`, yesterday is `-1`.
pub fn days_until_deadline(deadline: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> i64 {
    match deadline {
        Some(deadline) => (deadline.date_naive() - as_of.date_naive()).num_days(),
        None => NO_DEADLINE_DAYS,
    }
}

/// Advance `from` by the whole calendar days that `effort` units occupy.
///
/// Saturates at the latest representable instant instead of overflowing.
pub fn advance_clock(effort: f64, from: DateTime<Utc>) -> ClockAdvance {
    let effort = if effort.is_finite() { effort.max(0.0) } else { 0.0 };
    let whole_days = (effort / USABLE_HOURS_PER_DAY).floor() as i64;
    let hours_used = effort % USABLE_HOURS_PER_DAY;

    let date = TimeDelta::try_days(whole_days)
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    ClockAdvance { date, hours_used }
}

/// ISO-8601 rendering with millisecond precision and a `Z` suffix
pub fn iso_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Clamp a day count into the reportable crunch window
pub fn clamp_crunch(days: i64) -> i64 {
    days.clamp(-MAX_CRUNCH_DAYS, MAX_CRUNCH_DAYS)
}
