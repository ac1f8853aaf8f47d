// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! When a profile runs.
//!
//! A profile either repeats on a fixed interval measured from the end of its
//! previous run, or runs at set times of day, optionally only on named
//! weekdays. Time-of-day schedules are evaluated in local time and compiled to
//! one cron expression per time, so day rollover and weekday filtering come
//! from the `cron` crate rather than hand-written calendar arithmetic.
//!
//! # Examples
//! ```
//! use chrono::{TimeZone, Utc};
//! use std::time::Duration;
//! use workload_scheduler::registry::{ProfileSchedule, TimeOfDay};
//!
//! let nightly = ProfileSchedule::At(TimeOfDay::parse(&["02:00"], &["SATURDAY"]).unwrap());
//! // Friday 23:00 -> Saturday 02:00
//! let now = Utc.with_ymd_and_hms(2025, 3, 7, 23, 0, 0).unwrap();
//!
//! assert_eq!(nightly.delay_from(&now), Duration::from_secs(3 * 3_600));
//! assert_eq!(nightly.summary(), "Runs at the following times: 02:00 on SATURDAY");
//! ```

use chrono::{DateTime, Local, NaiveTime, TimeDelta, TimeZone, Timelike, Weekday};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

use super::format_interval;
use crate::errors::ScheduleError;

// A valid daily/weekly expression always has a next occurrence; this only
// guards against the iterator running dry.
const NO_OCCURRENCE_DELAY: Duration = Duration::from_secs(7 * 86_400);

/// Cadence of a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSchedule {
    /// Repeat this long after the previous run finished.
    Every(Duration),
    /// Run at fixed times of day.
    At(TimeOfDay),
}

impl ProfileSchedule {
    /// Nominal wait before the next run, as seen at `now`.
    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        match self {
            ProfileSchedule::Every(interval) => *interval,
            ProfileSchedule::At(times) => times.delay_from(now),
        }
    }

    /// Stretch `delay` so the run still lands on the schedule.
    ///
    /// Interval schedules take the delay as is; time-of-day schedules move it
    /// to the first scheduled time after `now + delay`.
    pub fn align_from<Tz: TimeZone>(&self, now: &DateTime<Tz>, delay: Duration) -> Duration {
        match self {
            ProfileSchedule::Every(_) => delay,
            ProfileSchedule::At(times) => times.align_from(now, delay),
        }
    }

    /// [`delay_from`](Self::delay_from) against the local wall clock.
    pub fn next_delay(&self) -> Duration {
        match self {
            ProfileSchedule::Every(interval) => *interval,
            ProfileSchedule::At(times) => times.delay_from(&Local::now()),
        }
    }

    /// [`align_from`](Self::align_from) against the local wall clock.
    pub fn aligned_delay(&self, delay: Duration) -> Duration {
        match self {
            ProfileSchedule::Every(_) => delay,
            ProfileSchedule::At(times) => times.align_from(&Local::now(), delay),
        }
    }

    /// Human readable cadence, e.g. `Every 0:05:00`.
    pub fn summary(&self) -> String {
        match self {
            ProfileSchedule::Every(interval) => format!("Every {}", format_interval(*interval)),
            ProfileSchedule::At(times) => times.summary(),
        }
    }
}

/// Set times of day, optionally restricted to some weekdays.
#[derive(Debug, Clone)]
pub struct TimeOfDay {
    times: Vec<NaiveTime>,
    days: Vec<Weekday>,
    expressions: Vec<Schedule>,
}

impl PartialEq for TimeOfDay {
    fn eq(&self, other: &Self) -> bool {
        self.times == other.times && self.days == other.days
    }
}

impl TimeOfDay {
    /// An empty `days` list means every day.
    pub fn new(mut times: Vec<NaiveTime>, mut days: Vec<Weekday>) -> Result<Self, ScheduleError> {
        if times.is_empty() {
            return Err(ScheduleError::NoTimes);
        }
        times.sort();
        times.dedup();
        days.sort_by_key(|day| day.num_days_from_monday());
        days.dedup();

        let day_field = if days.is_empty() {
            "*".to_string()
        } else {
            days.iter()
                .map(|day| day.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };

        let expressions = times
            .iter()
            .map(|time| {
                let expression = format!(
                    "{} {} {} * * {}",
                    time.second(),
                    time.minute(),
                    time.hour(),
                    day_field
                );
                Schedule::from_str(&expression).map_err(|e| ScheduleError::Expression {
                    reason: e.to_string(),
                    expression,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            times,
            days,
            expressions,
        })
    }

    /// Parse `HH:MM[:SS]` times and weekday names (`MONDAY`, `mon`, ...).
    pub fn parse<S: AsRef<str>>(times: &[S], days: &[S]) -> Result<Self, ScheduleError> {
        let times = times
            .iter()
            .map(|raw| parse_time(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let days = days
            .iter()
            .map(|raw| {
                let raw = raw.as_ref().trim();
                Weekday::from_str(raw).map_err(|_| ScheduleError::InvalidDay(raw.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(times, days)
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    /// First scheduled instant strictly after `now`.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.expressions
            .iter()
            .filter_map(|schedule| schedule.after(now).next())
            .min()
    }

    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        self.next_after(now)
            .and_then(|next| next.signed_duration_since(now.clone()).to_std().ok())
            .unwrap_or(NO_OCCURRENCE_DELAY)
    }

    pub fn align_from<Tz: TimeZone>(&self, now: &DateTime<Tz>, delay: Duration) -> Duration {
        let target = TimeDelta::from_std(delay)
            .ok()
            .and_then(|offset| now.clone().checked_add_signed(offset));
        match target {
            Some(target) => delay.saturating_add(self.delay_from(&target)),
            None => delay,
        }
    }

    pub fn summary(&self) -> String {
        let times = self
            .times
            .iter()
            .map(|time| {
                if time.second() == 0 {
                    time.format("%H:%M").to_string()
                } else {
                    time.format("%H:%M:%S").to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        if self.days.is_empty() {
            format!("Runs at the following times: {}", times)
        } else {
            let days = self
                .days
                .iter()
                .map(|day| day_name(*day))
                .collect::<Vec<_>>()
                .join(",");
            format!("Runs at the following times: {} on {}", times, days)
        }
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const HOUR: u64 = 3_600;

    // 2025-03-03 is a Monday
    fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, hour, minute, 0).unwrap()
    }

    fn at(times: &[&str], days: &[&str]) -> ProfileSchedule {
        ProfileSchedule::At(TimeOfDay::parse(times, days).unwrap())
    }

    #[test]
    fn test_next_time_today_then_tomorrow() {
        let schedule = at(&["14:30", "02:00"], &[]);

        assert_eq!(schedule.delay_from(&monday_at(1, 30)), Duration::from_secs(HOUR / 2));
        assert_eq!(
            schedule.delay_from(&monday_at(2, 0)),
            Duration::from_secs(12 * HOUR + HOUR / 2),
            "a run at exactly 02:00 waits for the next slot"
        );
        assert_eq!(schedule.delay_from(&monday_at(15, 0)), Duration::from_secs(11 * HOUR));
    }

    #[test]
    fn test_weekday_filter() {
        let schedule = at(&["02:00"], &["FRIDAY", "friday"]);
        assert_eq!(
            schedule.delay_from(&monday_at(1, 30)),
            Duration::from_secs(4 * 24 * HOUR + HOUR / 2)
        );
        if let ProfileSchedule::At(times) = &schedule {
            assert_eq!(times.days(), &[Weekday::Fri]);
        }
    }

    #[test]
    fn test_align_moves_backoff_onto_schedule() {
        let schedule = at(&["02:00", "14:30"], &[]);
        let now = monday_at(1, 30);

        assert_eq!(
            schedule.align_from(&now, Duration::from_secs(HOUR)),
            Duration::from_secs(13 * HOUR)
        );

        let every = ProfileSchedule::Every(Duration::from_secs(60));
        assert_eq!(every.delay_from(&now), Duration::from_secs(60));
        assert_eq!(
            every.align_from(&now, Duration::from_secs(240)),
            Duration::from_secs(240)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            TimeOfDay::parse::<&str>(&[], &[]).unwrap_err(),
            ScheduleError::NoTimes
        );
        assert_eq!(
            TimeOfDay::parse(&["25:00"], &[]).unwrap_err(),
            ScheduleError::InvalidTime("25:00".to_string())
        );
        assert_eq!(
            TimeOfDay::parse(&["02:00"], &["FUNDAY"]).unwrap_err(),
            ScheduleError::InvalidDay("FUNDAY".to_string())
        );
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            ProfileSchedule::Every(Duration::from_secs(300)).summary(),
            "Every 0:05:00"
        );
        assert_eq!(
            at(&["14:30", "02:00:30"], &[]).summary(),
            "Runs at the following times: 02:00:30, 14:30"
        );
        assert_eq!(
            at(&["02:00"], &["SUNDAY", "MONDAY"]).summary(),
            "Runs at the following times: 02:00 on MONDAY,SUNDAY"
        );
    }

    #[test]
    fn test_local_clock_delay_is_bounded() {
        let schedule = at(&["00:00", "12:00"], &[]);
        let delay = schedule.next_delay();
        assert!(delay > Duration::ZERO);
        // 13h leaves room for a DST change between the two times
        assert!(delay <= Duration::from_secs(13 * HOUR));
    }
}
