//! dailymovich-cron: Scheduled job runner.
//!
//! Jobs are registered with a [`Schedule`] and run on their own tokio task.
//! Timing goes through a [`Clock`] so schedules can be driven by a fake
//! clock in tests.

pub mod scheduler;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub use scheduler::{Scheduler, SchedulerHandle};

/// A unit of scheduled work.
#[async_trait]
pub trait Job: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run one firing of the job.
    async fn run(&self) -> anyhow::Result<()>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// When a job fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Schedule {
    /// Immediately on start, then once per period.
    Every(Duration),
    /// At fixed local wall-clock times, every day.
    DailyAt { times: Vec<NaiveTime>, tz: Tz },
}

impl Schedule {
    /// Daily schedule; times are sorted and deduplicated.
    pub fn daily(mut times: Vec<NaiveTime>, tz: Tz) -> Self {
        times.sort();
        times.dedup();
        Schedule::DailyAt { times, tz }
    }

    /// The first firing strictly after `now`.
    ///
    /// For `DailyAt`, a local time falling into a DST gap is skipped that day
    /// and an ambiguous one fires at its earliest instant. Returns `None` for a
    /// daily schedule with no times.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Schedule::Every(period) => {
                let period = chrono::Duration::from_std(*period).ok()?;
                now.checked_add_signed(period)
            }
            Schedule::DailyAt { times, tz } => {
                let today = now.with_timezone(tz).date_naive();
                // Two days of lookahead covers a skipped time on the next day.
                (0..=2u64)
                    .filter_map(|offset| today.checked_add_days(Days::new(offset)))
                    .flat_map(|date| times.iter().map(move |t| date.and_time(*t)))
                    .filter_map(|local| tz.from_local_datetime(&local).earliest())
                    .map(|dt| dt.with_timezone(&Utc))
                    .find(|dt| *dt > now)
            }
        }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schedule::Every(period) => write!(f, "every {}s", period.as_secs()),
            Schedule::DailyAt { times, tz } => {
                let times: Vec<String> = times.iter().map(|t| t.format("%H:%M").to_string()).collect();
                write!(f, "daily at {} ({tz})", times.join(", "))
            }
        }
    }
}
