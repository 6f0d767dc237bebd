//! Job scheduler — owns timing policy and triggers job execution.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{Clock, Job, Schedule, SystemClock};

struct Registration {
    schedule: Schedule,
    job: Arc<dyn Job>,
}

/// Collects job registrations and runs each on its own task once started.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    registrations: Vec<Registration>,
}

impl Scheduler {
    /// Create a scheduler driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            registrations: Vec::new(),
        }
    }

    /// Register a job. Has no effect on timing until [`Scheduler::start`].
    pub fn register(&mut self, schedule: Schedule, job: Arc<dyn Job>) {
        info!(job = job.name(), schedule = %schedule, "Registering scheduled job");
        self.registrations.push(Registration { schedule, job });
    }

    /// Names of the registered jobs, in registration order.
    pub fn job_names(&self) -> Vec<String> {
        self.registrations
            .iter()
            .map(|r| r.job.name().to_string())
            .collect()
    }

    /// Spawn one task per registered job.
    pub fn start(self) -> SchedulerHandle {
        info!("Scheduler started with {} jobs", self.registrations.len());
        let tasks = self
            .registrations
            .into_iter()
            .map(|Registration { schedule, job }| {
                let clock = self.clock.clone();
                tokio::spawn(async move {
                    match schedule {
                        Schedule::Every(period) => run_every(period, job).await,
                        daily @ Schedule::DailyAt { .. } => run_daily(daily, clock, job).await,
                    }
                })
            })
            .collect();
        SchedulerHandle { tasks }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the running job tasks.
pub struct SchedulerHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Abort every job task. A firing in progress is dropped at its next await point.
    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }

    /// Whether every job task has ended.
    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(|t| t.is_finished())
    }
}

async fn run_every(period: Duration, job: Arc<dyn Job>) {
    // First tick completes immediately.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        fire(job.as_ref()).await;
    }
}

async fn run_daily(schedule: Schedule, clock: Arc<dyn Clock>, job: Arc<dyn Job>) {
    let mut cursor = clock.now();
    loop {
        let Some(next) = schedule.next_after(cursor) else {
            warn!(job = job.name(), "Schedule has no upcoming firing, stopping job");
            return;
        };
        debug!(job = job.name(), next = %next, "Waiting for next firing");

        // Re-check after waking: the clock and the timer may disagree slightly.
        loop {
            let now = clock.now();
            if now >= next {
                break;
            }
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;
        }

        fire(job.as_ref()).await;
        cursor = next.max(clock.now());
    }
}

async fn fire(job: &dyn Job) {
    info!(job = job.name(), "Running scheduled job");
    if let Err(e) = job.run().await {
        error!(job = job.name(), "Scheduled job failed: {e:#}");
    }
}
