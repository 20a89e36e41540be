//! Job scheduler core.
//!
//! Owns the set of live timer jobs keyed by tag, drives each job with a
//! dedicated tokio task, and supports tag-based cancellation. The job map
//! and the live-reminder counter share one mutex; fire callbacks always run
//! outside that critical section, so a slow delivery never stalls the other
//! timers or the command path.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{info, warn};
use tokio::sync::Notify;
use tokio::time::sleep;

use crate::transport::Presence;

use super::error::SchedulerError;
use super::intent::{FireTime, ScheduleIntent, Timing};

/// Snapshot handed to the fire callback for one due job.
#[derive(Debug, Clone)]
pub struct JobFire {
    pub tag: String,
    pub run_count: u32,
    /// True when the job reached its run limit with this fire and has
    /// already been removed.
    pub is_last: bool,
}

/// Callback invoked on each fire, outside the scheduler lock.
pub type FireCallback =
    Arc<dyn Fn(JobFire) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Returned from a successful registration.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub tag: String,
    pub next_run: DateTime<Local>,
}

struct JobEntry {
    cancel: Arc<Notify>,
    run_count: u32,
    limit: Option<u32>,
}

struct State {
    jobs: HashMap<String, JobEntry>,
    live: usize,
}

struct Inner {
    state: Mutex<State>,
    presence: Arc<dyn Presence>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("scheduler state poisoned")
    }
}

/// The scheduler core. Cheap to clone; all clones share the same job set.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<Inner>,
}

impl ReminderScheduler {
    pub fn new(presence: Arc<dyn Presence>) -> Self {
        ReminderScheduler {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    jobs: HashMap::new(),
                    live: 0,
                }),
                presence,
            }),
        }
    }

    /// Number of currently registered jobs.
    pub fn live_count(&self) -> usize {
        self.inner.lock().live
    }

    /// Register a job for `intent` under `tag` and start its timer.
    ///
    /// Registration is one logical step: once this returns, `cancel(tag)`
    /// will find the job. The tag must be unique per command instance.
    pub fn schedule(
        &self,
        intent: &ScheduleIntent,
        tag: impl Into<String>,
        on_fire: FireCallback,
    ) -> Result<JobHandle, SchedulerError> {
        let tag = tag.into();
        let now = Local::now();

        let (first_delay, interval, limit, next_run) = match &intent.timing {
            Timing::Recurring { interval, start_at } => {
                if interval.is_zero() {
                    return Err(SchedulerError::InvalidInterval);
                }
                // A start time that already passed degrades to the default
                // first-fire-after-one-interval behavior.
                let first = start_at.and_then(|s| (s - now).to_std().ok());
                let next_run = match (start_at, &first) {
                    (Some(s), Some(_)) => *s,
                    _ => now + to_chrono(*interval)?,
                };
                (first.unwrap_or(*interval), Some(*interval), None, next_run)
            }
            Timing::OneShot(FireTime::At(when)) => {
                let delay = (*when - now)
                    .to_std()
                    .map_err(|_| SchedulerError::PastFireTime)?;
                (delay, None, Some(1), *when)
            }
            Timing::OneShot(FireTime::After(delay)) => {
                if delay.is_zero() {
                    return Err(SchedulerError::InvalidInterval);
                }
                (*delay, None, Some(1), now + to_chrono(*delay)?)
            }
        };

        let cancel = Arc::new(Notify::new());
        let live = {
            let mut state = self.inner.lock();
            if state.jobs.contains_key(&tag) {
                return Err(SchedulerError::RegistrationFailed(format!(
                    "tag '{tag}' is already registered"
                )));
            }
            state.jobs.insert(
                tag.clone(),
                JobEntry {
                    cancel: cancel.clone(),
                    run_count: 0,
                    limit,
                },
            );
            state.live += 1;
            state.live
        };
        self.inner.presence.set_live_count(live);

        tokio::spawn(run_job(
            self.inner.clone(),
            tag.clone(),
            cancel,
            first_delay,
            interval,
            on_fire,
        ));

        info!("Scheduled job {tag}; next run at {next_run}");
        Ok(JobHandle { tag, next_run })
    }

    /// Cancel the job carrying `tag`. Returns whether one was removed.
    ///
    /// After this returns true no further fire for the tag occurs; a fire
    /// already in flight is allowed to complete.
    pub fn cancel(&self, tag: &str) -> bool {
        let removed = {
            let mut state = self.inner.lock();
            match state.jobs.remove(tag) {
                Some(entry) => {
                    state.live -= 1;
                    Some((entry, state.live))
                }
                None => None,
            }
        };
        match removed {
            Some((entry, live)) => {
                entry.cancel.notify_one();
                self.inner.presence.set_live_count(live);
                info!("Cancelled job {tag}");
                true
            }
            None => {
                warn!("Cancel requested for unknown tag {tag}");
                false
            }
        }
    }
}

/// Timer loop for one job. The fire decision happens under the state lock
/// (membership check doubles as the cancellation check); the callback runs
/// after the lock is released.
async fn run_job(
    inner: Arc<Inner>,
    tag: String,
    cancel: Arc<Notify>,
    first_delay: Duration,
    interval: Option<Duration>,
    on_fire: FireCallback,
) {
    let mut delay = first_delay;
    loop {
        tokio::select! {
            _ = cancel.notified() => break,
            _ = sleep(delay) => {}
        }
        let Some(fire) = claim_fire(&inner, &tag) else {
            break;
        };
        let is_last = fire.is_last;
        on_fire(fire).await;
        match (is_last, interval) {
            (false, Some(next)) => delay = next,
            _ => break,
        }
    }
}

fn claim_fire(inner: &Inner, tag: &str) -> Option<JobFire> {
    let (fire, live_after_removal) = {
        let mut state = inner.lock();
        let entry = state.jobs.get_mut(tag)?;
        entry.run_count += 1;
        let run_count = entry.run_count;
        let is_last = entry.limit.is_some_and(|limit| run_count >= limit);
        let live = if is_last {
            state.jobs.remove(tag);
            state.live -= 1;
            Some(state.live)
        } else {
            None
        };
        (
            JobFire {
                tag: tag.to_string(),
                run_count,
                is_last,
            },
            live,
        )
    };
    if let Some(live) = live_after_removal {
        inner.presence.set_live_count(live);
    }
    Some(fire)
}

fn to_chrono(duration: Duration) -> Result<chrono::Duration, SchedulerError> {
    chrono::Duration::from_std(duration)
        .map_err(|e| SchedulerError::RegistrationFailed(e.to_string()))
}
