//! Periodic due-reminder scan.
//!
//! [`due_at`] is the pure decision: given the store and a wall-clock moment
//! it lists what fires in that minute. [`Scheduler`] wraps it in a
//! cancellable timer loop that forwards each result over a channel.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::calendar::{next_occurrence, Recurrence, Reminder, ReminderId, Store};
use crate::error::SkipReason;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

pub type SharedStore = Arc<Mutex<Store>>;

pub fn shared(store: Store) -> SharedStore {
    Arc::new(Mutex::new(store))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub reminder_id: ReminderId,
    pub title: String,
    pub time: NaiveTime,
    pub occurrence_date: NaiveDate,
    pub is_recurring: bool,
    pub original_date: NaiveDate,
}

impl Notification {
    pub fn message(&self) -> String {
        let at = self.time.format("%H:%M");
        if self.is_recurring {
            format!(
                "Recurring reminder: {} at {} (originally on {})",
                self.title, at, self.original_date
            )
        } else {
            format!("Reminder: {} at {}", self.title, at)
        }
    }
}

/// Everything due in the minute containing `now`, ordered by time then
/// title. Reads only; calling it twice with the same inputs gives the same
/// answer.
pub fn due_at(store: &Store, now: NaiveDateTime) -> Vec<Notification> {
    let today = now.date();
    let mut due: Vec<Notification> = store
        .iter()
        .filter_map(|(_, reminder)| check(reminder, today, now.time()))
        .collect();
    due.sort_by(|a, b| (a.time, &a.title).cmp(&(b.time, &b.title)));
    due
}

fn check(reminder: &Reminder, today: NaiveDate, now: NaiveTime) -> Option<Notification> {
    let time = reminder.time?;
    if time.hour() != now.hour() || time.minute() != now.minute() {
        return None;
    }

    match reminder.recurrence {
        Recurrence::None => {
            if reminder.date != today {
                return None;
            }
        }
        rule => {
            let Some(next) = next_occurrence(reminder.date, rule, today) else {
                warn!(id = %reminder.id, reason = %SkipReason::DateOverflow, "skipping reminder in scan");
                return None;
            };
            if next != today || !reminder.within_end_date(today) {
                return None;
            }
        }
    }

    Some(Notification {
        reminder_id: reminder.id.clone(),
        title: reminder.title.clone(),
        time,
        occurrence_date: today,
        is_recurring: reminder.is_recurring(),
        original_date: reminder.date,
    })
}

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct Scheduler {
    store: SharedStore,
    notify: mpsc::UnboundedSender<Notification>,
    period: Duration,
    clock: Clock,
}

impl Scheduler {
    pub fn new(store: SharedStore, notify: mpsc::UnboundedSender<Notification>) -> Self {
        Self {
            store,
            notify,
            period: DEFAULT_PERIOD,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// Replaces the local wall clock.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// One scan: reads the clock once, evaluates every reminder under the
    /// store lock and forwards the results. Returns `false` once the
    /// receiving side has gone away.
    pub fn tick(&self) -> bool {
        let now = (self.clock)();
        let due = {
            let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            due_at(&store, now)
        };
        debug!(at = %now.format("%Y-%m-%d %H:%M"), due = due.len(), "due scan");

        for notification in due {
            info!(id = %notification.reminder_id, title = %notification.title, "reminder due");
            if self.notify.send(notification).is_err() {
                return false;
            }
        }
        !self.notify.is_closed()
    }

    /// Scans once per period until `shutdown` flips to `true` (or its sender
    /// is dropped). A scan already underway finishes; no new one starts
    /// after the flag is observed.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_ms = self.period.as_millis() as u64, "due-scan scheduler started");

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    if !self.tick() {
                        info!("notification receiver closed");
                        break;
                    }
                }
            }
        }
        info!("due-scan scheduler stopped");
    }

    /// Runs the loop on its own thread with a single-threaded runtime.
    pub fn spawn(self) -> io::Result<SchedulerHandle> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let (shutdown, signal) = watch::channel(false);
        let thread = thread::Builder::new()
            .name("due-scan".to_string())
            .spawn(move || runtime.block_on(self.run(signal)))?;
        Ok(SchedulerHandle {
            shutdown,
            thread: Some(thread),
        })
    }
}

/// Stops the scheduler thread when asked or when dropped.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("due-scan thread panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
