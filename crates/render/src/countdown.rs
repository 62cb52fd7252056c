//! Countdown for flash polls.
//!
//! The state is always re-derived from `expires_at - now`, never decremented,
//! so a ticker that was suspended catches up on its next tick.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CountdownState {
    /// No expiry configured.
    Inactive,
    Counting { seconds_left: u64 },
    Expired,
}

impl CountdownState {
    pub fn at(now: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        let Some(expires_at) = expires_at else {
            return CountdownState::Inactive;
        };

        // num_seconds truncates toward zero, which floors any positive gap
        match (expires_at - now).num_seconds() {
            s if s > 0 => CountdownState::Counting {
                seconds_left: s as u64,
            },
            _ => CountdownState::Expired,
        }
    }

    pub fn time_left(self) -> Option<u64> {
        match self {
            CountdownState::Inactive => None,
            CountdownState::Counting { seconds_left } => Some(seconds_left),
            CountdownState::Expired => Some(0),
        }
    }

    pub fn is_expired(self) -> bool {
        self == CountdownState::Expired
    }

    /// `MM:SS`, or `None` when there is no timer to show.
    pub fn display(self) -> Option<String> {
        self.time_left().map(format_clock)
    }
}

/// Minutes are not wrapped into hours; anything past 99:59 just grows the
/// minute field.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ===== Clock =====

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ===== Ticker =====

/// Owns the background recomputation for one render session. Dropping it
/// (or calling [`CountdownTicker::stop`]) cancels the task, after which no
/// further state is published.
pub struct CountdownTicker {
    state: watch::Receiver<CountdownState>,
    task: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    /// Must be called from within a tokio runtime.
    pub fn spawn<C: Clock>(expires_at: Option<DateTime<Utc>>, clock: C) -> Self {
        let initial = CountdownState::at(clock.now(), expires_at);
        let (tx, rx) = watch::channel(initial);

        let task = match (initial, expires_at) {
            (CountdownState::Counting { .. }, Some(expires_at)) => {
                Some(tokio::spawn(tick(tx, expires_at, clock)))
            }
            _ => None,
        };

        Self { state: rx, task }
    }

    pub fn current(&self) -> CountdownState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(self) {}
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn tick<C: Clock>(
    tx: watch::Sender<CountdownState>,
    expires_at: DateTime<Utc>,
    clock: C,
) {
    let mut interval = time::interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let state = CountdownState::at(clock.now(), Some(expires_at));
        if tx.send(state).is_err() {
            break;
        }
        if state.is_expired() {
            tracing::debug!("Countdown reached zero");
            break;
        }
    }
}
