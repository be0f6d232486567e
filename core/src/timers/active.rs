//! Active countdown state
//!
//! A `CountdownEntry` is what the registry stores per slot while a countdown
//! runs. Its `Ticker` is the background task that fires once per second.
//!
//! # Lifecycle
//!
//! 1. `start` / `continue_countdown` → entry created with its ticker attached
//! 2. Ticker decrements a task-local count and queues ticks for delivery
//! 3. Final tick delivered → entry removed (or `stop` removes it early)

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::delivery::Tick;
use super::key::CountdownKey;

/// Tick callback: `(remaining_secs, finished)`.
pub type CountdownCallback = Arc<dyn Fn(i64, bool) + Send + Sync>;

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Registry-side state of one running countdown
pub(crate) struct CountdownEntry {
    /// Absolute deadline; the only source of truth for remaining time
    pub end_time: DateTime<Utc>,

    pub callback: CountdownCallback,

    pub ticker: Ticker,

    /// Identifies the launch that owns `ticker`. Ticks carrying any other
    /// generation are stale.
    pub generation: u64,
}

/// Handle to a running ticker task
pub(crate) struct Ticker {
    task: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

impl Ticker {
    /// Spawn a ticker that reports `remaining - 1` on its first (immediate)
    /// fire and one less on every fire after that, until it reaches zero.
    pub fn spawn<K: CountdownKey>(
        runtime: &Handle,
        key: K,
        generation: u64,
        remaining: i64,
        callback: CountdownCallback,
        ticks: mpsc::Sender<Tick<K>>,
    ) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut remaining = remaining;

            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }

                remaining -= 1;
                let finished = remaining <= 0;
                if finished {
                    flag.store(true, Ordering::Release);
                }

                let tick = Tick {
                    key,
                    generation,
                    remaining: remaining.max(0),
                    finished,
                    callback: Arc::clone(&callback),
                };
                if ticks.send(tick).await.is_err() || finished {
                    break;
                }
            }
        });

        Self { task, cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
