//! Countdown registry
//!
//! Tracks one countdown per slot. Deadlines are stored as absolute wall-clock
//! instants, so after the process was suspended `on_resume` can recompute the
//! remaining time instead of trusting a tick counter that stood still.
//!
//! All map access goes through a single mutex. Callbacks never run while it
//! is held: a callback is free to call back into the registry, including
//! restarting its own slot from its finished callback.
//!
//! Immediate completions (`start` with an elapsed deadline, `stop`,
//! `continue_countdown` on a missing or elapsed deadline) call the callback
//! synchronously on the caller's thread. Regular ticks go through the
//! delivery task.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use hashbrown::HashMap;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use super::active::{CountdownCallback, CountdownEntry, Ticker};
use super::clock::{Clock, SystemClock, seconds_until};
use super::delivery::{Tick, spawn_delivery};
use super::key::CountdownKey;
use crate::context::CountdownConfig;

/// Keyed countdown timers.
///
/// Cloning is cheap and every clone drives the same set of countdowns.
pub struct CountdownRegistry<K: CountdownKey> {
    state: Arc<RegistryState<K>>,
}

impl<K: CountdownKey> Clone for CountdownRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

pub(crate) struct RegistryState<K: CountdownKey> {
    entries: Mutex<HashMap<K, CountdownEntry>>,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    ticks: mpsc::Sender<Tick<K>>,
    next_generation: AtomicU64,
    stop_invokes_callback: bool,
}

impl<K: CountdownKey> CountdownRegistry<K> {
    /// Create a registry on the system wall clock.
    ///
    /// Tickers and the delivery task are spawned on `runtime`.
    pub fn new(runtime: Handle, config: &CountdownConfig) -> Self {
        Self::with_clock(runtime, config, Arc::new(SystemClock))
    }

    pub fn with_clock(runtime: Handle, config: &CountdownConfig, clock: Arc<dyn Clock>) -> Self {
        let (tx, rx) = mpsc::channel(config.delivery_capacity.max(1));
        let state = Arc::new(RegistryState {
            entries: Mutex::new(HashMap::new()),
            clock,
            runtime,
            ticks: tx,
            next_generation: AtomicU64::new(0),
            stop_invokes_callback: config.stop_invokes_callback,
        });
        spawn_delivery(&state.runtime, Arc::downgrade(&state), rx);
        Self { state }
    }

    /// Start a countdown of `duration_secs` for `key`, replacing any countdown
    /// already running there.
    ///
    /// With a non-positive duration the callback receives `(0, true)` before
    /// this returns and nothing is registered.
    pub fn start<F>(&self, key: K, duration_secs: i64, callback: F)
    where
        F: Fn(i64, bool) + Send + Sync + 'static,
    {
        let end_time = deadline_after(self.state.clock.now(), duration_secs);
        debug!(?key, duration_secs, %end_time, "starting countdown");
        self.launch(key, end_time, Arc::new(callback), None);
    }

    /// Cancel the countdown for `key`.
    ///
    /// When `stop_invokes_callback` is set (the default) the cancelled
    /// countdown's callback receives `(0, true)`, so stopping looks the same
    /// to the caller as running out. Unknown keys are ignored.
    pub fn stop(&self, key: K) {
        let removed = self.state.lock_entries().remove(&key);
        let Some(entry) = removed else {
            return;
        };
        entry.ticker.cancel();
        debug!(?key, "countdown stopped");

        if self.state.stop_invokes_callback {
            (entry.callback)(0, true);
        }
    }

    /// Re-attach `callback` to the deadline already stored for `key` and
    /// restart ticking from the time actually left.
    ///
    /// Without a stored deadline, or once it has passed, the callback
    /// receives `(0, true)` immediately and the registry is left untouched.
    pub fn continue_countdown<F>(&self, key: K, callback: F)
    where
        F: Fn(i64, bool) + Send + Sync + 'static,
    {
        self.resume_with(key, Arc::new(callback));
    }

    /// True unless `key` has a countdown that is still ticking.
    pub fn is_finished(&self, key: K) -> bool {
        self.state
            .lock_entries()
            .get(&key)
            .is_none_or(|entry| entry.ticker.is_cancelled())
    }

    /// Recompute every running countdown from its deadline.
    ///
    /// Call this when the process comes back to the foreground: tickers may
    /// have been frozen while suspended, but deadlines were not.
    pub fn on_resume(&self) {
        let now = self.state.clock.now();
        let (resumable, expired) = {
            let mut entries = self.state.lock_entries();
            let mut resumable = Vec::new();
            let mut expired = Vec::new();
            for &key in K::all() {
                let Some(entry) = entries.get(&key) else {
                    continue;
                };
                if now < entry.end_time {
                    resumable.push((key, Arc::clone(&entry.callback)));
                } else if let Some(entry) = entries.remove(&key) {
                    entry.ticker.cancel();
                    expired.push(entry);
                }
            }
            (resumable, expired)
        };
        debug!(
            resumed = resumable.len(),
            expired = expired.len(),
            "recomputing countdowns after resume"
        );

        for entry in expired {
            (entry.callback)(0, true);
        }
        for (key, callback) in resumable {
            self.resume_with(key, callback);
        }
    }

    /// Whole seconds left on the deadline for `key`, if one is registered.
    pub fn remaining(&self, key: K) -> Option<i64> {
        let end_time = self.state.lock_entries().get(&key).map(|e| e.end_time)?;
        Some(seconds_until(end_time, self.state.clock.now()).max(0))
    }

    /// Slots that currently hold a countdown, in declaration order.
    pub fn active_keys(&self) -> Vec<K> {
        let entries = self.state.lock_entries();
        K::all()
            .iter()
            .copied()
            .filter(|key| entries.contains_key(key))
            .collect()
    }

    /// Stop every countdown, with the same callback policy as `stop`.
    pub fn stop_all(&self) {
        for &key in K::all() {
            self.stop(key);
        }
    }

    fn resume_with(&self, key: K, callback: CountdownCallback) {
        let stored = self
            .state
            .lock_entries()
            .get(&key)
            .map(|e| (e.end_time, e.generation));
        match stored {
            Some((end_time, generation)) if self.state.clock.now() < end_time => {
                debug!(?key, %end_time, "continuing countdown");
                self.launch(key, end_time, callback, Some(generation));
            }
            _ => {
                trace!(?key, "nothing left to continue");
                callback(0, true);
            }
        }
    }

    /// Register and start ticking towards `end_time`.
    ///
    /// With `expected` set, the launch only goes ahead if `key` still holds
    /// that generation when the lock is taken again; a countdown stopped or
    /// finished in the meantime stays gone and the callback gets `(0, true)`.
    fn launch(
        &self,
        key: K,
        end_time: DateTime<Utc>,
        callback: CountdownCallback,
        expected: Option<u64>,
    ) {
        let now = self.state.clock.now();
        let mut entries = self.state.lock_entries();

        let still_owned = expected.is_none_or(|generation| {
            entries.get(&key).is_some_and(|e| e.generation == generation)
        });
        if !still_owned {
            drop(entries);
            trace!(?key, "countdown changed before it could continue");
            callback(0, true);
            return;
        }

        if now >= end_time {
            let replaced = entries.remove(&key);
            drop(entries);
            if let Some(entry) = replaced {
                entry.ticker.cancel();
            }
            callback(0, true);
            return;
        }

        // +1 so the first, immediate tick reports the full duration
        let remaining = seconds_until(end_time, now) + 1;
        let generation = self.state.next_generation.fetch_add(1, Ordering::Relaxed);
        let ticker = Ticker::spawn(
            &self.state.runtime,
            key,
            generation,
            remaining,
            Arc::clone(&callback),
            self.state.ticks.clone(),
        );
        let replaced = entries.insert(
            key,
            CountdownEntry {
                end_time,
                callback,
                ticker,
                generation,
            },
        );
        drop(entries);

        if let Some(old) = replaced {
            old.ticker.cancel();
            trace!(?key, generation = old.generation, "replaced running countdown");
        }
    }
}

impl<K: CountdownKey> RegistryState<K> {
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<K, CountdownEntry>> {
        // Callbacks never run under this lock, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, key: K, generation: u64) -> bool {
        self.lock_entries()
            .get(&key)
            .is_some_and(|entry| entry.generation == generation)
    }

    /// Hand a tick to its callback, then tear the entry down if it was the last one.
    pub(crate) fn deliver(&self, tick: Tick<K>) {
        let Tick {
            key,
            generation,
            remaining,
            finished,
            callback,
        } = tick;

        if !self.is_current(key, generation) {
            trace!(?key, generation, remaining, "dropping stale tick");
            return;
        }

        trace!(?key, remaining, finished, "tick");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(remaining, finished)));
        if outcome.is_err() {
            error!(?key, remaining, finished, "countdown callback panicked");
        }

        if finished {
            self.retire(key, generation);
        }
    }

    /// Remove the entry for `key` only if the finished launch still owns it,
    /// so a countdown restarted from inside the callback survives.
    fn retire(&self, key: K, generation: u64) {
        let retired = {
            let mut entries = self.lock_entries();
            if entries.get(&key).is_some_and(|e| e.generation == generation) {
                entries.remove(&key)
            } else {
                None
            }
        };
        if retired.is_some() {
            debug!(?key, "countdown finished");
        }
    }
}

/// `now + secs`, saturating at the representable range.
fn deadline_after(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}
