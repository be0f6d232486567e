//! Countdown timers
//!
//! This module provides:
//! - **Keys**: the closed set of countdown slots
//! - **Registry**: starts, stops, continues and resumes countdowns per slot
//! - **Delivery**: a single task that runs every tick callback in order
//! - **Lifecycle**: resume hook for a process returning to the foreground
//!
//! # Ticks
//!
//! A countdown of `n` seconds reports `n, n-1, ..., 0`, one second apart,
//! with `finished = true` only on the final `0`.

mod active;
mod clock;
mod delivery;
mod error;
mod key;
mod lifecycle;
mod manager;
pub mod shared;


pub use active::{CountdownCallback, TICK_PERIOD};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RegistryError;
pub use key::{CountdownKey, TimerKey};
pub use lifecycle::{LifecycleEvent, spawn_lifecycle_listener};
pub use manager::CountdownRegistry;
