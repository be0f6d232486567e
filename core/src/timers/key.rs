//! Countdown slots
//!
//! The key space is closed: every countdown an application runs has a slot
//! declared up front, so the registry can walk all of them on resume.

use std::fmt::Debug;
use std::hash::Hash;

/// A closed, enumerable set of countdown slots.
pub trait CountdownKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every slot, in the order `on_resume` and `stop_all` visit them.
    fn all() -> &'static [Self];
}

/// Default slot set used by the process-wide registry and the CLI.
///
/// Add a variant here when the application needs another countdown. With the
/// `cli` feature the same names are what clap accepts on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TimerKey {
    Primary,
    Secondary,
}

impl TimerKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerKey::Primary => "primary",
            TimerKey::Secondary => "secondary",
        }
    }
}

impl CountdownKey for TimerKey {
    fn all() -> &'static [Self] {
        &[TimerKey::Primary, TimerKey::Secondary]
    }
}

impl std::fmt::Display for TimerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
