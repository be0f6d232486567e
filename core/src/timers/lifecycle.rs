//! Foreground/background notifications
//!
//! The host environment reports lifecycle transitions over a channel. Coming
//! back to the foreground triggers `on_resume` so countdowns catch up with
//! wall-clock time lost while suspended.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::key::CountdownKey;
use super::manager::CountdownRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    EnteredForeground,
    EnteredBackground,
}

/// Forward lifecycle events to `registry` until the sender side is dropped.
pub fn spawn_lifecycle_listener<K: CountdownKey>(
    registry: CountdownRegistry<K>,
    mut events: mpsc::Receiver<LifecycleEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                LifecycleEvent::EnteredForeground => registry.on_resume(),
                LifecycleEvent::EnteredBackground => {
                    tracing::debug!(active = registry.active_keys().len(), "entered background");
                }
            }
        }
    })
}
