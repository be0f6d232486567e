pub mod context;
pub mod serde_defaults;
pub mod timers;

// Re-exports for convenience
pub use context::{ConfigError, CountdownConfig};
pub use timers::{
    Clock, CountdownCallback, CountdownKey, CountdownRegistry, LifecycleEvent, ManualClock,
    RegistryError, SystemClock, TimerKey, spawn_lifecycle_listener,
};
