use countdown_core::timers::shared;
use countdown_core::{
    CountdownConfig, CountdownRegistry, LifecycleEvent, TimerKey, spawn_lifecycle_listener,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Holds all shared state for the CLI application.
pub struct CliContext {
    pub config: CountdownConfig,
    pub registry: &'static CountdownRegistry<TimerKey>,
    /// Stands in for the host's foreground/background notifications
    pub lifecycle: mpsc::Sender<LifecycleEvent>,
    lifecycle_task: Option<JoinHandle<()>>,
}

impl CliContext {
    /// Load configuration and bring up the shared registry.
    /// Must be called from inside the tokio runtime.
    pub fn new() -> Result<Self, String> {
        let config = CountdownConfig::load();
        let registry = shared::init(&config).map_err(|e| e.to_string())?;

        let (tx, rx) = mpsc::channel(8);
        let lifecycle_task = spawn_lifecycle_listener(registry.clone(), rx);

        Ok(Self {
            config,
            registry,
            lifecycle: tx,
            lifecycle_task: Some(lifecycle_task),
        })
    }

    /// Stop every countdown and the lifecycle listener.
    pub fn shutdown(&mut self) {
        self.registry.stop_all();
        if let Some(handle) = self.lifecycle_task.take() {
            handle.abort();
        }
    }
}
