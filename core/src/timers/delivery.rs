//! Callback delivery
//!
//! Every tick passes through one task per registry, so callbacks run
//! sequentially: ticks for a key arrive in order and two callbacks never
//! overlap. This is the "main thread" the presentation layer can rely on.

use std::sync::Weak;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::active::CountdownCallback;
use super::key::CountdownKey;
use super::manager::RegistryState;

/// One tick waiting to be handed to its callback
pub(crate) struct Tick<K> {
    pub key: K,
    pub generation: u64,
    pub remaining: i64,
    pub finished: bool,
    pub callback: CountdownCallback,
}

/// Run the delivery loop until every sender is gone or the registry is dropped.
pub(crate) fn spawn_delivery<K: CountdownKey>(
    runtime: &Handle,
    registry: Weak<RegistryState<K>>,
    mut ticks: mpsc::Receiver<Tick<K>>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        while let Some(tick) = ticks.recv().await {
            let Some(registry) = registry.upgrade() else {
                break;
            };
            registry.deliver(tick);
        }
        tracing::trace!("countdown delivery stopped");
    })
}
