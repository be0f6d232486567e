//! Process-wide countdown registry
//!
//! The application builds it once at startup with [`init`] and reaches it
//! from anywhere through [`get`]. Nothing stops tests or embedders from
//! building independent registries with `CountdownRegistry::new`.

use std::sync::OnceLock;

use tokio::runtime::Handle;

use super::error::RegistryError;
use super::key::TimerKey;
use super::manager::CountdownRegistry;
use crate::context::CountdownConfig;

static SHARED_REGISTRY: OnceLock<CountdownRegistry<TimerKey>> = OnceLock::new();

/// Build the shared registry on the current tokio runtime.
pub fn init(
    config: &CountdownConfig,
) -> Result<&'static CountdownRegistry<TimerKey>, RegistryError> {
    let runtime = Handle::try_current().map_err(RegistryError::NoRuntime)?;

    let mut created = false;
    let registry = SHARED_REGISTRY.get_or_init(|| {
        created = true;
        CountdownRegistry::new(runtime, config)
    });

    if created {
        tracing::info!("countdown registry initialized");
        Ok(registry)
    } else {
        Err(RegistryError::AlreadyInitialized)
    }
}

/// The shared registry, once [`init`] has run.
pub fn get() -> Option<&'static CountdownRegistry<TimerKey>> {
    SHARED_REGISTRY.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_outside_runtime_fails() {
        let result = init(&CountdownConfig::default());
        assert!(matches!(result, Err(RegistryError::NoRuntime(_))));
    }

    #[tokio::test]
    async fn init_only_once() {
        let config = CountdownConfig::default();
        let first = init(&config).expect("first init succeeds");
        assert!(matches!(init(&config), Err(RegistryError::AlreadyInitialized)));
        assert!(std::ptr::eq(first, get().expect("registry available")));
        assert!(first.is_finished(TimerKey::Primary));
    }
}
