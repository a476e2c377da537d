//! Shared fixtures for the Pulsor benchmarks.

use pulsor_core::{BoxError, Callback, NoopRecorder, PulseFn, Pulser, PulserOptions, Registry};
use serde_json::{json, Value};
use std::sync::Arc;

/// A registry that records nothing, so benches measure dispatch only.
#[must_use]
pub fn quiet_registry() -> Registry {
    Registry::with_recorder(Arc::new(NoopRecorder))
}

/// Register a sync pulser that sums its integer arguments, with `callbacks`
/// no-op callbacks bound.
///
/// # Panics
///
/// Panics if `alias` is invalid or already taken.
#[must_use]
pub fn sync_pulser(registry: &Registry, alias: &str, callbacks: usize) -> Pulser {
    let sum = PulseFn::sync(|args| Ok(json!(args.iter().filter_map(Value::as_i64).sum::<i64>())));
    let pulser = registry
        .create_pulser(alias, Some(sum), PulserOptions::new())
        .unwrap();
    for _ in 0..callbacks {
        pulser.bind(&Callback::sync(|_| Ok(()))).unwrap();
    }
    pulser
}

/// Register an async pulser echoing its first argument, with `callbacks`
/// async no-op callbacks bound.
///
/// # Panics
///
/// Panics if `alias` is invalid or already taken.
#[must_use]
pub fn async_pulser(registry: &Registry, alias: &str, callbacks: usize) -> Pulser {
    let echo = PulseFn::from_async(|args: Vec<Value>| async move {
        Ok::<_, BoxError>(args.into_iter().next().unwrap_or(Value::Null))
    });
    let pulser = registry
        .create_pulser(alias, Some(echo), PulserOptions::new())
        .unwrap();
    for _ in 0..callbacks {
        pulser
            .bind(&Callback::from_async(|_| async { Ok::<_, BoxError>(()) }))
            .unwrap();
    }
    pulser
}
