//! The pulser registry.
//!
//! The registry maps aliases to pulser entries. It is a plain service object:
//! build one, share it behind an `Arc`, and hand it to whoever needs it.

use crate::alias::validate_alias;
use crate::callbacks::CallbackSet;
use crate::error::{PulsorError, ASYNC_IN_SYNC_MODE};
use crate::function::{ExecutionMode, PulseFn};
use crate::metrics;
use crate::pulser::Pulser;
use crate::recorder::{Level, Recorder, TracingRecorder};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Options for [`Registry::create_pulser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PulserOptions {
    /// Replace an existing pulser with the same alias.
    pub override_existing: bool,
    /// Force an execution mode. `None` infers it from the function.
    pub mode: Option<ExecutionMode>,
}

impl PulserOptions {
    /// Default options: no override, inferred mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow replacing an existing pulser.
    #[must_use]
    pub fn with_override(mut self) -> Self {
        self.override_existing = true;
        self
    }

    /// Force an execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// The registration record behind an alias.
///
/// Shared by every handle for the alias; only the callback set ever changes.
pub(crate) struct PulserEntry {
    pub(crate) function: PulseFn,
    pub(crate) mode: ExecutionMode,
    pub(crate) callbacks: Mutex<CallbackSet>,
}

impl PulserEntry {
    fn new(function: PulseFn, mode: ExecutionMode) -> Self {
        Self {
            function,
            mode,
            callbacks: Mutex::new(CallbackSet::new()),
        }
    }
}

/// Registry slot. `seq` keeps the alias's place in [`Registry::list`].
struct Slot {
    seq: u64,
    entry: Arc<PulserEntry>,
}

/// Read-only description of a pulser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PulserInfo {
    pub alias: String,
    pub execution_mode: ExecutionMode,
    pub callback_count: usize,
    pub function_name: String,
}

/// Registry statistics.
#[derive(Debug, Clone)]
pub struct RegistryStats {
    /// Number of registered pulsers.
    pub pulser_count: usize,
    /// Callbacks bound across all pulsers.
    pub total_callbacks: usize,
}

/// The pulser registry.
pub struct Registry {
    /// Entries indexed by trimmed alias.
    pulsers: DashMap<String, Slot>,
    /// Next insertion sequence.
    next_seq: AtomicU64,
    /// Diagnostics sink shared with handles.
    recorder: Arc<dyn Recorder>,
}

impl Registry {
    /// Create a registry that logs through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_recorder(Arc::new(TracingRecorder::new()))
    }

    /// Create a registry with a custom recorder.
    #[must_use]
    pub fn with_recorder(recorder: Arc<dyn Recorder>) -> Self {
        Self {
            pulsers: DashMap::new(),
            next_seq: AtomicU64::new(0),
            recorder,
        }
    }

    /// Get the recorder.
    #[must_use]
    pub fn recorder(&self) -> &Arc<dyn Recorder> {
        &self.recorder
    }

    /// Register a pulser and return a handle to it.
    ///
    /// A `None` function registers a no-op that returns `null`.
    ///
    /// # Errors
    ///
    /// - [`PulsorError::InvalidAlias`] for a bad alias.
    /// - [`PulsorError::InvalidFunction`] when an async function is forced into sync mode.
    /// - [`PulsorError::AlreadyExists`] when the alias is taken and override is off.
    pub fn create_pulser(
        &self,
        alias: &str,
        function: Option<PulseFn>,
        options: PulserOptions,
    ) -> Result<Pulser, PulsorError> {
        let alias = validate_alias(alias)?;
        let function = function.unwrap_or_else(PulseFn::noop);
        let mode = resolve_mode(alias, &function, options.mode)?;
        let entry = Arc::new(PulserEntry::new(function, mode));

        let replaced = match self.pulsers.entry(alias.to_string()) {
            Entry::Occupied(mut occupied) => {
                if !options.override_existing {
                    return Err(PulsorError::AlreadyExists(alias.to_string()));
                }
                // Pulses in flight keep the old entry and its callbacks
                occupied.get_mut().entry = Arc::clone(&entry);
                true
            }
            Entry::Vacant(vacant) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Slot {
                    seq,
                    entry: Arc::clone(&entry),
                });
                false
            }
        };

        if replaced {
            self.recorder.record(
                Level::Log,
                &format!("Pulser '{alias}' already exists. Overriding."),
            );
        }

        metrics::set_active_pulsers(self.pulsers.len());
        debug!(alias = %alias, mode = %mode, function = %entry.function.name(), "Created pulser");
        self.recorder
            .record(Level::Log, &format!("Pulser '{alias}' ({mode}) created."));

        Ok(Pulser::new(alias, entry, Arc::clone(&self.recorder)))
    }

    /// Remove a pulser and its callbacks from the registry.
    ///
    /// Handles already holding the entry, including a pulse in progress,
    /// keep operating on it.
    ///
    /// # Errors
    ///
    /// Returns [`PulsorError::InvalidAlias`] for a bad alias, or
    /// [`PulsorError::NotFound`] if nothing is registered under it.
    pub fn destroy_pulser(&self, alias: &str) -> Result<(), PulsorError> {
        let alias = validate_alias(alias)?;
        let (_, slot) = self
            .pulsers
            .remove(alias)
            .ok_or_else(|| PulsorError::NotFound(alias.to_string()))?;

        let dropped = slot.entry.callbacks.lock().len();

        metrics::set_active_pulsers(self.pulsers.len());
        debug!(alias = %alias, callbacks = dropped, "Destroyed pulser");
        self.recorder.record(
            Level::Log,
            &format!("Pulser '{alias}' and all its callbacks have been destroyed."),
        );
        Ok(())
    }

    /// Check if a pulser exists. Invalid aliases are simply absent.
    #[must_use]
    pub fn exists(&self, alias: &str) -> bool {
        validate_alias(alias)
            .map(|alias| self.pulsers.contains_key(alias))
            .unwrap_or(false)
    }

    /// Get all aliases, oldest registration first.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut aliases: Vec<(u64, String)> = self
            .pulsers
            .iter()
            .map(|slot| (slot.seq, slot.key().clone()))
            .collect();
        aliases.sort_unstable_by_key(|(seq, _)| *seq);
        aliases.into_iter().map(|(_, alias)| alias).collect()
    }

    /// Describe a pulser, or `None` if the alias is invalid or unknown.
    #[must_use]
    pub fn info(&self, alias: &str) -> Option<PulserInfo> {
        let alias = validate_alias(alias).ok()?;
        let entry = self.lookup(alias)?;
        let callback_count = entry.callbacks.lock().len();
        Some(PulserInfo {
            alias: alias.to_string(),
            execution_mode: entry.mode,
            callback_count,
            function_name: entry.function.name().to_string(),
        })
    }

    /// Get a handle for a registered pulser.
    ///
    /// # Errors
    ///
    /// Returns [`PulsorError::InvalidAlias`] for a bad alias, or
    /// [`PulsorError::NotFound`] if nothing is registered under it.
    pub fn get_handle(&self, alias: &str) -> Result<Pulser, PulsorError> {
        let alias = validate_alias(alias)?;
        let entry = self
            .lookup(alias)
            .ok_or_else(|| PulsorError::NotFound(alias.to_string()))?;
        Ok(Pulser::new(alias, entry, Arc::clone(&self.recorder)))
    }

    /// Number of registered pulsers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pulsers.len()
    }

    /// Check if no pulser is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pulsers.is_empty()
    }

    /// Get registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let entries: Vec<Arc<PulserEntry>> = self
            .pulsers
            .iter()
            .map(|slot| Arc::clone(&slot.entry))
            .collect();
        RegistryStats {
            pulser_count: entries.len(),
            total_callbacks: entries.iter().map(|e| e.callbacks.lock().len()).sum(),
        }
    }

    fn lookup(&self, alias: &str) -> Option<Arc<PulserEntry>> {
        self.pulsers.get(alias).map(|slot| Arc::clone(&slot.entry))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_mode(
    alias: &str,
    function: &PulseFn,
    requested: Option<ExecutionMode>,
) -> Result<ExecutionMode, PulsorError> {
    let inferred = function.kind();
    match requested {
        None => Ok(inferred),
        Some(ExecutionMode::Sync) if inferred.is_async() => Err(PulsorError::InvalidFunction {
            alias: alias.to_string(),
            reason: ASYNC_IN_SYNC_MODE,
        }),
        Some(mode) => Ok(mode),
    }
}
