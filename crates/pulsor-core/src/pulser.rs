//! Pulser handles and the pulse protocol.
//!
//! A [`Pulser`] is a view onto one registry entry. Handles are cheap to
//! create and clone, and all handles for an alias share the same callback
//! set.
//!
//! Pulsing runs the primary function and, only if it succeeds, every bound
//! callback with the same arguments. Callback failures are reported to the
//! recorder and never reach the caller. The callback set is walked live: see
//! [`crate::callbacks`].

use crate::callbacks::Seq;
use crate::error::{BoxError, PulsorError, ASYNC_CALLBACK_ON_SYNC, ASYNC_IN_SYNC_MODE};
use crate::function::{Callable, Callback, CallbackResult, ExecutionMode, PulseResult};
use crate::metrics;
use crate::recorder::{Level, Recorder};
use crate::registry::PulserEntry;
use futures_util::future::{self, BoxFuture, Ready};
use futures_util::FutureExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::trace;

/// Outcome of [`Pulser::pulse`].
///
/// Sync pulsers return an already-complete pulse; async pulsers return one
/// that does nothing until awaited. Either way it can be awaited.
#[must_use = "async pulses do nothing unless awaited"]
pub struct Pulse {
    inner: PulseInner,
}

enum PulseInner {
    Ready(Ready<PulseResult>),
    Deferred(BoxFuture<'static, PulseResult>),
}

impl Pulse {
    fn ready(result: PulseResult) -> Self {
        Self {
            inner: PulseInner::Ready(future::ready(result)),
        }
    }

    fn deferred(fut: BoxFuture<'static, PulseResult>) -> Self {
        Self {
            inner: PulseInner::Deferred(fut),
        }
    }

    /// Check if the pulse already ran to completion.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.inner, PulseInner::Ready(_))
    }

    /// Take the result of a completed pulse, or get the pulse back if it
    /// still has to be awaited.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` for a deferred pulse.
    pub fn into_ready(self) -> Result<PulseResult, Self> {
        match self.inner {
            PulseInner::Ready(ready) => Ok(ready.into_inner()),
            inner @ PulseInner::Deferred(_) => Err(Self { inner }),
        }
    }
}

impl Future for Pulse {
    type Output = PulseResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            PulseInner::Ready(ready) => Pin::new(ready).poll(cx),
            PulseInner::Deferred(fut) => fut.as_mut().poll(cx),
        }
    }
}

impl fmt::Debug for Pulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pulse")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Handle to a registered pulser.
#[derive(Clone)]
pub struct Pulser {
    alias: String,
    entry: Arc<PulserEntry>,
    recorder: Arc<dyn Recorder>,
}

impl Pulser {
    pub(crate) fn new(alias: &str, entry: Arc<PulserEntry>, recorder: Arc<dyn Recorder>) -> Self {
        Self {
            alias: alias.to_string(),
            entry,
            recorder,
        }
    }

    /// Get the alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Get the execution mode.
    #[must_use]
    pub fn execution_mode(&self) -> ExecutionMode {
        self.entry.mode
    }

    /// Get the number of bound callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.entry.callbacks.lock().len()
    }

    /// Get the primary function's name.
    #[must_use]
    pub fn function_name(&self) -> &str {
        self.entry.function.name()
    }

    /// Run the primary function, then the bound callbacks.
    ///
    /// In sync mode everything runs before this returns. In async mode the
    /// returned pulse awaits the primary, drives all callbacks concurrently,
    /// and resolves with the primary's value once every callback settled.
    pub fn pulse(&self, args: Vec<Value>) -> Pulse {
        metrics::record_pulse(self.entry.mode);
        match self.entry.mode {
            ExecutionMode::Sync => Pulse::ready(self.pulse_sync(&args)),
            ExecutionMode::Async => Pulse::deferred(self.pulse_async(args)),
        }
    }

    fn pulse_sync(&self, args: &[Value]) -> PulseResult {
        let Callable::Sync(primary) = self.entry.function.callable() else {
            return Err(self.mode_mismatch(ASYNC_IN_SYNC_MODE).into());
        };

        let value = primary(args).map_err(|err| {
            metrics::record_primary_failure(ExecutionMode::Sync);
            err
        })?;

        let mut cursor: Option<Seq> = None;
        let mut dispatched = 0;
        loop {
            let next = self.entry.callbacks.lock().next_after(cursor);
            let Some((seq, callback)) = next else {
                break;
            };
            cursor = Some(seq);
            dispatched += 1;

            let outcome = match callback.callable() {
                Callable::Sync(f) => f(args),
                Callable::Async(_) => Err(self.mode_mismatch(ASYNC_CALLBACK_ON_SYNC).into()),
            };
            if let Err(err) = outcome {
                self.report_callback_failure("Sync", &err);
            }
        }

        metrics::record_callbacks(dispatched);
        trace!(alias = %self.alias, callbacks = dispatched, "Sync pulse complete");
        Ok(value)
    }

    fn pulse_async(&self, args: Vec<Value>) -> BoxFuture<'static, PulseResult> {
        let this = self.clone();
        async move {
            let primary = this.entry.function.callable().call_deferred(&args);
            let value = primary.await.map_err(|err| {
                metrics::record_primary_failure(ExecutionMode::Async);
                err
            })?;

            let pending = this.dispatch_async(&args);
            let dispatched = pending.len();
            if dispatched > 0 {
                for outcome in future::join_all(pending).await {
                    if let Err(err) = outcome {
                        this.report_callback_failure("Async", &err);
                    }
                }
            }

            metrics::record_callbacks(dispatched);
            trace!(alias = %this.alias, callbacks = dispatched, "Async pulse complete");
            Ok(value)
        }
        .boxed()
    }

    /// Call every bound callback in order and collect their futures.
    fn dispatch_async(&self, args: &[Value]) -> Vec<BoxFuture<'static, CallbackResult>> {
        let mut pending = Vec::new();
        let mut cursor: Option<Seq> = None;
        loop {
            let next = self.entry.callbacks.lock().next_after(cursor);
            let Some((seq, callback)) = next else {
                break;
            };
            cursor = Some(seq);
            pending.push(callback.callable().call_deferred(args));
        }
        pending
    }

    /// Bind a callback. Returns the handle for chaining.
    ///
    /// # Errors
    ///
    /// - [`PulsorError::InvalidFunction`] for an async callback on a sync pulser.
    /// - [`PulsorError::AlreadyBound`] if this callback is already bound.
    pub fn bind(&self, callback: &Callback) -> Result<&Self, PulsorError> {
        if !self.entry.mode.is_async() && callback.kind().is_async() {
            return Err(self.mode_mismatch(ASYNC_CALLBACK_ON_SYNC));
        }

        let inserted = self.entry.callbacks.lock().insert(callback.clone());
        if !inserted {
            return Err(PulsorError::AlreadyBound(self.alias.clone()));
        }

        self.recorder
            .record(Level::Log, &format!("Callback added to '{}'.", self.alias));
        Ok(self)
    }

    /// Unbind a callback. Returns `true` if it was bound.
    pub fn unbind(&self, callback: &Callback) -> bool {
        let removed = self.entry.callbacks.lock().remove(callback);
        if removed {
            self.recorder
                .record(Level::Log, &format!("Callback removed from '{}'.", self.alias));
        }
        removed
    }

    /// Bind several callbacks in order.
    ///
    /// Not transactional: callbacks before a failing one stay bound.
    ///
    /// # Errors
    ///
    /// Returns [`PulsorError::AtIndex`] wrapping the first failure.
    pub fn bind_many(&self, callbacks: &[Callback]) -> Result<&Self, PulsorError> {
        for (index, callback) in callbacks.iter().enumerate() {
            self.bind(callback)
                .map_err(|err| PulsorError::at_index(index, err))?;
        }
        Ok(self)
    }

    /// Unbind several callbacks. Returns how many were actually bound.
    pub fn unbind_many(&self, callbacks: &[Callback]) -> usize {
        callbacks.iter().filter(|cb| self.unbind(cb)).count()
    }

    /// Unbind every callback. Returns how many were removed.
    pub fn unbind_all(&self) -> usize {
        let count = self.entry.callbacks.lock().clear();
        if count > 0 {
            self.recorder.record(
                Level::Log,
                &format!("All {} callbacks removed from '{}'.", count, self.alias),
            );
        }
        count
    }

    /// A free-standing function equivalent to [`Pulser::pulse`], for event
    /// handlers and timers.
    pub fn as_callback(&self) -> impl Fn(Vec<Value>) -> Pulse + Clone + Send + Sync + 'static {
        let this = self.clone();
        move |args| this.pulse(args)
    }

    fn report_callback_failure(&self, flavor: &str, err: &BoxError) {
        metrics::record_callback_failure();
        self.recorder.record(
            Level::Warn,
            &format!("{} callback error in '{}': {}", flavor, self.alias, err),
        );
    }

    fn mode_mismatch(&self, reason: &'static str) -> PulsorError {
        PulsorError::InvalidFunction {
            alias: self.alias.clone(),
            reason,
        }
    }
}

impl fmt::Debug for Pulser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pulser")
            .field("alias", &self.alias)
            .field("mode", &self.entry.mode)
            .field("callbacks", &self.callback_count())
            .finish()
    }
}
