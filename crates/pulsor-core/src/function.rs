//! Primary functions and callbacks.
//!
//! Both come in two flavors: ordinary functions that run to completion when
//! called, and async functions that return a future. The flavor a function
//! was built with is its declared nature and drives execution mode inference.

use crate::error::BoxError;
use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Result of a primary function.
pub type PulseResult = Result<Value, BoxError>;

/// Result of a callback. Callback values are discarded.
pub type CallbackResult = Result<(), BoxError>;

/// Name reported for functions without a usable type name.
pub const ANONYMOUS: &str = "anonymous";

/// How a pulser runs its primary function and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run to completion inside `pulse`, callbacks in sequence.
    Sync,
    /// Await the primary, then drive all callbacks concurrently.
    Async,
}

impl ExecutionMode {
    /// Check if this is the async mode.
    #[must_use]
    pub fn is_async(self) -> bool {
        matches!(self, Self::Async)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Async => f.write_str("async"),
        }
    }
}

type SyncFn<T> = dyn Fn(&[Value]) -> Result<T, BoxError> + Send + Sync;
type AsyncFn<T> = dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<T, BoxError>> + Send + Sync;

/// A type-erased function of either flavor.
pub(crate) enum Callable<T> {
    Sync(Arc<SyncFn<T>>),
    Async(Arc<AsyncFn<T>>),
}

impl<T> Clone for Callable<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Async(f) => Self::Async(Arc::clone(f)),
        }
    }
}

impl<T: Send + 'static> Callable<T> {
    pub(crate) fn kind(&self) -> ExecutionMode {
        match self {
            Self::Sync(_) => ExecutionMode::Sync,
            Self::Async(_) => ExecutionMode::Async,
        }
    }

    /// Call and return a future for the outcome.
    ///
    /// Sync functions run right here and yield an already-complete future.
    pub(crate) fn call_deferred(&self, args: &[Value]) -> BoxFuture<'static, Result<T, BoxError>> {
        match self {
            Self::Sync(f) => future::ready(f(args)).boxed(),
            Self::Async(f) => f(args.to_vec()),
        }
    }
}

fn function_name<F>() -> String {
    let full = std::any::type_name::<F>();
    if full.contains("{{closure}}") || full.starts_with("fn(") {
        return ANONYMOUS.to_string();
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// The primary function of a pulser.
#[derive(Clone)]
pub struct PulseFn {
    callable: Callable<Value>,
    name: String,
}

impl PulseFn {
    /// Wrap an ordinary function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> PulseResult + Send + Sync + 'static,
    {
        Self {
            name: function_name::<F>(),
            callable: Callable::Sync(Arc::new(f)),
        }
    }

    /// Wrap a function returning a future.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PulseResult> + Send + 'static,
    {
        Self {
            name: function_name::<F>(),
            callable: Callable::Async(Arc::new(move |args| f(args).boxed())),
        }
    }

    /// The function used when a pulser is registered without one.
    pub(crate) fn noop() -> Self {
        Self::sync(|_| Ok(Value::Null)).named("noop")
    }

    /// Set the name reported by introspection.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The execution mode this function's flavor implies.
    #[must_use]
    pub fn kind(&self) -> ExecutionMode {
        self.callable.kind()
    }

    pub(crate) fn callable(&self) -> &Callable<Value> {
        &self.callable
    }
}

impl fmt::Debug for PulseFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseFn")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

static CALLBACK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a callback. Clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    fn next() -> Self {
        Self(CALLBACK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb_{}", self.0)
    }
}

/// A function bound to a pulser, run after each successful pulse with the
/// same arguments.
///
/// Equality is identity: a callback equals its clones and nothing else, so
/// two callbacks built from identical closures can both be bound.
#[derive(Clone)]
pub struct Callback {
    id: CallbackId,
    callable: Callable<()>,
}

impl Callback {
    /// Wrap an ordinary function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> CallbackResult + Send + Sync + 'static,
    {
        Self {
            id: CallbackId::next(),
            callable: Callable::Sync(Arc::new(f)),
        }
    }

    /// Wrap a function returning a future.
    ///
    /// Async callbacks can only be bound to async pulsers.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        Self {
            id: CallbackId::next(),
            callable: Callable::Async(Arc::new(move |args| f(args).boxed())),
        }
    }

    /// Get the callback identity.
    #[must_use]
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// The execution mode this callback's flavor requires.
    #[must_use]
    pub fn kind(&self) -> ExecutionMode {
        self.callable.kind()
    }

    pub(crate) fn callable(&self) -> &Callable<()> {
        &self.callable
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn double(args: &[Value]) -> PulseResult {
        let n = args.first().and_then(Value::as_i64).unwrap_or(0);
        Ok(json!(n * 2))
    }

    async fn lookup(args: Vec<Value>) -> PulseResult {
        Ok(json!({ "data": args.first().cloned() }))
    }

    #[test]
    fn test_function_kind() {
        assert_eq!(PulseFn::sync(double).kind(), ExecutionMode::Sync);
        assert_eq!(PulseFn::from_async(lookup).kind(), ExecutionMode::Async);
        assert_eq!(
            PulseFn::from_async(|_| async { Ok::<_, BoxError>(Value::Null) }).kind(),
            ExecutionMode::Async
        );
    }

    #[test]
    fn test_function_names() {
        assert_eq!(PulseFn::sync(double).name(), "double");
        assert_eq!(PulseFn::from_async(lookup).name(), "lookup");
        assert_eq!(PulseFn::sync(|_| Ok(Value::Null)).name(), ANONYMOUS);
        assert_eq!(PulseFn::sync(|_| Ok(Value::Null)).named("add").name(), "add");
        assert_eq!(PulseFn::noop().name(), "noop");
    }

    #[test]
    fn test_callback_identity() {
        let a = Callback::sync(|_| Ok(()));
        let b = Callback::sync(|_| Ok(()));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_call_deferred_runs_sync_now() {
        let f = PulseFn::sync(double);
        let fut = f.callable().call_deferred(&[json!(21)]);
        assert_eq!(fut.now_or_never().unwrap().unwrap(), json!(42));

        let g = PulseFn::from_async(lookup);
        let value = g.callable().call_deferred(&[json!(7)]).await.unwrap();
        assert_eq!(value, json!({ "data": 7 }));
    }

    #[test]
    fn test_execution_mode_display() {
        assert_eq!(ExecutionMode::Sync.to_string(), "sync");
        assert_eq!(ExecutionMode::Async.to_string(), "async");
        assert_eq!(
            serde_json::to_string(&ExecutionMode::Async).unwrap(),
            "\"async\""
        );
    }
}
