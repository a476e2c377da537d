//! # pulsor-core
//!
//! Named-function registry with bound callbacks.
//!
//! A pulser is a function registered under an alias. Pulsing the alias runs
//! the function and then every callback bound to it, with the same
//! arguments:
//!
//! - **Registry** - Alias to pulser mapping: create, destroy, list, inspect
//! - **Pulser** - Handle for one alias: pulse, bind and unbind callbacks
//! - **Recorder** - Injected diagnostics sink
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐ get_handle ┌─────────────┐   pulse   ┌─────────────┐
//! │  Registry   │───────────▶│   Pulser    │──────────▶│  Primary fn │
//! └─────────────┘            └─────────────┘           └─────────────┘
//!                                   │ on success
//!                                   ▼
//!                            ┌─────────────┐
//!                            │  Callbacks  │ (in bind order)
//!                            └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pulsor_core::{Callback, PulseFn, PulserOptions, Registry};
//! use serde_json::{json, Value};
//!
//! let registry = Registry::new();
//! let add = PulseFn::sync(|args| {
//!     let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
//!     Ok(json!(sum))
//! });
//!
//! let pulser = registry.create_pulser("add", Some(add), PulserOptions::new()).unwrap();
//! pulser.bind(&Callback::sync(|args| {
//!     println!("pulsed with {args:?}");
//!     Ok(())
//! })).unwrap();
//!
//! let result = pulser.pulse(vec![json!(5), json!(3)]).into_ready().unwrap().unwrap();
//! assert_eq!(result, json!(8));
//! ```

pub mod alias;
mod callbacks;
pub mod error;
pub mod function;
pub mod metrics;
pub mod pulser;
pub mod recorder;
pub mod registry;

pub use alias::{validate_alias, MAX_ALIAS_LENGTH};
pub use error::{BoxError, ErrorKind, PulsorError, ASYNC_CALLBACK_ON_SYNC, ASYNC_IN_SYNC_MODE};
pub use function::{Callback, CallbackId, CallbackResult, ExecutionMode, PulseFn, PulseResult};
pub use pulser::{Pulse, Pulser};
pub use recorder::{Level, LogLevels, NoopRecorder, Recorder, TracingRecorder};
pub use registry::{PulserInfo, PulserOptions, Registry, RegistryStats};
