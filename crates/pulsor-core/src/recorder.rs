//! Diagnostics sink for the registry.
//!
//! The registry never depends on a recorder for correctness. It reports
//! lifecycle events at [`Level::Log`] and callback failures at
//! [`Level::Warn`]; everything else is up to the recorder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, trace, warn};

/// Default message prefix.
pub const DEFAULT_PREFIX: &str = "[Pulsor]";

/// Diagnostic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Routine lifecycle messages.
    Log,
    Warn,
    Error,
    Info,
    Debug,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Log => "log",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Something that accepts diagnostic messages.
pub trait Recorder: Send + Sync {
    /// Record a message at a level.
    fn record(&self, level: Level, message: &str);
}

/// A recorder that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {
    fn record(&self, _level: Level, _message: &str) {}
}

/// Level switches.
///
/// `None` leaves a level as it is when applied with
/// [`TracingRecorder::set_levels`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLevels {
    #[serde(default)]
    pub log: Option<bool>,
    #[serde(default)]
    pub warn: Option<bool>,
    #[serde(default)]
    pub error: Option<bool>,
    #[serde(default)]
    pub info: Option<bool>,
    #[serde(default)]
    pub debug: Option<bool>,
}

impl LogLevels {
    /// Levels enabled out of the box: everything but debug.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            log: Some(true),
            warn: Some(true),
            error: Some(true),
            info: Some(true),
            debug: Some(false),
        }
    }

    /// Set a single level.
    #[must_use]
    pub fn with(mut self, level: Level, enabled: bool) -> Self {
        *self.slot(level) = Some(enabled);
        self
    }

    fn slot(&mut self, level: Level) -> &mut Option<bool> {
        match level {
            Level::Log => &mut self.log,
            Level::Warn => &mut self.warn,
            Level::Error => &mut self.error,
            Level::Info => &mut self.info,
            Level::Debug => &mut self.debug,
        }
    }
}

/// Recorder that forwards to `tracing`, with per-level switches.
///
/// `Log` maps to `debug!` and `Debug` maps to `trace!`; the other levels map
/// to their namesakes.
#[derive(Debug)]
pub struct TracingRecorder {
    prefix: String,
    log: AtomicBool,
    warn: AtomicBool,
    error: AtomicBool,
    info: AtomicBool,
    debug: AtomicBool,
}

impl TracingRecorder {
    /// Create a recorder with the default prefix and standard levels.
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    /// Create a recorder with a custom prefix.
    ///
    /// A blank prefix falls back to the default one.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = match prefix.trim() {
            "" => DEFAULT_PREFIX.to_string(),
            trimmed => trimmed.to_string(),
        };
        let recorder = Self {
            prefix,
            log: AtomicBool::new(false),
            warn: AtomicBool::new(false),
            error: AtomicBool::new(false),
            info: AtomicBool::new(false),
            debug: AtomicBool::new(false),
        };
        recorder.set_levels(LogLevels::standard());
        recorder
    }

    /// Get the message prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Turn levels on or off. Levels left as `None` are untouched.
    ///
    /// `debug` is ignored here; use [`TracingRecorder::set_debug`].
    pub fn set_levels(&self, levels: LogLevels) {
        let pairs = [
            (&self.log, levels.log),
            (&self.warn, levels.warn),
            (&self.error, levels.error),
            (&self.info, levels.info),
        ];
        for (flag, value) in pairs {
            if let Some(enabled) = value {
                flag.store(enabled, Ordering::Relaxed);
            }
        }
    }

    /// Turn the debug level on or off.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Check whether a level is enabled.
    #[must_use]
    pub fn is_enabled(&self, level: Level) -> bool {
        let flag = match level {
            Level::Log => &self.log,
            Level::Warn => &self.warn,
            Level::Error => &self.error,
            Level::Info => &self.info,
            Level::Debug => &self.debug,
        };
        flag.load(Ordering::Relaxed)
    }

    /// Prepend the prefix to a message.
    #[must_use]
    pub fn format(&self, message: &str) -> String {
        format!("{}: {}", self.prefix, message)
    }
}

impl Default for TracingRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder for TracingRecorder {
    fn record(&self, level: Level, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        let prefix = &self.prefix;
        match level {
            Level::Log => debug!(target: "pulsor", prefix = %prefix, "{}", message),
            Level::Debug => trace!(target: "pulsor", prefix = %prefix, "{}", message),
            Level::Info => info!(target: "pulsor", prefix = %prefix, "{}", message),
            Level::Warn => warn!(target: "pulsor", prefix = %prefix, "{}", message),
            Level::Error => error!(target: "pulsor", prefix = %prefix, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_levels() {
        let recorder = TracingRecorder::new();
        assert!(recorder.is_enabled(Level::Log));
        assert!(recorder.is_enabled(Level::Warn));
        assert!(recorder.is_enabled(Level::Error));
        assert!(recorder.is_enabled(Level::Info));
        assert!(!recorder.is_enabled(Level::Debug));
    }

    #[test]
    fn test_set_levels_partial() {
        let recorder = TracingRecorder::new();
        recorder.set_levels(LogLevels::default().with(Level::Warn, false));

        assert!(!recorder.is_enabled(Level::Warn));
        // Untouched
        assert!(recorder.is_enabled(Level::Log));
        assert!(!recorder.is_enabled(Level::Debug));

        recorder.set_levels(LogLevels::default().with(Level::Debug, true));
        assert!(!recorder.is_enabled(Level::Debug));
    }

    #[test]
    fn test_set_debug() {
        let recorder = TracingRecorder::new();
        recorder.set_debug(true);
        assert!(recorder.is_enabled(Level::Debug));

        recorder.set_levels(LogLevels::standard());
        assert!(recorder.is_enabled(Level::Debug));

        recorder.set_debug(false);
        assert!(!recorder.is_enabled(Level::Debug));
    }

    #[test]
    fn test_prefix() {
        let recorder = TracingRecorder::with_prefix("  [Fragments] ");
        assert_eq!(recorder.prefix(), "[Fragments]");
        assert_eq!(recorder.format("ready"), "[Fragments]: ready");

        let blank = TracingRecorder::with_prefix("   ");
        assert_eq!(blank.prefix(), DEFAULT_PREFIX);
    }

    #[test]
    fn test_levels_deserialize() {
        let levels: LogLevels = serde_json::from_str(r#"{"warn": false, "debug": true}"#).unwrap();
        assert_eq!(levels.warn, Some(false));
        assert_eq!(levels.debug, Some(true));
        assert_eq!(levels.log, None);
    }

    #[test]
    fn test_record_disabled_is_silent() {
        let recorder = TracingRecorder::new();
        recorder.set_levels(LogLevels::default().with(Level::Error, false));
        // Nothing to observe without a subscriber, just make sure it does not panic
        recorder.record(Level::Error, "dropped");
        NoopRecorder.record(Level::Warn, "dropped");
    }
}
