//! Pulse instrumentation.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder (see the `pulsor` binary).

use crate::function::ExecutionMode;
use metrics::{counter, gauge};

/// Metric names.
pub mod names {
    pub const PULSES_TOTAL: &str = "pulsor_pulses_total";
    pub const PRIMARY_FAILURES_TOTAL: &str = "pulsor_primary_failures_total";
    pub const CALLBACKS_DISPATCHED_TOTAL: &str = "pulsor_callbacks_dispatched_total";
    pub const CALLBACK_FAILURES_TOTAL: &str = "pulsor_callback_failures_total";
    pub const PULSERS_ACTIVE: &str = "pulsor_pulsers_active";
}

/// Describe all metrics. Call once after installing an exporter.
pub fn describe_metrics() {
    metrics::describe_counter!(names::PULSES_TOTAL, "Total number of pulses started");
    metrics::describe_counter!(
        names::PRIMARY_FAILURES_TOTAL,
        "Pulses whose primary function failed"
    );
    metrics::describe_counter!(
        names::CALLBACKS_DISPATCHED_TOTAL,
        "Total number of callback invocations"
    );
    metrics::describe_counter!(
        names::CALLBACK_FAILURES_TOTAL,
        "Callback invocations that failed"
    );
    metrics::describe_gauge!(names::PULSERS_ACTIVE, "Currently registered pulsers");
}

pub(crate) fn record_pulse(mode: ExecutionMode) {
    counter!(names::PULSES_TOTAL, "mode" => mode.to_string()).increment(1);
}

pub(crate) fn record_primary_failure(mode: ExecutionMode) {
    counter!(names::PRIMARY_FAILURES_TOTAL, "mode" => mode.to_string()).increment(1);
}

pub(crate) fn record_callbacks(count: usize) {
    counter!(names::CALLBACKS_DISPATCHED_TOTAL).increment(count as u64);
}

pub(crate) fn record_callback_failure() {
    counter!(names::CALLBACK_FAILURES_TOTAL).increment(1);
}

pub(crate) fn set_active_pulsers(count: usize) {
    gauge!(names::PULSERS_ACTIVE).set(count as f64);
}
