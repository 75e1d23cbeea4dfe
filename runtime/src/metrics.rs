//! Metrics emitted by the registry.
//!
//! The registry records through the `metrics` facade; the hosting process
//! decides which recorder (if any) is installed.

use metrics::describe_counter;

/// Counter incremented each time a handle is opened, labelled by `handle`.
pub const HANDLES_OPENED: &str = "managers_handles_opened_total";
/// Counter incremented each time a handle is closed, labelled by `handle`.
pub const HANDLES_CLOSED: &str = "managers_handles_closed_total";
/// Counter incremented each time opening or closing a handle fails, labelled
/// by `handle` and `operation`.
pub const HANDLE_ERRORS: &str = "managers_handle_errors_total";

/// Register all metric descriptions.
///
/// Call once after installing a recorder.
pub fn register_metrics() {
    describe_counter!(HANDLES_OPENED, "Total number of registry handles opened");
    describe_counter!(HANDLES_CLOSED, "Total number of registry handles closed");
    describe_counter!(
        HANDLE_ERRORS,
        "Total number of failures while opening or closing registry handles"
    );
}
