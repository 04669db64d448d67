//! Developer log for query compilation.
//!
//! `Query::compile_request` reports each compiled request as a one-line JSON event
//! (`{"event":"compile","class":...}`). Records go to the global logger at TRACE on
//! [`DEV_TARGET`], which the logging setup routes to `dev.log` or switches off. A thread-local
//! sink can capture the same lines so tests can assert on what a builder compiled.

use std::cell::RefCell;

/// Log target used for developer records.
pub const DEV_TARGET: &str = "odm_query::dev";

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Stops capturing on drop.
pub struct DevSinkGuard;

impl Drop for DevSinkGuard {
    fn drop(&mut self) {
        CAPTURED.with(|s| *s.borrow_mut() = None);
    }
}

/// Starts capturing developer records emitted on this thread.
pub fn enable_thread_sink() -> DevSinkGuard {
    CAPTURED.with(|s| *s.borrow_mut() = Some(Vec::new()));
    DevSinkGuard
}

pub fn write_str(msg: &str) {
    CAPTURED.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(msg.to_owned());
        }
    });
}

/// Takes every captured line. Empty when capture is off.
pub fn drain() -> Vec<String> {
    CAPTURED.with(|s| s.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

pub fn snapshot() -> Vec<String> {
    CAPTURED.with(|s| s.borrow().as_ref().cloned().unwrap_or_default())
}

/// Captured JSON events named `event`, oldest first. Lines that are not JSON objects, or carry
/// another event name, are skipped. The capture buffer is left as is.
pub fn events(event: &str) -> Vec<serde_json::Value> {
    snapshot()
        .iter()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|v| v.get("event").and_then(serde_json::Value::as_str) == Some(event))
        .collect()
}

/// Formats a developer record, captures it when the thread sink is on and logs it on
/// [`DEV_TARGET`].
#[macro_export]
macro_rules! devlog {
    ($($arg:tt)*) => {{
        let __line = format!($($arg)*);
        $crate::utils::devlog::write_str(&__line);
        log::log!(target: $crate::utils::devlog::DEV_TARGET, log::Level::Trace, "{}", __line);
    }};
}
