#![deny(missing_docs)]
//! Logging for pm-console.
//!
//! The session loop on the main thread advances a render tick; records
//! emitted on that thread carry `[tick N]` so log lines can be lined up
//! with what the terminal showed. Engine threads never set a tick and
//! log without the prefix.

use std::cell::Cell;

thread_local! {
    /// Render tick of the session loop running on this thread; 0 when none.
    static RENDER_TICK: Cell<u64> = const { Cell::new(0) };
}

/// Records the session loop's current render tick for this thread.
pub fn set_render_tick(tick: u64) {
    RENDER_TICK.with(|v| v.set(tick));
}

/// Render tick for this thread, 0 before the session loop starts.
pub fn get_render_tick() -> u64 {
    RENDER_TICK.with(|v| v.get())
}

/// Emits one record at `$level`, prefixed with the render tick when set.
#[doc(hidden)]
#[macro_export]
macro_rules! console_log {
    ($level:expr, $($arg:tt)*) => {{
        match $crate::get_render_tick() {
            0 => log::log!($level, $($arg)*),
            tick => log::log!($level, "[tick {}] {}", tick, format_args!($($arg)*)),
        }
    }};
}

/// Trace-level record.
#[macro_export]
macro_rules! console_trace {
    ($($arg:tt)*) => {
        $crate::console_log!(log::Level::Trace, $($arg)*)
    };
}

/// Debug-level record.
#[macro_export]
macro_rules! console_debug {
    ($($arg:tt)*) => {
        $crate::console_log!(log::Level::Debug, $($arg)*)
    };
}

/// Info-level record.
#[macro_export]
macro_rules! console_info {
    ($($arg:tt)*) => {
        $crate::console_log!(log::Level::Info, $($arg)*)
    };
}

/// Warn-level record.
#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::console_log!(log::Level::Warn, $($arg)*)
    };
}

/// Error-level record.
#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {
        $crate::console_log!(log::Level::Error, $($arg)*)
    };
}

/// HTTP stack targets that drown out console records at debug level.
const QUIET_TARGETS: [&str; 4] = ["hyper", "hyper_util", "reqwest", "rustls"];

/// Terminal logger for tests; a no-op when a logger is already installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let mut config = ConfigBuilder::new();
    for target in QUIET_TARGETS {
        config.add_filter_ignore_str(target);
    }

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        config.build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
