#![deny(missing_docs)]
//! Logging macros for the scraper crates.
//!
//! The `scrape_*` macros forward to the `log` facade through a re-export, so
//! callers only depend on this crate. No request secrets go through them:
//! call sites log lengths and request ids instead.

use std::sync::Once;

#[doc(hidden)]
pub use log as __log;

/// Debug-level message. Stale replies and lookup details go here.
#[macro_export]
macro_rules! scrape_debug {
    ($($arg:tt)*) => {
        $crate::__log::debug!($($arg)*)
    };
}

/// Info-level message.
#[macro_export]
macro_rules! scrape_info {
    ($($arg:tt)*) => {
        $crate::__log::info!($($arg)*)
    };
}

/// Warn-level message.
#[macro_export]
macro_rules! scrape_warn {
    ($($arg:tt)*) => {
        $crate::__log::warn!($($arg)*)
    };
}

/// Error-level message.
#[macro_export]
macro_rules! scrape_error {
    ($($arg:tt)*) => {
        $crate::__log::error!($($arg)*)
    };
}

static TEST_LOGGER: Once = Once::new();

/// Installs a stderr logger at debug level for tests.
///
/// Only the first call in a test binary does anything; later calls, or a
/// logger installed elsewhere, are left alone.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

    TEST_LOGGER.call_once(|| {
        let config = ConfigBuilder::new()
            .set_thread_level(LevelFilter::Off)
            .build();
        let _ = TermLogger::init(
            LevelFilter::Debug,
            config,
            TerminalMode::Stderr,
            ColorChoice::Never,
        );
    });
}
