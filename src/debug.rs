/// Category-tagged protocol tracing for tabsman
///
/// Controlled by the TABSMAN_DEBUG_LEVEL environment variable:
/// - 0 or unset: No tracing
/// - 1: Errors only
/// - 2: Info level (tab lifecycle, workspace switches)
/// - 3: Debug level (history events consumed or recorded)
/// - 4: Trace level (every suppression transition and render)
///
/// Messages are forwarded to the `log` facade with target
/// `tabsman::<category>` so the host's logger decides where they land.
use std::fmt;
use std::sync::OnceLock;

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Self {
        std::env::var("TABSMAN_DEBUG_LEVEL")
            .ok()
            .and_then(|val| val.trim().parse::<u8>().ok())
            .map(Self::from_u8)
            .unwrap_or(DebugLevel::Off)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => DebugLevel::Off,
            1 => DebugLevel::Error,
            2 => DebugLevel::Info,
            3 => DebugLevel::Debug,
            4.. => DebugLevel::Trace,
        }
    }

    fn as_log_level(self) -> Option<log::Level> {
        match self {
            DebugLevel::Off => None,
            DebugLevel::Error => Some(log::Level::Error),
            DebugLevel::Info => Some(log::Level::Info),
            DebugLevel::Debug => Some(log::Level::Debug),
            DebugLevel::Trace => Some(log::Level::Trace),
        }
    }
}

static LEVEL: OnceLock<DebugLevel> = OnceLock::new();

fn current_level() -> DebugLevel {
    *LEVEL.get_or_init(DebugLevel::from_env)
}

/// Check if tracing is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    level != DebugLevel::Off && level <= current_level()
}

/// Log formatted message under `tabsman::<category>`
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if !is_enabled(level) {
        return;
    }
    if let Some(log_level) = level.as_log_level() {
        let target = format!("tabsman::{}", category.to_ascii_lowercase());
        log::log!(target: target.as_str(), log_level, "{}", args);
    }
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}
