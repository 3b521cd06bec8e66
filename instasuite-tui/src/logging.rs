use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

/// Areas of the client that can be logged independently. Each one writes
/// under its own `log` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    ApiCalls,
    KeyEvents,
    Rendering,
    /// Login, logout and token expiry
    Session,
    General,
}

impl LogCategory {
    pub const ALL: [LogCategory; 5] = [
        LogCategory::ApiCalls,
        LogCategory::KeyEvents,
        LogCategory::Rendering,
        LogCategory::Session,
        LogCategory::General,
    ];

    pub fn target(self) -> &'static str {
        match self {
            LogCategory::ApiCalls => "api_calls",
            LogCategory::KeyEvents => "key_events",
            LogCategory::Rendering => "rendering",
            LogCategory::Session => "session",
            LogCategory::General => "general",
        }
    }
}

/// Where and how much the client logs. The terminal belongs to the UI, so
/// everything goes to a file that is truncated on startup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_file: PathBuf,
    pub level: LevelFilter,
    pub categories: Vec<LogCategory>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("instasuite_debug.log"),
            level: LevelFilter::Info,
            categories: vec![LogCategory::ApiCalls, LogCategory::Session, LogCategory::General],
        }
    }
}

impl LogConfig {
    /// `--verbose` turns on every category at trace level
    pub fn for_cli(verbose: bool) -> Self {
        if !verbose {
            return Self::default();
        }
        Self {
            level: LevelFilter::Trace,
            categories: LogCategory::ALL.to_vec(),
            ..Default::default()
        }
    }

    pub fn allows(&self, category: LogCategory) -> bool {
        self.categories.contains(&category)
    }
}

/// Install the file logger. A logger that is already set is left in place.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let log_file = File::create(&config.log_file)?;

    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339();
    // Stays on UTC when the local offset can't be determined
    let _ = builder.set_time_offset_to_local();
    for noisy in ["hyper", "reqwest", "axum", "mio"] {
        builder.add_filter_ignore_str(noisy);
    }

    if WriteLogger::init(config.level, builder.build(), log_file).is_err() {
        log::debug!("Logger already initialized");
        return Ok(());
    }

    log::info!(
        "Logging to {} at {:?}, categories {:?}",
        config.log_file.display(),
        config.level,
        config.categories
    );
    Ok(())
}

/// Log under `category` when the config allows it
#[macro_export]
macro_rules! log_for {
    ($config:expr, $category:ident, $level:ident, $($arg:tt)*) => {
        if $config.allows($crate::logging::LogCategory::$category) {
            log::$level!(target: $crate::logging::LogCategory::$category.target(), $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_key_event {
    ($config:expr, $($arg:tt)*) => { $crate::log_for!($config, KeyEvents, debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_rendering {
    ($config:expr, $($arg:tt)*) => { $crate::log_for!($config, Rendering, trace, $($arg)*) };
}

#[macro_export]
macro_rules! log_api_call {
    ($config:expr, $($arg:tt)*) => { $crate::log_for!($config, ApiCalls, debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_session {
    ($config:expr, $($arg:tt)*) => { $crate::log_for!($config, Session, info, $($arg)*) };
}

#[macro_export]
macro_rules! log_debug {
    ($config:expr, $($arg:tt)*) => { $crate::log_for!($config, General, debug, $($arg)*) };
}
