//! Core logging bootstrap.
//!
//! # Responsibility
//! - Start a size-rotated file logger at most once per process.
//! - Record panics as metadata-only log lines.
//!
//! # Invariants
//! - Re-initializing with identical settings is a no-op.
//! - Re-initializing with a different level or directory is rejected.
//! - Log lines carry ids and counts only, never user-entered text.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "homechores";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Validated logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    level: &'static str,
    dir: PathBuf,
}

impl LogSettings {
    /// Normalizes `level` (`trace|debug|info|warn|error`, any case) and
    /// requires an absolute, non-empty `dir`.
    pub fn new(level: &str, dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" => "error",
            other => return Err(LoggingError::UnsupportedLevel(other.to_string())),
        };

        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(LoggingError::InvalidDirectory("log directory is empty".to_string()));
        }
        if !dir.is_absolute() {
            return Err(LoggingError::InvalidDirectory(format!(
                "log directory must be absolute, got `{}`",
                dir.display()
            )));
        }

        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }

    pub fn level(&self) -> &'static str {
        self.level
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    /// Logger already running with other settings.
    AlreadyInitialized { active: LogSettings },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "{message}"),
            Self::AlreadyInitialized { active } => write!(
                f,
                "logging already initialized with level `{}` at `{}`; refusing to switch",
                active.level,
                active.dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Starts file logging. Safe to call again with the same settings.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(settings))?;
    if &active.settings != settings {
        return Err(LoggingError::AlreadyInitialized {
            active: active.settings.clone(),
        });
    }
    Ok(())
}

/// Active settings, or `None` before `init_logging` succeeded.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE_LOGGER.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| {
        LoggingError::InvalidDirectory(format!(
            "failed to create log directory `{}`: {err}",
            settings.dir.display()
        ))
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok level={} version={}",
        settings.level,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payload text is not logged; it may echo user input.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!("event=panic_captured module=core status=error location={location}");
        previous_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, LogSettings, LoggingError};

    #[test]
    fn settings_normalize_level_aliases() {
        let dir = std::env::temp_dir();
        assert_eq!(LogSettings::new(" WARNING ", &dir).unwrap().level(), "warn");
        assert_eq!(LogSettings::new("Info", &dir).unwrap().level(), "info");
        assert!(matches!(
            LogSettings::new("verbose", &dir),
            Err(LoggingError::UnsupportedLevel(_))
        ));
    }

    #[test]
    fn settings_reject_relative_and_empty_dirs() {
        assert!(matches!(
            LogSettings::new("info", "logs/dev"),
            Err(LoggingError::InvalidDirectory(_))
        ));
        assert!(matches!(
            LogSettings::new("info", ""),
            Err(LoggingError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn init_is_idempotent_and_rejects_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings::new("info", dir.path()).unwrap();
        init_logging(&settings).unwrap();
        init_logging(&settings).unwrap();

        let louder = LogSettings::new("debug", dir.path()).unwrap();
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert_eq!(logging_status(), Some(settings));
    }
}
