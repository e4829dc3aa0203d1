use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use time::OffsetDateTime;
use time::macros::format_description;

/// Logger writing to stderr and, optionally, to a file
pub struct Logger {
    severity: LevelFilter,
    file: Option<Mutex<File>>,
    enable_colors: bool,
}

impl Logger {
    /// Create a new logger. An unopenable log file is skipped and reported on stderr.
    pub fn new(severity: LevelFilter, file_path: Option<PathBuf>, enable_colors: bool) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => Some(Mutex::new(file)),
                Err(err) => {
                    eprintln!("cannot open log file {}: {}", path.display(), err);
                    None
                }
            }
        });
        Logger { severity, file, enable_colors }
    }

    /// Install the logger.
    ///
    /// `level` comes from the command line; without it `MINIDOC_LOG`, then `RUST_LOG`,
    /// are consulted. Colors are disabled when `NO_COLOR` is set.
    pub fn init(level: Option<&str>, file_path: Option<PathBuf>) -> Result<(), log::SetLoggerError> {
        let severity = level
            .map(str::to_string)
            .or_else(|| std::env::var("MINIDOC_LOG").ok())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .and_then(|value| value.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info);
        let enable_colors = std::env::var("NO_COLOR").is_err();

        let logger = Logger::new(severity, file_path, enable_colors);
        log::set_max_level(severity);
        log::set_logger(Box::leak(Box::new(logger)))
    }

    fn timestamp() -> String {
        OffsetDateTime::now_utc()
            .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
            .unwrap_or_default()
    }

    fn color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }

    fn format_line(&self, timestamp: &str, record: &Record, colored: bool) -> String {
        let level = record.level();
        if colored {
            format!("{}[{timestamp}] {level}\x1b[0m {}", Self::color(level), record.args())
        } else {
            format!("[{timestamp}] {level} {}", record.args())
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let timestamp = Self::timestamp();

        let line = self.format_line(&timestamp, record, self.enable_colors);
        let _ = writeln!(std::io::stderr(), "{line}");

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", self.format_line(&timestamp, record, false));
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
