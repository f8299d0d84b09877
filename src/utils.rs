use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use log::{LevelFilter, Record};
use std::fs::OpenOptions;
use std::io::Write;

// Logging and small formatting helpers shared by the console panes.

pub struct SimpleLogger {
    log_file: Option<std::fs::File>,
}

impl SimpleLogger {
    pub fn new(log_file_path: Option<&str>) -> Result<Self> {
        let log_file = if let Some(path) = log_file_path {
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        } else {
            None
        };

        Ok(SimpleLogger { log_file })
    }
}

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now: DateTime<Local> = Local::now();
            let log_message = format!(
                "[{}] {} [{}:{}] {}\n",
                now.format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            );

            if let Some(file) = &self.log_file {
                if let Ok(mut file) = file.try_clone() {
                    let _ = file.write_all(log_message.as_bytes());
                }
            } else {
                // The console owns stdout while the UI is up; spill to
                // stderr when no log file is configured.
                eprint!("{}", log_message);
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.log_file {
            if let Ok(mut file) = file.try_clone() {
                let _ = file.flush();
            }
        } else {
            let _ = std::io::stderr().flush();
        }
    }
}

pub fn setup_logging(log_file: Option<&str>, level: LevelFilter) -> Result<()> {
    let logger = SimpleLogger::new(log_file)?;
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(level))?;

    log::info!("Logging initialized at level: {}", level);
    log::info!(
        "App version: {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_NAME")
    );

    Ok(())
}

/// Render a millisecond timestamp as local wall-clock time for the thread
/// view.
pub fn format_message_time(millis: u64) -> String {
    match Utc.timestamp_millis_opt(millis as i64) {
        chrono::LocalResult::Single(dt) => {
            dt.with_timezone(&Local).format("%H:%M").to_string()
        }
        _ => "--:--".to_string(),
    }
}

/// Clip a preview to the contact-list column, on a char boundary.
pub fn preview_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", clipped)
    }
}
