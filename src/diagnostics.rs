//! Log output setup for the reminder daemon.
//!
//! Logs always go to stderr. When `logging.directory` is set they are also
//! written to daily-rotated files named `fitmind-reminderd.log.YYYY-MM-DD`;
//! old files are pruned at startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;
use crate::error::{ReminderError, Result};

/// Prefix of rotated log file names.
pub const LOG_FILE_PREFIX: &str = "fitmind-reminderd.log";

/// Maximum age (in days) of log files to keep.
pub const MAX_LOG_AGE_DAYS: u64 = 7;

/// Maximum number of log files to keep.
pub const MAX_LOG_FILES: usize = 10;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `config.filter`. Keep the returned guard alive for
/// the life of the process or buffered file output is lost.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.as_str()));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            prune_old_logs(dir);
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ReminderError::Config(format!("cannot install log subscriber: {e}")))?;

    Ok(guard)
}

/// Remove log files older than [`MAX_LOG_AGE_DAYS`] or beyond [`MAX_LOG_FILES`].
fn prune_old_logs(log_dir: &Path) {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(MAX_LOG_AGE_DAYS * 86_400))
        .unwrap_or(UNIX_EPOCH);
    prune_old_logs_with_cutoff(log_dir, cutoff, MAX_LOG_FILES);
}

fn prune_old_logs_with_cutoff(log_dir: &Path, cutoff: SystemTime, max_files: usize) {
    let mut entries: Vec<(PathBuf, SystemTime)> = match fs::read_dir(log_dir) {
        Ok(dir) => dir
            .flatten()
            .filter_map(|e| {
                let path = e.path();
                let name = path.file_name()?.to_str()?.to_owned();
                if name.starts_with(LOG_FILE_PREFIX) {
                    let mtime = path.metadata().ok()?.modified().ok()?;
                    Some((path, mtime))
                } else {
                    None
                }
            })
            .collect(),
        Err(_) => return,
    };

    // Newest first.
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    for (i, (path, mtime)) in entries.iter().enumerate() {
        if *mtime < cutoff || i >= max_files {
            let _ = fs::remove_file(path);
        }
    }
}
