use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use time::UtcOffset;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_RETENTION_DAYS: u64 = 7;
const LOG_PREFIX: &str = "highlights-";

/// Log directory under the user cache directory
/// - Linux: ~/.cache/sitter-highlights/
/// - macOS: ~/Library/Caches/sitter-highlights/
/// - Windows: %LOCALAPPDATA%\sitter-highlights\
fn log_dir() -> io::Result<PathBuf> {
    let mut dir = dirs::cache_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Unable to determine user cache directory"))?;
    dir.push("sitter-highlights");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Removes our log files older than `LOG_RETENTION_DAYS`.
fn cleanup_old_logs(dir: &Path) {
    let now = SystemTime::now();
    let retention = Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60);
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !(name.starts_with(LOG_PREFIX) && name.ends_with(".log")) {
            continue;
        }
        let expired = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > retention);
        if expired {
            if let Err(e) = fs::remove_file(entry.path()) {
                eprintln!("Failed to remove old log file {:?}: {}", entry.path(), e);
            }
        }
    }
}

fn session_log_path(dir: &Path) -> PathBuf {
    let stamp = time::OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .unwrap_or_else(|_| "unknown".to_string());
    dir.join(format!("{}{}-{}.log", LOG_PREFIX, stamp, std::process::id()))
}

/// Initialize logging to stderr and, optionally, a per-session file
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Stderr filter; otherwise `RUST_LOG`, defaulting to "info"
/// * `enable_file_logging` - Also log at DEBUG level to the cache directory (off in tests)
///
/// The returned guard flushes the file writer on drop and must be kept alive.
/// Calling this again after a subscriber is installed is not an error.
pub fn init_logger(no_color: bool, log_level: Option<&str>, enable_file_logging: bool) -> io::Result<WorkerGuard> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let stderr_filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    if !enable_file_logging {
        let (_, guard) = tracing_appender::non_blocking(io::sink());
        let result = tracing_subscriber::registry().with(stderr_layer).try_init();
        return accept_existing(result).map(|()| guard);
    }

    let dir = log_dir()?;
    cleanup_old_logs(&dir);
    let log_path = session_log_path(&dir);
    let file = fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(timer)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));

    let result = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    accept_existing(result)?;
    eprintln!("Logging to file: {:?}", log_path);
    Ok(guard)
}

/// A failed install is fine once some global dispatcher exists, whichever
/// caller won the race to set it.
fn accept_existing(result: Result<(), tracing_subscriber::util::TryInitError>) -> io::Result<()> {
    let Err(e) = result else {
        return Ok(());
    };
    // another thread may still be between claiming and publishing the dispatcher
    for _ in 0..1_000 {
        if tracing::dispatcher::has_been_set() {
            return Ok(());
        }
        std::thread::yield_now();
    }
    Err(io::Error::other(e))
}
