//! Process logger: `[date time][target][LEVEL] message` to stdout and a
//! log file that rolls over at local midnight.
//!
//! The file for a given day is `<log_file>.<YYYY-MM-DD>`. At startup only
//! the newest [`BACKUP_COUNT`] days before today are kept.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::LevelFilter;

pub const BACKUP_COUNT: usize = 3;

const DATE_SUFFIX: &str = ".%Y-%m-%d";

/// Parse a `--log-level` value. Unknown names fall back to `info`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

pub fn init(log_file: &Path, level: LevelFilter) -> Result<()> {
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let today = chrono::Local::now().date_naive();
    let pruned = prune_backups(log_file, today, BACKUP_COUNT)
        .with_context(|| format!("pruning old logs next to {}", log_file.display()))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .chain(fern::DateBased::new(log_file, DATE_SUFFIX))
        .apply()
        .context("installing logger")?;

    for old in pruned {
        log::debug!("removed old log {}", old.display());
    }
    Ok(())
}

/// Delete dated log files older than the newest `keep` days before `today`.
/// Returns the removed paths.
pub fn prune_backups(log_file: &Path, today: NaiveDate, keep: usize) -> Result<Vec<PathBuf>> {
    let Some(base) = log_file.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    let dir = match log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(d) => d.to_path_buf(),
        None => PathBuf::from("."),
    };
    let prefix = format!("{base}.");

    let mut dated: Vec<(NaiveDate, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(day) = name
            .to_str()
            .and_then(|n| n.strip_prefix(&prefix))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if day < today {
            dated.push((day, entry.path()));
        }
    }

    dated.sort_by(|a, b| b.0.cmp(&a.0));
    let mut removed = Vec::new();
    for (_, path) in dated.into_iter().skip(keep) {
        fs::remove_file(&path)?;
        removed.push(path);
    }
    Ok(removed)
}
