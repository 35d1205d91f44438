//! Logging setup.
//!
//! Events go to a size-rotated file under the log directory and, unless
//! disabled, to stderr. Rotated files are named `jobscrape.log.1`,
//! `jobscrape.log.2`, ... with `.1` the most recent.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use jobscrape_store::LogConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "jobscrape.log";

// ============================================================================
// Rotating File
// ============================================================================

/// Append-only log file that rotates once it reaches `max_bytes`.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    size: u64,
    max_bytes: u64,
    max_files: usize,
}

impl RotatingFile {
    /// Opens or creates the log file, creating its directory.
    pub fn open(path: &Path, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
            max_bytes,
            max_files,
        })
    }

    /// Shifts `.N` backups up by one, drops the oldest, and starts a fresh file.
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files == 0 {
            std::fs::remove_file(&self.path)?;
        } else {
            let oldest = backup_path(&self.path, self.max_files);
            if oldest.exists() {
                std::fs::remove_file(&oldest)?;
            }
            for index in (1..self.max_files).rev() {
                let from = backup_path(&self.path, index);
                if from.exists() {
                    std::fs::rename(&from, backup_path(&self.path, index + 1))?;
                }
            }
            std::fs::rename(&self.path, backup_path(&self.path, 1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// `jobscrape.log` -> `jobscrape.log.<index>`.
fn backup_path(base: &Path, index: usize) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Cloneable handle handed to the subscriber for each event.
#[derive(Debug, Clone)]
pub struct SharedFile(Arc<Mutex<RotatingFile>>);

impl SharedFile {
    /// Wraps a rotating file.
    pub fn new(file: RotatingFile) -> Self {
        Self(Arc::new(Mutex::new(file)))
    }
}

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

// ============================================================================
// Subscriber
// ============================================================================

/// Crates whose events are logged at the configured level; everything
/// else is held at `warn`.
const OWN_TARGETS: &[&str] = &[
    "jobscrape",
    "jobscrape_core",
    "jobscrape_fetch",
    "jobscrape_sites",
    "jobscrape_store",
    "jobscrape_services",
];

/// Filter directives: `RUST_LOG` wins, then `--verbose`, then the config.
fn filter(level: &str, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if verbose { "debug" } else { level };
    let directives = std::iter::once("warn".to_string())
        .chain(OWN_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// Returns the log file path. `quiet` disables stderr output; the file is
/// always written.
///
/// # Errors
///
/// Fails if the log file cannot be opened.
pub fn init(config: &LogConfig, log_dir: &Path, verbose: bool, quiet: bool) -> Result<PathBuf> {
    let path = log_dir.join(LOG_FILE_NAME);
    let file = RotatingFile::open(&path, config.max_bytes, config.max_files)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let shared = SharedFile::new(file);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(move || shared.clone());

    let stderr_layer = (config.stderr && !quiet).then(|| {
        fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter(&config.level, verbose))
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(path)
}

/// Stderr-only logging, used when the log file is unavailable.
pub fn init_stderr(level: &str, verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter(level, verbose))
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join(LOG_FILE_NAME);
        let mut file = RotatingFile::open(&path, 10, 2).unwrap();

        for line in ["aaaaaaaa\n", "bbbbbbbb\n", "cccccccc\n", "dddddddd\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "dddddddd\n");
        assert_eq!(
            std::fs::read_to_string(backup_path(&path, 1)).unwrap(),
            "cccccccc\n"
        );
        assert_eq!(
            std::fs::read_to_string(backup_path(&path, 2)).unwrap(),
            "bbbbbbbb\n"
        );
        assert!(!backup_path(&path, 3).exists());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);

        RotatingFile::open(&path, 1024, 5)
            .unwrap()
            .write_all(b"first\n")
            .unwrap();
        let mut file = RotatingFile::open(&path, 1024, 5).unwrap();
        file.write_all(b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/var/log/jobscrape.log"), 3),
            PathBuf::from("/var/log/jobscrape.log.3")
        );
    }
}
