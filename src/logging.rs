//! Tracing subscriber setup for the CLI.
//!
//! Console output goes to stderr; stdout is reserved for result lines and
//! download paths. With `enable_logging` set in the settings, the same events
//! are also appended to `~/.torrentbd.log`.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log file name, created in the home directory.
pub const LOG_FILE_NAME: &str = ".torrentbd.log";

/// Default filter directive for the verbosity flags.
///
/// `RUST_LOG` still takes priority when set.
pub fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// `~/.torrentbd.log`, or `None` without a home directory.
pub fn log_file_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(LOG_FILE_NAME))
}

fn open_log_file() -> Option<File> {
    let path = log_file_path()?;
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(file),
        Err(error) => {
            eprintln!("cannot open log file {}: {error}", path.display());
            None
        }
    }
}

/// Installs the global subscriber.
pub fn init_tracing(verbose: u8, quiet: bool, enable_log_file: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    let file_layer = enable_log_file.then(open_log_file).flatten().map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}
