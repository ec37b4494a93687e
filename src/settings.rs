//! Adapter settings: credentials and search filters.
//!
//! Settings come from a JSON object, either passed in directly or read from
//! the first `torrentbdrc.json` / `.torrentbdrc.json` found in the search
//! directories. Validation is all-or-nothing: a missing required key, a
//! wrongly typed value, or unparsable input yields no settings at all.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// File names probed in each search directory, in priority order.
pub const SETTINGS_FILE_NAMES: [&str; 2] = ["torrentbdrc.json", ".torrentbdrc.json"];

/// Validated adapter settings.
///
/// The password is redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Account name used for sign-in.
    pub username: String,
    /// Account password. Never logged.
    pub password: String,
    /// Restrict results to freeleech torrents.
    #[serde(default)]
    pub freeleech: bool,
    /// Restrict results to internal releases.
    #[serde(default)]
    pub internal: bool,
    /// Restrict results to torrents with active peers.
    #[serde(default)]
    pub active_only: bool,
    /// Append diagnostics to `~/.torrentbd.log`.
    #[serde(default)]
    pub enable_logging: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("freeleech", &self.freeleech)
            .field("internal", &self.internal)
            .field("active_only", &self.active_only)
            .field("enable_logging", &self.enable_logging)
            .finish()
    }
}

impl Settings {
    /// Creates settings with the given credentials and every flag off.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            freeleech: false,
            internal: false,
            active_only: false,
            enable_logging: false,
        }
    }

    /// Parses and validates a JSON settings document.
    ///
    /// Returns `None` for empty input, non-object JSON, a missing `username` or
    /// `password`, or any recognized key holding the wrong type. Unknown keys
    /// are ignored.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Self>(raw) {
            Ok(settings) => Some(settings),
            Err(error) => {
                debug!(error = %error, "rejecting settings document");
                None
            }
        }
    }

    /// Both credentials are present and non-empty.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Option-name → value view of the settings.
    ///
    /// With `redact` set, the password is replaced by a placeholder so the
    /// map can be printed or logged.
    #[must_use]
    pub fn to_map(&self, redact: bool) -> Map<String, Value> {
        let password = if redact {
            "[REDACTED]".to_string()
        } else {
            self.password.clone()
        };
        let mut map = Map::new();
        map.insert("username".into(), Value::String(self.username.clone()));
        map.insert("password".into(), Value::String(password));
        map.insert("freeleech".into(), Value::Bool(self.freeleech));
        map.insert("internal".into(), Value::Bool(self.internal));
        map.insert("active_only".into(), Value::Bool(self.active_only));
        map.insert("enable_logging".into(), Value::Bool(self.enable_logging));
        map
    }
}

/// Directories searched for a settings file, in priority order: the home
/// directory, the directory holding the running executable, and the current
/// working directory. Directories that cannot be determined are skipped.
#[must_use]
pub fn settings_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(3);
    if let Some(home) = env_var_non_empty_os("HOME") {
        dirs.push(PathBuf::from(home));
    }
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }
    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd);
    }
    dirs
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Returns the first existing settings file: directories in order, and
/// within each directory the names of [`SETTINGS_FILE_NAMES`] in order.
#[must_use]
pub fn find_settings_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| SETTINGS_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.exists())
}

/// Loads settings from `explicit` when given and non-empty, otherwise from the
/// first settings file in [`settings_search_dirs`].
#[must_use]
pub fn load_settings(explicit: Option<&str>) -> Option<Settings> {
    load_settings_from(explicit, &settings_search_dirs())
}

/// Like [`load_settings`] with a caller-supplied directory list.
#[must_use]
#[instrument(level = "debug", skip(explicit))]
pub fn load_settings_from(explicit: Option<&str>, dirs: &[PathBuf]) -> Option<Settings> {
    if let Some(raw) = explicit.filter(|raw| !raw.is_empty()) {
        return Settings::from_json(raw);
    }

    let path = find_settings_file(dirs)?;
    match fs::read_to_string(&path) {
        Ok(raw) => {
            debug!(path = %path.display(), "read settings file");
            Settings::from_json(&raw)
        }
        Err(error) => {
            debug!(path = %path.display(), error = %error, "cannot read settings file");
            None
        }
    }
}
