//! Error types for adapter operations.
//!
//! Every failure in the search and download flows is represented here so
//! internal steps can use `?`. The public entry points on
//! [`TorrentBd`](crate::TorrentBd) log these and degrade to "no output".

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the tracker.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The site answered with a non-200 status.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Login was rejected or the login response could not be understood.
    #[error("[AUTH] sign-in failed: {reason}")]
    Auth {
        /// Why the sign-in is considered failed.
        reason: String,
    },

    /// Settings are missing or unusable for an authenticated operation.
    #[error("no usable settings: {reason}")]
    Config {
        /// What is missing.
        reason: String,
    },

    /// File system error while persisting a download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Payload carried the gzip magic but did not decompress.
    #[error("failed to decompress gzip payload from {url}: {source}")]
    Decompress {
        /// The URL the payload came from.
        url: String,
        /// The underlying decoder error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or cannot be resolved against the site.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl AdapterError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an authentication error.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a decompression error.
    pub fn decompress(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Decompress {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// URL or path the source error lacks, so callers go through the constructors.
