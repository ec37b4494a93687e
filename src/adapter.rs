//! Search and download flows against the tracker.
//!
//! [`TorrentBd`] owns the settings and one [`Session`]. The session signs in
//! lazily, on the first search or download, and stays signed in for the
//! lifetime of the adapter; a failed sign-in is retried on the next call.
//!
//! Failures never surface from [`TorrentBd::search`] or
//! [`TorrentBd::download_torrent`]: they are logged and the call produces no
//! output. [`TorrentBd::try_login`] returns the error for callers that need to
//! tell a rejected sign-in apart from an empty result.

use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;

use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::categories::category_codes;
use crate::error::AdapterError;
use crate::output::ResultSink;
use crate::parser::{ENGINE_URL, ResultRecord, SearchResultParser};
use crate::session::Session;
use crate::settings::Settings;

/// Display name of the engine.
pub const ENGINE_NAME: &str = "TorrentBD";

/// Sign-in endpoint.
pub const LOGIN_PATH: &str = "/ajtakelogin.php";

/// Search endpoint.
pub const SEARCH_PATH: &str = "/ajsearch.php";

/// Prefix of files written by [`TorrentBd::download_torrent`].
pub const DOWNLOAD_FILE_PREFIX: &str = "tbd_";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Deserialize)]
struct LoginResponse {
    success: bool,
}

/// A torrent file saved to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedTorrent {
    /// Where the file was written.
    pub path: PathBuf,
    /// URL the file was requested from, as given by the caller.
    pub url: String,
}

impl fmt::Display for DownloadedTorrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path.display(), self.url)
    }
}

/// Search/download adapter for one tracker site.
#[derive(Debug)]
pub struct TorrentBd {
    settings: Option<Settings>,
    session: Session,
}

impl TorrentBd {
    /// Creates an adapter for the public site.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Transport`] if the HTTP client cannot be built.
    pub fn new(settings: Option<Settings>) -> Result<Self, AdapterError> {
        let base_url = Url::parse(ENGINE_URL).map_err(|_| AdapterError::invalid_url(ENGINE_URL))?;
        Self::with_base_url(settings, base_url)
    }

    /// Creates an adapter talking to `base_url` instead of the public site.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Transport`] if the HTTP client cannot be built.
    pub fn with_base_url(settings: Option<Settings>, base_url: Url) -> Result<Self, AdapterError> {
        let session = Session::new(base_url)?;
        match &settings {
            Some(settings) => info!(
                settings = ?settings.to_map(true),
                "initialized"
            ),
            None => info!("initialized without settings"),
        }
        Ok(Self { settings, session })
    }

    /// Settings in effect, if any were loaded.
    #[must_use]
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// Whether the session has signed in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Signs in with the configured credentials.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::Config`] when no settings or empty credentials
    /// - [`AdapterError::Transport`] / [`AdapterError::HttpStatus`] when the
    ///   exchange itself fails
    /// - [`AdapterError::Auth`] when the response lacks a true `success` flag
    #[instrument(skip(self))]
    pub async fn try_login(&mut self) -> Result<(), AdapterError> {
        let settings = self
            .settings
            .as_ref()
            .filter(|settings| settings.has_credentials())
            .ok_or_else(|| AdapterError::config("username and password are required"))?;

        info!("signing in");
        let form = login_form(settings);
        let response = self.session.post_form(LOGIN_PATH, &form).await;
        let body = match response {
            Ok(response) => response
                .bytes()
                .await
                .map_err(|e| AdapterError::transport(self.session.endpoint(LOGIN_PATH), e))?,
            Err(error) => {
                self.session.set_logged_in(false);
                return Err(error);
            }
        };

        let success = serde_json::from_slice::<LoginResponse>(&body)
            .map(|parsed| parsed.success)
            .map_err(|e| AdapterError::auth(format!("unreadable sign-in response: {e}")));
        self.session.set_logged_in(matches!(success, Ok(true)));
        info!(logged_in = self.session.is_logged_in(), "sign-in finished");

        if success? {
            Ok(())
        } else {
            Err(AdapterError::auth("site reported success = false"))
        }
    }

    /// Signs in unless already signed in. Returns the resulting state.
    async fn ensure_logged_in(&mut self) -> bool {
        let has_credentials = self
            .settings
            .as_ref()
            .is_some_and(Settings::has_credentials);
        if has_credentials && !self.session.is_logged_in() {
            if let Err(error) = self.try_login().await {
                warn!(error = %error, "sign-in failed");
            }
        }
        self.session.is_logged_in()
    }

    /// Runs one search and emits every result to `sink` in page order.
    ///
    /// `what` may arrive percent-encoded; it is trimmed and decoded before
    /// use. `category` is looked up in the category table; unknown names
    /// search everything. Returns the number of records emitted, zero when
    /// the search was skipped or failed.
    #[instrument(skip(self, sink))]
    pub async fn search(&mut self, what: &str, category: &str, sink: &mut dyn ResultSink) -> usize {
        let logged_in = self.ensure_logged_in().await;
        let term = what.trim();
        if !logged_in || term.is_empty() {
            debug!(logged_in, empty_term = term.is_empty(), "search skipped");
            return 0;
        }

        let records = match self.fetch_results(term, category).await {
            Ok(records) => records,
            Err(error) => {
                warn!(error = %error, "search failed");
                return 0;
            }
        };
        for record in &records {
            sink.emit(record);
        }
        records.len()
    }

    async fn fetch_results(
        &self,
        term: &str,
        category: &str,
    ) -> Result<Vec<ResultRecord>, AdapterError> {
        let term = urlencoding::decode(term).map_or_else(|_| term.to_string(), |t| t.into_owned());
        let flags = self.settings.as_ref().map(SearchFlags::from).unwrap_or_default();
        let form = search_form(&term, category, flags);
        info!(term = %term, category, "searching");
        debug!(params = ?form, "search params");

        let response = self.session.post_form(SEARCH_PATH, &form).await?;
        let body = response
            .text()
            .await
            .map_err(|e| AdapterError::transport(self.session.endpoint(SEARCH_PATH), e))?;
        debug!(len = body.len(), "search response received");

        let mut parser = SearchResultParser::with_base_url(self.session.base_url().clone());
        parser.feed(&body);
        let records = parser.into_results();
        info!(results = records.len(), "search complete");
        Ok(records)
    }

    /// Downloads a torrent file into a fresh temporary file.
    ///
    /// Gzip payloads are decompressed before writing. Returns `None` when
    /// not signed in, when `url` is empty, or on any failure (logged).
    #[instrument(skip(self))]
    pub async fn download_torrent(&mut self, url: &str) -> Option<DownloadedTorrent> {
        if !self.ensure_logged_in().await || url.is_empty() {
            debug!("download skipped");
            return None;
        }
        match self.fetch_torrent(url).await {
            Ok(downloaded) => {
                info!(path = %downloaded.path.display(), "torrent file saved");
                Some(downloaded)
            }
            Err(error) => {
                warn!(error = %error, "download failed");
                None
            }
        }
    }

    async fn fetch_torrent(&self, url: &str) -> Result<DownloadedTorrent, AdapterError> {
        info!(url, "downloading torrent file");
        let response = self.session.get(url).await?;
        let data = response
            .bytes()
            .await
            .map_err(|e| AdapterError::transport(url, e))?;
        let data = decode_payload(data.to_vec(), url)?;
        let path = write_temp_file(&data)?;
        Ok(DownloadedTorrent {
            path,
            url: url.to_string(),
        })
    }
}

/// Search refinements appended only when switched on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFlags {
    pub freeleech: bool,
    pub internal: bool,
    pub active_only: bool,
}

impl From<&Settings> for SearchFlags {
    fn from(settings: &Settings) -> Self {
        Self {
            freeleech: settings.freeleech,
            internal: settings.internal,
            active_only: settings.active_only,
        }
    }
}

/// Fields of the sign-in form.
#[must_use]
pub fn login_form(settings: &Settings) -> Vec<(&'static str, String)> {
    vec![
        ("username", settings.username.clone()),
        ("password", settings.password.clone()),
        ("auth_login", String::new()),
        ("recaptcha_token", String::new()),
        ("otp", String::new()),
        ("login_phase", "1".to_string()),
        ("_remember", "yes".to_string()),
        ("extra", String::new()),
    ]
}

/// Fields of the search form, in submission order.
///
/// Results are always sorted by seeders. Each category code adds one
/// `searchParams[torrentcats][]` entry; each enabled flag adds one
/// `searchParams[tertiary_filters][]` entry.
#[must_use]
pub fn search_form(term: &str, category: &str, flags: SearchFlags) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("page", "1".to_string()),
        ("kuddus_searchtype", "torrents".to_string()),
        ("kuddus_searchkey", term.to_string()),
        ("searchParams[sortBy]", "seeders".to_string()),
        ("searchParams[secondary_filters_extended]", String::new()),
    ];
    form.extend(
        category_codes(category)
            .iter()
            .map(|code| ("searchParams[torrentcats][]", (*code).to_string())),
    );
    for (enabled, filter) in [
        (flags.freeleech, "freeleech"),
        (flags.internal, "internal"),
        (flags.active_only, "active"),
    ] {
        if enabled {
            form.push(("searchParams[tertiary_filters][]", filter.to_string()));
        }
    }
    form
}

/// Gunzips `data` when it starts with the gzip magic; returns it unchanged otherwise.
///
/// # Errors
///
/// Returns [`AdapterError::Decompress`] when a gzip payload is corrupt.
pub fn decode_payload(data: Vec<u8>, url: &str) -> Result<Vec<u8>, AdapterError> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Ok(data);
    }
    debug!("gzipped payload, decompressing");
    let mut decoded = Vec::with_capacity(data.len() * 2);
    GzDecoder::new(data.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| AdapterError::decompress(url, e))?;
    Ok(decoded)
}

fn write_temp_file(data: &[u8]) -> Result<PathBuf, AdapterError> {
    let mut file = tempfile::Builder::new()
        .prefix(DOWNLOAD_FILE_PREFIX)
        .tempfile()
        .map_err(|e| AdapterError::io(std::env::temp_dir(), e))?;
    let path = file.path().to_path_buf();
    file.write_all(data)
        .map_err(|e| AdapterError::io(path.clone(), e))?;
    file.keep()
        .map_err(|e| AdapterError::io(path.clone(), e.error))?;
    Ok(path)
}
