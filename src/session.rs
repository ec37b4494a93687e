//! HTTP session with the tracker.
//!
//! Wraps a `reqwest` client that owns a cookie store, so the sign-in cookie
//! set by the login exchange is replayed on every later search and download
//! made through the same [`Session`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::{Client, Response};
use tracing::{debug, instrument};
use url::Url;

use crate::error::AdapterError;
use crate::parser::join_url_paths;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP total request timeout (5 minutes).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// The site rejects non-browser clients; requests present as desktop Chrome.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/95.0.4638.54 Safari/537.36";

/// Cookie-carrying HTTP session bound to one site.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    base_url: Url,
    logged_in: bool,
}

impl Session {
    /// Creates a session for `base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Transport`] if the HTTP client cannot be built
    /// (for example when no TLS backend can be initialized).
    pub fn new(base_url: Url) -> Result<Self, AdapterError> {
        Self::with_timeouts(base_url, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a session with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Same as [`Session::new`].
    #[instrument(level = "debug", fields(base_url = %base_url))]
    pub fn with_timeouts(
        base_url: Url,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, AdapterError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(BROWSER_USER_AGENT)
            .cookie_provider(jar)
            .build()
            .map_err(|e| AdapterError::transport(base_url.as_str(), e))?;
        Ok(Self {
            client,
            base_url,
            logged_in: false,
        })
    }

    /// Site root all relative paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a sign-in has succeeded on this session.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Records the outcome of a sign-in exchange.
    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    /// Absolute URL for a site path such as `/ajsearch.php`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        join_url_paths(self.base_url.as_str(), path)
    }

    /// Resolves `target` against the site root; absolute URLs pass through.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidUrl`] when `target` cannot be resolved.
    pub fn resolve(&self, target: &str) -> Result<Url, AdapterError> {
        self.base_url
            .join(target)
            .map_err(|_| AdapterError::invalid_url(target))
    }

    /// POSTs a form-encoded body to a site path.
    ///
    /// Field order is kept and repeated keys (`name[]`) are sent as given.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Transport`] on network failure and
    /// [`AdapterError::HttpStatus`] for any status other than 200.
    #[instrument(level = "debug", skip(self, form), fields(fields = form.len()))]
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<Response, AdapterError> {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| AdapterError::transport(&url, e))?;
        expect_ok(&url, response)
    }

    /// GETs a URL (absolute, or relative to the site root).
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidUrl`] for an unresolvable target,
    /// [`AdapterError::Transport`] on network failure and
    /// [`AdapterError::HttpStatus`] for any status other than 200.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, target: &str) -> Result<Response, AdapterError> {
        let url = self.resolve(target)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AdapterError::transport(url.as_str(), e))?;
        expect_ok(url.as_str(), response)
    }
}

fn expect_ok(url: &str, response: Response) -> Result<Response, AdapterError> {
    let status = response.status().as_u16();
    debug!(url, status, "response received");
    if status == 200 {
        Ok(response)
    } else {
        Err(AdapterError::http_status(url, status))
    }
}
