//! Mock tracker shared by the integration tests.

use std::net::TcpListener;

use serde_json::json;
use torrentbd::{Settings, TorrentBd};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Set to `1` to fail, instead of skip, when the mock tracker cannot bind.
const REQUIRE_MOCK_TRACKER: &str = "TORRENTBD_REQUIRE_SOCKET_TESTS";

/// Sign-in response the site sends for accepted credentials.
#[allow(dead_code)]
pub fn login_ok() -> serde_json::Value {
    json!({"success": true, "msg": "ok"})
}

/// Stand-in for the tracker site, served by wiremock on localhost.
pub struct MockTracker {
    server: MockServer,
}

#[allow(dead_code)]
impl MockTracker {
    /// Starts the tracker, or returns `None` (after saying why on stderr)
    /// where localhost sockets are unavailable. Callers return early on
    /// `None` unless the environment demands the tests run.
    #[track_caller]
    pub fn start() -> impl Future<Output = Option<Self>> {
        let caller = std::panic::Location::caller();
        let bindable = TcpListener::bind("127.0.0.1:0").is_ok();
        async move {
            if bindable {
                return Some(Self {
                    server: MockServer::start().await,
                });
            }
            let required = std::env::var(REQUIRE_MOCK_TRACKER)
                .is_ok_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
            assert!(
                !required,
                "mock tracker cannot bind localhost (test at {caller}); {REQUIRE_MOCK_TRACKER} is set"
            );
            eprintln!("mock tracker cannot bind localhost; skipping test at {caller}");
            None
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Base URL of the tracker, without a trailing slash.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Accepts any sign-in.
    pub async fn accept_login(&self) {
        Mock::given(method("POST"))
            .and(path("/ajtakelogin.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_ok()))
            .mount(&self.server)
            .await;
    }

    /// Adapter pointed at this tracker.
    pub fn adapter(&self, settings: Option<Settings>) -> TorrentBd {
        let base = Url::parse(&self.server.uri()).expect("mock server uri is a valid URL");
        TorrentBd::with_base_url(settings, base).expect("HTTP client builds")
    }
}
