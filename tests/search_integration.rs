//! Integration tests for sign-in and search against a mock tracker.

use torrentbd::{AdapterError, Settings, VecSink};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::{MockTracker, login_ok};

const SAMPLE: &str = include_str!("fixtures/sample_search_result.html");

fn settings() -> Settings {
    Settings::new("dummy", "1234")
}

#[tokio::test]
async fn test_login_posts_credentials_and_sets_flag() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/ajtakelogin.php"))
        .and(body_string_contains("username=dummy"))
        .and(body_string_contains("password=1234"))
        .and(body_string_contains("login_phase=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok()))
        .expect(1)
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    adapter.try_login().await.unwrap();
    assert!(adapter.is_logged_in());
}

#[tokio::test]
async fn test_login_rejected_is_auth_error() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/ajtakelogin.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    let err = adapter.try_login().await.unwrap_err();
    assert!(matches!(err, AdapterError::Auth { .. }), "got {err:?}");
    assert!(err.to_string().starts_with("[AUTH]"));
    assert!(!adapter.is_logged_in());
}

#[tokio::test]
async fn test_login_with_unreadable_body_is_auth_error() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/ajtakelogin.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    assert!(matches!(
        adapter.try_login().await,
        Err(AdapterError::Auth { .. })
    ));
    assert!(!adapter.is_logged_in());
}

#[tokio::test]
async fn test_login_http_error_status() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/ajtakelogin.php"))
        .respond_with(ResponseTemplate::new(503))
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    assert!(matches!(
        adapter.try_login().await,
        Err(AdapterError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_search_emits_all_results_and_reuses_login_cookie() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/ajtakelogin.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "PHPSESSID=abc123; Path=/")
                .set_body_json(login_ok()),
        )
        .expect(1)
        .mount(tracker.server())
        .await;
    Mock::given(method("POST"))
        .and(path("/ajsearch.php"))
        .and(header("cookie", "PHPSESSID=abc123"))
        .and(body_string_contains("kuddus_searchkey=open+source"))
        .and(body_string_contains("searchParams%5BsortBy%5D=seeders"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
        .expect(2)
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    let mut sink = VecSink::default();
    assert_eq!(adapter.search("open%20source", "all", &mut sink).await, 15);
    assert_eq!(adapter.search("open source", "all", &mut sink).await, 15);
    assert_eq!(sink.records.len(), 30);

    let base = tracker.uri();
    let first = &sink.records[0];
    assert_eq!(first.engine_url(), Some(base.as_str()));
    assert_eq!(
        first.link(),
        Some(format!("{base}/download.php?id=101&type=torrent").as_str())
    );
}

#[tokio::test]
async fn test_search_sends_category_codes_and_enabled_filters() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    tracker.accept_login().await;
    Mock::given(method("POST"))
        .and(path("/ajsearch.php"))
        .and(body_string_contains("searchParams%5Btorrentcats%5D%5B%5D=65"))
        .and(body_string_contains("searchParams%5Btorrentcats%5D%5B%5D=20"))
        .and(body_string_contains(
            "searchParams%5Btertiary_filters%5D%5B%5D=freeleech",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
        .expect(1)
        .mount(tracker.server())
        .await;

    let mut with_freeleech = settings();
    with_freeleech.freeleech = true;
    let mut adapter = tracker.adapter(Some(with_freeleech));
    let mut sink = VecSink::default();
    assert_eq!(adapter.search("linux", "software", &mut sink).await, 15);
}

#[tokio::test]
async fn test_empty_term_logs_in_but_never_searches() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/ajtakelogin.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok()))
        .expect(1)
        .mount(tracker.server())
        .await;
    Mock::given(method("POST"))
        .and(path("/ajsearch.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
        .expect(0)
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    let mut sink = VecSink::default();
    assert_eq!(adapter.search("   ", "all", &mut sink).await, 0);
    assert!(sink.records.is_empty());
    assert!(adapter.is_logged_in());
}

#[tokio::test]
async fn test_failed_login_skips_search() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/ajtakelogin.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
        .mount(tracker.server())
        .await;
    Mock::given(method("POST"))
        .and(path("/ajsearch.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
        .expect(0)
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    let mut sink = VecSink::default();
    assert_eq!(adapter.search("ubuntu", "all", &mut sink).await, 0);
    assert!(sink.records.is_empty());
}

#[tokio::test]
async fn test_search_error_status_emits_nothing() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    tracker.accept_login().await;
    Mock::given(method("POST"))
        .and(path("/ajsearch.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string(SAMPLE))
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(Some(settings()));
    let mut sink = VecSink::default();
    assert_eq!(adapter.search("ubuntu", "all", &mut sink).await, 0);
    assert!(sink.records.is_empty());
}

#[tokio::test]
async fn test_search_without_settings_makes_no_requests() {
    let Some(tracker) = MockTracker::start().await else {
        return;
    };
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok()))
        .expect(0)
        .mount(tracker.server())
        .await;

    let mut adapter = tracker.adapter(None);
    let mut sink = VecSink::default();
    assert_eq!(adapter.search("ubuntu", "all", &mut sink).await, 0);
}
