//! HTTP fetcher and acquisition session against a mock server.

use std::time::Duration;

use jobscrape_fetch::{
    AcquisitionSession, AcquisitionState, BlockDetector, FetchError, HttpFetcher, HttpSettings,
    PageFetcher, RetryPolicy,
};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_html() -> String {
    format!(
        "<html><body><a class=\"name\" href=\"/job/1\">Picker</a>{}</body></html>",
        "<p>filler</p>".repeat(300)
    )
}

fn fast_http() -> HttpFetcher {
    HttpFetcher::from_settings(&HttpSettings {
        timeout_secs: 5,
        max_attempts: 5,
        retry_delay_secs: 0,
    })
}

#[tokio::test]
async fn test_http_fetch_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html()))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = fast_http();
    let body = fetcher.fetch(&format!("{}/jobs", server.uri())).await.unwrap();

    assert!(body.contains("Picker"));
}

#[tokio::test]
async fn test_http_fetch_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = fast_http();
    let body = fetcher.fetch(&format!("{}/jobs", server.uri())).await.unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_http_fetch_gives_up_after_five_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&server)
        .await;

    let mut fetcher = fast_http();
    let err = fetcher
        .fetch(&format!("{}/jobs", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_http_fetch_does_not_retry_missing_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = fast_http();
    let err = fetcher
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_http_fetch_retries_throttling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = fast_http();
    let body = fetcher.fetch(&format!("{}/jobs", server.uri())).await.unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_http_fetch_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let mut fetcher = fast_http()
        .with_timeout(Duration::from_millis(100))
        .with_policy(RetryPolicy::new(2));
    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn test_session_retries_block_page_until_clean() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>Sorry, you have been blocked</html>"),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html()))
        .mount(&server)
        .await;

    let mut session = AcquisitionSession::new(fast_http(), BlockDetector::new());
    let content = session
        .fetch(&format!("{}/job/1", server.uri()))
        .await
        .unwrap();

    assert!(content.contains("Picker"));
    assert_eq!(session.state(), AcquisitionState::Succeeded);
    assert_eq!(session.stats().attempts, 3);
    assert_eq!(session.stats().resets, 2);
}

#[tokio::test]
async fn test_session_reports_unavailable_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>short</html>"))
        .expect(5)
        .mount(&server)
        .await;

    let url = format!("{}/job/2", server.uri());
    let mut session = AcquisitionSession::new(fast_http(), BlockDetector::new());
    let err = session.fetch(&url).await.unwrap_err();

    match err {
        FetchError::PageUnavailable { url: failed, attempts } => {
            assert_eq!(failed, url);
            assert_eq!(attempts, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_session_accepts_small_json_without_size_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = AcquisitionSession::new(
        fast_http(),
        BlockDetector::new().with_min_content_len(0),
    );
    let body = session
        .fetch(&format!("{}/api", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, r#"{"results":[]}"#);
}

#[tokio::test]
async fn test_session_stops_on_invalid_url() {
    let mut session = AcquisitionSession::new(fast_http(), BlockDetector::new());
    let err = session.fetch("not a url").await.unwrap_err();

    assert!(matches!(err, FetchError::InvalidUrl(_)));
    assert_eq!(session.state(), AcquisitionState::Failed);
    assert_eq!(session.stats().attempts, 1);
    assert_eq!(session.stats().resets, 0);
    assert_eq!(session.stats().exhausted, 0);
}
