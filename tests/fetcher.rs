use site_capture::fetcher::fetch_page;
use site_capture::{CaptureError, FetchOptions, UrlPolicy};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_page_returns_body_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
    let page = fetch_page(&url, &FetchOptions::default(), &UrlPolicy::permissive())
        .await
        .unwrap();

    assert!(page.is_success());
    assert_eq!(page.status, 200);
    assert_eq!(page.url, url);
    assert_eq!(page.body, "<p>hello</p>");
    assert_eq!(page.location, None);
}

#[tokio::test]
async fn test_unfollowed_redirect_keeps_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;

    let options = FetchOptions {
        follow_redirects: false,
        ..FetchOptions::default()
    };
    let url = Url::parse(&server.uri()).unwrap();
    let page = fetch_page(&url, &options, &UrlPolicy::permissive())
        .await
        .unwrap();

    assert!(page.is_redirect());
    assert_eq!(page.location.as_deref(), Some("/elsewhere"));
    assert!(page.body.is_empty());
}

#[tokio::test]
async fn test_redirect_to_blocked_host_rejected() {
    let server = MockServer::start().await;
    let target = format!("http://localhost:{}/internal", server.address().port());
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", target.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/internal"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    // The first hop is requested directly; only the redirect target is vetted
    let url = Url::parse(&format!("{}/start", server.uri())).unwrap();
    let result = fetch_page(&url, &FetchOptions::default(), &UrlPolicy::default()).await;

    match result {
        Err(CaptureError::TransportError(message)) => {
            assert!(message.contains("redirect rejected"), "{}", message)
        }
        other => panic!("expected a rejected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let err = fetch_page(&url, &FetchOptions::default(), &UrlPolicy::permissive())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
}
