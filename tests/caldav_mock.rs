use pagecal::components::caldav::CalDavClient;
use pagecal::components::ics::CalendarEvent;
use pagecal::error::Error;
use pagecal::settings::Settings;
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> Settings {
    Settings {
        // No trailing slash; the client must add it
        server_url: format!("{}/cal/home", server.uri()),
        username: "user".to_string(),
        password: "pass".to_string(),
    }
}

/// Settings pointing at a local port nothing listens on
fn unreachable_settings() -> Settings {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    Settings {
        server_url: format!("http://127.0.0.1:{}/cal/home", port),
        username: "user".to_string(),
        password: "pass".to_string(),
    }
}

fn sample_event() -> CalendarEvent {
    CalendarEvent {
        title: "Launch, party; v2".to_string(),
        start: "2024-06-01T18:00:00+03:00".to_string(),
        end: "2024-06-01T21:00:00+03:00".to_string(),
        all_day: false,
        description: Some("Bring snacks\n\nSource: https://example.com/launch".to_string()),
        url: Some("https://example.com/launch".to_string()),
    }
}

/// A 207 Multi-Status answer to PROPFIND means the collection is reachable
#[tokio::test]
async fn test_check_connection_multistatus() {
    let server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/cal/home/"))
        .and(header("Depth", "0"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .and(body_string_contains("resourcetype"))
        .respond_with(ResponseTemplate::new(207))
        .expect(1)
        .mount(&server)
        .await;

    let client = CalDavClient::default();
    assert!(client.check_connection(&settings(&server)).await);
}

#[tokio::test]
async fn test_check_connection_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = CalDavClient::default();
    assert!(!client.check_connection(&settings(&server)).await);
}

/// A request that never gets an answer yields false instead of an error
#[tokio::test]
async fn test_check_connection_network_failure() {
    let client = CalDavClient::default();
    assert!(!client.check_connection(&unreachable_settings()).await);
}

#[tokio::test]
async fn test_check_connection_invalid_url() {
    let client = CalDavClient::default();
    let settings = Settings {
        server_url: "not a url".to_string(),
        username: String::new(),
        password: String::new(),
    };
    assert!(!client.check_connection(&settings).await);
}

#[tokio::test]
async fn test_create_event_puts_ics_resource() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/cal/home/[0-9a-f-]{36}\.ics$"))
        .and(header("If-None-Match", "*"))
        .and(header("Content-Type", "text/calendar; charset=utf-8"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = CalDavClient::default();
    let created = client
        .create_event(&sample_event(), &settings(&server))
        .await
        .unwrap();

    assert_eq!(
        created.href,
        format!("{}/cal/home/{}.ics", server.uri(), created.uid)
    );

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(body.contains(&format!("UID:{}\r\n", created.uid)));
    assert!(body.contains("SUMMARY:Launch\\, party\\; v2\r\n"));
    assert!(body.contains("DTSTART:20240601T150000Z\r\n"));
    assert!(body.contains("DTEND:20240601T180000Z\r\n"));
    assert!(body.contains("URL:https://example.com/launch\r\n"));
}

#[tokio::test]
async fn test_create_event_accepts_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = CalDavClient::default();
    assert!(client
        .create_event(&sample_event(), &settings(&server))
        .await
        .is_ok());
}

/// An existing resource makes the precondition fail and the error carries the status
#[tokio::test]
async fn test_create_event_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = CalDavClient::default();
    let err = client
        .create_event(&sample_event(), &settings(&server))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("409"));
    assert!(matches!(
        err,
        Error::Protocol { status: 409, ref status_text } if status_text == "Conflict"
    ));
}

#[tokio::test]
async fn test_create_event_precondition_failed() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let client = CalDavClient::default();
    let err = client
        .create_event(&sample_event(), &settings(&server))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("412"));
}

#[tokio::test]
async fn test_create_event_network_failure_propagates() {
    let client = CalDavClient::default();
    let err = client
        .create_event(&sample_event(), &unreachable_settings())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_create_event_invalid_date_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut event = sample_event();
    event.start = "tomorrow-ish".to_string();

    let client = CalDavClient::default();
    let err = client
        .create_event(&event, &settings(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidDate(_)));
}
