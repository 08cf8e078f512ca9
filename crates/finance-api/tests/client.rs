//! FinanceClient against a canned-response axum backend

use axum::Router;
use axum::extract::State;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use finance_api::{ApiError, ErrorKind, FinanceApi, FinanceClient};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

/// A request as the backend saw it
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    /// Path plus raw query string
    uri: String,
    headers: HeaderMap,
    body: String,
}

impl Recorded {
    fn header(&self, name: axum::http::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Replies served in order, one per request, and everything received
#[derive(Clone, Default)]
struct Backend {
    replies: Arc<Mutex<VecDeque<(StatusCode, &'static str)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Backend {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    backend.requests.lock().unwrap().push(Recorded {
        method,
        uri: uri
            .path_and_query()
            .map(ToString::to_string)
            .unwrap_or_else(|| uri.path().to_string()),
        headers,
        body,
    });

    let reply = backend.replies.lock().unwrap().pop_front();
    match reply {
        Some((status, body)) => (status, [(CONTENT_TYPE, "application/json")], body).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no reply queued").into_response(),
    }
}

/// Serve `replies` on an ephemeral port
async fn spawn_backend(replies: Vec<(StatusCode, &'static str)>) -> (String, Backend) {
    let backend = Backend {
        replies: Arc::new(Mutex::new(replies.into())),
        ..Default::default()
    };
    let app = Router::new().fallback(record).with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, backend)
}

/// An address nothing listens on
async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn test_get_quote_success() {
    let (base_url, backend) = spawn_backend(vec![(
        StatusCode::OK,
        r#"{"ticker":"AAPL","price":150.25,"change":2.10,"changePct":1.42}"#,
    )])
    .await;
    let client = FinanceClient::new(&base_url).unwrap();

    let quote = assert_ok!(client.get_quote("AAPL").await);
    assert_eq!(quote.ticker, "AAPL");
    assert!((quote.price - 150.25).abs() < f64::EPSILON);
    assert_eq!(quote.currency, "USD");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].uri, "/price/quote?ticker=AAPL");
    assert_eq!(requests[0].header(ACCEPT), Some("application/json"));
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_get_quote_encodes_ticker() {
    let (base_url, backend) =
        spawn_backend(vec![(StatusCode::OK, r#"{"ticker":"BRK.B","price":400.0}"#)]).await;
    let client = FinanceClient::new(&base_url).unwrap();

    assert_ok!(client.get_quote("BRK B&X").await);

    assert_eq!(backend.requests()[0].uri, "/price/quote?ticker=BRK+B%26X");
}

#[tokio::test]
async fn test_not_found_embeds_status_and_body() {
    let (base_url, _backend) = spawn_backend(vec![(
        StatusCode::NOT_FOUND,
        r#"{"detail":"Ticker FAKE not found"}"#,
    )])
    .await;
    let client = FinanceClient::new(&base_url).unwrap();

    let err = client.get_quote("FAKE").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
    assert_eq!(err.status(), Some(404));
    assert_eq!(
        err.to_string(),
        r#"API Error: 404 Not Found - {"detail":"Ticker FAKE not found"}"#
    );
}

#[tokio::test]
async fn test_server_error_on_post() {
    let (base_url, _backend) =
        spawn_backend(vec![(StatusCode::INTERNAL_SERVER_ERROR, "model crashed")]).await;
    let client = FinanceClient::new(&base_url).unwrap();

    let err = client.analyze("AAPL").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: "model crashed".to_string(),
        }
    );
}

#[tokio::test]
async fn test_status_without_reason_phrase() {
    let status = StatusCode::from_u16(599).unwrap();
    let (base_url, _backend) = spawn_backend(vec![(status, "boom")]).await;
    let client = FinanceClient::new(&base_url).unwrap();

    let err = client.check_health().await.unwrap_err();
    assert_eq!(err.status(), Some(599));
    assert_eq!(err.to_string(), "API Error: 599 - boom");
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let (base_url, _backend) = spawn_backend(vec![(StatusCode::OK, "<html>oops</html>")]).await;
    let client = FinanceClient::new(&base_url).unwrap();

    let err = client.send_prompt("hi").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_wrong_shape_is_an_error() {
    let (base_url, _backend) = spawn_backend(vec![(StatusCode::OK, r#"{"ticker":"AAPL"}"#)]).await;
    let client = FinanceClient::new(&base_url).unwrap();

    let err = client.get_quote("AAPL").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_post_bodies() {
    let (base_url, backend) = spawn_backend(vec![
        (StatusCode::OK, r#"{"content":"Buy","model":"gpt-4"}"#),
        (StatusCode::OK, r#"{"content":"Headlines"}"#),
        (StatusCode::OK, r#"{"content":"Market news"}"#),
        (StatusCode::OK, r#"{"content":"P/E is price over earnings","model":"gpt-4"}"#),
    ])
    .await;
    let client = FinanceClient::new(&base_url).unwrap();

    let analysis = assert_ok!(client.analyze("AAPL").await);
    assert_eq!(analysis.model.as_deref(), Some("gpt-4"));
    let news = assert_ok!(client.get_news(Some("AAPL".to_string())).await);
    assert_eq!(news.model, None);
    assert_ok!(client.get_news(None).await);
    let reply = assert_ok!(client.send_prompt("What is P/E ratio?").await);
    assert_eq!(reply.content, "P/E is price over earnings");

    let requests = backend.requests();
    let sent: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.uri.as_str(), r.body.as_str()))
        .collect();
    assert_eq!(
        sent,
        vec![
            ("/analysis/stock", r#"{"ticker":"AAPL"}"#),
            ("/news", r#"{"ticker":"AAPL"}"#),
            ("/news", "{}"),
            ("/prompt", r#"{"prompt":"What is P/E ratio?"}"#),
        ]
    );
    for request in &requests {
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header(CONTENT_TYPE), Some("application/json"));
    }
}

#[tokio::test]
async fn test_health_is_stable() {
    let (base_url, backend) = spawn_backend(vec![
        (StatusCode::OK, r#"{"status":"ok"}"#),
        (StatusCode::OK, r#"{"status":"ok"}"#),
    ])
    .await;
    let client = FinanceClient::new(&base_url).unwrap();

    let first = assert_ok!(client.check_health().await);
    let second = assert_ok!(client.check_health().await);
    assert_eq!(first, second);
    assert_eq!(first.status, "ok");
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend() {
    let base_url = dead_address().await;
    let client = FinanceClient::new(&base_url).unwrap();

    let first = client.check_health().await.unwrap_err();
    let second = client.check_health().await.unwrap_err();
    assert_eq!(first, second);
    assert_eq!(
        first,
        ApiError::Unreachable {
            base_url: base_url.clone()
        }
    );
    assert!(first.to_string().ends_with(&base_url));
}
