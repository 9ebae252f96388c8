//! HttpApiClient end-to-end tests.
//!
//! Each test binds a loopback listener that answers exactly one request with a
//! canned HTTP/1.1 response and hands back the raw request it received.

use api_client::HttpApiClient;
use board::{ApiClient, ApiFailure, ApiPath, ApiToken, AuthContext, LoginRequest};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves one response and returns the request head (and any body bytes that
/// arrived with it), lowercased for header matching.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            if let Some(head_end) = find_head_end(&received) {
                let content_length = content_length(&received[..head_end]);
                if received.len() >= head_end + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&received).to_lowercase()
    });

    (base_url, handle)
}

fn find_head_end(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn authed() -> AuthContext {
    AuthContext::with_token(ApiToken::new("tok-123").unwrap())
}

#[tokio::test]
async fn success_returns_parsed_body_and_sends_token() {
    let (base_url, server) = serve_once("HTTP/1.1 200 OK", r#"[{"id":1,"name":"A"}]"#).await;
    let client = HttpApiClient::new(&base_url, authed()).unwrap();

    let body = client.get_json(&ApiPath::pipelines()).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(body, json!([{"id": 1, "name": "A"}]));
    assert!(request.starts_with("get /pipelines http/1.1"));
    assert!(request.contains("x-api-key: tok-123"));
    assert!(request.contains("content-type: application/json"));
}

#[tokio::test]
async fn anonymous_requests_are_still_sent() {
    let (base_url, server) = serve_once("HTTP/1.1 200 OK", "[]").await;
    let client = HttpApiClient::new(&base_url, AuthContext::anonymous()).unwrap();

    let body = client.get_json(&ApiPath::admin_users()).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(body, json!([]));
    assert!(!request.contains("x-api-key"));
}

#[tokio::test]
async fn error_status_is_reported_without_reading_body() {
    let (base_url, server) = serve_once("HTTP/1.1 500 Internal Server Error", "not json").await;
    let client = HttpApiClient::new(&base_url, authed()).unwrap();

    let result = client
        .get_json(&ApiPath::stages(board::PipelineId::new(1)))
        .await;
    server.await.unwrap();

    assert_eq!(result, Err(ApiFailure::HttpError { status: 500 }));
}

#[tokio::test]
async fn success_with_garbage_body_is_a_decode_failure() {
    let (base_url, server) = serve_once("HTTP/1.1 200 OK", "<html>").await;
    let client = HttpApiClient::new(&base_url, authed()).unwrap();

    let result = client.get_json(&ApiPath::pipelines()).await;
    server.await.unwrap();

    assert_eq!(result.unwrap_err().reason(), "decode-error");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let client = HttpApiClient::new(&base_url, authed()).unwrap();

    let result = client.get_json(&ApiPath::pipelines()).await;

    assert_eq!(result.unwrap_err().reason(), "transport-error");
}

#[tokio::test]
async fn post_sends_json_body() {
    let (base_url, server) =
        serve_once("HTTP/1.1 201 Created", r#"{"id":9,"name":"Sales"}"#).await;
    let client = HttpApiClient::new(&base_url, authed()).unwrap();

    let created = client
        .post_json(&ApiPath::pipelines(), json!({"name": "Sales"}))
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert_eq!(created["id"], 9);
    assert!(request.starts_with("post /pipelines http/1.1"));
    assert!(request.ends_with(r#"{"name":"sales"}"#));
}

#[tokio::test]
async fn login_sends_identity_as_query_and_returns_token() {
    let (base_url, server) = serve_once("HTTP/1.1 200 OK", r#"{"token":"abcdef"}"#).await;
    let client = HttpApiClient::new(&base_url, AuthContext::anonymous()).unwrap();
    let login = LoginRequest {
        account_id: "7".into(),
        user_id: "42".into(),
        user_email: "ana@example.com".into(),
        user_name: "Ana".into(),
    };

    let token = client.login(&login).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(token.as_str(), "abcdef");
    assert!(request.starts_with("get /auth/webhook?account_id=7&user_id=42&user_email=ana%40example.com&user_name=ana http/1.1"));
    assert!(!request.contains("x-api-key"));
}

#[tokio::test]
async fn rejected_login_is_an_http_failure() {
    let (base_url, server) =
        serve_once("HTTP/1.1 400 Bad Request", r#"{"error":"Missing fields"}"#).await;
    let client = HttpApiClient::new(&base_url, AuthContext::anonymous()).unwrap();
    let login = LoginRequest {
        account_id: "7".into(),
        user_id: "42".into(),
        user_email: "ana@example.com".into(),
        user_name: "Ana".into(),
    };

    let result = client.login(&login).await;
    server.await.unwrap();

    assert_eq!(result, Err(ApiFailure::HttpError { status: 400 }));
}
