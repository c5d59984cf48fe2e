//! Contract tests for the GitHub source against a mocked contents API.
//!
//! | Response | Expected |
//! |----------|----------|
//! | 200 file, base64 | decoded bytes, validated |
//! | 200 array | `NotAFile { kind: "directory" }` |
//! | 200 symlink | `NotAFile { kind: "symlink" }` |
//! | 404 | `Api { status: 404 }` |
//! | 200 file, wrong category | `Content` |

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use capem_core::{AssetCategory, Locator};
use capem_source::{
    FetchError, GitHubClient, GitHubConfig, S3Backend, SourceAdapter, SourceBackends, TokenSource,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CERT: &[u8] = b"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
const CONTENTS_PATH: &str = "/repos/acme/pki/contents/ca/root-ca.crt";

fn backends(server: &MockServer) -> SourceBackends {
    let config = GitHubConfig {
        api_url: server.uri().parse().unwrap(),
        token: TokenSource::Static("test-token".into()),
    };
    SourceBackends::new(GitHubClient::new(config).unwrap(), S3Backend::new())
}

fn source(server: &MockServer, text: &str, category: AssetCategory) -> SourceAdapter {
    SourceAdapter::new(Locator::parse(text).unwrap(), category, &backends(server)).unwrap()
}

/// Base64 the way the API returns it: wrapped at 60 columns.
fn wrapped_base64(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

fn file_body(bytes: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "type": "file",
        "encoding": "base64",
        "size": bytes.len(),
        "name": "root-ca.crt",
        "path": "ca/root-ca.crt",
        "content": wrapped_base64(bytes),
    })
}

#[tokio::test]
async fn fetch_file_sends_auth_and_decodes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_body(CERT)))
        .expect(1)
        .mount(&server)
        .await;

    let src = source(
        &server,
        "github:///repos/acme/pki/contents/ca/root-ca.crt",
        AssetCategory::Certificate,
    );
    let bytes = src.fetch(&CancellationToken::new()).await.unwrap();
    assert_eq!(bytes, CERT);
}

#[tokio::test]
async fn fetch_with_ref_passes_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .and(query_param("ref", "v1.2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_body(CERT)))
        .expect(1)
        .mount(&server)
        .await;

    let src = source(
        &server,
        "github:///repos/acme/pki/contents/ca/root-ca.crt?ref=v1.2.0",
        AssetCategory::Certificate,
    );
    assert_eq!(src.fetch(&CancellationToken::new()).await.unwrap(), CERT);
}

#[tokio::test]
async fn directory_listing_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/pki/contents/ca"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"type": "file", "name": "root-ca.crt", "path": "ca/root-ca.crt"}
        ])))
        .mount(&server)
        .await;

    let src = source(
        &server,
        "github:///repos/acme/pki/contents/ca",
        AssetCategory::Certificate,
    );
    let err = src.fetch(&CancellationToken::new()).await.unwrap_err();
    assert!(
        matches!(err, FetchError::NotAFile { ref kind, .. } if kind == "directory"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn symlink_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "symlink",
            "target": "../other/root-ca.crt",
            "name": "root-ca.crt",
        })))
        .mount(&server)
        .await;

    let src = source(
        &server,
        "github:///repos/acme/pki/contents/ca/root-ca.crt",
        AssetCategory::Certificate,
    );
    let err = src.fetch(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, FetchError::NotAFile { ref kind, .. } if kind == "symlink"));
}

#[tokio::test]
async fn not_found_reports_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
        .mount(&server)
        .await;

    let text = "github:///repos/acme/pki/contents/ca/root-ca.crt";
    let err = source(&server, text, AssetCategory::Certificate)
        .fetch(&CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        FetchError::Api {
            locator,
            status,
            body,
        } => {
            assert_eq!(locator, text);
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_category_is_content_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_body(CERT)))
        .mount(&server)
        .await;

    let err = source(
        &server,
        "github:///repos/acme/pki/contents/ca/root-ca.crt",
        AssetCategory::PrivateKey,
    )
    .fetch(&CancellationToken::new())
    .await
    .unwrap_err();
    assert!(matches!(err, FetchError::Content { .. }));
}

#[tokio::test]
async fn cancellation_interrupts_slow_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(file_body(CERT))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let src = source(
        &server,
        "github:///repos/acme/pki/contents/ca/root-ca.crt",
        AssetCategory::Certificate,
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = src.fetch(&cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}
