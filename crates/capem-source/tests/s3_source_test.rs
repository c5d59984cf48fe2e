//! S3 source against a mock endpoint speaking path-style `GetObject`.

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use capem_core::{AssetCategory, Locator};
use capem_source::{
    FetchError, GitHubClient, GitHubConfig, S3Backend, SourceAdapter, SourceBackends, TokenSource,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CRL: &[u8] = b"-----BEGIN X509 CRL-----\nMIIB\n-----END X509 CRL-----\n";

fn backends(server: &MockServer) -> SourceBackends {
    let s3_config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .endpoint_url(server.uri())
        .force_path_style(true)
        .build();
    let github = GitHubClient::new(GitHubConfig {
        api_url: server.uri().parse().unwrap(),
        token: TokenSource::Static("unused".into()),
    })
    .unwrap();
    SourceBackends::new(
        github,
        S3Backend::with_client(aws_sdk_s3::Client::from_conf(s3_config)),
    )
}

#[tokio::test]
async fn get_object_drains_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pki-assets/crl/root.crl"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(CRL))
        .expect(1)
        .mount(&server)
        .await;

    let src = SourceAdapter::new(
        Locator::parse("s3://pki-assets/crl/root.crl").unwrap(),
        AssetCategory::Crl,
        &backends(&server),
    )
    .unwrap();

    assert_eq!(src.fetch(&CancellationToken::new()).await.unwrap(), CRL);
}

#[tokio::test]
async fn access_denied_is_s3_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pki-assets/crl/root.crl"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
        ))
        .mount(&server)
        .await;

    let text = "s3://pki-assets/crl/root.crl";
    let src = SourceAdapter::new(
        Locator::parse(text).unwrap(),
        AssetCategory::Crl,
        &backends(&server),
    )
    .unwrap();

    let err = src.fetch(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, FetchError::S3 { .. }), "got {err:?}");
    assert_eq!(err.locator(), text);

    let service = match &err {
        FetchError::S3 { source, .. } => source.as_service_error(),
        _ => None,
    };
    assert!(
        service.is_some_and(|e| e.code() == Some("AccessDenied")),
        "SDK error not kept as source: {err:?}"
    );
    assert!(std::error::Error::source(&err).is_some());
}
