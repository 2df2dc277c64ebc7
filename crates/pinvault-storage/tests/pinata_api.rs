use pinvault_storage::{
    check_health, is_healthy, ContentStore, GatewayClient, Gateways, PinataStore, StorageError,
};
use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> PinataStore {
    let gateways = Gateways {
        public: format!("{}/ipfs/", server.uri()),
        pinata: format!("{}/ipfs/", server.uri()),
        custom: None,
    };
    PinataStore::new(
        reqwest::Client::new(),
        &server.uri(),
        SecretString::from("test-jwt".to_string()),
        gateways,
        false,
    )
}

// ── Pinning ─────────────────────────────────────────────────────

#[tokio::test]
async fn put_returns_ipfs_hash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("authorization", "Bearer test-jwt"))
        .and(body_string_contains("pinataMetadata"))
        .and(body_string_contains("\"cidVersion\":1"))
        .and(body_string_contains("report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "IpfsHash": "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi",
            "PinSize": 11,
            "Timestamp": "2026-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let cid = store.put("report.pdf", b"hello world").await.unwrap();
    assert_eq!(
        cid,
        "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi"
    );
}

#[tokio::test]
async fn put_surfaces_string_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "Invalid authentication" })),
        )
        .mount(&server)
        .await;

    let err = store_for(&server).put("a.txt", b"x").await.unwrap_err();
    match err {
        StorageError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid authentication");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn put_surfaces_structured_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "reason": "NO_SCOPES", "details": "key lacks pinFileToIPFS" }
        })))
        .mount(&server)
        .await;

    let err = store_for(&server).put("a.txt", b"x").await.unwrap_err();
    assert!(err.to_string().contains("NO_SCOPES: key lacks pinFileToIPFS"));
}

#[tokio::test]
async fn put_non_json_error_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = store_for(&server).put("a.txt", b"x").await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Api { status: 502, ref message } if message == "Bad Gateway"
    ));
}

// ── Unpin ───────────────────────────────────────────────────────

#[tokio::test]
async fn remove_calls_unpin() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/pinning/unpin/bafyabc"))
        .and(header("authorization", "Bearer test-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).remove("bafyabc").await.unwrap();
}

#[tokio::test]
async fn remove_failure_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "error": "CID not pinned" })),
        )
        .mount(&server)
        .await;

    let err = store_for(&server).remove("bafyabc").await.unwrap_err();
    assert!(err.to_string().contains("CID not pinned"));
}

// ── Reads ───────────────────────────────────────────────────────

#[tokio::test]
async fn get_reads_through_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/bafyabc"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"content".to_vec()))
        .mount(&server)
        .await;

    assert_eq!(store_for(&server).get("bafyabc").await.unwrap(), b"content");
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(matches!(
        store_for(&server).get("bafymissing").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn gateway_client_joins_without_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/QmX"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;

    let client = GatewayClient::new(reqwest::Client::new(), false);
    let gateway = format!("{}/ipfs", server.uri());
    assert_eq!(client.fetch(&gateway, "QmX").await.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn gateway_client_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = GatewayClient::new(reqwest::Client::new(), false);
    let err = client
        .fetch(&format!("{}/ipfs/", server.uri()), "QmX")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Gateway { status: 500, .. }));
}

#[tokio::test]
async fn gateway_client_enforce_tls_refuses_http() {
    let client = GatewayClient::new(reqwest::Client::new(), true);
    let err = client
        .fetch("http://127.0.0.1:9/ipfs/", "QmX")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InsecureEndpoint(_)));
}

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_check_uses_test_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/testAuthentication"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Congratulations! You are communicating with the Pinata API!"
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    check_health(&store).await.unwrap();
    assert!(is_healthy(&store).await);
}

#[tokio::test]
async fn health_check_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/testAuthentication"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!is_healthy(&store_for(&server)).await);
}
