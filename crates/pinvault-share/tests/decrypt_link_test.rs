//! End-to-end decrypt-link runs against a mock IPFS gateway.

use pinvault_core::{FileMetadata, PreviewKind};
use pinvault_crypto::{FileCipher, KdfParams};
use pinvault_share::{
    DecryptLinkWorkflow, FailureReason, LinkParams, Phase, ShareError, ShareLink, WorkflowState,
};
use pinvault_storage::GatewayClient;
use secrecy::SecretString;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cipher() -> FileCipher {
    FileCipher::new(KdfParams { iterations: 1 })
}

fn password(p: &str) -> SecretString {
    SecretString::from(p.to_string())
}

fn envelope(plaintext: &[u8], pass: &str, name: &str) -> Vec<u8> {
    cipher()
        .encrypt(
            plaintext,
            &password(pass),
            FileMetadata::for_file(name, plaintext.len() as u64),
        )
        .unwrap()
        .envelope
}

async fn gateway_serving(cid: &str, body: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{cid}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;
    server
}

fn workflow(params: LinkParams) -> DecryptLinkWorkflow {
    DecryptLinkWorkflow::new(
        params,
        GatewayClient::new(reqwest::Client::new(), false),
        cipher(),
    )
}

#[tokio::test]
async fn link_without_gateway_uses_default_and_infers_png() {
    let png = b"\x89PNG\r\n\x1a\nnot really a png".to_vec();
    let server = gateway_serving("X", envelope(&png, "hunter22", "photo.png")).await;
    let default_gateway = format!("{}/ipfs/", server.uri());

    let params = LinkParams::parse_with_default_gateway(
        "https://vault.example.com/decrypt?cid=X&name=photo.png",
        &default_gateway,
    )
    .unwrap();
    assert_eq!(params.gateway, default_gateway);

    let mut wf = workflow(params);
    wf.set_password(password("hunter22")).unwrap();
    wf.submit().await.unwrap();

    let file = wf.file().expect("decryption should succeed");
    assert_eq!(file.bytes, png);
    assert_eq!(file.name, "photo.png");
    assert_eq!(file.mime_type, "image/png");
    assert_eq!(file.size, png.len() as u64);
    assert_eq!(file.preview, PreviewKind::Image);
}

#[tokio::test]
async fn generated_link_roundtrips_through_workflow() {
    let report = b"quarterly numbers".to_vec();
    let server = gateway_serving("bafyreport", envelope(&report, "s3cret-pass", "q3.pdf")).await;

    // no trailing slash: the workflow inserts one
    let url = ShareLink::new("bafyreport", format!("{}/ipfs", server.uri()), "q3.pdf")
        .to_url("https://vault.example.com");
    let mut wf = workflow(LinkParams::parse(&url).unwrap());
    wf.set_password(password("s3cret-pass")).unwrap();

    assert!(matches!(wf.submit().await.unwrap(), WorkflowState::Success(_)));
    let file = wf.file().unwrap();
    assert_eq!(file.mime_type, "application/pdf");
    assert_eq!(file.preview, PreviewKind::Pdf);
}

#[tokio::test]
async fn unknown_extension_is_downloadable_but_not_previewable() {
    let server = gateway_serving("QmBin", envelope(b"blob", "pw-123456", "dump.xyz")).await;
    let link = format!("?cid=QmBin&gateway={}/ipfs/&name=dump.xyz", server.uri());

    let mut wf = workflow(LinkParams::parse(&link).unwrap());
    wf.set_password(password("pw-123456")).unwrap();
    wf.submit().await.unwrap();

    let file = wf.file().unwrap();
    assert_eq!(file.mime_type, "application/octet-stream");
    assert!(!file.preview.is_previewable());
    assert_eq!(file.bytes, b"blob");
}

#[tokio::test]
async fn wrong_password_fails_then_retry_succeeds() {
    let server =
        gateway_serving("QmRetry", envelope(b"second time lucky", "right-one", "a.txt")).await;
    let link = format!("?cid=QmRetry&gateway={}/ipfs/&name=a.txt", server.uri());
    let mut wf = workflow(LinkParams::parse(&link).unwrap());
    let mut phases = wf.subscribe();

    wf.set_password(password("wrong-one")).unwrap();
    match wf.submit().await.unwrap() {
        WorkflowState::Failed { reason, message } => {
            assert_eq!(*reason, FailureReason::DecryptionFailed);
            assert_eq!(message, "incorrect password or corrupted file");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(phases.has_changed().unwrap());
    assert_eq!(*phases.borrow_and_update(), Phase::Failed);

    // a failed run cannot be resubmitted without going through retry
    assert!(matches!(
        wf.submit().await,
        Err(ShareError::InvalidTransition { phase: Phase::Failed, .. })
    ));

    wf.retry().unwrap();
    assert_eq!(wf.phase(), Phase::AwaitingPassword);
    assert_eq!(wf.params().cid.as_deref(), Some("QmRetry"));
    // the old password is gone
    assert_eq!(wf.submit().await.unwrap_err(), ShareError::PasswordRequired);

    wf.set_password(password("right-one")).unwrap();
    wf.submit().await.unwrap();
    assert_eq!(wf.file().unwrap().bytes, b"second time lucky");
}

#[tokio::test]
async fn gateway_error_is_fetch_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let link = format!("?cid=QmGone&gateway={}/ipfs/", server.uri());
    let mut wf = workflow(LinkParams::parse(&link).unwrap());
    wf.set_password(password("whatever")).unwrap();

    match wf.submit().await.unwrap() {
        WorkflowState::Failed { reason, .. } => assert_eq!(*reason, FailureReason::FetchFailed),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_gateway_is_fetch_failed() {
    // grab a free port, then close it so the connection is refused
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let link = format!("?cid=QmNowhere&gateway=http://127.0.0.1:{port}/ipfs/&name=a.txt");
    let mut wf = workflow(LinkParams::parse(&link).unwrap());
    wf.set_password(password("whatever")).unwrap();

    match wf.submit().await.unwrap() {
        WorkflowState::Failed { reason, message } => {
            assert_eq!(*reason, FailureReason::FetchFailed);
            assert!(message.starts_with("failed to download file from IPFS"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(wf.phase(), Phase::Failed);

    // a transport failure can be retried like any other
    wf.retry().unwrap();
    assert_eq!(wf.phase(), Phase::AwaitingPassword);
}

#[tokio::test]
async fn truncated_envelope_is_decryption_failed() {
    let server = gateway_serving("QmShort", vec![0u8; 27]).await;
    let link = format!("?cid=QmShort&gateway={}/ipfs/", server.uri());
    let mut wf = workflow(LinkParams::parse(&link).unwrap());
    wf.set_password(password("whatever")).unwrap();

    match wf.submit().await.unwrap() {
        WorkflowState::Failed { reason, .. } => {
            assert_eq!(*reason, FailureReason::DecryptionFailed)
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn restart_after_success_clears_result() {
    let server = gateway_serving("QmAgain", envelope(b"once", "pw-pw-pw", "a.txt")).await;
    let link = format!("?cid=QmAgain&gateway={}/ipfs/&name=a.txt", server.uri());
    let mut wf = workflow(LinkParams::parse(&link).unwrap());
    wf.set_password(password("pw-pw-pw")).unwrap();
    wf.submit().await.unwrap();
    assert_eq!(wf.phase(), Phase::Success);

    // success has no retry edge
    assert!(wf.retry().is_err());

    wf.restart().unwrap();
    assert_eq!(wf.phase(), Phase::AwaitingPassword);
    assert!(wf.file().is_none());
}
