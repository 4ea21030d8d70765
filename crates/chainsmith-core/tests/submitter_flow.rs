//! Source verification submission against a local HTTP endpoint.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use ethers::abi::Token;
use ethers::types::Address;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use chainsmith_core::accounts::NamedAccounts;
use chainsmith_core::context::ProvisionContext;
use chainsmith_core::fakes::{FakeChain, SimArtifact};
use chainsmith_core::staking::{DEPOSIT_MANAGER, WRAPPED_ETH};
use chainsmith_core::submitter::{
    SubmissionStatus, TokenVerification, VerificationSubmitter, VerifierConfig,
};
use chainsmith_core::ComponentName;
use chainsmith_state::fakes::MemoryRegistry;
use chainsmith_state::DeploymentRecord;

const TOKEN_ADDR: u64 = 0x700;
const ISSUER_ADDR: u64 = 0x600;

/// Serve exactly one request, answer with `body`, and hand back the raw
/// request bytes for inspection.
async fn serve_one(response_body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/api", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..n]);
            let request = String::from_utf8_lossy(&raw);
            if let Some(header_end) = request.find("\r\n\r\n") {
                let content_length = request
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{response_body}",
            response_body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        let _ = tx.send(String::from_utf8_lossy(&raw).into_owned());
    });

    (endpoint, rx)
}

async fn seeded_context() -> ProvisionContext {
    let chain = FakeChain::new();
    chain.register_artifact("WrappedToken", SimArtifact::new());
    chain.add_component(
        Address::from_low_u64_be(TOKEN_ADDR),
        "WrappedToken",
        BTreeMap::from([
            ("name".to_string(), Token::String("Wrapped Ether".to_string())),
            ("symbol".to_string(), Token::String("wETH".to_string())),
        ]),
    );

    let registry = MemoryRegistry::with_records([
        DeploymentRecord {
            name: ComponentName::new(WRAPPED_ETH),
            address: Address::from_low_u64_be(TOKEN_ADDR),
            artifact: "WrappedToken".to_string(),
            proxy: None,
            created_at: chrono::Utc::now(),
        },
        DeploymentRecord {
            name: ComponentName::new(DEPOSIT_MANAGER),
            address: Address::from_low_u64_be(ISSUER_ADDR),
            artifact: "DepositManager".to_string(),
            proxy: None,
            created_at: chrono::Utc::now(),
        },
    ]);

    ProvisionContext::new(Arc::new(registry), Arc::new(chain), NamedAccounts::new())
}

#[tokio::test]
async fn already_verified_token_submits_constructor_arguments() {
    common::init_tracing();
    let (endpoint, request_rx) = serve_one(r#"{"status":"already_verified"}"#).await;
    let ctx = seeded_context().await;

    let submitter = VerificationSubmitter::new(VerifierConfig {
        endpoint,
        api_key: Some("test-key".to_string()),
    });
    let status = submitter
        .submit(
            &ctx,
            &TokenVerification {
                token: ComponentName::new(WRAPPED_ETH),
                issuer: ComponentName::new(DEPOSIT_MANAGER),
            },
        )
        .await
        .unwrap();
    assert_eq!(status, SubmissionStatus::AlreadyVerified);

    let request = request_rx.await.unwrap();
    assert!(request
        .lines()
        .any(|line| line.to_ascii_lowercase() == "x-api-key: test-key"));

    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let payload: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        payload["address"],
        format!("{:?}", Address::from_low_u64_be(TOKEN_ADDR))
    );
    assert_eq!(
        payload["constructor_arguments"],
        serde_json::json!([
            format!("{:?}", Address::from_low_u64_be(ISSUER_ADDR)),
            "Wrapped Ether",
            "wETH",
        ])
    );
}

#[tokio::test]
async fn fresh_submission_reports_verified() {
    let (endpoint, _request_rx) = serve_one(r#"{"status":"verified"}"#).await;
    let ctx = seeded_context().await;

    let submitter = VerificationSubmitter::new(VerifierConfig {
        endpoint,
        api_key: None,
    });
    let status = submitter
        .submit(
            &ctx,
            &TokenVerification {
                token: ComponentName::new(WRAPPED_ETH),
                issuer: ComponentName::new(DEPOSIT_MANAGER),
            },
        )
        .await
        .unwrap();
    assert_eq!(status, SubmissionStatus::Verified);
}
