// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::credentials::client_secret::ClientSecretCredentials;
use crate::helpers::time::ManualClock;
use crate::sources::TokenSource;

pub const TEST_PKCS8_PEM: &str = include_str!("../fixtures/test_pkcs8.pem");
pub const TEST_PKCS1_PEM: &str = include_str!("../fixtures/test_pkcs1.pem");
pub const TEST_PKCS1_DER: &[u8] = include_bytes!("../fixtures/test_pkcs1.der");
/// Public half of the test key pair (SubjectPublicKeyInfo PEM).
pub const TEST_PUBLIC_PEM: &str = include_str!("../fixtures/test_public.pem");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn token_body(access_token: &str, expires_in: u64) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "internal_user_mgt_view"
    })
}

/// Token endpoint that numbers the tokens it issues (`token-1`, `token-2`, ...),
/// answers after `delay`, and returns 500 while `failing` is set.
pub struct TokenEndpoint {
    pub hits: Arc<AtomicUsize>,
    pub failing: Arc<AtomicBool>,
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TokenEndpoint {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Drop for TokenEndpoint {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn token_router(
    hits: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    delay: Duration,
    expires_in: u64,
) -> Router {
    Router::new().route(
        "/oauth2/token",
        post(move || {
            let hits = hits.clone();
            let failing = failing.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(delay).await;
                if failing.load(Ordering::SeqCst) {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "server_error"})))
                } else {
                    (StatusCode::OK, Json(token_body(&format!("token-{n}"), expires_in)))
                }
            }
        }),
    )
}

pub async fn spawn_token_endpoint(delay: Duration, expires_in: u64) -> TokenEndpoint {
    let hits = Arc::new(AtomicUsize::new(0));
    let failing = Arc::new(AtomicBool::new(false));
    let router = token_router(hits.clone(), failing.clone(), delay, expires_in);
    let (handle, addr) = spawn_axum(router).await;
    TokenEndpoint {
        hits,
        failing,
        addr,
        handle,
    }
}

pub fn client_secret_source(host: &str, clock: &ManualClock) -> TokenSource {
    let credentials = ClientSecretCredentials::new("abc", "xyz", "read write", host);
    TokenSource::builder(credentials)
        .client(build_reqwest_client())
        .clock(Arc::new(clock.clone()))
        .build()
}

pub fn build_reqwest_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
