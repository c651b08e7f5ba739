use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::cache::token::Token;
use crate::cache::token_context::CachedToken;
use crate::credentials::CredentialStrategy;
use crate::error::{Error, Result};
use crate::helpers::time::{Clock, SystemClock};
use crate::observability::metrics::get_metrics;
use crate::sources::AuthContext;
use crate::utils::constants::DEFAULT_SAFETY_MARGIN;

static SUCCESS_MSG: &str = "success";
static ERROR_MSG: &str = "error";

type RefreshOutcome = Result<String>;

/// Hands out valid bearer tokens for one set of client credentials.
///
/// Cloning is cheap; clones share the cached token and the in-flight refresh.
/// At most one token endpoint round trip runs at a time per source: callers
/// that find the token expired while a refresh is running wait for that
/// refresh and receive its outcome.
#[derive(Clone)]
pub struct TokenSource {
    inner: Arc<Inner>,
}

struct Inner {
    strategy: CredentialStrategy,
    client: Client,
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
    state: RwLock<TokenState>,
}

#[derive(Default)]
struct TokenState {
    cached: Option<CachedToken>,
    in_flight: Option<watch::Receiver<Option<RefreshOutcome>>>,
}

pub struct TokenSourceBuilder {
    strategy: CredentialStrategy,
    client: Option<Client>,
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
}

impl TokenSourceBuilder {
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn safety_margin(mut self, safety_margin: Duration) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    pub fn build(self) -> TokenSource {
        TokenSource {
            inner: Arc::new(Inner {
                strategy: self.strategy,
                client: self.client.unwrap_or_default(),
                clock: self.clock,
                safety_margin: self.safety_margin,
                state: RwLock::new(TokenState::default()),
            }),
        }
    }
}

impl TokenSource {
    pub fn new(strategy: impl Into<CredentialStrategy>, client: Client) -> Self {
        Self::builder(strategy).client(client).build()
    }

    pub fn builder(strategy: impl Into<CredentialStrategy>) -> TokenSourceBuilder {
        TokenSourceBuilder {
            strategy: strategy.into(),
            client: None,
            clock: Arc::new(SystemClock),
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }

    pub fn strategy(&self) -> &CredentialStrategy {
        &self.inner.strategy
    }

    /// Returns the cached access token, refreshing it first when it expired.
    pub async fn valid_token(&self) -> Result<String> {
        let cached = {
            let state = self.inner.state.read().await;
            self.inner.valid_cached(&state)
        };
        if let Some(access_token) = cached {
            get_metrics().await.token_cache_hits.inc();
            return Ok(access_token);
        }
        self.join_refresh(false).await
    }

    /// Fetches a new token even if the cached one is still valid.
    ///
    /// A failed refresh leaves the cached token in place.
    pub async fn refresh(&self) -> Result<String> {
        self.join_refresh(true).await
    }

    async fn join_refresh(&self, force: bool) -> Result<String> {
        let mut receiver = {
            let mut state = self.inner.state.write().await;
            // another caller may have completed a refresh while we waited for the lock
            if !force {
                if let Some(access_token) = self.inner.valid_cached(&state) {
                    return Ok(access_token);
                }
            }
            // a closed channel means the refresh task died without reporting
            let joinable = state
                .in_flight
                .clone()
                .filter(|receiver| receiver.has_changed().is_ok());
            if let Some(receiver) = joinable {
                debug!(client_id = self.inner.strategy.client_id(), "joining in-flight token refresh");
                receiver
            } else {
                let receiver = Inner::spawn_refresh(self.inner.clone());
                state.in_flight = Some(receiver.clone());
                receiver
            }
        };

        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or(Err(Error::RefreshAbandoned))
    }
}

impl Inner {
    fn valid_cached(&self, state: &TokenState) -> Option<String> {
        let now = self.clock.now();
        state
            .cached
            .as_ref()
            .filter(|cached| cached.is_valid_at(now))
            .map(|cached| cached.access_token().to_owned())
    }

    /// Runs the round trip on its own task so that dropping a waiter never
    /// cancels the refresh.
    fn spawn_refresh(inner: Arc<Inner>) -> watch::Receiver<Option<RefreshOutcome>> {
        let (sender, receiver) = watch::channel(None);
        tokio::spawn(async move {
            let fetched_at = inner.clock.now();
            let fetched = inner.fetch_token().await;

            let mut state = inner.state.write().await;
            state.in_flight = None;
            let outcome = match fetched {
                Ok(token) => {
                    let cached = CachedToken::new(token, fetched_at, inner.safety_margin);
                    let access_token = cached.access_token().to_owned();
                    state.cached = Some(cached);
                    Ok(access_token)
                }
                Err(err) => {
                    warn!(client_id = inner.strategy.client_id(), "token refresh failed: {}", err);
                    Err(err)
                }
            };
            sender.send_replace(Some(outcome));
        });
        receiver
    }

    #[tracing::instrument(
        skip(self),
        fields(client_id = %self.strategy.client_id(), strategy = self.strategy.kind()),
    )]
    async fn fetch_token(&self) -> Result<Token> {
        let metrics = get_metrics().await;
        let strategy = self.strategy.kind();
        let start = Instant::now();

        let result = self.request_token().await;

        metrics
            .token_refresh_duration
            .with_label_values(&[strategy])
            .observe(start.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { SUCCESS_MSG } else { ERROR_MSG };
        metrics
            .token_refresh_total
            .with_label_values(&[strategy, outcome])
            .inc();

        result
    }

    async fn request_token(&self) -> Result<Token> {
        let request = self.strategy.token_request()?;
        let url = Url::parse(&request.url)
            .map_err(|e| Error::RequestConstruction(format!("invalid token url '{}': {e}", request.url)))?;

        debug!("requesting token from {}", url);
        let response = self
            .client
            .request(request.method, url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(Error::transport)?;
        if !status.is_success() {
            return Err(Error::unexpected_status(status.as_u16(), &body));
        }

        let token: Token = serde_json::from_slice(&body).map_err(Error::decode)?;
        info!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            scope = %token.scope,
            "received new token"
        );
        Ok(token)
    }
}

impl AuthContext for TokenSource {
    async fn current_token(&self) -> Result<String> {
        self.valid_token().await
    }

    fn base_host(&self) -> &str {
        self.inner.strategy.host()
    }

    fn transport(&self) -> &Client {
        &self.inner.client
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("strategy", &self.inner.strategy)
            .field("safety_margin", &self.inner.safety_margin)
            .finish_non_exhaustive()
    }
}
