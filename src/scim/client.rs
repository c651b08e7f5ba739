use std::borrow::Cow;
use std::time::Instant;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::observability::metrics::get_metrics;
use crate::scim::types::{ListResponse, SearchRequest, SCIM_CONTENT_TYPE};
use crate::sources::AuthContext;

pub const SCIM_USERS: &str = "scim2/Users";
pub const SCIM_GROUPS: &str = "scim2/Groups";
const SEARCH_SEGMENT: &str = ".search";

/// Authenticated operations over one SCIM resource collection.
///
/// Holds no state besides the borrowed [`AuthContext`] and the collection
/// path. Operations never retry; every unexpected status surfaces as
/// [`Error::UnexpectedStatus`] with the exact code.
#[derive(Debug, Clone)]
pub struct ResourceClient<'a, A> {
    auth: &'a A,
    collection: Cow<'static, str>,
}

impl<'a, A: AuthContext> ResourceClient<'a, A> {
    pub fn users(auth: &'a A) -> Self {
        Self::collection(auth, SCIM_USERS)
    }

    pub fn groups(auth: &'a A) -> Self {
        Self::collection(auth, SCIM_GROUPS)
    }

    /// Collection path relative to the provider host, e.g. `scim2/Roles`.
    pub fn collection(auth: &'a A, path: impl Into<Cow<'static, str>>) -> Self {
        Self {
            auth,
            collection: path.into(),
        }
    }

    /// `GET <collection>?<query>`; `query` is a raw query string such as
    /// `filter=userName eq "alice"&count=10`.
    pub async fn filter<T: DeserializeOwned>(&self, query: Option<&str>) -> Result<ListResponse<T>> {
        let mut url = self.endpoint(&[])?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(query));
        }
        let response = self.execute(Method::GET, url, None).await?;
        if !response.status.is_success() {
            return Err(response.into_error());
        }
        response.decode()
    }

    /// `POST <collection>`; succeeds only on `201 Created`.
    pub async fn create<T: Serialize>(&self, resource: &T) -> Result<()> {
        let url = self.endpoint(&[])?;
        let body = encode(resource)?;
        self.execute(Method::POST, url, Some(body))
            .await?
            .expect(StatusCode::CREATED)
            .map(|_| ())
    }

    /// `POST <collection>/.search`.
    pub async fn search<T: DeserializeOwned>(&self, search: &SearchRequest) -> Result<ListResponse<T>> {
        let url = self.endpoint(&[SEARCH_SEGMENT])?;
        let body = encode(search)?;
        self.execute(Method::POST, url, Some(body))
            .await?
            .expect(StatusCode::OK)?
            .decode()
    }

    /// `GET <collection>/<id>`.
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        let url = self.endpoint(&[id])?;
        self.execute(Method::GET, url, None)
            .await?
            .expect(StatusCode::OK)?
            .decode()
    }

    /// `PUT <collection>/<id>` with the full resource.
    pub async fn replace<T: Serialize + DeserializeOwned>(&self, id: &str, resource: &T) -> Result<T> {
        let url = self.endpoint(&[id])?;
        let body = encode(resource)?;
        self.execute(Method::PUT, url, Some(body))
            .await?
            .expect(StatusCode::OK)?
            .decode()
    }

    /// `PATCH <collection>/<id>` with a patch document of shape `U`.
    pub async fn patch<T: DeserializeOwned, U: Serialize>(&self, id: &str, patch: &U) -> Result<T> {
        let url = self.endpoint(&[id])?;
        let body = encode(patch)?;
        self.execute(Method::PATCH, url, Some(body))
            .await?
            .expect(StatusCode::OK)?
            .decode()
    }

    /// `DELETE <collection>/<id>`; succeeds only on `204 No Content`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&[id])?;
        self.execute(Method::DELETE, url, None)
            .await?
            .expect(StatusCode::NO_CONTENT)
            .map(|_| ())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let host = self.auth.base_host();
        let mut url = Url::parse(host)
            .map_err(|e| Error::RequestConstruction(format!("invalid base host '{host}': {e}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::RequestConstruction(format!("base host '{host}' cannot carry a path")))?;
            path.pop_if_empty()
                .extend(self.collection.split('/').filter(|s| !s.is_empty()))
                .extend(segments);
        }
        Ok(url)
    }

    async fn execute(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<ResponseBody> {
        let token = self.auth.current_token().await?;
        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::RequestConstruction(format!("invalid bearer token: {e}")))?;
        authorization.set_sensitive(true);

        let mut request = self
            .auth
            .transport()
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, SCIM_CONTENT_TYPE);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, SCIM_CONTENT_TYPE).body(body);
        }

        let metrics = get_metrics().await;
        let start = Instant::now();
        debug!("{} {}", method, url);

        let response = request.send().await.map_err(Error::transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(Error::transport)?.to_vec();

        metrics
            .scim_request_duration
            .with_label_values(&[method.as_str()])
            .observe(start.elapsed().as_secs_f64());
        metrics
            .scim_requests_total
            .with_label_values(&[method.as_str(), status.as_str()])
            .inc();
        debug!("{} {} -> {}", method, url, status);

        Ok(ResponseBody { status, body })
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| Error::RequestConstruction(format!("failed to encode request body: {e}")))
}

/// Status and fully read body of one SCIM exchange.
struct ResponseBody {
    status: StatusCode,
    body: Vec<u8>,
}

impl ResponseBody {
    fn expect(self, expected: StatusCode) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> Error {
        Error::unexpected_status(self.status.as_u16(), &self.body)
    }

    fn decode<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::decode)
    }
}
