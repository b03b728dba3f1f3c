//! HTTP access to the backend
//!
//! [`PublicClient`] sends unauthenticated reads. [`SecureClient`] attaches the
//! signed-in user's bearer token and reacts to auth failures: a 401 signs the
//! user out and empties the query cache, a 403 navigates to the forbidden page.

use common::access::{FORBIDDEN_PATH, SIGN_IN_PATH};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::navigation::Navigator;

/// Acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutationAck {
    pub acknowledged: Option<bool>,
    pub inserted_id: Option<String>,
    pub modified_count: Option<u64>,
    pub deleted_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Base URL plus a shared connection pool
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    root: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let root = Url::parse(&config.api_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;
        if root.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.api_url.clone()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            root,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request path made of `segments`, each percent-encoded on its own
    ///
    /// Use this for paths carrying user data such as emails, so a `/`, `?` or
    /// `#` in the value stays inside its segment.
    pub fn path(&self, segments: &[&str]) -> String {
        let mut url = self.root.clone();
        // `root` is checked to be a base URL in `new`
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.clear().extend(segments);
        }
        url.path().to_string()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("{} {}", method, url);
        self.http.request(method, url)
    }
}

/// Map an unsuccessful status to an error, keeping the backend's message
async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .and_then(|body| body.message)
        .unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        status => ClientError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Decode a successful response; an empty body reads as `{}`
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let body = response.text().await?;
    let body = if body.trim().is_empty() { "{}" } else { &body };
    Ok(serde_json::from_str(body)?)
}

/// Unauthenticated reads
#[derive(Debug, Clone)]
pub struct PublicClient {
    api: ApiClient,
}

impl PublicClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let response = self.api.request(Method::GET, path).query(query).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        decode(response).await
    }
}

/// Requests on behalf of the signed-in user
#[derive(Clone)]
pub struct SecureClient {
    api: ApiClient,
    auth: AuthContext,
    navigator: Navigator,
    cache: QueryCache,
}

impl SecureClient {
    pub fn new(api: ApiClient, auth: AuthContext, navigator: Navigator, cache: QueryCache) -> Self {
        Self {
            api,
            auth,
            navigator,
            cache,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let request = self.authorized(Method::GET, path)?.query(query);
        self.execute(request).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<MutationAck> {
        let request = self.authorized(Method::POST, path)?.json(body);
        self.execute(request).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<MutationAck> {
        let request = self.authorized(Method::PUT, path)?.json(body);
        self.execute(request).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<MutationAck> {
        let request = self.authorized(Method::PATCH, path)?.json(body);
        self.execute(request).await
    }

    /// `PATCH` without a body
    pub async fn patch_empty(&self, path: &str) -> ClientResult<MutationAck> {
        let request = self.authorized(Method::PATCH, path)?;
        self.execute(request).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<MutationAck> {
        let request = self.authorized(Method::DELETE, path)?;
        self.execute(request).await
    }

    /// See [`ApiClient::path`]
    pub fn path(&self, segments: &[&str]) -> String {
        self.api.path(segments)
    }

    fn authorized(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.auth.access_token().ok_or(ClientError::NotSignedIn)?;
        Ok(self.api.request(method, path).bearer_auth(token))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        if response.status().is_success() {
            return decode(response).await;
        }

        let error = status_error(response).await;
        match &error {
            ClientError::Unauthorized => self.force_sign_out().await,
            ClientError::Forbidden => {
                warn!("Backend refused access, showing {}", FORBIDDEN_PATH);
                self.navigator.redirect(FORBIDDEN_PATH);
            }
            _ => {}
        }
        Err(error)
    }

    async fn force_sign_out(&self) {
        warn!("Backend rejected the access token, signing out");
        if let Err(e) = self.auth.sign_out().await {
            warn!("Sign-out after 401 did not reach the identity provider: {}", e);
        }
        self.cache.clear().await;
        self.navigator.redirect(SIGN_IN_PATH);
    }
}
