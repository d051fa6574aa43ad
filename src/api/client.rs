//! HTTP client for the Resource Manager REST API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use super::error::ApiError;
use super::{pager, poller};

/// The public-cloud Resource Manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com/";

/// Maximum length of a response body written to the log.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body and strip control characters before logging it.
fn sanitize_for_log(body: &str) -> String {
    let total = body.chars().count();
    let mut out: String = body
        .chars()
        .take(MAX_LOG_BODY_LENGTH)
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    if total > MAX_LOG_BODY_LENGTH {
        out.push_str(&format!("... [truncated, {} chars total]", total));
    }
    out
}

/// Settings for [`ResourceManagerClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the Resource Manager endpoint.
    pub endpoint: String,
    /// Bearer token sent with every request.
    pub access_token: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Poll interval used when the service sends no `Retry-After`.
    pub default_poll_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: String::new(),
            user_agent: concat!("azurerm-provider/", env!("CARGO_PKG_VERSION")).to_string(),
            default_poll_interval: Duration::from_secs(10),
        }
    }
}

/// A response with its body read into memory.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Client shared by every service package.
#[derive(Debug, Clone)]
pub struct ResourceManagerClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Arc<str>,
    poll_interval: Duration,
}

impl ResourceManagerClient {
    /// Create a client from options.
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(options.user_agent)
            .build()
            .map_err(ApiError::Client)?;

        let mut endpoint = options.endpoint;
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }

        Ok(Self {
            http,
            endpoint: Url::parse(&endpoint)?,
            token: Arc::from(options.access_token),
            poll_interval: options.default_poll_interval,
        })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Build the URL for a resource path with its `api-version`.
    pub(crate) fn resource_url(&self, path: &str, api_version: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint.join(path.trim_start_matches('/'))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    /// Resolve a link returned by the service (absolute, or relative to the endpoint).
    pub(crate) fn link_url(&self, link: &str) -> Result<Url, ApiError> {
        Ok(self.endpoint.join(link)?)
    }

    /// Send a request and read the body, whatever the status.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError> {
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url).bearer_auth(&*self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Send a request, turning non-success statuses into [`ApiError::Status`].
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError> {
        let response = self.send(method.clone(), url, body).await?;

        if !response.status.is_success() {
            if response.status == StatusCode::NOT_FOUND {
                debug!("{} returned 404", method);
            } else {
                error!(
                    "API error: {} - {}",
                    response.status,
                    sanitize_for_log(&response.body)
                );
            }
            return Err(ApiError::from_response(response.status, &response.body));
        }

        Ok(response)
    }

    /// Retrieve a resource.
    #[instrument(skip(self), level = "debug")]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        api_version: &str,
    ) -> Result<T, ApiError> {
        let url = self.resource_url(path, api_version)?;
        let response = self.execute(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Create or replace a resource and wait for the operation to finish.
    #[instrument(skip(self, body), level = "debug")]
    pub async fn put_then_poll<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.write_then_poll(Method::PUT, path, api_version, body)
            .await
    }

    /// Partially update a resource and wait for the operation to finish.
    #[instrument(skip(self, body), level = "debug")]
    pub async fn patch_then_poll<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.write_then_poll(Method::PATCH, path, api_version, body)
            .await
    }

    /// Delete a resource and wait for the operation to finish.
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_then_poll(&self, path: &str, api_version: &str) -> Result<(), ApiError> {
        let url = self.resource_url(path, api_version)?;
        let response = self.execute(Method::DELETE, url.clone(), None).await?;
        poller::poll_until_done(self, &Method::DELETE, &url, &response).await
    }

    /// List every item under `path`, following `nextLink` across pages and
    /// keeping the items for which `predicate` returns true.
    #[instrument(skip(self, predicate), level = "debug")]
    pub async fn list_complete_matching_predicate<T, F>(
        &self,
        path: &str,
        api_version: &str,
        predicate: F,
    ) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned + Send,
        F: Fn(&T) -> bool + Send + Sync,
    {
        let url = self.resource_url(path, api_version)?;
        pager::collect_pages(self, url, predicate).await
    }

    async fn write_then_poll<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.resource_url(path, api_version)?;
        let payload = serde_json::to_value(body)?;
        let response = self
            .execute(method.clone(), url.clone(), Some(&payload))
            .await?;
        poller::poll_until_done(self, &method, &url, &response).await
    }
}
