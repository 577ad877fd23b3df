//! REST implementation of the panel contracts
//!
//! `ureq` is blocking, so every call runs on tokio's blocking pool.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use ureq::Agent;
use url::Url;
use uuid::Uuid;

use super::page::{ListRecord, Page};
use super::{BulkActionBackend, ClientError, PageFetcher};
use crate::bulk::{BulkActionEnvelope, BulkActionResponse};
use crate::config::ApiConfig;
use crate::errors::PanelError;
use crate::filter::FilterState;
use crate::selection::RecordId;

/// Header carrying the bulk request's idempotency key
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Shared HTTP settings for every resource
#[derive(Clone)]
pub struct RestClient {
    agent: Agent,
    base_url: Url,
    token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, PanelError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| PanelError::config(format!("Invalid api.base_url '{}': {}", base_url, e)))?;

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, PanelError> {
        Self::new(
            &config.base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }

    /// Endpoint URL for a resource path relative to the base
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Internal(format!("Invalid path '{}': {}", path, e)))
    }

    /// Handle for one list resource (e.g. "links")
    pub fn resource<R>(self: &Arc<Self>, path: impl Into<String>) -> RestResource<R> {
        RestResource {
            client: Arc::clone(self),
            path: path.into(),
            _record: PhantomData,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        trace!("GET {}", url);
        let mut request = self.agent.get(url.as_str());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request.call()?;
        read_json(response)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        request_id: Uuid,
    ) -> Result<T, ClientError> {
        trace!("POST {} ({})", url, request_id);
        let mut request = self
            .agent
            .post(url.as_str())
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request.send_json(body)?;
        read_json(response)
    }
}

fn read_json<T: DeserializeOwned>(mut response: ureq::http::Response<ureq::Body>) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.body_mut().read_to_string().unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: message.trim().to_string(),
        });
    }
    response
        .body_mut()
        .read_json::<T>()
        .map_err(|e| ClientError::Decode(e.to_string()))
}

async fn blocking<T, F>(f: F) -> Result<T, ClientError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ClientError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ClientError::Internal(format!("spawn_blocking failed: {}", e)))?
}

/// One list resource on the backend; implements both contracts
pub struct RestResource<R> {
    client: Arc<RestClient>,
    path: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> RestResource<R> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn list_url(&self, filter: &FilterState) -> Result<Url, ClientError> {
        let mut url = self.client.endpoint(&self.path)?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in filter.to_query_pairs() {
                query.append_pair(&name, &value);
            }
        }
        Ok(url)
    }

    pub fn bulk_url(&self) -> Result<Url, ClientError> {
        self.client
            .endpoint(&format!("{}/bulk", self.path.trim_end_matches('/')))
    }
}

#[async_trait]
impl<R> PageFetcher<R> for RestResource<R>
where
    R: ListRecord + DeserializeOwned,
{
    async fn fetch_page(&self, filter: &FilterState) -> Result<Page<R>, ClientError> {
        let url = self.list_url(filter)?;
        let client = Arc::clone(&self.client);
        let page: Page<R> = blocking(move || client.get_json(url)).await?;
        debug!(
            "Fetched {} page {} - {} items of {}",
            self.path,
            page.page,
            page.items.len(),
            page.total_matching_count
        );
        Ok(page)
    }
}

#[async_trait]
impl<R, Id> BulkActionBackend<Id> for RestResource<R>
where
    R: Send + Sync,
    Id: RecordId + Serialize + DeserializeOwned,
{
    async fn submit_bulk(
        &self,
        envelope: &BulkActionEnvelope<Id>,
        request_id: Uuid,
    ) -> Result<BulkActionResponse<Id>, ClientError> {
        let url = self.bulk_url()?;
        let client = Arc::clone(&self.client);
        let body = envelope.clone();
        blocking(move || client.post_json(url, &body, request_id)).await
    }
}
