//! Request builder, response parser and endpoint dispatch for the launch API.
//!
//! # Design
//! `LaunchClient` holds its configuration and a `Transport`, and carries no
//! mutable state between calls. Each read is split into `build_request`
//! (validated parameters in, `HttpRequest` out) and `parse_page`
//! (`HttpResponse` in, `Page` out); the transport executes the round-trip in
//! between. Validation always runs before the transport is touched.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{AuthMode, ClientConfig};
use crate::error::{ApiError, Error};
use crate::http::{HttpRequest, HttpResponse};
use crate::params::{validate, RawValue, WireParams};
use crate::resource::Resource;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::Page;
use crate::watcher::{Fetch, Watcher};

/// Client for the launch API.
#[derive(Debug, Clone)]
pub struct LaunchClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl LaunchClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self { config, transport })
    }

    /// Build a client from `LAUNCH_API_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T> LaunchClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_request(&self, resource: Resource, params: &WireParams) -> HttpRequest {
        let mut query = params.clone().into_pairs();
        let mut headers = Vec::new();
        match self.config.auth {
            AuthMode::Header => headers.push((
                "authorization".to_string(),
                format!("Bearer {}", self.config.api_key.as_str()),
            )),
            AuthMode::QueryKey => query.push(("key".to_string(), self.config.api_key.as_str().to_string())),
        }
        HttpRequest {
            url: format!("{}{}", self.config.base_url, resource.path()),
            query,
            headers,
        }
    }

    pub fn parse_page(&self, response: HttpResponse) -> Result<Page, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

impl<T: Transport> LaunchClient<T> {
    /// Send already-validated parameters to `resource`.
    pub async fn fetch(&self, resource: Resource, params: &WireParams) -> Result<Page, ApiError> {
        let request = self.build_request(resource, params);
        debug!(resource = %resource, "fetching page");
        let response = self.transport.execute(request).await?;
        self.parse_page(response)
    }

    /// Validate `options` for `resource`, then fetch.
    pub async fn get(&self, resource: Resource, options: impl Into<RawValue>) -> Result<Page, Error> {
        let validated = validate(resource, &options.into())?;
        Ok(self.fetch(resource, &validated.params).await?)
    }

    pub async fn companies(&self, options: impl Into<RawValue>) -> Result<Page, Error> {
        self.get(Resource::Companies, options).await
    }

    pub async fn launches(&self, options: impl Into<RawValue>) -> Result<Page, Error> {
        self.get(Resource::Launches, options).await
    }

    pub async fn locations(&self, options: impl Into<RawValue>) -> Result<Page, Error> {
        self.get(Resource::Locations, options).await
    }

    pub async fn missions(&self, options: impl Into<RawValue>) -> Result<Page, Error> {
        self.get(Resource::Missions, options).await
    }

    pub async fn pads(&self, options: impl Into<RawValue>) -> Result<Page, Error> {
        self.get(Resource::Pads, options).await
    }

    pub async fn tags(&self, options: impl Into<RawValue>) -> Result<Page, Error> {
        self.get(Resource::Tags, options).await
    }

    pub async fn vehicles(&self, options: impl Into<RawValue>) -> Result<Page, Error> {
        self.get(Resource::Vehicles, options).await
    }
}

impl<T: Transport + 'static> LaunchClient<T> {
    /// Create a watcher over the launches collection.
    ///
    /// `interval` is in minutes; `options` are validated against the
    /// launches schema before anything is sent.
    pub fn watch(
        self: &Arc<Self>,
        interval: impl Into<RawValue>,
        options: impl Into<RawValue>,
    ) -> Result<Watcher<LaunchFeed<T>>, Error> {
        let feed = LaunchFeed { client: Arc::clone(self) };
        Watcher::new(feed, &interval.into(), &options.into())
    }
}

/// `Fetch` bound to the launches endpoint of a client.
pub struct LaunchFeed<T> {
    client: Arc<LaunchClient<T>>,
}

#[async_trait]
impl<T: Transport + 'static> Fetch for LaunchFeed<T> {
    async fn fetch(&self, params: &WireParams) -> Result<Page, ApiError> {
        self.client.fetch(Resource::Launches, params).await
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
