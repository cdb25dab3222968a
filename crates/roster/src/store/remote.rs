//! Remote HTTP backend.
//!
//! Talks to a record server with four JSON endpoints:
//!
//! | Operation | Method | Path            |
//! |-----------|--------|-----------------|
//! | list      | GET    | `/getData`      |
//! | create    | POST   | `/create`       |
//! | update    | PUT    | `/{id}/update`  |
//! | delete    | DELETE | `/{id}/delete`  |
//!
//! The server issues identifiers (`_id`). Every non-success status or
//! transport failure is returned to the caller; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Backend, UpdateOutcome};
use crate::config::{BackendKind, Config, DEFAULT_BASE_URL};
use crate::error::{Error, Result};
use crate::record::{NewRecord, Record, RecordId};

/// Settings for [`RemoteBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOptions {
    /// Server base URL.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Ask the store to reload the whole list after an update.
    pub refetch_after_update: bool,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            refetch_after_update: true,
        }
    }
}

impl From<&Config> for RemoteOptions {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.remote.base_url.clone(),
            timeout: config.remote_timeout(),
            refetch_after_update: config.remote.refetch_after_update,
        }
    }
}

/// Record backend served by a remote HTTP endpoint.
#[derive(Debug)]
pub struct RemoteBackend {
    client: Client,
    base: Url,
    refetch_after_update: bool,
}

impl RemoteBackend {
    /// Create a backend for the given server.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed or used as a base,
    /// or the HTTP client cannot be built.
    pub fn new(options: RemoteOptions) -> Result<Self> {
        let base = Url::parse(&options.base_url).map_err(|e| Error::InvalidUrl {
            url: options.base_url.clone(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: options.base_url,
                message: "url cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http("client", e))?;

        Ok(Self {
            client,
            base,
            refetch_after_update: options.refetch_after_update,
        })
    }

    /// The server base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL under the base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl {
                url: self.base.to_string(),
                message: "url cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "Sending request");
        self.client.request(method, url)
    }

    /// Send a request and require a success status.
    async fn send(operation: &'static str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(operation, error = %e, "Request failed");
            Error::http(operation, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "Server returned error status");
            return Err(Error::RemoteStatus {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Read and decode a JSON response body.
    async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> Result<T> {
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::http(operation, e))?;
        serde_json::from_slice(&body).map_err(|e| Error::remote_decode(operation, e.to_string()))
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let url = self.endpoint(&["getData"])?;
        let response = Self::send("list", self.request(Method::GET, url)).await?;
        Self::decode("list", response).await
    }

    async fn create(&self, data: &NewRecord) -> Result<Record> {
        let url = self.endpoint(&["create"])?;
        let response = Self::send("create", self.request(Method::POST, url).json(data)).await?;
        Self::decode("create", response).await
    }

    async fn update(&self, id: &RecordId, data: &NewRecord) -> Result<UpdateOutcome> {
        let url = self.endpoint(&[id.as_str(), "update"])?;
        Self::send("update", self.request(Method::PUT, url).json(data)).await?;
        Ok(if self.refetch_after_update {
            UpdateOutcome::Refetch
        } else {
            UpdateOutcome::Applied
        })
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let url = self.endpoint(&[id.as_str(), "delete"])?;
        Self::send("delete", self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
