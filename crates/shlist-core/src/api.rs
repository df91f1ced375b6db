//! Remote list service
//!
//! [`ListService`] is the seam between the views and the network. The
//! production implementation, [`HttpListService`], talks JSON to the
//! service's REST endpoints under `/api/v1/shlists`:
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | create | POST | `/create` |
//! | fetch active | GET | `/active-list/{clientId}?page=&size=5` |
//! | fetch history | GET | `/history-list/{clientId}?page=&size=5` |
//! | complete | PATCH | `/{id}/completed` |
//! | update | PUT | `/{id}/update` |
//! | delete | DELETE | `/{id}/delete` |
//!
//! Requests are sent once. Failures are mapped to [`ShlistError`] and never
//! retried here.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ShlistError;
use crate::models::{Ack, Category, CompletionRequest, ListItem, ListRequest, Page, ServerId};

/// Path prefix of every endpoint
pub const API_BASE_PATH: &str = "/api/v1/shlists";

/// Lists per page
pub const PAGE_SIZE: u32 = 5;

/// Operations offered by the remote list service
#[async_trait]
pub trait ListService: Send + Sync {
    /// Fetch one page of a category for a client
    async fn fetch_page(
        &self,
        category: Category,
        client_id: &str,
        page: u32,
    ) -> Result<Page<ListItem>, ShlistError>;

    /// Store a new list
    async fn create(&self, request: &ListRequest) -> Result<Ack, ShlistError>;

    /// Mark a list completed (`enabled = false`)
    async fn complete(&self, id: ServerId) -> Result<Ack, ShlistError>;

    /// Replace a list's name and items
    async fn update(&self, id: ServerId, request: &ListRequest) -> Result<Ack, ShlistError>;

    /// Delete a list
    async fn delete(&self, id: ServerId) -> Result<Ack, ShlistError>;
}

/// HTTP client for the list service
pub struct HttpListService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpListService {
    /// Create a client for the deployment at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ShlistError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shlist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self, ShlistError> {
        Self::new(&config.api_url, config.request_timeout())
    }

    /// Deployment base URL (without the API path)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_BASE_PATH, path)
    }

    /// Send a request and decode a JSON body
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ShlistError> {
        let bytes = self.send(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| ShlistError::NetworkFailed {
            message: format!("Invalid response from list service: {}", e),
        })
    }

    /// Send a mutation; an empty success body is accepted
    async fn send_ack(&self, request: RequestBuilder) -> Result<Ack, ShlistError> {
        let bytes = self.send(request).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Ack::default());
        }
        serde_json::from_slice(&bytes).map_err(|e| ShlistError::NetworkFailed {
            message: format!("Invalid response from list service: {}", e),
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ShlistError> {
        let response = request.send().await.map_err(|e| {
            warn!("List service request failed: {}", e);
            ShlistError::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?.to_vec();

        if status.is_success() {
            Ok(bytes)
        } else {
            let error = error_from_response(status, &bytes);
            warn!("List service returned {}: {}", status, error);
            Err(error)
        }
    }
}

#[async_trait]
impl ListService for HttpListService {
    async fn fetch_page(
        &self,
        category: Category,
        client_id: &str,
        page: u32,
    ) -> Result<Page<ListItem>, ShlistError> {
        let url = self.url(&format!("/{}/{}", category.path_segment(), client_id));
        debug!("GET {} page={} size={}", url, page, PAGE_SIZE);

        let request = self
            .client
            .get(&url)
            .query(&[("page", page), ("size", PAGE_SIZE)]);
        self.send_json(request).await
    }

    async fn create(&self, request: &ListRequest) -> Result<Ack, ShlistError> {
        let url = self.url("/create");
        debug!("POST {} name={}", url, request.name);
        self.send_ack(self.client.post(&url).json(request)).await
    }

    async fn complete(&self, id: ServerId) -> Result<Ack, ShlistError> {
        let url = self.url(&format!("/{}/completed", id));
        debug!("PATCH {}", url);
        self.send_ack(
            self.client
                .patch(&url)
                .json(&CompletionRequest { enabled: false }),
        )
        .await
    }

    async fn update(&self, id: ServerId, request: &ListRequest) -> Result<Ack, ShlistError> {
        let url = self.url(&format!("/{}/update", id));
        debug!("PUT {}", url);
        self.send_ack(self.client.put(&url).json(request)).await
    }

    async fn delete(&self, id: ServerId) -> Result<Ack, ShlistError> {
        let url = self.url(&format!("/{}/delete", id));
        debug!("DELETE {}", url);
        self.send_ack(self.client.delete(&url)).await
    }
}

/// Error body produced by the service
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    /// Spring's default error attribute when no handler matched
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    validation_errors: Option<BTreeMap<String, String>>,
}

/// Map a non-2xx response to an error
fn error_from_response(status: StatusCode, body: &[u8]) -> ShlistError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let Some(body) = parsed else {
        if status == StatusCode::NOT_FOUND {
            return ShlistError::NotFound {
                message: status.to_string(),
            };
        }
        return ShlistError::NetworkFailed {
            message: format!("HTTP {}", status),
        };
    };

    let message = body
        .message
        .filter(|m| !m.is_empty())
        .or(body.error.filter(|m| !m.is_empty()));

    if let Some(fields) = body.validation_errors.filter(|f| !f.is_empty()) {
        return ShlistError::ValidationFailed {
            message: message.unwrap_or_else(|| "Validation error".to_string()),
            fields,
        };
    }

    if status == StatusCode::NOT_FOUND {
        return ShlistError::NotFound {
            message: message.unwrap_or_else(|| status.to_string()),
        };
    }

    match message {
        Some(message) => ShlistError::Rejected {
            status: status.as_u16(),
            message,
        },
        None => ShlistError::NetworkFailed {
            message: format!("HTTP {}", status),
        },
    }
}
