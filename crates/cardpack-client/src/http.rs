use std::future::Future;

use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

use crate::data::{CardKind, StaffMember, Student, StudentFilter};
use crate::error::{ClientError, Result};

/// Source of rendered ID-card payloads.
///
/// One call maps to one round-trip: no caching, no internal retry. Retry
/// policy belongs to the caller, and the batch runner applies none; a
/// failed item is skipped.
///
/// # Implementations
///
/// - [`PortalClient`]: production implementation over `reqwest`
/// - Mock implementations for batch tests
pub trait CardSource: Send + Sync {
    fn fetch_card(&self, kind: CardKind, id: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Authenticated client for the portal REST backend.
///
/// Every request carries the configured bearer token. Non-2xx responses map
/// to [`ClientError::Status`] so callers can treat them as per-item
/// failures.
pub struct PortalClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl PortalClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}/{path}", self.base);
        debug!(%url, "portal request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                path: path.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// Full staff roster.
    pub async fn list_staff(&self) -> Result<Vec<StaffMember>> {
        let response = self.get("staff").await?;
        response.json().await.map_err(|source| ClientError::Decode {
            path: "staff".to_string(),
            source,
        })
    }

    /// Students eligible for ID cards, optionally narrowed to a class and
    /// section on the server side.
    pub async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let path = filter.query_path();
        let response = self.get(&path).await?;
        response
            .json()
            .await
            .map_err(|source| ClientError::Decode { path, source })
    }
}

impl CardSource for PortalClient {
    async fn fetch_card(&self, kind: CardKind, id: &str) -> Result<Bytes> {
        let path = kind.card_path(id);
        let response = self.get(&path).await?;
        response
            .bytes()
            .await
            .map_err(|source| ClientError::Decode { path, source })
    }
}
