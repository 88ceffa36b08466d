//! Remote capture store reached over HTTP.
//!
//! Wire contract: `GET /captures` returns `{"captures": [...]}` (an
//! empty or missing store is an empty list, not an error); `POST
//! /captures` accepts either `{"capture": {...}}` (append) or
//! `{"captures": [...]}` (bulk replace); `DELETE /captures` accepts
//! `{"id": "..."}` and deleting an absent id succeeds.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use satchel_core::{Capture, Error, Result};

use crate::credential::CredentialProvider;

/// Object-safe seam for the remote store, so the repository and sync
/// scheduler can run against an in-memory double in tests.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Load all captures. An empty store is `Ok(vec![])`.
    async fn load(&self) -> Result<Vec<Capture>>;
    /// Replace the remote contents with the given snapshot.
    async fn save_all(&self, captures: &[Capture]) -> Result<()>;
    /// Append a single new capture.
    async fn append(&self, capture: &Capture) -> Result<()>;
    /// Delete by id. Idempotent — an absent id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// HTTP-backed remote store.
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    credential: Arc<dyn CredentialProvider>,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>, credential: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/captures", self.base_url)
    }

    fn token(&self) -> Result<String> {
        self.credential
            .credential()
            .ok_or_else(|| Error::Unauthorized("no credential for remote store".into()))
    }

    async fn post(&self, body: serde_json::Value) -> Result<()> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::RemoteStore(format!("request failed: {}", e)))?;

        if response.status().as_u16() == 401 {
            return Err(Error::Unauthorized("remote store rejected credential".into()));
        }
        if !response.status().is_success() {
            return Err(Error::RemoteStore(format!(
                "save failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn load(&self) -> Result<Vec<Capture>> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.endpoint())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::RemoteStore(format!("request failed: {}", e)))?;

        if response.status().as_u16() == 401 {
            return Err(Error::Unauthorized("remote store rejected credential".into()));
        }
        if response.status().as_u16() == 404 {
            // Store not created yet — same as empty.
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(Error::RemoteStore(format!(
                "load failed with status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::RemoteStore(format!("bad response body: {}", e)))?;

        let captures = body
            .get("captures")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::RemoteStore(format!("bad capture list: {}", e)))?
            .unwrap_or_default();

        Ok(captures)
    }

    async fn save_all(&self, captures: &[Capture]) -> Result<()> {
        debug!("Bulk-replacing remote store with {} captures", captures.len());
        self.post(json!({ "captures": captures })).await
    }

    async fn append(&self, capture: &Capture) -> Result<()> {
        debug!("Appending capture {} to remote store", capture.id);
        self.post(json!({ "capture": capture })).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let token = self.token()?;
        let response = self
            .client
            .delete(self.endpoint())
            .bearer_auth(token)
            .json(&json!({ "id": id }))
            .send()
            .await
            .map_err(|e| Error::RemoteStore(format!("request failed: {}", e)))?;

        if response.status().as_u16() == 401 {
            return Err(Error::Unauthorized("remote store rejected credential".into()));
        }
        // 404 means the id was already gone — delete is idempotent.
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(Error::RemoteStore(format!(
                "delete failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticCredential;

    #[tokio::test]
    async fn test_missing_credential_is_unauthorized() {
        let store = HttpRemoteStore::new(
            "http://localhost:9",
            Arc::new(StaticCredential::new(None)),
        );
        match store.load().await {
            Err(Error::Unauthorized(_)) => {}
            other => panic!("expected Unauthorized, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_remote_store_error() {
        // Port 9 (discard) with nothing listening — connection refused.
        let store = HttpRemoteStore::new(
            "http://127.0.0.1:9",
            Arc::new(StaticCredential::new(Some("tok".into()))),
        );
        match store.save_all(&[]).await {
            Err(Error::RemoteStore(_)) => {}
            other => panic!("expected RemoteStore error, got {:?}", other),
        }
    }
}
