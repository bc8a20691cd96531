use std::time::Duration;

use async_trait::async_trait;
use mv_core::{OwnerKey, ProvenanceRecord};
use reqwest::{Client, Url};

use crate::error::AppError;

/// Durable keyed-append store used as the primary provenance tier
#[async_trait]
pub trait ProvenanceSink: Send + Sync {
    async fn append(&self, owner: &OwnerKey, record: &ProvenanceRecord) -> Result<(), AppError>;
}

/// Appends records to `{base_url}/provenance/{owner}` over HTTP, with the
/// owner key percent-encoded as one path segment
#[derive(Debug, Clone)]
pub struct HttpProvenanceSink {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpProvenanceSink {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, AppError> {
        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("invalid provenance store URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "provenance store URL {base_url} cannot carry a path"
            )));
        }

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// The owner key is pushed as a single percent-encoded path segment
    fn endpoint(&self, owner: &OwnerKey) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| AppError::Config(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push("provenance")
            .push(owner.as_str());
        Ok(url)
    }
}

#[async_trait]
impl ProvenanceSink for HttpProvenanceSink {
    async fn append(&self, owner: &OwnerKey, record: &ProvenanceRecord) -> Result<(), AppError> {
        let mut request = self.client.post(self.endpoint(owner)?).json(record);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BackendError(format!("HTTP {}: {}", status, body)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_scoped_by_owner() {
        let sink = HttpProvenanceSink::new("https://store.example/api/", None).unwrap();
        let owner = OwnerKey::parse("0xabc123");
        assert_eq!(
            sink.endpoint(&owner).unwrap().as_str(),
            "https://store.example/api/provenance/0xabc123"
        );

        let bare = HttpProvenanceSink::new("https://store.example/api", None).unwrap();
        assert_eq!(bare.endpoint(&owner).unwrap(), sink.endpoint(&owner).unwrap());
    }

    #[test]
    fn test_owner_cannot_escape_its_path() {
        let sink = HttpProvenanceSink::new("https://store.example/api/", None).unwrap();
        let url = sink.endpoint(&OwnerKey::parse("../../admin/wipe?x=")).unwrap();

        assert_eq!(url.host_str(), Some("store.example"));
        assert!(url.query().is_none());
        assert!(url.path().starts_with("/api/provenance/"));
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[..2], ["api", "provenance"]);
        assert!(!segments[2].contains('/'));
        assert!(!segments[2].contains('?'));
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(matches!(
            HttpProvenanceSink::new("not a url", None),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            HttpProvenanceSink::new("mailto:ops@store.example", None),
            Err(AppError::Config(_))
        ));
    }
}
