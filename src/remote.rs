use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::{config::NetworkConfig, error::StoreError, traits::TrainingStore, training::Training};

/// Body returned by the store after creating a document.
#[derive(Debug, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Training store backed by a remote JSON document store.
///
/// - `GET    {base}/trainings?courtId={id}` lists a court's trainings
/// - `POST   {base}/trainings` creates one and returns `{"id": ...}`
/// - `PUT    {base}/trainings/{id}` replaces one
/// - `DELETE {base}/trainings/{id}` removes one
#[derive(Clone, Debug)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: Url,
}

impl RemoteStore {
    /// Create a new store client with configurable timeouts.
    pub fn new(base_url: impl Into<String>, network_config: &NetworkConfig) -> Result<Self, StoreError> {
        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Base url with `segments` appended, each percent-encoded.
    fn url_with(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: non-base urls are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn collection_url(&self) -> Url {
        self.url_with(&["trainings"])
    }

    fn document_url(&self, id: &str) -> Url {
        self.url_with(&["trainings", id])
    }
}

fn check_status(status: StatusCode, id: &str) -> Result<(), StoreError> {
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound {
            kind: "training",
            id: id.to_string(),
        });
    }
    if !status.is_success() {
        return Err(StoreError::Status(status.as_u16()));
    }
    Ok(())
}

impl TrainingStore for RemoteStore {
    async fn trainings_for_court(&self, court_id: &str) -> Result<Vec<Training>, StoreError> {
        let response = self
            .client
            .get(self.collection_url())
            .query(&[("courtId", court_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let trainings = response.json::<Vec<Training>>().await?;
        Ok(trainings)
    }

    async fn save_training(&self, training: &Training) -> Result<String, StoreError> {
        if training.id.is_empty() {
            let response = self
                .client
                .post(self.collection_url())
                .json(training)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(StoreError::Status(status.as_u16()));
            }
            let created = response.json::<CreatedResponse>().await?;
            return Ok(created.id);
        }

        let response = self
            .client
            .put(self.document_url(&training.id))
            .json(training)
            .send()
            .await?;

        check_status(response.status(), &training.id)?;
        Ok(training.id.clone())
    }

    async fn delete_training(&self, id: &str) -> Result<(), StoreError> {
        let response = self.client.delete(self.document_url(id)).send().await?;
        check_status(response.status(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NetworkConfig {
        NetworkConfig {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }

    #[test]
    fn test_remote_store_creation() {
        let result = RemoteStore::new("https://example.com/api", &config());
        assert!(result.is_ok());
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let store = RemoteStore::new("https://example.com/v1/", &config()).unwrap();
        assert_eq!(
            store.collection_url().as_str(),
            "https://example.com/v1/trainings"
        );
        assert_eq!(
            store.document_url("t1").as_str(),
            "https://example.com/v1/trainings/t1"
        );
    }

    #[test]
    fn test_document_url_encodes_id() {
        let store = RemoteStore::new("https://example.com/v1", &config()).unwrap();
        assert_eq!(
            store.document_url("a/b?c").as_str(),
            "https://example.com/v1/trainings/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RemoteStore::new("not a url", &config()),
            Err(StoreError::InvalidUrl(_))
        ));
        assert!(matches!(
            RemoteStore::new("mailto:someone@example.com", &config()),
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK, "t1").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, "t1").is_ok());
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "t1"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, "t1"),
            Err(StoreError::Status(403))
        ));
    }
}
