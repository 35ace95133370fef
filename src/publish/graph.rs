//! Instagram Graph API publisher.
//!
//! A carousel is published in three steps: one item container per slide,
//! a `CAROUSEL` container holding them, then `media_publish`. Slides must
//! already be reachable under `media_base_url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use url::Url;

use crate::app::{NectarError, Result};
use crate::config::ConfigError;
use crate::fetcher::http::join_url;
use crate::fetcher::HttpClient;
use crate::publish::{Publisher, PublisherConfig};

/// Polls of a container's status before giving up on it.
const STATUS_POLLS: u32 = 10;
const STATUS_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermalinkResponse {
    permalink: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// The API's own message when the body carries one.
fn error_message(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("Graph API error {}: {}", status, envelope.error.message),
        Err(_) => format!("Graph API error {}", status),
    }
}

/// Public URL of a rendered file.
pub fn media_url(base: &str, path: &Path) -> Result<Url> {
    let name = path
        .file_name()
        .ok_or_else(|| NectarError::Publish(format!("not a file: {}", path.display())))?;
    join_url(base, &name.to_string_lossy())
}

pub struct GraphPublisher {
    http: HttpClient,
    api_base: String,
    account_id: String,
    token: String,
    media_base_url: String,
    poll_interval: Duration,
}

impl GraphPublisher {
    pub fn from_config(config: &PublisherConfig, http: HttpClient) -> std::result::Result<Self, ConfigError> {
        let missing = |field: &str| ConfigError::Invalid(format!("publisher.{} is required for instagram_graph", field));

        let account_id = config.account_id.clone().ok_or_else(|| missing("account_id"))?;
        let token = config.resolved_token().ok_or_else(|| missing("access_token"))?;
        let media_base_url = config
            .media_base_url
            .clone()
            .ok_or_else(|| missing("media_base_url"))?;

        Ok(Self {
            http,
            api_base: config.graph_api_base.clone(),
            account_id,
            token,
            media_base_url,
            poll_interval: STATUS_INTERVAL,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = join_url(&self.api_base, path)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("access_token", &self.token);
        }
        Ok(url)
    }

    async fn call<T: for<'de> Deserialize<'de>>(&self, method: Method, url: Url) -> Result<T> {
        tracing::debug!("{} {}{}", method, url.origin().ascii_serialization(), url.path());

        let response = self.http.inner().request(method, url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(NectarError::Publish(error_message(status.as_u16(), &body)));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn create_container(&self, params: &[(&str, &str)]) -> Result<String> {
        let url = self.endpoint(&format!("{}/media", self.account_id), params)?;
        let created: IdResponse = self.call(Method::POST, url).await?;
        Ok(created.id)
    }

    /// Wait until a container has finished processing.
    async fn wait_ready(&self, container: &str) -> Result<()> {
        for _ in 0..STATUS_POLLS {
            let url = self.endpoint(container, &[("fields", "status_code")])?;
            let status: StatusResponse = self.call(Method::GET, url).await?;

            match status.status_code.as_deref() {
                Some("FINISHED") | None => return Ok(()),
                Some("ERROR") | Some("EXPIRED") => {
                    return Err(NectarError::Publish(format!(
                        "container {} failed processing",
                        container
                    )))
                }
                Some(other) => tracing::debug!("Container {} is {}", container, other),
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(NectarError::Publish(format!(
            "container {} not ready after {} checks",
            container, STATUS_POLLS
        )))
    }

    async fn publish_container(&self, container: &str) -> Result<String> {
        self.wait_ready(container).await?;
        let url = self.endpoint(
            &format!("{}/media_publish", self.account_id),
            &[("creation_id", container)],
        )?;
        let published: IdResponse = self.call(Method::POST, url).await?;
        Ok(published.id)
    }
}

#[async_trait]
impl Publisher for GraphPublisher {
    fn name(&self) -> &str {
        "instagram_graph"
    }

    async fn publish(&self, paths: &[PathBuf], caption: &str) -> Result<String> {
        if paths.is_empty() {
            return Err(NectarError::Publish("nothing to publish".into()));
        }

        let mut children = Vec::with_capacity(paths.len());
        for path in paths {
            let image_url = media_url(&self.media_base_url, path)?;
            let id = self
                .create_container(&[("image_url", image_url.as_str()), ("is_carousel_item", "true")])
                .await?;
            tracing::debug!("Carousel item {} for {}", id, path.display());
            children.push(id);
        }

        for child in &children {
            self.wait_ready(child).await?;
        }

        let children = children.join(",");
        let carousel = self
            .create_container(&[
                ("media_type", "CAROUSEL"),
                ("children", &children),
                ("caption", caption),
            ])
            .await?;

        let media_id = self.publish_container(&carousel).await?;
        tracing::info!("Published carousel {} ({} slides)", media_id, paths.len());
        Ok(media_id)
    }

    async fn share_to_story(&self, path: &Path, link: Option<&str>) -> Result<String> {
        let image_url = media_url(&self.media_base_url, path)?;
        let container = self
            .create_container(&[("image_url", image_url.as_str()), ("media_type", "STORIES")])
            .await?;
        let story_id = self.publish_container(&container).await?;

        // Link stickers cannot be attached through this API.
        if let Some(link) = link {
            tracing::info!("Story {} shared; post link: {}", story_id, link);
        }
        Ok(story_id)
    }

    async fn permalink(&self, post_id: &str) -> Option<String> {
        let url = self.endpoint(post_id, &[("fields", "permalink")]).ok()?;
        match self.call::<PermalinkResponse>(Method::GET, url).await {
            Ok(response) => response.permalink,
            Err(e) => {
                tracing::warn!("Could not look up permalink for {}: {}", post_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::PublisherKind;

    fn http() -> HttpClient {
        HttpClient::new(Duration::from_secs(5), "nectar-test").unwrap()
    }

    fn graph_config() -> PublisherConfig {
        PublisherConfig {
            kind: PublisherKind::InstagramGraph,
            account_id: Some("1784".into()),
            access_token: Some("secret".into()),
            media_base_url: Some("https://cdn.example.org/nectar".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config = PublisherConfig {
            account_id: None,
            ..graph_config()
        };
        let err = GraphPublisher::from_config(&config, http()).err().unwrap();
        assert!(err.to_string().contains("account_id"));

        let config = PublisherConfig {
            media_base_url: None,
            ..graph_config()
        };
        assert!(GraphPublisher::from_config(&config, http()).is_err());
    }

    #[test]
    fn test_endpoint_carries_params_and_token() {
        let publisher = GraphPublisher::from_config(&graph_config(), http()).unwrap();
        let url = publisher
            .endpoint("1784/media", &[("caption", "Al-Fatiha 1:1 #Quran")])
            .unwrap();

        assert_eq!(url.path(), "/v19.0/1784/media");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("caption".to_string(), "Al-Fatiha 1:1 #Quran".to_string()),
                ("access_token".to_string(), "secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_media_url_uses_file_name() {
        let url = media_url(
            "https://cdn.example.org/nectar",
            Path::new("/var/lib/nectar/output/quran_post_x_slide1.png"),
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/nectar/quran_post_x_slide1.png");
    }

    #[test]
    fn test_error_message_from_body() {
        let body = br#"{"error":{"message":"Invalid OAuth access token.","code":190}}"#;
        assert_eq!(
            error_message(400, body),
            "Graph API error 400: Invalid OAuth access token."
        );
        assert_eq!(error_message(502, b"<html>"), "Graph API error 502");
    }
}
