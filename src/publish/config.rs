use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when `access_token` is not in the file.
pub const ACCESS_TOKEN_ENV: &str = "NECTAR_ACCESS_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherKind {
    Outbox,
    InstagramGraph,
}

/// Configuration for where finished carousels go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub kind: PublisherKind,

    /// Outbox location (default: `<data dir>/outbox`)
    pub outbox_dir: Option<PathBuf>,

    pub graph_api_base: String,
    pub account_id: Option<String>,
    pub access_token: Option<String>,

    /// Public URL prefix under which the output directory is served
    pub media_base_url: Option<String>,

    pub share_to_story: bool,
    pub permalink_base: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            kind: PublisherKind::Outbox,
            outbox_dir: None,
            graph_api_base: "https://graph.facebook.com/v19.0".to_string(),
            account_id: None,
            access_token: None,
            media_base_url: None,
            share_to_story: true,
            permalink_base: "https://www.instagram.com/p/".to_string(),
        }
    }
}

impl PublisherConfig {
    /// Token from the file, else from the environment.
    pub fn resolved_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// Link shown for a published post id.
    pub fn permalink(&self, post_id: &str) -> String {
        format!("{}/{}", self.permalink_base.trim_end_matches('/'), post_id)
    }

    /// Credentials are checked when the Graph publisher is built, so a
    /// config without them still loads for `generate` and `fetch`.
    pub fn validate(&self) -> Result<(), String> {
        if self.kind == PublisherKind::InstagramGraph {
            url::Url::parse(&self.graph_api_base)
                .map_err(|e| format!("publisher.graph_api_base is not a valid URL: {}", e))?;
            if let Some(base) = &self.media_base_url {
                url::Url::parse(base)
                    .map_err(|e| format!("publisher.media_base_url is not a valid URL: {}", e))?;
            }
        }
        Ok(())
    }
}
