pub mod caption;
pub mod config;
pub mod graph;
pub mod outbox;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::Result;
use crate::fetcher::HttpClient;

pub use caption::build_caption;
pub use config::{PublisherConfig, PublisherKind};
pub use graph::GraphPublisher;
pub use outbox::OutboxPublisher;

/// Destination for finished carousels.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &str;

    /// Publish slides in order with a caption. Returns the post id.
    async fn publish(&self, paths: &[PathBuf], caption: &str) -> Result<String>;

    /// Share a single image as a story, optionally pointing at `link`.
    async fn share_to_story(&self, path: &Path, link: Option<&str>) -> Result<String>;

    /// Public link for a post id, when one can be determined.
    async fn permalink(&self, post_id: &str) -> Option<String>;
}

/// Build the configured publisher. `default_outbox` is used when the
/// config leaves `outbox_dir` unset.
pub fn build_publisher(
    config: &PublisherConfig,
    http: HttpClient,
    default_outbox: &Path,
) -> Result<Arc<dyn Publisher>> {
    match config.kind {
        PublisherKind::Outbox => {
            let root = config
                .outbox_dir
                .clone()
                .unwrap_or_else(|| default_outbox.to_path_buf());
            Ok(Arc::new(OutboxPublisher::new(root)))
        }
        PublisherKind::InstagramGraph => Ok(Arc::new(GraphPublisher::from_config(config, http)?)),
    }
}
