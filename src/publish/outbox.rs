use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use crate::app::{NectarError, Result};
use crate::publish::Publisher;
use crate::store::write_atomic;

/// What gets written next to the copied slides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub kind: String,
    pub caption: Option<String>,
    pub link: Option<String>,
    pub files: Vec<String>,
    pub created_at: chrono::DateTime<Utc>,
}

/// Writes each post into its own directory instead of publishing it.
pub struct OutboxPublisher {
    root: PathBuf,
}

impl OutboxPublisher {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh directory named after the current time, suffixed when taken.
    fn claim_dir(&self, prefix: &str) -> Result<(String, PathBuf)> {
        fs::create_dir_all(&self.root)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");

        for n in 0..1000 {
            let id = match n {
                0 => format!("{}_{}", prefix, stamp),
                n => format!("{}_{}_{}", prefix, stamp, n),
            };
            let dir = self.root.join(&id);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok((id, dir)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(NectarError::Publish(format!(
            "no free outbox directory under {}",
            self.root.display()
        )))
    }

    fn copy_into(dir: &Path, paths: &[PathBuf]) -> Result<Vec<String>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .ok_or_else(|| NectarError::Publish(format!("not a file: {}", path.display())))?;
            fs::copy(path, dir.join(name))?;
            files.push(name.to_string_lossy().into_owned());
        }
        Ok(files)
    }

    fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<()> {
        write_atomic(&dir.join("post.json"), &serde_json::to_string_pretty(manifest)?)
    }
}

#[async_trait]
impl Publisher for OutboxPublisher {
    fn name(&self) -> &str {
        "outbox"
    }

    async fn publish(&self, paths: &[PathBuf], caption: &str) -> Result<String> {
        if paths.is_empty() {
            return Err(NectarError::Publish("nothing to publish".into()));
        }

        let (id, dir) = self.claim_dir("post")?;
        let files = Self::copy_into(&dir, paths)?;
        Self::write_manifest(
            &dir,
            &Manifest {
                kind: "carousel".into(),
                caption: Some(caption.to_string()),
                link: None,
                files,
                created_at: Utc::now(),
            },
        )?;

        tracing::info!("Wrote post {} with {} slides to {}", id, paths.len(), dir.display());
        Ok(id)
    }

    async fn share_to_story(&self, path: &Path, link: Option<&str>) -> Result<String> {
        let (id, dir) = self.claim_dir("story")?;
        let files = Self::copy_into(&dir, &[path.to_path_buf()])?;
        Self::write_manifest(
            &dir,
            &Manifest {
                kind: "story".into(),
                caption: None,
                link: link.map(str::to_string),
                files,
                created_at: Utc::now(),
            },
        )?;

        tracing::info!("Wrote story {} to {}", id, dir.display());
        Ok(id)
    }

    async fn permalink(&self, post_id: &str) -> Option<String> {
        Some(self.root.join(post_id).display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(dir: &Path, n: usize) -> Vec<PathBuf> {
        (1..=n)
            .map(|i| {
                let path = dir.join(format!("slide{}.png", i));
                fs::write(&path, format!("png {}", i)).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_publish_copies_slides_and_manifest() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let publisher = OutboxPublisher::new(out.path().join("outbox"));

        let id = publisher.publish(&slides(src.path(), 3), "caption text").await.unwrap();
        let dir = out.path().join("outbox").join(&id);

        assert!(id.starts_with("post_"));
        assert_eq!(fs::read_to_string(dir.join("slide2.png")).unwrap(), "png 2");

        let manifest: Manifest =
            serde_json::from_str(&fs::read_to_string(dir.join("post.json")).unwrap()).unwrap();
        assert_eq!(manifest.files, vec!["slide1.png", "slide2.png", "slide3.png"]);
        assert_eq!(manifest.caption.as_deref(), Some("caption text"));
    }

    #[tokio::test]
    async fn test_same_second_posts_get_distinct_ids() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let publisher = OutboxPublisher::new(out.path().to_path_buf());
        let paths = slides(src.path(), 1);

        let a = publisher.publish(&paths, "a").await.unwrap();
        let b = publisher.publish(&paths, "b").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_publish_fails() {
        let out = tempfile::tempdir().unwrap();
        let publisher = OutboxPublisher::new(out.path().to_path_buf());
        assert!(publisher.publish(&[], "caption").await.is_err());
    }

    #[tokio::test]
    async fn test_story_records_link() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let publisher = OutboxPublisher::new(out.path().to_path_buf());
        let paths = slides(src.path(), 1);

        let id = publisher
            .share_to_story(&paths[0], Some("https://example.org/p/1"))
            .await
            .unwrap();
        let manifest: Manifest = serde_json::from_str(
            &fs::read_to_string(out.path().join(&id).join("post.json")).unwrap(),
        )
        .unwrap();

        assert_eq!(manifest.kind, "story");
        assert_eq!(manifest.link.as_deref(), Some("https://example.org/p/1"));
    }

    #[tokio::test]
    async fn test_missing_slide_fails() {
        let out = tempfile::tempdir().unwrap();
        let publisher = OutboxPublisher::new(out.path().to_path_buf());
        let missing = vec![out.path().join("nope.png")];
        assert!(publisher.publish(&missing, "caption").await.is_err());
    }
}
