use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::app::Result;

/// Thin JSON-over-HTTP client shared by the providers.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET `url` and decode the body as JSON. Non-2xx statuses are errors.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Join `path` onto a base URL, keeping any path prefix the base carries.
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_keeps_prefix() {
        let url = join_url("https://api.alquran.cloud/v1", "ayah/2:255/en.sahih").unwrap();
        assert_eq!(url.as_str(), "https://api.alquran.cloud/v1/ayah/2:255/en.sahih");
    }

    #[test]
    fn test_join_url_trailing_slash() {
        let url = join_url("https://quranapi.pages.dev/api/", "/tafsir/2_255.json").unwrap();
        assert_eq!(url.as_str(), "https://quranapi.pages.dev/api/tafsir/2_255.json");
    }

    #[test]
    fn test_join_url_rejects_garbage_base() {
        assert!(join_url("not a url", "x").is_err());
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpClient::new(Duration::from_secs(5), "nectar-test").is_ok());
    }
}
