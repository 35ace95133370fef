pub mod alquran_cloud;
pub mod config;
pub mod http;
pub mod multi;
pub mod quran_com;
pub mod quranapi_ir;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{VerseRecord, VerseReference};

pub use config::{FetchConfig, ProviderKind, ProviderToggle, RetryPolicy};
pub use http::HttpClient;
pub use multi::MultiSourceFetcher;

/// What a provider call produced when the transport itself succeeded.
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    /// A normalized record. Still checked for completeness by the caller.
    Record(VerseRecord),
    /// The response arrived but lacked required fields
    Incomplete(String),
}

/// A remote source of verse text.
///
/// Transport failures (timeouts, non-2xx status, undecodable bodies) are
/// returned as `Err`; the fallback loop treats them the same as
/// [`ProviderOutcome::Incomplete`].
#[async_trait]
pub trait VerseProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, reference: VerseReference) -> Result<ProviderOutcome>;
}

/// Pick `Record` when both texts are present, `Incomplete` otherwise.
pub(crate) fn outcome_from(record: VerseRecord) -> ProviderOutcome {
    if record.arabic.trim().is_empty() {
        ProviderOutcome::Incomplete("missing original-script text".into())
    } else if record.translation.trim().is_empty() {
        ProviderOutcome::Incomplete("missing translation".into())
    } else {
        ProviderOutcome::Record(record)
    }
}
