pub mod arxiv;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// One entry of a listing page: the identity the pipeline deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperEntry {
    pub title: String,
    pub detail_url: String,
}

/// A paper whose abstract passed the keyword filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    RemoteFetch { url: String, status: u16 },
    #[error("no listing section for {date} in subject {subject}")]
    DateNotFound { subject: String, date: NaiveDate },
    #[error("no abstract block on {url}")]
    AbstractNotFound { url: String },
    #[error("malformed entry in subject {subject}: {reason}")]
    MalformedEntry { subject: String, reason: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A site that publishes per-subject daily listings and per-paper abstract pages.
#[async_trait]
pub trait PaperSource: Send + Sync {
    fn name(&self) -> &str;

    /// Entries listed under `date` for `subject`, in document order.
    async fn scan_listing(
        &self,
        subject: &str,
        date: NaiveDate,
    ) -> Result<Vec<PaperEntry>, SourceError>;

    /// Plain abstract text of the paper at `detail_url`.
    async fn fetch_abstract(&self, detail_url: &str) -> Result<String, SourceError>;
}
