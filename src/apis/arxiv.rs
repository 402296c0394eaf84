use super::{PaperEntry, PaperSource, SourceError};
use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::config::Config;

/// Scrapes the arXiv `/list/<subject>/recent` pages and `/abs/<id>` pages.
pub struct ArxivClient {
    client: reqwest::Client,
    origin: String,
    page_size: u32,
    retries: u32,
}

impl ArxivClient {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(config.timeout)
                .build()?,
            origin: config.origin.clone(),
            page_size: config.page_size,
            retries: config.retries,
        })
    }

    fn listing_url(&self, subject: &str) -> String {
        format!(
            "{}/list/{}/recent?skip=0&show={}",
            self.origin, subject, self.page_size
        )
    }

    /// GET `url` and return the body. Transport errors and 5xx responses are
    /// retried up to `retries` times, immediately.
    async fn get_html(&self, url: &str) -> Result<String, SourceError> {
        let mut attempt = 0;
        loop {
            tracing::debug!("GET {} (attempt {})", url, attempt + 1);
            let outcome = self.client.get(url).send().await;
            if attempt < self.retries {
                let failure = match &outcome {
                    Ok(resp) if resp.status().is_server_error() => {
                        Some(resp.status().to_string())
                    }
                    Ok(_) => None,
                    Err(e) => Some(e.to_string()),
                };
                if let Some(reason) = failure {
                    attempt += 1;
                    tracing::warn!("Retrying {} after failure: {}", url, reason);
                    continue;
                }
            }

            let resp = outcome?;
            let status = resp.status();
            if !status.is_success() {
                return Err(SourceError::RemoteFetch {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            return Ok(resp.text().await?);
        }
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn scan_listing(
        &self,
        subject: &str,
        date: NaiveDate,
    ) -> Result<Vec<PaperEntry>, SourceError> {
        let html = self.get_html(&self.listing_url(subject)).await?;

        let mut entries = Vec::new();
        for entry in parse_listing(&html, subject, date, &self.origin)? {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Skipping entry listed on {}: {}", date, e),
            }
        }
        tracing::info!("{}: {} entries listed on {}", subject, entries.len(), date);
        Ok(entries)
    }

    async fn fetch_abstract(&self, detail_url: &str) -> Result<String, SourceError> {
        let html = self.get_html(detail_url).await?;
        parse_abstract(&html, detail_url)
    }
}

/// Date as printed in listing section headers, e.g. `Mon, 1 Jan 2024`.
pub fn listing_date(date: NaiveDate) -> String {
    date.format("%a, %-d %b %Y").to_string()
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("{:?}", e)))
}

/// Extract the entries of the section headed by `date`.
///
/// The outer error is for the page as a whole (no such section). Each inner
/// result is one `<dt>` identity node; a malformed one does not stop the walk.
pub fn parse_listing(
    html: &str,
    subject: &str,
    date: NaiveDate,
    origin: &str,
) -> Result<Vec<Result<PaperEntry, SourceError>>, SourceError> {
    let document = Html::parse_document(html);
    let marker_sel = selector("h3")?;
    let anchor_sel = selector(r#"a[href][title="Abstract"]"#)?;
    let title_sel = selector("div.list-title")?;

    let wanted = listing_date(date);
    let marker = document
        .select(&marker_sel)
        .find(|h3| h3.text().collect::<String>().contains(&wanted))
        .ok_or_else(|| SourceError::DateNotFound {
            subject: subject.to_string(),
            date,
        })?;

    let siblings: Vec<ElementRef> = marker
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .collect();

    let mut entries = Vec::new();
    for (cursor, node) in siblings.iter().enumerate() {
        match node.value().name() {
            "h3" => break,
            "dt" => {
                let position = entries.len() + 1;
                let malformed = |reason: &str| SourceError::MalformedEntry {
                    subject: subject.to_string(),
                    reason: format!("entry {}: {}", position, reason),
                };

                let Some(href) = node
                    .select(&anchor_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                else {
                    entries.push(Err(malformed("no abstract link")));
                    continue;
                };
                let detail_url = format!("{}{}", origin, href);

                let title = siblings
                    .get(cursor + 1)
                    .filter(|next| next.value().name() == "dd")
                    .and_then(|dd| dd.select(&title_sel).next())
                    .map(|div| {
                        div.text()
                            .collect::<String>()
                            .replacen("Title:", "", 1)
                            .trim()
                            .to_string()
                    });
                match title {
                    Some(title) => entries.push(Ok(PaperEntry { title, detail_url })),
                    None => {
                        entries.push(Err(malformed(&format!("no title for {}", detail_url))))
                    }
                }
            }
            _ => {}
        }
    }
    Ok(entries)
}

/// Abstract text of a detail page, with the leading `Abstract:` label removed.
pub fn parse_abstract(html: &str, url: &str) -> Result<String, SourceError> {
    let document = Html::parse_document(html);
    let block_sel = selector("blockquote.abstract")?;
    let block = document
        .select(&block_sel)
        .next()
        .ok_or_else(|| SourceError::AbstractNotFound {
            url: url.to_string(),
        })?;

    let text = block
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<String>();
    Ok(text.replacen("Abstract:", "", 1).trim().to_string())
}
