use std::collections::HashSet;

use chrono::NaiveDate;

use crate::apis::{Paper, PaperEntry, PaperSource, SourceError};
use crate::select::KeywordFilter;

/// A subject whose listing could not be scanned.
#[derive(Debug)]
pub struct SubjectFailure {
    pub subject: String,
    pub error: SourceError,
}

/// Outcome of a full run.
#[derive(Debug, Default)]
pub struct Selection {
    pub papers: Vec<Paper>,
    pub failed_subjects: Vec<SubjectFailure>,
    pub skipped_candidates: usize,
}

/// Listing entries merged across subjects, in first-seen order, keyed by title.
///
/// Two different papers that share a title collapse into one: the entry seen
/// first keeps its URL and the later one is dropped.
#[derive(Debug, Default)]
pub struct CandidateSet {
    entries: Vec<PaperEntry>,
    titles: HashSet<String>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if an entry with the same title is already present.
    pub fn insert(&mut self, entry: PaperEntry) -> bool {
        if !self.titles.insert(entry.title.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaperEntry> {
        self.entries.iter()
    }
}

/// Scan every subject in order and merge the results.
pub async fn collect_candidates(
    source: &dyn PaperSource,
    subjects: &[String],
    date: NaiveDate,
) -> (CandidateSet, Vec<SubjectFailure>) {
    let mut candidates = CandidateSet::new();
    let mut failures = Vec::new();

    for subject in subjects {
        match source.scan_listing(subject, date).await {
            Ok(entries) => {
                for entry in entries {
                    let title = entry.title.clone();
                    if !candidates.insert(entry) {
                        tracing::debug!("{}: dropping duplicate title {:?}", subject, title);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping subject {} on {}: {}", subject, date, e);
                failures.push(SubjectFailure {
                    subject: subject.clone(),
                    error: e,
                });
            }
        }
    }

    (candidates, failures)
}

/// Fetch each candidate's abstract and keep those the filter accepts.
///
/// Every accepted paper is handed to `on_select` before the next candidate is
/// fetched, so callers can print results as they arrive.
pub async fn run<F>(
    source: &dyn PaperSource,
    subjects: &[String],
    date: NaiveDate,
    filter: &KeywordFilter,
    mut on_select: F,
) -> Selection
where
    F: FnMut(&Paper),
{
    let (candidates, failed_subjects) = collect_candidates(source, subjects, date).await;
    tracing::info!(
        "{} candidates from {} subjects on {} via {}",
        candidates.len(),
        subjects.len() - failed_subjects.len(),
        date,
        source.name()
    );

    if candidates.is_empty() {
        tracing::info!("Nothing listed on {}", date);
    }

    let mut selection = Selection {
        failed_subjects,
        ..Selection::default()
    };

    for entry in candidates.iter() {
        let abstract_text = match source.fetch_abstract(&entry.detail_url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {:?} ({}): {}", entry.title, entry.detail_url, e);
                selection.skipped_candidates += 1;
                continue;
            }
        };

        if !filter.matches(&abstract_text) {
            continue;
        }

        let paper = Paper {
            title: entry.title.clone(),
            abstract_text,
            url: entry.detail_url.clone(),
        };
        on_select(&paper);
        selection.papers.push(paper);
    }
    selection
}
