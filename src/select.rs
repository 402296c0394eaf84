use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Keyword sets a paper's abstract is tested against.
#[derive(Debug, Clone, Default)]
pub struct SelectionCriteria {
    /// Every one of these must match.
    pub required: Vec<String>,
    /// At least one of these must match, when non-empty.
    pub any: Vec<String>,
    /// Match keywords as plain text instead of regular expressions.
    pub literal: bool,
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid keyword pattern {keyword:?}: {source}")]
    InvalidKeyword {
        keyword: String,
        #[source]
        source: regex::Error,
    },
}

/// Compiled form of [`SelectionCriteria`]. All searches are case-insensitive.
#[derive(Debug)]
pub struct KeywordFilter {
    required: Vec<Regex>,
    any: Vec<Regex>,
}

impl KeywordFilter {
    pub fn new(criteria: &SelectionCriteria) -> Result<Self, FilterError> {
        let compile = |keywords: &[String]| -> Result<Vec<Regex>, FilterError> {
            keywords
                .iter()
                .map(|keyword| {
                    let pattern = if criteria.literal {
                        regex::escape(keyword)
                    } else {
                        keyword.clone()
                    };
                    RegexBuilder::new(&pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|source| FilterError::InvalidKeyword {
                            keyword: keyword.clone(),
                            source,
                        })
                })
                .collect()
        };

        Ok(Self {
            required: compile(&criteria.required)?,
            any: compile(&criteria.any)?,
        })
    }

    /// True when no keywords were given.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.any.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        matches(text, &self.required, &self.any)
    }
}

/// Every `required` pattern occurs in `text`, and at least one `any` pattern
/// does unless `any` is empty.
pub fn matches(text: &str, required: &[Regex], any: &[Regex]) -> bool {
    required.iter().all(|re| re.is_match(text))
        && (any.is_empty() || any.iter().any(|re| re.is_match(text)))
}
