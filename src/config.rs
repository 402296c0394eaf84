use std::str::FromStr;
use std::time::Duration;

use crate::apis::arxiv::ArxivClient;
use crate::apis::SourceError;

const DEFAULT_ORIGIN: &str = "https://arxiv.org";
const DEFAULT_PAGE_SIZE: u32 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scheme and host prepended to listing paths and abstract links.
    pub origin: String,
    /// `show=` parameter of the listing request.
    pub page_size: u32,
    pub timeout: Duration,
    pub retries: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: 0,
            user_agent: format!("paper-digest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let origin = lookup("PAPER_DIGEST_ORIGIN")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.origin);

        let page_size = parse_or(
            "PAPER_DIGEST_PAGE_SIZE",
            &lookup,
            defaults.page_size,
            |n| n > 0,
        );
        let timeout = Duration::from_secs(parse_or(
            "PAPER_DIGEST_TIMEOUT_SECS",
            &lookup,
            DEFAULT_TIMEOUT_SECS,
            |secs| secs > 0,
        ));
        let retries = parse_or("PAPER_DIGEST_RETRIES", &lookup, defaults.retries, |_| true);
        let user_agent = lookup("PAPER_DIGEST_USER_AGENT").unwrap_or(defaults.user_agent);

        Self {
            origin,
            page_size,
            timeout,
            retries,
            user_agent,
        }
    }

    /// Build the listing/abstract source for this configuration.
    pub fn build_source(&self) -> Result<ArxivClient, SourceError> {
        ArxivClient::new(self)
    }
}

/// Parse `key` if set. Values that fail to parse or that `valid` rejects fall
/// back to `default`.
fn parse_or<T>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
    valid: impl Fn(T) -> bool,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let raw = match lookup(key) {
        None => return default,
        Some(raw) => raw,
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(value) => value,
        _ => {
            tracing::warn!("{}={:?} is not a valid value, using {}", key, raw, default);
            default
        }
    }
}

/// Split a comma-separated argument, trimming items and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.origin, "https://arxiv.org");
        assert_eq!(config.page_size, 2000);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retries, 0);
        assert!(config.user_agent.starts_with("paper-digest/"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PAPER_DIGEST_ORIGIN", "http://127.0.0.1:8080/"),
            ("PAPER_DIGEST_PAGE_SIZE", "500"),
            ("PAPER_DIGEST_TIMEOUT_SECS", "5"),
            ("PAPER_DIGEST_RETRIES", "3"),
        ]);
        assert_eq!(config.origin, "http://127.0.0.1:8080");
        assert_eq!(config.page_size, 500);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("PAPER_DIGEST_RETRIES", "many"),
            ("PAPER_DIGEST_PAGE_SIZE", "-1"),
        ]);
        assert_eq!(config.retries, 0);
        assert_eq!(config.page_size, 2000);
    }

    #[test]
    fn test_zero_timeout_and_page_size_fall_back() {
        let config = config_from(&[
            ("PAPER_DIGEST_TIMEOUT_SECS", "0"),
            ("PAPER_DIGEST_PAGE_SIZE", "0"),
            ("PAPER_DIGEST_RETRIES", "0"),
        ]);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 2000);
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("cs.LG, cs.CL,,"), vec!["cs.LG", "cs.CL"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }
}
