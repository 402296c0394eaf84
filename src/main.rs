use std::io;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod apis;
mod config;
mod render;
mod search;
mod select;

use config::{split_list, Config};
use render::OutputFormat;
use select::{KeywordFilter, SelectionCriteria};

/// Print the papers listed on a given day whose abstracts match a set of keywords.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Comma-separated subject codes, e.g. cs.LG,cs.CL
    #[arg(long, default_value = "cs.LG,cs.CL")]
    subjects: String,
    /// Listing date as YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Comma-separated keywords that must all appear in the abstract
    #[arg(long, default_value = "")]
    required_keywords: String,
    /// Comma-separated keywords of which at least one must appear
    #[arg(long, default_value = "")]
    any_keywords: String,
    /// Match keywords as plain text rather than regular expressions
    #[arg(long)]
    literal: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn criteria(&self) -> SelectionCriteria {
        SelectionCriteria {
            required: split_list(&self.required_keywords),
            any: split_list(&self.any_keywords),
            literal: self.literal,
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let subjects = split_list(&args.subjects);
    if subjects.is_empty() {
        anyhow::bail!("No subjects given. Use --subjects with at least one subject code.");
    }
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let filter = KeywordFilter::new(&args.criteria()).context("Failed to compile keywords")?;

    let config = Config::from_env();
    let source = config.build_source().context("Failed to build HTTP client")?;

    tracing::info!(
        "Scanning {} for {} (origin={}, filter {})",
        subjects.join(","),
        date,
        config.origin,
        if filter.is_empty() { "off" } else { "on" }
    );

    let mut out = io::stdout();
    let styled = console::colors_enabled();
    let selection = search::run(&source, &subjects, date, &filter, |paper| {
        if let Err(e) = render::write_paper(&mut out, paper, args.format, styled) {
            tracing::warn!("Failed to write {:?}: {}", paper.title, e);
        }
    })
    .await;

    tracing::info!(
        "Selected {} papers ({} candidates skipped)",
        selection.papers.len(),
        selection.skipped_candidates
    );
    if selection.failed_subjects.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    for failure in &selection.failed_subjects {
        tracing::error!("Subject {} failed: {}", failure.subject, failure.error);
    }
    Ok(ExitCode::FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["paper-digest"]).unwrap();
        assert_eq!(split_list(&args.subjects), vec!["cs.LG", "cs.CL"]);
        assert_eq!(args.date, None);
        assert_eq!(args.format, OutputFormat::Text);

        let criteria = args.criteria();
        assert!(criteria.required.is_empty());
        assert!(criteria.any.is_empty());
        assert!(!criteria.literal);
    }

    #[test]
    fn test_full_argument_set() {
        let args = Args::try_parse_from([
            "paper-digest",
            "--subjects",
            "cs.AI",
            "--date",
            "2024-01-01",
            "--required-keywords",
            "quantization, llm",
            "--any-keywords",
            "4-bit",
            "--literal",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.format, OutputFormat::Json);

        let criteria = args.criteria();
        assert_eq!(criteria.required, vec!["quantization", "llm"]);
        assert_eq!(criteria.any, vec!["4-bit"]);
        assert!(criteria.literal);
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Args::try_parse_from(["paper-digest", "--date", "01/02/2024"]).is_err());
        assert!(Args::try_parse_from(["paper-digest", "--date", "2024-02-30"]).is_err());
    }
}
