use std::io::{self, Write};

use clap::ValueEnum;
use console::style;

use crate::apis::Paper;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Heading, abstract and link, separated by a blank line.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Write one selected paper and flush, so output appears as papers are found.
///
/// With `styled` set the text heading is the bold title; otherwise it is a
/// Markdown `# title` line.
pub fn write_paper<W: Write>(
    out: &mut W,
    paper: &Paper,
    format: OutputFormat,
    styled: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            if styled {
                writeln!(out, "{}", style(&paper.title).bold().force_styling(true))?;
            } else {
                writeln!(out, "# {}", paper.title)?;
            }
            writeln!(out, "{}", paper.abstract_text)?;
            writeln!(out, "{}", paper.url)?;
            writeln!(out)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, paper)?;
            writeln!(out)?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> Paper {
        Paper {
            title: "Foo".to_string(),
            abstract_text: "Studies language models at scale.".to_string(),
            url: "https://arxiv.org/abs/1.0001".to_string(),
        }
    }

    #[test]
    fn test_text_layout() {
        let mut out = Vec::new();
        write_paper(&mut out, &paper(), OutputFormat::Text, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# Foo\nStudies language models at scale.\nhttps://arxiv.org/abs/1.0001\n\n"
        );
    }

    #[test]
    fn test_styled_heading_is_bold_title() {
        let mut out = Vec::new();
        write_paper(&mut out, &paper(), OutputFormat::Text, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let heading = text.lines().next().unwrap();
        assert!(heading.starts_with("\u{1b}[1m"));
        assert!(heading.contains("Foo"));
        assert!(!heading.contains('#'));
        assert!(text.ends_with(
            "Studies language models at scale.\nhttps://arxiv.org/abs/1.0001\n\n"
        ));
    }

    #[test]
    fn test_json_lines() {
        let mut out = Vec::new();
        write_paper(&mut out, &paper(), OutputFormat::Json, true).unwrap();
        write_paper(&mut out, &paper(), OutputFormat::Json, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["title"], "Foo");
        assert_eq!(value["abstract"], "Studies language models at scale.");
        assert_eq!(value["url"], "https://arxiv.org/abs/1.0001");
    }
}
