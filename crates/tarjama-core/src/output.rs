//! Writing batch results for the command line.
//!
//! Supports a plain-text listing, a JSON array, JSON Lines (one record per
//! image), and a standalone HTML results page.

use crate::batch::TranslationResult;
use crate::error::TarjamaError;
use crate::render;
use std::io::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
    /// Standalone HTML page with image/translation pairs
    Html,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

/// Serializes batch results to a writer in one format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON array format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write a whole batch, in input order.
    pub fn write_all(&mut self, results: &[TranslationResult]) -> Result<(), TarjamaError> {
        match self.format {
            OutputFormat::Text => {
                self.writer
                    .write_all(render::render_results_text(results).as_bytes())?;
            }
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, results)?;
                } else {
                    serde_json::to_writer(&mut self.writer, results)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                for result in results {
                    serde_json::to_writer(&mut self.writer, result)?;
                    writeln!(self.writer)?;
                }
            }
            OutputFormat::Html => {
                self.writer
                    .write_all(render::render_results_html(results)?.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::fixtures::jpeg;

    fn sample() -> Vec<TranslationResult> {
        vec![
            TranslationResult {
                image: jpeg("1.jpg"),
                outcome: Ok("مرحبا".to_string()),
            },
            TranslationResult {
                image: jpeg("2.jpg"),
                outcome: Err("HTTP 429".to_string()),
            },
        ]
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("ndjson"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("html"), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::parse("xml"), None);
    }

    #[test]
    fn test_jsonl_one_line_per_image() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::JsonLines, false);
        writer.write_all(&sample()).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["image"], "2.jpg");
        assert_eq!(second["translation"], "Error: HTTP 429");
    }

    #[test]
    fn test_json_array_keeps_order() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, true);
        writer.write_all(&sample()).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();

        let parsed: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["translation"], "مرحبا");
        assert_eq!(parsed[0]["ok"], true);
    }

    #[test]
    fn test_html_output() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Html, false);
        writer.write_all(&sample()).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("dir=\"rtl\""));
    }
}
