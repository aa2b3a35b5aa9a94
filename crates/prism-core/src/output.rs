//! Result records and their JSON / JSONL serialization.

use crate::catalog;
use crate::error::GenerationError;
use crate::types::EntryOutcome;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array of records
    Json,
    /// One record per line
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// One generated (or failed) entry, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    /// 1-based position of the prompt in the set
    pub prompt_number: usize,
    pub prompt: String,
    pub model_id: String,
    pub model_name: String,
    pub image_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRecord {
    /// Build a record from an outcome. Failed outcomes have no result, so
    /// the prompt and selection are taken from the entry's job snapshot.
    pub fn from_outcome(outcome: &EntryOutcome, prompt: &str, model_id: &str, size_id: &str) -> Self {
        let (prompt, model_id, size_id, image_url, error) = match &outcome.result {
            Ok(result) => (
                result.prompt_text.as_str(),
                result.model_id.as_str(),
                result.image_size_id.as_str(),
                Some(result.image_url.clone()),
                None,
            ),
            Err(e) => (prompt, model_id, size_id, None, Some(error_text(e))),
        };
        Self {
            prompt_number: outcome.index + 1,
            prompt: prompt.to_string(),
            model_id: model_id.to_string(),
            model_name: catalog::model_name(model_id).to_string(),
            image_size: size_id.to_string(),
            image_url,
            saved_path: None,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn error_text(error: &GenerationError) -> String {
    match error {
        GenerationError::Auth { message } => format!("authentication failed: {message}"),
        other => other.to_string(),
    }
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects the JSON format; JSONL is always one line per item.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        let pretty = self.pretty && self.format == OutputFormat::Json;
        self.write_json(item, pretty)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a batch: one array for JSON, one line per item for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.write_json(items, self.pretty)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationResult;

    fn ok_outcome() -> EntryOutcome {
        EntryOutcome {
            index: 2,
            result: Ok(GenerationResult {
                image_url: "https://fal.media/a.png".into(),
                prompt_text: "a heron".into(),
                model_id: "fal-ai/flux/schnell".into(),
                image_size_id: "square".into(),
            }),
        }
    }

    fn failed_outcome() -> EntryOutcome {
        EntryOutcome {
            index: 0,
            result: Err(GenerationError::Failed {
                message: "fal HTTP 500".into(),
            }),
        }
    }

    #[test]
    fn test_record_from_success_uses_result_stamp() {
        let record = ResultRecord::from_outcome(
            &ok_outcome(),
            "edited later",
            "fal-ai/kolors",
            "landscape_16_9",
        );
        assert_eq!(record.prompt_number, 3);
        assert_eq!(record.prompt, "a heron");
        assert_eq!(record.model_id, "fal-ai/flux/schnell");
        assert_eq!(record.model_name, catalog::model_name("fal-ai/flux/schnell"));
        assert_eq!(record.image_size, "square");
        assert!(record.is_success());
    }

    #[test]
    fn test_record_from_failure() {
        let record = ResultRecord::from_outcome(
            &failed_outcome(),
            "a heron",
            catalog::DEFAULT_MODEL,
            catalog::DEFAULT_SIZE,
        );
        assert!(!record.is_success());
        assert!(record.image_url.is_none());
        assert_eq!(record.error.as_deref(), Some("fal HTTP 500"));
    }

    #[test]
    fn test_auth_failure_text() {
        let outcome = EntryOutcome {
            index: 0,
            result: Err(GenerationError::Auth {
                message: "HTTP 401".into(),
            }),
        };
        let record = ResultRecord::from_outcome(&outcome, "p", catalog::DEFAULT_MODEL, "square");
        assert_eq!(record.error.as_deref(), Some("authentication failed: HTTP 401"));
    }

    #[test]
    fn test_failed_record_omits_empty_fields() {
        let record =
            ResultRecord::from_outcome(&failed_outcome(), "p", catalog::DEFAULT_MODEL, "square");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("image_url").is_none());
        assert!(json.get("saved_path").is_none());
        assert_eq!(json["error"], "fal HTTP 500");
    }

    #[test]
    fn test_write_jsonl() {
        let records = vec![
            ResultRecord::from_outcome(&failed_outcome(), "p", catalog::DEFAULT_MODEL, "square"),
            ResultRecord::from_outcome(&ok_outcome(), "p", catalog::DEFAULT_MODEL, "square"),
        ];
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_all(&records).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"image_url\":\"https://fal.media/a.png\""));
    }

    #[test]
    fn test_write_all_json_array() {
        let records = vec![ResultRecord::from_outcome(
            &ok_outcome(),
            "p",
            catalog::DEFAULT_MODEL,
            "square",
        )];
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_all(&records).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("csv"), None);
    }
}
