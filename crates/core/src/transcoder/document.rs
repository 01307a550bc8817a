//! In-process conversion between text documents: CSV, JSON, YAML and HTML.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};

use super::error::TranscodeError;
use super::options::ConversionOptions;
use super::traits::Transcoder;

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <style>
    body { font-family: Arial, sans-serif; margin: 20px; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
    th { background-color: #4CAF50; color: white; }
    tr:nth-child(even) { background-color: #f2f2f2; }
  </style>
</head>
<body>
  <table>
"#;

const HTML_TAIL: &str = "  </table>\n</body>\n</html>\n";

/// Parsed input document.
///
/// The source format is sniffed from the bytes: anything that opens with
/// `{` or `[` is JSON, everything else is CSV.
#[derive(Debug)]
enum Document {
    Csv(Vec<Vec<String>>),
    Json(Value),
}

/// Converts tabular and structured text documents.
///
/// | Source | Targets |
/// |---|---|
/// | CSV | `json`, `html`, `yaml` |
/// | JSON | `csv`, `yaml`, `json` (pretty, or minified with `minify`) |
///
/// CSV reading and writing honour the `delimiter` and `include_header`
/// options. Without a header row, columns are named `column_1`, `column_2`...
#[derive(Debug, Clone, Default)]
pub struct DocumentTranscoder;

impl DocumentTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// Whether `target` is a document format this transcoder can produce.
    pub fn supports(target: &str) -> bool {
        matches!(
            target.trim().to_ascii_lowercase().as_str(),
            "json" | "csv" | "html" | "htm" | "yaml" | "yml"
        )
    }

    fn delimiter(options: &ConversionOptions) -> Result<u8, TranscodeError> {
        match options.delimiter() {
            None => Ok(b','),
            Some(d) if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            Some(d) => Err(TranscodeError::invalid_options(format!(
                "delimiter must be a single ASCII character, got {:?}",
                d
            ))),
        }
    }

    fn parse(source: &[u8], delimiter: u8) -> Result<Document, TranscodeError> {
        let text = std::str::from_utf8(source).map_err(|e| TranscodeError::Decode {
            reason: format!("Input is not UTF-8 text: {}", e),
        })?;
        let text = text.trim_start_matches('\u{feff}').trim();

        if text.starts_with('{') || text.starts_with('[') {
            let value = serde_json::from_str(text).map_err(|e| TranscodeError::Decode {
                reason: format!("Invalid JSON file: {}", e),
            })?;
            return Ok(Document::Json(value));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TranscodeError::Decode {
                reason: format!("Invalid CSV file: {}", e),
            })?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        if rows.is_empty() {
            return Err(TranscodeError::Decode {
                reason: "Empty CSV file".to_string(),
            });
        }
        Ok(Document::Csv(rows))
    }

    /// CSV rows as an array of objects keyed by column name.
    fn rows_to_value(rows: &[Vec<String>], include_header: bool) -> Value {
        let (headers, body) = if include_header {
            (rows[0].clone(), &rows[1..])
        } else {
            let width = rows[0].len();
            let generated = (1..=width).map(|i| format!("column_{}", i)).collect::<Vec<_>>();
            (generated, rows)
        };

        let objects = body
            .iter()
            .map(|row| {
                let object: Map<String, Value> = headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        let cell = row.get(i).cloned().unwrap_or_default();
                        (header.clone(), Value::String(cell))
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();
        Value::Array(objects)
    }

    fn value_to_csv(value: &Value, delimiter: u8) -> Result<Vec<u8>, TranscodeError> {
        let not_tabular = || TranscodeError::Decode {
            reason: "JSON must be an array of objects".to_string(),
        };

        let items = value.as_array().ok_or_else(not_tabular)?;
        let objects = items
            .iter()
            .map(|item| item.as_object().ok_or_else(not_tabular))
            .collect::<Result<Vec<_>, _>>()?;
        let first = objects.first().ok_or_else(|| TranscodeError::Decode {
            reason: "Empty JSON array".to_string(),
        })?;
        let headers: Vec<&String> = first.keys().collect();

        let encode_err = |e: String| TranscodeError::Encode { reason: e };
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(headers.iter().map(|h| h.as_str()))
            .map_err(|e| encode_err(e.to_string()))?;
        for object in objects {
            let record = headers.iter().map(|h| cell_text(object.get(h.as_str())));
            writer
                .write_record(record)
                .map_err(|e| encode_err(e.to_string()))?;
        }

        writer.into_inner().map_err(|e| encode_err(e.to_string()))
    }

    fn rows_to_html(rows: &[Vec<String>], include_header: bool) -> String {
        let mut html = String::from(HTML_HEAD);
        let (head, body) = if include_header {
            (Some(&rows[0]), &rows[1..])
        } else {
            (None, rows)
        };

        if let Some(head) = head {
            html.push_str("    <thead>");
            push_row(&mut html, head, "th");
            html.push_str("</thead>\n");
        }
        html.push_str("    <tbody>\n");
        for row in body {
            html.push_str("      ");
            push_row(&mut html, row, "td");
            html.push('\n');
        }
        html.push_str("    </tbody>\n");
        html.push_str(HTML_TAIL);
        html
    }

    fn to_yaml(value: &Value) -> Result<Vec<u8>, TranscodeError> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| TranscodeError::Encode {
                reason: e.to_string(),
            })
    }

    fn to_json(value: &Value, minify: bool) -> Result<Vec<u8>, TranscodeError> {
        let encoded = if minify {
            serde_json::to_vec(value)
        } else {
            serde_json::to_vec_pretty(value)
        };
        encoded.map_err(|e| TranscodeError::Encode {
            reason: e.to_string(),
        })
    }

    fn convert(
        source: &[u8],
        target: &str,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, TranscodeError> {
        let delimiter = Self::delimiter(options)?;
        let include_header = options.include_header();
        let document = Self::parse(source, delimiter)?;

        match (document, target) {
            (Document::Csv(rows), "json") => {
                Self::to_json(&Self::rows_to_value(&rows, include_header), options.minify())
            }
            (Document::Csv(rows), "yaml" | "yml") => {
                Self::to_yaml(&Self::rows_to_value(&rows, include_header))
            }
            (Document::Csv(rows), "html" | "htm") => {
                Ok(Self::rows_to_html(&rows, include_header).into_bytes())
            }
            (Document::Json(value), "json") => Self::to_json(&value, options.minify()),
            (Document::Json(value), "csv") => Self::value_to_csv(&value, delimiter),
            (Document::Json(value), "yaml" | "yml") => Self::to_yaml(&value),
            _ => Err(TranscodeError::unsupported(target)),
        }
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn push_row(html: &mut String, cells: &[String], tag: &str) {
    html.push_str("<tr>");
    for cell in cells {
        html.push('<');
        html.push_str(tag);
        html.push('>');
        html.push_str(&escape_html(cell));
        html.push_str("</");
        html.push_str(tag);
        html.push('>');
    }
    html.push_str("</tr>");
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[async_trait]
impl Transcoder for DocumentTranscoder {
    fn name(&self) -> &str {
        "document"
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        if !Self::supports(target_format) {
            return Err(TranscodeError::unsupported(target_format));
        }

        let target = target_format.trim().to_ascii_lowercase();
        let options = options.clone();
        let output = tokio::task::spawn_blocking(move || Self::convert(&source, &target, &options))
            .await
            .map_err(|e| TranscodeError::failed(format!("Document task failed: {}", e)))??;

        Ok(Bytes::from(output))
    }
}
