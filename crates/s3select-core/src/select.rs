//! Request descriptors for the remote select service.
//!
//! Every descriptor has a `params()` method producing the exact parameter
//! shape the service expects (`{"CSV": {"QuoteFields": "ALWAYS", ...}}` and so
//! on). The serde derives give the Rust-side form used in config files; the
//! wire form is always `params()`.
//!
//! Readers hand out an [`OutputSerialization`]; the transport passes its
//! `params()` through verbatim when issuing the request.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionType {
    #[default]
    Sql,
}

impl ExpressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionType::Sql => "SQL",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteFields {
    #[default]
    Always,
    AsNeeded,
}

impl QuoteFields {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteFields::Always => "ALWAYS",
            QuoteFields::AsNeeded => "ASNEEDED",
        }
    }
}

/// CSV response formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOutput {
    pub quote_fields: QuoteFields,
    /// Left to the service default when `None`.
    pub record_delimiter: Option<char>,
    pub field_delimiter: char,
    pub quote_character: char,
    pub quote_escape_character: char,
}

impl CsvOutput {
    /// The dialect the CSV readers decode: every field quoted, `"` as quote
    /// and escape, `,` between fields, service-default record delimiter.
    pub const fn reader_default() -> Self {
        Self {
            quote_fields: QuoteFields::Always,
            record_delimiter: None,
            field_delimiter: ',',
            quote_character: '"',
            quote_escape_character: '"',
        }
    }

    pub fn params(&self) -> Value {
        let mut opts = Map::new();
        opts.insert("QuoteFields".into(), json!(self.quote_fields.as_str()));
        if let Some(d) = self.record_delimiter {
            opts.insert("RecordDelimiter".into(), json!(d.to_string()));
        }
        opts.insert("FieldDelimiter".into(), json!(self.field_delimiter.to_string()));
        opts.insert("QuoteCharacter".into(), json!(self.quote_character.to_string()));
        opts.insert(
            "QuoteEscapeCharacter".into(),
            json!(self.quote_escape_character.to_string()),
        );
        json!({ "CSV": opts })
    }
}

impl Default for CsvOutput {
    fn default() -> Self {
        Self::reader_default()
    }
}

/// JSON response formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOutput {
    pub record_delimiter: char,
}

impl JsonOutput {
    pub const fn newline_delimited() -> Self {
        Self {
            record_delimiter: '\n',
        }
    }

    pub fn params(&self) -> Value {
        json!({ "JSON": { "RecordDelimiter": self.record_delimiter.to_string() } })
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::newline_delimited()
    }
}

/// The serialization a reader requires of the service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputSerialization {
    Csv(CsvOutput),
    Json(JsonOutput),
}

impl OutputSerialization {
    /// Wire format name (`CSV` or `JSON`).
    pub fn format_name(&self) -> &'static str {
        match self {
            OutputSerialization::Csv(_) => "CSV",
            OutputSerialization::Json(_) => "JSON",
        }
    }

    pub fn params(&self) -> Value {
        match self {
            OutputSerialization::Csv(c) => c.params(),
            OutputSerialization::Json(j) => j.params(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    #[default]
    None,
    Gzip,
    Bzip2,
}

impl CompressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionType::None => "NONE",
            CompressionType::Gzip => "GZIP",
            CompressionType::Bzip2 => "BZIP2",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileHeaderInfo {
    #[default]
    None,
    Ignore,
    Use,
}

impl FileHeaderInfo {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileHeaderInfo::None => "NONE",
            FileHeaderInfo::Ignore => "IGNORE",
            FileHeaderInfo::Use => "USE",
        }
    }
}

/// How the stored object is laid out when it is CSV.
///
/// `allow_quoted_record_delimiter` lets quoted fields span records, which the
/// service documents as slower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvInput {
    pub allow_quoted_record_delimiter: bool,
    pub comments: Option<char>,
    pub field_delimiter: char,
    pub file_header_info: FileHeaderInfo,
    pub quote_character: char,
    pub quote_escape_character: char,
    pub record_delimiter: Option<char>,
}

impl Default for CsvInput {
    fn default() -> Self {
        Self {
            allow_quoted_record_delimiter: false,
            comments: None,
            field_delimiter: ',',
            file_header_info: FileHeaderInfo::None,
            quote_character: '"',
            quote_escape_character: '"',
            record_delimiter: None,
        }
    }
}

impl CsvInput {
    fn options(&self) -> Value {
        let mut opts = Map::new();
        opts.insert(
            "AllowQuotedRecordDelimiter".into(),
            json!(self.allow_quoted_record_delimiter),
        );
        opts.insert("FieldDelimiter".into(), json!(self.field_delimiter.to_string()));
        opts.insert("FileHeaderInfo".into(), json!(self.file_header_info.as_str()));
        opts.insert("QuoteCharacter".into(), json!(self.quote_character.to_string()));
        opts.insert(
            "QuoteEscapeCharacter".into(),
            json!(self.quote_escape_character.to_string()),
        );
        if let Some(c) = self.comments {
            opts.insert("Comments".into(), json!(c.to_string()));
        }
        if let Some(d) = self.record_delimiter {
            opts.insert("RecordDelimiter".into(), json!(d.to_string()));
        }
        Value::Object(opts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonType {
    Document,
    Lines,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Document => "DOCUMENT",
            JsonType::Lines => "LINES",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonInput {
    pub kind: Option<JsonType>,
}

impl JsonInput {
    fn options(&self) -> Value {
        let mut opts = Map::new();
        if let Some(kind) = self.kind {
            opts.insert("Type".into(), json!(kind.as_str()));
        }
        Value::Object(opts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    #[default]
    Parquet,
    Csv(CsvInput),
    Json(JsonInput),
}

/// How the stored object is encoded. Defaults to uncompressed Parquet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSerialization {
    pub compression: CompressionType,
    pub format: InputFormat,
}

impl InputSerialization {
    pub fn params(&self) -> Value {
        let mut out = Map::new();
        match &self.format {
            InputFormat::Parquet => {
                out.insert("Parquet".into(), json!({}));
            }
            InputFormat::Csv(c) => {
                out.insert("CSV".into(), c.options());
            }
            InputFormat::Json(j) => {
                out.insert("JSON".into(), j.options());
            }
        }
        out.insert("CompressionType".into(), json!(self.compression.as_str()));
        Value::Object(out)
    }
}

/// Byte range of the object to scan; `end` open when `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ScanRange {
    pub fn params(&self) -> Value {
        let mut out = Map::new();
        out.insert("Start".into(), json!(self.start));
        if let Some(end) = self.end {
            out.insert("End".into(), json!(end));
        }
        Value::Object(out)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestProgress {
    pub enabled: bool,
}

impl RequestProgress {
    pub fn params(&self) -> Value {
        json!({ "Enabled": self.enabled })
    }
}

/// Everything about a select request except the object location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectParams {
    pub expression: String,
    pub expression_type: ExpressionType,
    pub input: InputSerialization,
    pub output: OutputSerialization,
    pub scan_range: ScanRange,
    pub progress: RequestProgress,
}

impl SelectParams {
    pub fn new(expression: impl Into<String>, output: OutputSerialization) -> Self {
        Self {
            expression: expression.into(),
            expression_type: ExpressionType::Sql,
            input: InputSerialization::default(),
            output,
            scan_range: ScanRange::default(),
            progress: RequestProgress::default(),
        }
    }

    pub fn with_input(mut self, input: InputSerialization) -> Self {
        self.input = input;
        self
    }

    pub fn with_scan_range(mut self, scan_range: ScanRange) -> Self {
        self.scan_range = scan_range;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = RequestProgress { enabled };
        self
    }

    pub fn params(&self) -> Value {
        json!({
            "Expression": self.expression,
            "ExpressionType": self.expression_type.as_str(),
            "InputSerialization": self.input.params(),
            "OutputSerialization": self.output.params(),
            "ScanRange": self.scan_range.params(),
            "RequestProgress": self.progress.params(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_csv_descriptor_matches_wire_literal() {
        let out = OutputSerialization::Csv(CsvOutput::reader_default());
        assert_eq!(out.format_name(), "CSV");
        assert_eq!(
            out.params(),
            json!({"CSV": {
                "QuoteFields": "ALWAYS",
                "QuoteEscapeCharacter": "\"",
                "FieldDelimiter": ",",
                "QuoteCharacter": "\"",
            }})
        );
    }

    #[test]
    fn csv_output_with_record_delimiter() {
        let out = CsvOutput {
            quote_fields: QuoteFields::AsNeeded,
            record_delimiter: Some('\n'),
            ..CsvOutput::reader_default()
        };
        let p = out.params();
        assert_eq!(p["CSV"]["QuoteFields"], "ASNEEDED");
        assert_eq!(p["CSV"]["RecordDelimiter"], "\n");
    }

    #[test]
    fn json_descriptor_matches_wire_literal() {
        let out = OutputSerialization::Json(JsonOutput::default());
        assert_eq!(out.params(), json!({"JSON": {"RecordDelimiter": "\n"}}));
    }

    #[test]
    fn input_defaults_to_uncompressed_parquet() {
        assert_eq!(
            InputSerialization::default().params(),
            json!({"Parquet": {}, "CompressionType": "NONE"})
        );
    }

    #[test]
    fn csv_input_optional_keys() {
        let input = InputSerialization {
            compression: CompressionType::Gzip,
            format: InputFormat::Csv(CsvInput {
                comments: Some('#'),
                file_header_info: FileHeaderInfo::Use,
                ..CsvInput::default()
            }),
        };
        let p = input.params();
        assert_eq!(p["CompressionType"], "GZIP");
        assert_eq!(p["CSV"]["Comments"], "#");
        assert_eq!(p["CSV"]["FileHeaderInfo"], "USE");
        assert_eq!(p["CSV"]["AllowQuotedRecordDelimiter"], false);
        assert!(p["CSV"].get("RecordDelimiter").is_none());
    }

    #[test]
    fn json_input_type_is_optional() {
        let bare = InputSerialization {
            compression: CompressionType::None,
            format: InputFormat::Json(JsonInput::default()),
        };
        assert_eq!(bare.params()["JSON"], json!({}));

        let lines = InputSerialization {
            compression: CompressionType::Bzip2,
            format: InputFormat::Json(JsonInput {
                kind: Some(JsonType::Lines),
            }),
        };
        assert_eq!(lines.params()["JSON"], json!({"Type": "LINES"}));
        assert_eq!(lines.params()["CompressionType"], "BZIP2");
    }

    #[test]
    fn select_params_assemble_all_sections() {
        let p = SelectParams::new(
            "SELECT * FROM S3Object s",
            OutputSerialization::Json(JsonOutput::default()),
        )
        .with_scan_range(ScanRange {
            start: 10,
            end: Some(20),
        })
        .with_progress(true)
        .params();
        assert_eq!(p["Expression"], "SELECT * FROM S3Object s");
        assert_eq!(p["ExpressionType"], "SQL");
        assert_eq!(p["ScanRange"], json!({"Start": 10, "End": 20}));
        assert_eq!(p["RequestProgress"], json!({"Enabled": true}));
        assert_eq!(p["OutputSerialization"], json!({"JSON": {"RecordDelimiter": "\n"}}));
    }
}
