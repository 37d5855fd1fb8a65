//! Plain-text extraction for the file types the indexer accepts.
//!
//! Binary formats (PDF, Word) are recognized so they can be reported
//! clearly, but their contents are not parsed.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use thiserror::Error;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
    static ref SPACES: Regex = Regex::new(r"\s+").expect("valid regex");
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("file type of {0} is not supported; use text, CSV, JSON, HTML or XML files")]
    UnsupportedType(String),
    #[error("cannot extract text from {kind} files ({path})")]
    BinaryFormat { kind: &'static str, path: String },
    #[error("invalid JSON file {path}: {source}")]
    InvalidJson { path: String, source: serde_json::Error },
    #[error("could not extract text from {0}; the file may be empty or corrupted")]
    Empty(String),
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: std::io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Csv,
    Json,
    Html,
    Xml,
    Pdf,
    Word,
    LegacyWord,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let kind = match ext.as_str() {
            "txt" | "text" | "md" => FileKind::Text,
            "csv" => FileKind::Csv,
            "json" => FileKind::Json,
            "html" | "htm" => FileKind::Html,
            "xml" => FileKind::Xml,
            "pdf" => FileKind::Pdf,
            "docx" => FileKind::Word,
            "doc" => FileKind::LegacyWord,
            _ => return None,
        };
        Some(kind)
    }

    pub fn mime(self) -> &'static str {
        match self {
            FileKind::Text => "text/plain",
            FileKind::Csv => "text/csv",
            FileKind::Json => "application/json",
            FileKind::Html => "text/html",
            FileKind::Xml => "application/xml",
            FileKind::Pdf => "application/pdf",
            FileKind::Word => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            FileKind::LegacyWord => "application/msword",
        }
    }
}

/// Extracted text of one file plus the MIME type recorded on the document.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub kind: FileKind,
    pub text: String,
}

pub fn extract_file(path: &Path) -> Result<Extracted, ExtractionError> {
    let display = path.display().to_string();
    let kind = FileKind::from_path(path).ok_or_else(|| ExtractionError::UnsupportedType(display.clone()))?;
    match kind {
        FileKind::Pdf => return Err(ExtractionError::BinaryFormat { kind: "PDF", path: display }),
        FileKind::Word | FileKind::LegacyWord => {
            return Err(ExtractionError::BinaryFormat { kind: "Word", path: display })
        }
        _ => {}
    }
    let raw = fs::read_to_string(path).map_err(|source| ExtractionError::Io { path: display.clone(), source })?;
    let text = extract_text(kind, &raw).map_err(|source| ExtractionError::InvalidJson { path: display.clone(), source })?;
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty(display));
    }
    Ok(Extracted { kind, text })
}

/// Render already-decoded file contents as plain text.
pub fn extract_text(kind: FileKind, raw: &str) -> Result<String, serde_json::Error> {
    let text = match kind {
        FileKind::Csv => raw.replace(',', " "),
        FileKind::Json => {
            let value: serde_json::Value = serde_json::from_str(raw)?;
            serde_json::to_string_pretty(&value)?
        }
        FileKind::Html | FileKind::Xml => strip_markup(raw),
        _ => raw.to_string(),
    };
    Ok(text)
}

fn strip_markup(raw: &str) -> String {
    let no_tags = TAG.replace_all(raw, " ");
    SPACES.replace_all(&no_tags, " ").trim().to_string()
}
